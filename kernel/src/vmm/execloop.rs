// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The secpart Authors

use crate::mm::AddressSpace;
use crate::platform::{SpPlatform, CNTKCTL_PL0PCTEN};
use crate::vmm::{EntryOutcome, SpRegs};

/// Transfers control into the partition and back.
///
/// Asynchronous exceptions stay masked and the partition gets access to the
/// physical counter for the duration of the call; both are restored before
/// returning. With `with_vfp` set the partition's FP/SIMD state is cleared
/// afterwards so nothing leaks to the next user of the CPU.
///
/// The call blocks until the partition issues its next call or faults. A
/// fault is only reported; tearing the partition down is up to the caller.
pub fn enter_partition(
    platform: &mut dyn SpPlatform,
    aspace: &mut dyn AddressSpace,
    regs: &mut SpRegs,
    with_vfp: bool,
) -> EntryOutcome {
    let exceptions = platform.mask_exceptions();
    let cntkctl = platform.read_cntkctl();
    platform.write_cntkctl(cntkctl | CNTKCTL_PL0PCTEN);

    let outcome = platform.enter_user_mode(aspace, regs);

    platform.write_cntkctl(cntkctl);
    platform.restore_exceptions(exceptions);

    if with_vfp {
        platform.clear_vfp_state();
    }

    outcome
}
