// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The secpart Authors

extern crate alloc;

use crate::mm::{AddressSpace, VmError};
use crate::vmm::{EntryOutcome, SpRegs};
use alloc::boxed::Box;
use core::fmt::Debug;

/// CNTKCTL_EL1 bit granting EL0 access to the physical counter.
pub const CNTKCTL_PL0PCTEN: u64 = 1 << 0;

/// Exception mask state as returned by [`SpPlatform::mask_exceptions`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExceptionMask(pub u32);

/// This defines the CPU and kernel services the partition manager needs
/// from the architecture it runs on.
pub trait SpPlatform: Debug {
    /// Masks all asynchronous exceptions and returns the previous mask.
    fn mask_exceptions(&mut self) -> ExceptionMask;

    /// Restores a mask returned by [`Self::mask_exceptions`].
    fn restore_exceptions(&mut self, mask: ExceptionMask);

    /// Reads the counter-timer kernel control register.
    fn read_cntkctl(&self) -> u64;

    /// Writes the counter-timer kernel control register.
    fn write_cntkctl(&mut self, val: u64);

    /// Clears partition-owned FP/SIMD register state.
    fn clear_vfp_state(&mut self);

    /// Affinity identifier of the calling CPU.
    fn read_mpidr(&self) -> u64;

    /// Creates an empty address space for a new partition.
    fn new_address_space(&mut self) -> Result<Box<dyn AddressSpace>, VmError>;

    /// Runs the partition in `aspace` from the state in `regs` until it
    /// issues a call or faults. On return `regs` holds the partition state at
    /// the point of the call.
    fn enter_user_mode(&mut self, aspace: &mut dyn AddressSpace, regs: &mut SpRegs)
        -> EntryOutcome;
}
