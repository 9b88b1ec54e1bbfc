// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The secpart Authors

//! Call loop between the kernel and a running partition.
//!
//! Each entry into the partition ends with an FF-A call. Version queries
//! and direct requests to kernel services are answered in place and the
//! partition is resumed with the reply, so a single [`run_partition`] call
//! may enter the partition many times. It returns once the partition sends
//! its direct response, faults, or issues a call this core does not know.

use crate::error::SpError;
use crate::partition::PartitionContext;
use crate::platform::SpPlatform;
use crate::protocols::errors::SpRetCode;
use crate::protocols::ffa::{
    make_ffa_version, DirectMsg, FfaMessage, FFA_VERSION_MAJOR, FFA_VERSION_MINOR,
};
use crate::protocols::{Endpoint, ServiceContext};
use crate::storage::StorageRegistry;
use crate::vmm::{enter_partition, EntryOutcome, SpRegs};
use uuid::Uuid;

/// Diagnostic code reported when the partition issues an unknown call.
pub const SP_PANIC_UNKNOWN_CALL: u32 = 0xabcd;

/// What to do after a partition call has been handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SvcAction {
    /// Re-enter the partition with the updated registers
    Resume,
    /// The partition delivered its direct response
    Return,
    Panic(u32),
}

/// Kernel services available to the partition while it runs.
#[derive(Debug, Clone, Copy)]
pub struct SpServices<'a> {
    pub storage: &'a StorageRegistry,
    /// Identity owning the partition's persistent objects
    pub owner: Uuid,
    pub with_vfp: bool,
}

fn handle_direct_req(frame: &mut SpRegs, svc: &mut ServiceContext<'_>, req: &DirectMsg) {
    let reply = match Endpoint::lookup(req.endpoints.dst) {
        Some(endpoint) => endpoint.handle(svc, req),
        None => {
            log::error!("Undefined endpoint id {:#x}", req.endpoints.dst);
            req.error(SpRetCode::INVALID_PARAM.into())
        }
    };

    frame.set_args(&reply.encode());
}

fn handle_svc(frame: &mut SpRegs, svc: &mut ServiceContext<'_>) -> SvcAction {
    let msg = FfaMessage::decode(&frame.args());

    match msg {
        FfaMessage::Version { input } => {
            log::debug!("Received FFA version {:#x}", input);
            frame.x[0] = make_ffa_version(FFA_VERSION_MAJOR, FFA_VERSION_MINOR).into();
            SvcAction::Resume
        }
        FfaMessage::DirectResp(_) => {
            log::debug!("Received FFA direct response");
            SvcAction::Return
        }
        FfaMessage::DirectReq(req) => {
            log::debug!("Received FFA direct request");
            handle_direct_req(frame, svc, &req);
            SvcAction::Resume
        }
        FfaMessage::Error { .. } | FfaMessage::Unknown(_) => {
            log::error!("Undefined syscall {:#x}", frame.x[0] as u32);
            SvcAction::Panic(SP_PANIC_UNKNOWN_CALL)
        }
    }
}

/// Runs the partition from the state saved in `ctx` until it delivers a
/// direct response.
///
/// On success the partition's resumption point and its response registers
/// are saved in the context. A fault or an unknown call leaves the saved
/// state untouched and fails with [`SpError::TargetDead`]; the context is
/// not destroyed.
pub fn run_partition(
    platform: &mut dyn SpPlatform,
    ctx: &mut PartitionContext,
    services: &SpServices<'_>,
) -> Result<(), SpError> {
    let mut frame = ctx.regs;

    loop {
        match enter_partition(platform, ctx.aspace.as_mut(), &mut frame, services.with_vfp) {
            EntryOutcome::Resumed => {}
            EntryOutcome::Faulted(code) => {
                log::error!("Partition faulted, abort code {:#x}", code);
                ctx.dump_state();
                return Err(SpError::TargetDead);
            }
        }

        let mut svc = ServiceContext {
            aspace: ctx.aspace.as_mut(),
            storage: services.storage,
            owner: services.owner,
        };

        match handle_svc(&mut frame, &mut svc) {
            SvcAction::Resume => {}
            SvcAction::Return => {
                ctx.regs.save_return_state(&frame);
                return Ok(());
            }
            SvcAction::Panic(code) => {
                log::error!("Partition panicked, code {:#x}", code);
                return Err(SpError::TargetDead);
            }
        }
    }
}
