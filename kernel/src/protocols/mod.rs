// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The secpart Authors

pub mod errors;
pub mod ffa;
pub mod mem_mgr;
pub mod storage;

use crate::mm::AddressSpace;
use crate::storage::StorageRegistry;
use ffa::{DirectMsg, FfaMessage};
use uuid::Uuid;

// FF-A endpoint ids
/// The partition itself
pub const STMM_ID: u16 = 1;
/// Management endpoint issuing requests on behalf of non-secure callers
pub const STMM_PTA_ID: u16 = 2;
pub const MEM_MGR_ID: u16 = 3;
pub const FFA_STORAGE_ID: u16 = 4;

/// The only command accepted from non-secure callers: forward the comm
/// buffer to the partition.
pub const PTA_STMM_CMD_COMMUNICATE: u32 = 0;

/// Kernel services reachable from the partition through direct requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    MemMgr,
    Storage,
}

impl Endpoint {
    /// Looks up the service registered for a destination id. The partition
    /// and management ids are reserved and never serviced.
    pub const fn lookup(id: u16) -> Option<Self> {
        match id {
            MEM_MGR_ID => Some(Self::MemMgr),
            FFA_STORAGE_ID => Some(Self::Storage),
            _ => None,
        }
    }

    /// Services `req` and returns the reply to deliver to the partition.
    pub fn handle(self, ctx: &mut ServiceContext<'_>, req: &DirectMsg) -> FfaMessage {
        match self {
            Self::MemMgr => mem_mgr::mem_mgr_request(ctx, req),
            Self::Storage => storage::storage_request(ctx, req),
        }
    }
}

/// Everything a service handler may touch while the partition waits for its
/// reply.
#[derive(Debug)]
pub struct ServiceContext<'a> {
    /// Address space of the calling partition
    pub aspace: &'a mut dyn AddressSpace,
    pub storage: &'a StorageRegistry,
    /// Identity owning the partition's persistent objects
    pub owner: Uuid,
}
