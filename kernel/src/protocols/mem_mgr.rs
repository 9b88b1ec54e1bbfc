// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The secpart Authors

//! Memory manager endpoint: lets the partition query and change the
//! permissions of its own pages.

use super::errors::SpRetCode;
use super::ffa::{DirectMsg, FfaMessage};
use super::ServiceContext;
use crate::address::{Address, VirtAddr};
use crate::mm::{AddressSpace, Prot};
use crate::types::PAGE_SIZE;

pub const FFA_SVC_MEMORY_ATTRIBUTES_GET_64: u32 = 0xC400_0064;
pub const FFA_SVC_MEMORY_ATTRIBUTES_SET_64: u32 = 0xC400_0065;

pub const SP_MEM_ATTR_ACCESS_NOACCESS: u64 = 0;
pub const SP_MEM_ATTR_ACCESS_RW: u64 = 1;
pub const SP_MEM_ATTR_ACCESS_RO: u64 = 3;
pub const SP_MEM_ATTR_ACCESS_MASK: u64 = 3;
pub const SP_MEM_ATTR_EXEC_NEVER: u64 = 1 << 2;
pub const SP_MEM_ATTR_EXEC: u64 = 0;
pub const SP_MEM_ATTR_ALL: u64 = SP_MEM_ATTR_ACCESS_MASK | SP_MEM_ATTR_EXEC_NEVER;

/// Returns the permission bits of the page containing `va`, or the
/// `DENIED` code if it cannot be determined.
pub fn get_mem_attr(aspace: &dyn AddressSpace, va: VirtAddr) -> u32 {
    if va.is_null() {
        return SpRetCode::DENIED.into();
    }

    let Ok(prot) = aspace.get_prot(va.page_align(), PAGE_SIZE) else {
        return SpRetCode::DENIED.into();
    };

    let mut perm = SP_MEM_ATTR_ACCESS_NOACCESS;
    if prot.contains(Prot::UW) {
        perm |= SP_MEM_ATTR_ACCESS_RW;
    } else if prot.contains(Prot::UR) {
        perm |= SP_MEM_ATTR_ACCESS_RO;
    }

    if !prot.contains(Prot::UX) {
        perm |= SP_MEM_ATTR_EXEC_NEVER;
    }

    perm as u32
}

/// Applies `perm` to `nr_pages` pages starting at `va`.
pub fn set_mem_attr(
    aspace: &mut dyn AddressSpace,
    va: VirtAddr,
    nr_pages: u64,
    perm: u64,
) -> SpRetCode {
    let Some(size) = usize::try_from(nr_pages)
        .ok()
        .and_then(|n| n.checked_mul(PAGE_SIZE))
    else {
        return SpRetCode::INVALID_PARAM;
    };

    if va.is_null() || size == 0 || perm & !SP_MEM_ATTR_ALL != 0 {
        return SpRetCode::INVALID_PARAM;
    }

    // Kernel access follows the partition's data access
    let mut prot = match perm & SP_MEM_ATTR_ACCESS_MASK {
        SP_MEM_ATTR_ACCESS_RO => Prot::UR | Prot::PR,
        SP_MEM_ATTR_ACCESS_RW => Prot::URW | Prot::PRW,
        _ => Prot::empty(),
    };

    if perm & SP_MEM_ATTR_EXEC_NEVER == SP_MEM_ATTR_EXEC {
        prot |= Prot::UX;
    }

    match aspace.set_prot(va, size, prot) {
        Ok(()) => SpRetCode::SUCCESS,
        Err(_) => SpRetCode::DENIED,
    }
}

pub fn mem_mgr_request(ctx: &mut ServiceContext<'_>, req: &DirectMsg) -> FfaMessage {
    let [action, va, nr_pages, perm, _] = req.args;
    let va = VirtAddr::from(va);

    match action as u32 {
        FFA_SVC_MEMORY_ATTRIBUTES_GET_64 => req.response(get_mem_attr(ctx.aspace, va)),
        FFA_SVC_MEMORY_ATTRIBUTES_SET_64 => {
            req.response(set_mem_attr(ctx.aspace, va, nr_pages, perm).into())
        }
        _ => {
            log::error!("Undefined memory manager service id {:#x}", action);
            req.response(SpRetCode::INVALID_PARAM.into())
        }
    }
}
