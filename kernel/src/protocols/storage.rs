// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The secpart Authors

//! Storage endpoint: proxies reads and writes of the partition's variable
//! store to a persistent object backend.
//!
//! Every request opens the object, transfers the data between the backend
//! and the partition's buffer and closes the object again. The buffer is
//! checked against the partition's own permissions before the backend is
//! touched.

extern crate alloc;

use super::errors::SpRetCode;
use super::ffa::{DirectMsg, FfaMessage};
use super::ServiceContext;
use crate::address::VirtAddr;
use crate::error::{tee_result_code, TeeError};
use crate::mm::AccessFlags;
use crate::storage::{DataFlags, PersistentObject, StorageError, TEE_STORAGE_PRIVATE_RPMB};
use alloc::vec;

pub const FFA_SVC_RPMB_READ: u32 = 0xC400_0066;
pub const FFA_SVC_RPMB_WRITE: u32 = 0xC400_0067;

/// Name of the object holding the variable store.
pub const EFI_VARS_OBJ_ID: &[u8] = b"EFI_VARS";

type TransferFn = fn(
    &mut ServiceContext<'_>,
    u32,
    &[u8],
    VirtAddr,
    usize,
    usize,
    DataFlags,
) -> Result<(), TeeError>;

/// Reads `len` bytes at `offset` of the object `obj_id` into the partition
/// buffer at `va`.
///
/// A corrupt object is removed from the backend. A read returning fewer
/// bytes than requested is reported as corruption too, after the bytes that
/// were read have been copied out.
pub fn sec_storage_obj_read(
    ctx: &mut ServiceContext<'_>,
    storage_id: u32,
    obj_id: &[u8],
    va: VirtAddr,
    len: usize,
    offset: usize,
    flags: DataFlags,
) -> Result<(), TeeError> {
    let fops = ctx.storage.file_ops(storage_id).ok_or(TeeError::NotFound)?;
    let po = PersistentObject::new(ctx.owner, obj_id, flags).ok_or(TeeError::BadParameters)?;

    ctx.aspace
        .check_access_rights(AccessFlags::WRITE | AccessFlags::ANY_OWNER, va, len)?;

    let mut fh = fops.open(&po)?;
    let mut buf = vec![0u8; len];

    match fh.read(offset, &mut buf) {
        Ok(n) => {
            ctx.aspace.write_bytes(va, &buf[..n])?;
            if n == len {
                Ok(())
            } else {
                Err(TeeError::CorruptObject)
            }
        }
        Err(StorageError::Corrupt) => {
            log::error!("Object corrupt");
            drop(fh);
            if let Err(e) = fops.remove(&po) {
                log::error!("Failed to remove corrupt object: {:?}", e);
            }
            Err(TeeError::CorruptObject)
        }
        Err(e) => Err(e.into()),
    }
}

/// Writes `len` bytes from the partition buffer at `va` to the object
/// `obj_id` at `offset`, creating the object on first use.
pub fn sec_storage_obj_write(
    ctx: &mut ServiceContext<'_>,
    storage_id: u32,
    obj_id: &[u8],
    va: VirtAddr,
    len: usize,
    offset: usize,
    flags: DataFlags,
) -> Result<(), TeeError> {
    let fops = ctx.storage.file_ops(storage_id).ok_or(TeeError::NotFound)?;
    let po = PersistentObject::new(ctx.owner, obj_id, flags).ok_or(TeeError::BadParameters)?;

    ctx.aspace
        .check_access_rights(AccessFlags::READ | AccessFlags::ANY_OWNER, va, len)?;

    let mut fh = match fops.open(&po) {
        Err(StorageError::NotFound) => fops.create(&po, false)?,
        res => res?,
    };

    let mut data = vec![0u8; len];
    ctx.aspace.read_bytes(va, &mut data)?;
    fh.write(offset, &data)?;

    Ok(())
}

pub fn storage_request(ctx: &mut ServiceContext<'_>, req: &DirectMsg) -> FfaMessage {
    let flags = DataFlags::ACCESS_READ
        | DataFlags::ACCESS_WRITE
        | DataFlags::SHARE_READ
        | DataFlags::SHARE_WRITE;
    let [action, va, len, offset, _] = req.args;
    let va = VirtAddr::from(va);

    let transfer: TransferFn = match action as u32 {
        FFA_SVC_RPMB_READ => sec_storage_obj_read,
        FFA_SVC_RPMB_WRITE => sec_storage_obj_write,
        _ => {
            log::error!("Undefined storage service id {:#x}", action);
            return req.response(SpRetCode::INVALID_PARAM.into());
        }
    };

    let res = match (usize::try_from(len), usize::try_from(offset)) {
        (Ok(len), Ok(offset)) => transfer(
            ctx,
            TEE_STORAGE_PRIVATE_RPMB,
            EFI_VARS_OBJ_ID,
            va,
            len,
            offset,
            flags,
        ),
        _ => Err(TeeError::BadParameters),
    };

    req.response(tee_result_code(res))
}
