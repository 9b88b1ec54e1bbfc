// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The secpart Authors

//! Persistent object storage seam.
//!
//! Backends are registered per storage id and operate on named objects
//! owned by a partition. A handle returned by [`FileOps::open`] or
//! [`FileOps::create`] stays open until it is dropped.

extern crate alloc;

use crate::types::TEE_OBJECT_ID_MAX_LEN;
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use bitflags::bitflags;
use core::fmt::Debug;
use uuid::Uuid;

/// Storage private to the partition, backed by the REE file system
pub const TEE_STORAGE_PRIVATE_REE: u32 = 0x8000_0000;
/// Storage private to the partition, backed by an RPMB partition
pub const TEE_STORAGE_PRIVATE_RPMB: u32 = 0x8000_0100;

bitflags! {
    #[derive(Debug, PartialEq, Eq, Copy, Clone)]
    pub struct DataFlags : u32 {
        const ACCESS_READ = 0x0000_0001;
        const ACCESS_WRITE = 0x0000_0002;
        const SHARE_READ = 0x0000_0010;
        const SHARE_WRITE = 0x0000_0020;
    }
}

/// Represents the type of error reported by a storage backend.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StorageError {
    NotFound,
    /// Integrity check of the stored content failed
    Corrupt,
    AccessConflict,
    OutOfMemory,
    NotAvailable,
    Io,
}

/// Identity of a persistent object: the owning partition, the object name
/// and the access flags it is opened with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersistentObject {
    owner: Uuid,
    obj_id: Vec<u8>,
    flags: DataFlags,
}

impl PersistentObject {
    /// Creates a new object descriptor.
    ///
    /// Returns `None` if `obj_id` is longer than
    /// [`TEE_OBJECT_ID_MAX_LEN`].
    pub fn new(owner: Uuid, obj_id: &[u8], flags: DataFlags) -> Option<Self> {
        if obj_id.len() > TEE_OBJECT_ID_MAX_LEN {
            return None;
        }

        Some(Self {
            owner,
            obj_id: obj_id.to_vec(),
            flags,
        })
    }

    pub fn owner(&self) -> &Uuid {
        &self.owner
    }

    pub fn obj_id(&self) -> &[u8] {
        &self.obj_id
    }

    pub fn flags(&self) -> DataFlags {
        self.flags
    }
}

/// An open persistent object.
pub trait FileHandle: Debug {
    /// Reads object data at `offset` into `buf`.
    ///
    /// # Returns
    ///
    /// [`Result<usize, StorageError>`]: the number of bytes read, which is
    /// smaller than `buf.len()` when the object ends before the buffer is
    /// filled.
    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Writes `data` at `offset`, growing the object as needed.
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StorageError>;
}

/// Operations a storage backend provides on named objects.
pub trait FileOps: Debug {
    /// Opens an existing object.
    fn open(&self, po: &PersistentObject) -> Result<Box<dyn FileHandle>, StorageError>;

    /// Creates an empty object. Fails with
    /// [`StorageError::AccessConflict`] if it exists and `overwrite` is not
    /// set.
    fn create(
        &self,
        po: &PersistentObject,
        overwrite: bool,
    ) -> Result<Box<dyn FileHandle>, StorageError>;

    /// Deletes an object.
    fn remove(&self, po: &PersistentObject) -> Result<(), StorageError>;
}

/// Maps storage ids to the backends serving them.
#[derive(Debug, Default)]
pub struct StorageRegistry {
    backends: Vec<(u32, Rc<dyn FileOps>)>,
}

impl StorageRegistry {
    pub fn new() -> Self {
        Self {
            backends: Vec::new(),
        }
    }

    /// Registers `ops` for `storage_id`, replacing any earlier backend.
    pub fn register(&mut self, storage_id: u32, ops: Rc<dyn FileOps>) {
        self.backends.retain(|(id, _)| *id != storage_id);
        self.backends.push((storage_id, ops));
    }

    pub fn file_ops(&self, storage_id: u32) -> Option<&dyn FileOps> {
        self.backends
            .iter()
            .find(|(id, _)| *id == storage_id)
            .map(|(_, ops)| ops.as_ref())
    }
}
