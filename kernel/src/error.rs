// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The secpart Authors

use crate::mm::VmError;
use crate::partition::LayoutError;
use crate::storage::StorageError;

// As a general rule, functions private to a given module may use the
// leaf error types. Public functions should return an SpError
// containing a leaf error type, usually the one corresponding to
// that module. We always provide a way to convert a leaf error into
// a SpError via the From trait at the module level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpError {
    // Errors from the partition address space
    Vm(VmError),
    // Errors from the region layout computation
    Layout(LayoutError),
    // A configuration value is unusable
    InvalidConfig,
    // The partition faulted or reported a panic
    TargetDead,
}

/// Result codes visible to the callers of the session entry points, with
/// their GlobalPlatform numbering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TeeError {
    Generic,
    AccessDenied,
    AccessConflict,
    ExcessData,
    BadParameters,
    BadState,
    NotFound,
    NotSupported,
    OutOfMemory,
    Busy,
    CorruptObject,
    StorageNotAvailable,
    TargetDead,
}

pub const TEE_SUCCESS: u32 = 0x0000_0000;

impl TeeError {
    pub const fn code(self) -> u32 {
        match self {
            Self::Generic => 0xFFFF_0000,
            Self::AccessDenied => 0xFFFF_0001,
            Self::AccessConflict => 0xFFFF_0002,
            Self::ExcessData => 0xFFFF_0004,
            Self::BadParameters => 0xFFFF_0006,
            Self::BadState => 0xFFFF_0007,
            Self::NotFound => 0xFFFF_0008,
            Self::NotSupported => 0xFFFF_000A,
            Self::OutOfMemory => 0xFFFF_000C,
            Self::Busy => 0xFFFF_000D,
            Self::CorruptObject => 0xF010_0001,
            Self::StorageNotAvailable => 0xF010_0003,
            Self::TargetDead => 0xFFFF_3024,
        }
    }
}

impl From<TeeError> for u32 {
    fn from(err: TeeError) -> u32 {
        err.code()
    }
}

/// Folds a result into the 32-bit code carried back to the partition.
pub fn tee_result_code(res: Result<(), TeeError>) -> u32 {
    match res {
        Ok(()) => TEE_SUCCESS,
        Err(e) => e.code(),
    }
}

impl From<SpError> for TeeError {
    fn from(err: SpError) -> Self {
        match err {
            SpError::Vm(e) => e.into(),
            SpError::Layout(_) => Self::BadParameters,
            SpError::InvalidConfig => Self::BadParameters,
            SpError::TargetDead => Self::TargetDead,
        }
    }
}

impl From<VmError> for TeeError {
    fn from(err: VmError) -> Self {
        match err {
            VmError::OutOfMemory => Self::OutOfMemory,
            VmError::InvalidRange => Self::BadParameters,
            VmError::NotMapped | VmError::AccessDenied => Self::AccessDenied,
        }
    }
}

impl From<StorageError> for TeeError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => Self::NotFound,
            StorageError::Corrupt => Self::CorruptObject,
            StorageError::AccessConflict => Self::AccessConflict,
            StorageError::OutOfMemory => Self::OutOfMemory,
            StorageError::NotAvailable => Self::StorageNotAvailable,
            StorageError::Io => Self::Generic,
        }
    }
}
