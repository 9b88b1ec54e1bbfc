// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The secpart Authors

extern crate alloc;

use crate::address::{Address, VirtAddr};
use crate::error::SpError;
use crate::types::PAGE_SIZE;
use alloc::vec::Vec;
use bitflags::bitflags;
use core::fmt::Debug;

bitflags! {
    /// Protection of a mapping. `P*` bits grant access from the kernel,
    /// `U*` bits from the partition.
    #[derive(Debug, PartialEq, Eq, Copy, Clone)]
    pub struct Prot : u32 {
        const PR = 1 << 0;
        const PW = 1 << 1;
        const PX = 1 << 2;
        const UR = 1 << 3;
        const UW = 1 << 4;
        const UX = 1 << 5;

        const PRW = Self::PR.bits() | Self::PW.bits();
        const URW = Self::UR.bits() | Self::UW.bits();
        const URX = Self::UR.bits() | Self::UX.bits();
    }
}

bitflags! {
    /// Access the kernel is about to perform on behalf of the partition.
    #[derive(Debug, PartialEq, Eq, Copy, Clone)]
    pub struct AccessFlags : u32 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        /// Accept memory not exclusively owned by the partition
        const ANY_OWNER = 1 << 2;
    }
}

/// Represents the type of error occured while operating on a partition
/// address space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VmError {
    /// No backing pages or virtual address space left
    OutOfMemory,
    /// Some page in the range is not mapped
    NotMapped,
    /// Misaligned range, or a range with non-uniform attributes
    InvalidRange,
    /// The mapping does not grant the requested access
    AccessDenied,
}

impl From<VmError> for SpError {
    fn from(e: VmError) -> Self {
        Self::Vm(e)
    }
}

/// One entry of the mapping listing produced for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MappingInfo {
    pub start: VirtAddr,
    pub size: usize,
    pub prot: Prot,
}

/// The partition's private address space.
///
/// The implementation owns the physical backing and the page tables; the
/// core only ever sees virtual addresses and protections. Dropping the
/// object releases every mapping it holds.
pub trait AddressSpace: Debug {
    /// Allocates `size` bytes (rounded up to whole pages) of zeroed memory
    /// and maps it at an address chosen by the implementation.
    fn map_zeroed(&mut self, size: usize, prot: Prot) -> Result<VirtAddr, VmError>;

    /// Replaces the protection of the page-aligned range `[va, va + size)`.
    /// Either the whole range is updated or nothing is.
    fn set_prot(&mut self, va: VirtAddr, size: usize, prot: Prot) -> Result<(), VmError>;

    /// Returns the protection of `[va, va + size)`, which must be mapped
    /// with uniform attributes.
    fn get_prot(&self, va: VirtAddr, size: usize) -> Result<Prot, VmError>;

    /// Copies partition memory at `va` into `buf` with kernel privileges.
    fn read_bytes(&self, va: VirtAddr, buf: &mut [u8]) -> Result<(), VmError>;

    /// Copies `data` into partition memory at `va` with kernel privileges.
    fn write_bytes(&mut self, va: VirtAddr, data: &[u8]) -> Result<(), VmError>;

    /// Lists the current mappings in ascending address order.
    fn mappings(&self) -> Vec<MappingInfo>;

    /// Address space identifier.
    fn asid(&self) -> u32;

    /// Checks that the partition itself may access `[va, va + len)` as
    /// described by `flags`. Runs against the partition's permissions, not
    /// the kernel's.
    fn check_access_rights(
        &self,
        flags: AccessFlags,
        va: VirtAddr,
        len: usize,
    ) -> Result<(), VmError> {
        let end = va.checked_add(len).ok_or(VmError::AccessDenied)?;
        let mut page = va.page_align();

        while page < end {
            let prot = self
                .get_prot(page, PAGE_SIZE)
                .map_err(|_| VmError::AccessDenied)?;

            if flags.contains(AccessFlags::READ) && !prot.contains(Prot::UR) {
                return Err(VmError::AccessDenied);
            }
            if flags.contains(AccessFlags::WRITE) && !prot.contains(Prot::UW) {
                return Err(VmError::AccessDenied);
            }

            page = page + PAGE_SIZE;
        }

        Ok(())
    }
}
