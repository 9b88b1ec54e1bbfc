// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The secpart Authors

use alloc::vec::Vec;
use core::mem::size_of;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Parameter type of the image boot information record.
pub const SP_PARAM_SP_IMAGE_BOOT_INFO: u8 = 0x1;
pub const SP_PARAM_VERSION_1: u8 = 0x1;

/// Set in [`SpMpInfo::flags`] for the CPU that performs cold boot.
pub const MP_INFO_FLAG_PRIMARY_CPU: u32 = 1 << 0;

/// Number of memory regions described by [`SpBootInfo`]: the whole partition
/// area, image, stack, heap, non-secure comm buffer and shared buffer.
pub const SP_MEM_REGIONS: u32 = 6;

#[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(C)]
pub struct SpParamHeader {
    pub ty: u8,
    pub version: u8,
    pub size: u16,
    pub attr: u32,
}

/// Boot information record. It lives at the start of the secure shared
/// buffer and is immediately followed by `num_cpus` [`SpMpInfo`] records.
#[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(C)]
pub struct SpBootInfo {
    pub h: SpParamHeader,
    pub sp_mem_base: u64,
    pub sp_mem_limit: u64,
    pub sp_image_base: u64,
    pub sp_stack_base: u64,
    pub sp_heap_base: u64,
    pub sp_ns_comm_buf_base: u64,
    pub sp_shared_buf_base: u64,
    pub sp_image_size: u64,
    pub sp_pcpu_stack_size: u64,
    pub sp_heap_size: u64,
    pub sp_ns_comm_buf_size: u64,
    pub sp_shared_buf_size: u64,
    pub num_sp_mem_regions: u32,
    pub num_cpus: u32,
    /// Partition virtual address of the first [`SpMpInfo`] record.
    pub mp_info: u64,
}

#[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(C)]
pub struct SpMpInfo {
    pub mpidr: u64,
    pub linear_id: u32,
    pub flags: u32,
}

const _: () = assert!(size_of::<SpParamHeader>() == 8);
const _: () = assert!(size_of::<SpBootInfo>() == 120);
const _: () = assert!(size_of::<SpMpInfo>() == 16);

/// Offset of the first [`SpMpInfo`] record from the start of the descriptor.
pub const MP_INFO_OFFSET: usize = size_of::<SpBootInfo>();

/// Total size of a descriptor carrying `num_cpus` MP records.
pub const fn boot_descriptor_size(num_cpus: usize) -> usize {
    MP_INFO_OFFSET + num_cpus * size_of::<SpMpInfo>()
}

/// Encodes a boot descriptor placed at partition address `base`.
///
/// The header, the CPU count and the `mp_info` pointer are derived here, the
/// remaining fields are taken from `info` as-is.
///
/// # Returns
///
/// The encoded bytes and the descriptor size, which is the offset just past
/// the last [`SpMpInfo`] record.
pub fn encode_boot_descriptor(info: &SpBootInfo, cpus: &[SpMpInfo], base: u64) -> (Vec<u8>, usize) {
    let size = boot_descriptor_size(cpus.len());
    let mut boot_info = *info;

    boot_info.h = SpParamHeader {
        ty: SP_PARAM_SP_IMAGE_BOOT_INFO,
        version: SP_PARAM_VERSION_1,
        size: size_of::<SpBootInfo>() as u16,
        attr: 0,
    };
    boot_info.num_cpus = cpus.len() as u32;
    boot_info.mp_info = base + MP_INFO_OFFSET as u64;

    let mut bytes = Vec::with_capacity(size);
    bytes.extend_from_slice(boot_info.as_bytes());
    for cpu in cpus {
        bytes.extend_from_slice(cpu.as_bytes());
    }
    debug_assert_eq!(bytes.len(), size);

    (bytes, size)
}

/// Decodes a boot descriptor from `bytes`.
///
/// Returns `None` if the buffer is too short for the header or for the
/// number of MP records it announces.
pub fn decode_boot_descriptor(bytes: &[u8]) -> Option<(SpBootInfo, Vec<SpMpInfo>)> {
    let (info, mut rest) = SpBootInfo::read_from_prefix(bytes).ok()?;
    let mut cpus = Vec::new();

    for _ in 0..info.num_cpus {
        let (cpu, next) = SpMpInfo::read_from_prefix(rest).ok()?;
        cpus.push(cpu);
        rest = next;
    }

    Some((info, cpus))
}
