// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The secpart Authors

extern crate alloc;

use super::context::{LoadedRegions, PartitionContext};
use super::layout::RegionLayout;
use crate::address::VirtAddr;
use crate::config::SpConfig;
use crate::decompress::Decompressor;
use crate::error::SpError;
use crate::mm::{AddressSpace, Prot};
use crate::vmm::SpRegs;
use alloc::vec::Vec;
use bootlib::boot_info::{
    encode_boot_descriptor, SpBootInfo, SpMpInfo, MP_INFO_FLAG_PRIMARY_CPU, SP_MEM_REGIONS,
};

/// Compressed partition image as linked into the kernel.
#[derive(Clone, Copy, Debug)]
pub struct SpImage {
    /// zlib stream
    pub data: &'static [u8],
    pub uncompressed_size: usize,
}

/// Maps `size` bytes of zeroed memory into the partition with `prot`.
pub fn alloc_and_map(
    aspace: &mut dyn AddressSpace,
    size: usize,
    prot: Prot,
) -> Result<VirtAddr, SpError> {
    Ok(aspace.map_zeroed(size, prot)?)
}

/// Allocates the partition regions, decompresses the image into place and
/// applies the final protections.
///
/// Mappings created before a failure stay in the address space and are only
/// released with it.
///
/// # Panics
///
/// Panics if the image does not decompress to exactly its recorded size.
pub fn load_and_protect(
    aspace: &mut dyn AddressSpace,
    image: &SpImage,
    config: &SpConfig,
    decompressor: &dyn Decompressor,
) -> Result<LoadedRegions, SpError> {
    let layout = RegionLayout::plan(image.uncompressed_size, config)?;

    let base = alloc_and_map(aspace, layout.primary_size, Prot::PRW)?;
    let ns_comm_buf = alloc_and_map(aspace, layout.ns_comm_buf.size, layout.ns_comm_buf.prot)?;
    let regions = LoadedRegions {
        layout,
        base,
        ns_comm_buf,
    };

    let Some(data) = decompressor.decompress(image.data, image.uncompressed_size) else {
        panic!("Failed to decompress partition image");
    };
    assert_eq!(data.len(), image.uncompressed_size);
    aspace.write_bytes(regions.image_base(), &data)?;

    for region in layout.primary_regions() {
        let va = base + region.offset;
        aspace.set_prot(va, region.size, region.prot)?;
        log::debug!("{:?}: {:#x} size {:#x}", region.kind, va, region.size);
    }

    log::debug!("Partition load address {:#x}", regions.image_base());
    log::debug!(
        "{:?}: {:#x} size {:#x}",
        layout.ns_comm_buf.kind,
        ns_comm_buf,
        layout.ns_comm_buf.size
    );

    Ok(regions)
}

/// Builds the boot descriptor for the partition: the boot information
/// record followed by one MP record for the calling CPU.
///
/// # Returns
///
/// The encoded descriptor and its size.
pub fn boot_descriptor(regions: &LoadedRegions, image: &SpImage, mpidr: u64) -> (Vec<u8>, usize) {
    let layout = &regions.layout;
    let info = SpBootInfo {
        sp_mem_base: regions.base.into(),
        sp_mem_limit: regions.limit().into(),
        sp_image_base: regions.image_base().into(),
        sp_stack_base: regions.stack_base().into(),
        sp_heap_base: regions.heap_base().into(),
        sp_ns_comm_buf_base: regions.ns_comm_buf.into(),
        sp_shared_buf_base: regions.sec_buf_base().into(),
        sp_image_size: image.data.len() as u64,
        sp_pcpu_stack_size: layout.stack.size as u64,
        sp_heap_size: layout.heap.size as u64,
        sp_ns_comm_buf_size: layout.ns_comm_buf.size as u64,
        sp_shared_buf_size: layout.sec_buf.size as u64,
        num_sp_mem_regions: SP_MEM_REGIONS,
        ..Default::default()
    };
    let cpu = SpMpInfo {
        mpidr,
        linear_id: 0,
        flags: MP_INFO_FLAG_PRIMARY_CPU,
    };

    encode_boot_descriptor(&info, &[cpu], regions.sec_buf_base().into())
}

/// Writes the boot descriptor to the start of the secure shared buffer.
pub fn write_boot_descriptor(
    aspace: &mut dyn AddressSpace,
    regions: &LoadedRegions,
    image: &SpImage,
    mpidr: u64,
) -> Result<usize, SpError> {
    let (bytes, size) = boot_descriptor(regions, image, mpidr);
    debug_assert!(size <= regions.layout.sec_buf.size);
    aspace.write_bytes(regions.sec_buf_base(), &bytes)?;
    Ok(size)
}

/// Register file for the first entry: the boot descriptor in x0/x1, the
/// stack top as stack pointer and the image start as entry point.
pub fn initial_registers(regions: &LoadedRegions, desc_size: usize) -> SpRegs {
    SpRegs::for_entry(
        regions.sec_buf_base().into(),
        desc_size as u64,
        regions.stack_top().into(),
        regions.image_base().into(),
    )
}

/// Loads `image` into the context's address space and prepares the
/// registers for the first entry.
pub fn load_partition(
    ctx: &mut PartitionContext,
    image: &SpImage,
    config: &SpConfig,
    decompressor: &dyn Decompressor,
    mpidr: u64,
) -> Result<(), SpError> {
    let regions = load_and_protect(ctx.aspace_mut(), image, config, decompressor)?;
    ctx.set_regions(regions);

    let desc_size = write_boot_descriptor(ctx.aspace_mut(), &regions, image, mpidr)?;
    ctx.regs = initial_registers(&regions, desc_size);

    Ok(())
}
