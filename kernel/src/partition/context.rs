// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The secpart Authors

extern crate alloc;

use super::layout::RegionLayout;
use crate::address::VirtAddr;
use crate::mm::{AddressSpace, MappingInfo};
use crate::vmm::SpRegs;
use alloc::boxed::Box;
use alloc::vec::Vec;

/// Placement of a loaded partition inside its address space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadedRegions {
    pub layout: RegionLayout,
    /// Start of the primary allocation
    pub base: VirtAddr,
    pub ns_comm_buf: VirtAddr,
}

impl LoadedRegions {
    pub fn image_base(&self) -> VirtAddr {
        self.base + self.layout.image.offset
    }

    pub fn heap_base(&self) -> VirtAddr {
        self.base + self.layout.heap.offset
    }

    pub fn stack_base(&self) -> VirtAddr {
        self.base + self.layout.stack.offset
    }

    pub fn stack_top(&self) -> VirtAddr {
        self.base + self.layout.stack.end()
    }

    pub fn sec_buf_base(&self) -> VirtAddr {
        self.base + self.layout.sec_buf.offset
    }

    pub fn limit(&self) -> VirtAddr {
        self.base + self.layout.primary_size
    }
}

/// State of one loaded partition: its address space and its suspended
/// register file.
#[derive(Debug)]
pub struct PartitionContext {
    pub(crate) aspace: Box<dyn AddressSpace>,
    pub(crate) regs: SpRegs,
    regions: Option<LoadedRegions>,
}

impl PartitionContext {
    pub fn new(aspace: Box<dyn AddressSpace>) -> Self {
        Self {
            aspace,
            regs: SpRegs::default(),
            regions: None,
        }
    }

    pub fn aspace(&self) -> &dyn AddressSpace {
        self.aspace.as_ref()
    }

    pub fn aspace_mut(&mut self) -> &mut dyn AddressSpace {
        self.aspace.as_mut()
    }

    pub fn regs(&self) -> &SpRegs {
        &self.regs
    }

    pub fn regions(&self) -> Option<&LoadedRegions> {
        self.regions.as_ref()
    }

    pub(crate) fn set_regions(&mut self, regions: LoadedRegions) {
        self.regions = Some(regions);
    }

    /// Comm buffer address and capacity, once the image is loaded.
    pub fn ns_comm_buf(&self) -> Option<(VirtAddr, usize)> {
        self.regions
            .as_ref()
            .map(|r| (r.ns_comm_buf, r.layout.ns_comm_buf.size))
    }

    /// Logs the mappings of the partition address space and returns them.
    pub fn dump_state(&self) -> Vec<MappingInfo> {
        let mappings = self.aspace.mappings();

        log::info!("Partition address space (asid {}):", self.aspace.asid());
        for (i, m) in mappings.iter().enumerate() {
            log::info!(
                " region {:2}: va {:#018x} size {:#08x} prot {:?}",
                i,
                m.start,
                m.size,
                m.prot
            );
        }

        mappings
    }
}
