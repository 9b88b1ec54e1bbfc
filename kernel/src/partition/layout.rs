// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The secpart Authors

use crate::config::SpConfig;
use crate::error::SpError;
use crate::mm::Prot;
use crate::types::PAGE_SIZE;
use crate::utils::{checked_page_align_up, is_aligned};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutError {
    /// The image has no content
    EmptyImage,
    /// A region size is zero or not a multiple of the page size
    Misaligned,
    /// The region sizes do not fit the address width
    Overflow,
}

impl From<LayoutError> for SpError {
    fn from(e: LayoutError) -> Self {
        Self::Layout(e)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionKind {
    Image,
    Heap,
    Stack,
    SecBuf,
    NsCommBuf,
}

/// A region of the partition, placed at `offset` bytes into the allocation
/// that holds it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub kind: RegionKind,
    pub offset: usize,
    pub size: usize,
    /// Protection applied once the image is loaded
    pub prot: Prot,
}

impl Region {
    pub const fn end(&self) -> usize {
        self.offset + self.size
    }
}

/// Placement of all partition regions.
///
/// Image, heap, stack and the secure shared buffer share one primary
/// allocation of `primary_size` bytes and follow each other in that order.
/// The non-secure comm buffer lives in an allocation of its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionLayout {
    pub image: Region,
    pub heap: Region,
    pub stack: Region,
    pub sec_buf: Region,
    pub ns_comm_buf: Region,
    pub primary_size: usize,
}

impl RegionLayout {
    /// Plans the regions for an image expanding to `image_size` bytes.
    pub fn plan(image_size: usize, config: &SpConfig) -> Result<Self, LayoutError> {
        if image_size == 0 {
            return Err(LayoutError::EmptyImage);
        }

        let sizes = [
            config.heap_size,
            config.stack_size,
            config.sec_buf_size,
            config.ns_comm_buf_size,
        ];
        if !sizes.iter().all(|&s| s != 0 && is_aligned(s, PAGE_SIZE)) {
            return Err(LayoutError::Misaligned);
        }

        let image_size = checked_page_align_up(image_size).ok_or(LayoutError::Overflow)?;
        let place = |kind, offset: usize, size: usize, prot| -> Result<Region, LayoutError> {
            offset.checked_add(size).ok_or(LayoutError::Overflow)?;
            Ok(Region {
                kind,
                offset,
                size,
                prot,
            })
        };

        let image = place(RegionKind::Image, 0, image_size, Prot::URX | Prot::PR)?;
        let heap = place(RegionKind::Heap, image.end(), config.heap_size, Prot::URW | Prot::PRW)?;
        let stack = place(RegionKind::Stack, heap.end(), config.stack_size, Prot::URW | Prot::PRW)?;
        let sec_buf = place(
            RegionKind::SecBuf,
            stack.end(),
            config.sec_buf_size,
            Prot::URW | Prot::PRW,
        )?;
        let ns_comm_buf = place(
            RegionKind::NsCommBuf,
            0,
            config.ns_comm_buf_size,
            Prot::URW | Prot::PRW,
        )?;

        Ok(Self {
            image,
            heap,
            stack,
            sec_buf,
            ns_comm_buf,
            primary_size: sec_buf.end(),
        })
    }

    /// Regions of the primary allocation, in address order.
    pub fn primary_regions(&self) -> [Region; 4] {
        [self.image, self.heap, self.stack, self.sec_buf]
    }
}
