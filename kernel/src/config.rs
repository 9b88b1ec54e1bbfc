// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The secpart Authors

use crate::error::SpError;
use crate::types::PAGE_SIZE;
use crate::utils::is_aligned;
use uuid::Uuid;

/// UUID under which the standalone MM partition is reachable.
pub const STMM_UUID: Uuid = Uuid::from_u128(0xed32d533_99e6_4209_9cc0_2d72cdd998a7);

/// Partition-wide sizes and build options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpConfig {
    /// Identity the partition is opened with
    pub uuid: Uuid,
    pub stack_size: usize,
    pub heap_size: usize,
    /// Secure buffer shared with the partition, holds the boot descriptor
    pub sec_buf_size: usize,
    /// Buffer exchanging payloads with non-secure callers
    pub ns_comm_buf_size: usize,
    /// Clear the partition's FP/SIMD state after each entry
    pub with_vfp: bool,
}

impl Default for SpConfig {
    fn default() -> Self {
        Self {
            uuid: STMM_UUID,
            stack_size: 4 * PAGE_SIZE,
            heap_size: 398 * PAGE_SIZE,
            sec_buf_size: PAGE_SIZE,
            ns_comm_buf_size: PAGE_SIZE,
            with_vfp: true,
        }
    }
}

impl SpConfig {
    /// Checks that every region size is a non-zero multiple of the page
    /// size.
    pub fn validate(&self) -> Result<(), SpError> {
        let sizes = [
            self.stack_size,
            self.heap_size,
            self.sec_buf_size,
            self.ns_comm_buf_size,
        ];

        if sizes
            .iter()
            .all(|&size| size != 0 && is_aligned(size, PAGE_SIZE))
        {
            Ok(())
        } else {
            Err(SpError::InvalidConfig)
        }
    }
}
