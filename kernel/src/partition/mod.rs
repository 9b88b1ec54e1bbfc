// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The secpart Authors

mod context;
mod layout;
mod loader;
mod session;

pub use context::{LoadedRegions, PartitionContext};
pub use layout::{LayoutError, Region, RegionKind, RegionLayout};
pub use loader::{
    alloc_and_map, boot_descriptor, initial_registers, load_and_protect, load_partition,
    write_boot_descriptor, SpImage,
};
pub use session::{MemRef, SecurePartition, SpState, TeeParam, TeeParamType, TeeParams};
