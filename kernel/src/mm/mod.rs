// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The secpart Authors

mod address_space;

pub use address_space::{AccessFlags, AddressSpace, MappingInfo, Prot, VmError};
