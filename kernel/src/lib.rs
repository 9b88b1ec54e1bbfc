// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The secpart Authors

//! Secure partition manager core.
//!
//! Loads a compressed secure partition image into its own address space,
//! enters it and mediates the FF-A direct-request/direct-response traffic
//! between the partition and the kernel services it relies on.

#![no_std]

pub mod address;
pub mod config;
pub mod console;
pub mod decompress;
pub mod error;
pub mod mm;
pub mod partition;
pub mod platform;
pub mod protocols;
pub mod requests;
pub mod storage;
pub mod types;
pub mod utils;
pub mod vmm;

#[test]
fn test_nop() {}

// Collaborator doubles for test configurations.
#[cfg(test)]
pub mod testutils;
