// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The secpart Authors

//! This crate provides definitions of the structures handed to a secure
//! partition at its first entry. The layout is an ABI shared with the
//! partition image and must stay bit-exact.

#![no_std]

extern crate alloc;

pub mod boot_info;
