// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The secpart Authors

pub const PAGE_SHIFT: usize = 12;
pub const PAGE_SIZE: usize = 1 << PAGE_SHIFT;

/// Maximum length in bytes of a persistent object identifier.
pub const TEE_OBJECT_ID_MAX_LEN: usize = 64;
