// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The secpart Authors

pub mod util;

pub use util::{checked_page_align_up, is_aligned};
