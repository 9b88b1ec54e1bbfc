// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The secpart Authors

pub mod execloop;
pub mod message;
pub mod registers;

pub use execloop::enter_partition;
pub use message::*;
pub use registers::*;
