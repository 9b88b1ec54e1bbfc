// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The secpart Authors

/// Report of the privilege-transition primitive after control comes back
/// from the partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryOutcome {
    /// The partition issued a call; its register file holds the message.
    Resumed,
    /// The partition faulted with the given code.
    Faulted(u32),
}
