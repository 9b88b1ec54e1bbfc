// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The secpart Authors

/// Return codes of the kernel services, as placed into direct responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types, clippy::upper_case_acronyms)]
pub enum SpRetCode {
    SUCCESS,
    NOT_SUPPORTED,
    INVALID_PARAM,
    DENIED,
    NO_MEM,
}

impl From<SpRetCode> for i32 {
    fn from(res: SpRetCode) -> i32 {
        match res {
            SpRetCode::SUCCESS => 0,
            SpRetCode::NOT_SUPPORTED => -1,
            SpRetCode::INVALID_PARAM => -2,
            SpRetCode::DENIED => -3,
            SpRetCode::NO_MEM => -5,
        }
    }
}

impl From<SpRetCode> for u32 {
    // Responses carry the code as a 32-bit value.
    fn from(res: SpRetCode) -> u32 {
        i32::from(res) as u32
    }
}
