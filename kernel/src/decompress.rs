// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The secpart Authors

extern crate alloc;

use alloc::vec::Vec;
use core::fmt::Debug;
use miniz_oxide::inflate::decompress_to_vec_zlib_with_limit;

/// Inflates a compressed partition image.
pub trait Decompressor: Debug {
    /// Decompresses `src`, which must expand to exactly `expected_len`
    /// bytes. Returns `None` on a malformed stream or a size mismatch.
    fn decompress(&self, src: &[u8], expected_len: usize) -> Option<Vec<u8>>;
}

/// Decompressor for zlib-wrapped deflate streams.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZlibDecompressor;

impl Decompressor for ZlibDecompressor {
    fn decompress(&self, src: &[u8], expected_len: usize) -> Option<Vec<u8>> {
        let data = decompress_to_vec_zlib_with_limit(src, expected_len).ok()?;
        (data.len() == expected_len).then_some(data)
    }
}
