// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Inputs of the reference deployment

use aes_dispatch::key::NONCE_LEN;

/// Payload length of the reference deployment
pub const LENGTH: usize = 256;

pub const KEY: [u8; 16] = *b"0123456789ABCDEF";

/// CTR counter block; its first [`NONCE_LEN`] bytes are the GCM nonce
pub const IV: [u8; 16] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x00, 0x00, 0x00, 0x00,
];

#[inline]
pub fn nonce() -> &'static [u8] {
    &IV[..NONCE_LEN]
}

/// Returns `len` bytes counting up from zero, wrapping at 256
pub fn plaintext(len: usize) -> Vec<u8> {
    (0..len).map(|i| i as u8).collect()
}
