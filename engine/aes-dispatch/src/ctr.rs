// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::{
    engine::Engine,
    error::{Error, Result},
    key::{CtrIv, Key},
};
use zeroize::Zeroize;

/// Encrypts `input` into the first `input.len()` bytes of `output`
pub fn encrypt<E: Engine + ?Sized>(
    engine: &mut E,
    key: &Key,
    iv: &CtrIv,
    input: &[u8],
    output: &mut [u8],
) -> Result {
    apply(engine, key, iv, input, output)
}

/// Decrypts `input` into the first `input.len()` bytes of `output`
///
/// CTR applies the same keystream in both directions, so this is the exact same transform
/// as [`encrypt`].
pub fn decrypt<E: Engine + ?Sized>(
    engine: &mut E,
    key: &Key,
    iv: &CtrIv,
    input: &[u8],
    output: &mut [u8],
) -> Result {
    apply(engine, key, iv, input, output)
}

fn apply<E: Engine + ?Sized>(
    engine: &mut E,
    key: &Key,
    iv: &CtrIv,
    input: &[u8],
    output: &mut [u8],
) -> Result {
    let output = output
        .get_mut(..input.len())
        .ok_or(Error::invalid_argument("output is shorter than the input"))?;

    // there's no keystream to apply
    if input.is_empty() {
        return Ok(());
    }

    engine.ctr(key, iv, input, output).map_err(|error| {
        output.zeroize();
        error
    })
}
