// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! GCM phase sequencing
//!
//! Engines come in two shapes. A [`Phased`] engine has to be walked through
//! INIT, HEADER, PAYLOAD and FINAL in that order before its tag is meaningful. An
//! [`Atomic`] engine performs the whole AEAD operation in one call. [`encrypt`] and
//! [`decrypt`] give both shapes the same contract: same inputs, same outputs, and the
//! same meaning for every failure.

use crate::{
    error::{Error, Result},
    key::{Key, Nonce, Tag, TAG_LEN},
};
use core::fmt;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Load key, nonce and direction; no data is processed
    Init,
    /// Feed the additional authenticated data; produces no output
    Header,
    /// Feed the payload; produces the same number of output bytes
    Payload,
    /// Emit the tag over everything fed so far
    Final,
}

impl Phase {
    pub const SEQUENCE: [Phase; 4] = [Phase::Init, Phase::Header, Phase::Payload, Phase::Final];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "INIT",
            Self::Header => "HEADER",
            Self::Payload => "PAYLOAD",
            Self::Final => "FINAL",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

/// Per-operation parameters shared by both engine shapes
#[derive(Clone, Copy, Debug)]
pub struct Params<'a> {
    pub key: &'a Key,
    pub nonce: &'a Nonce,
    pub header: &'a [u8],
}

/// An engine that must be driven one GCM phase at a time
pub trait Phased {
    /// Programs the engine for a new sequence; the next phase must be [`Phase::Init`]
    fn configure(&mut self, key: &Key, nonce: &Nonce, direction: Direction) -> Result;

    /// Runs a single phase
    ///
    /// * `Init`: `input` and `output` are empty
    /// * `Header`: `input` is the header, `output` is empty
    /// * `Payload`: `output` is the same length as `input`
    /// * `Final`: `input` is empty, `output` receives the [`TAG_LEN`]-byte tag
    ///
    /// The FINAL phase always produces the computed tag, regardless of direction. It
    /// never compares it against anything.
    fn run(&mut self, phase: Phase, input: &[u8], output: &mut [u8]) -> Result;
}

/// An engine that performs the whole AEAD operation in a single call
pub trait Atomic {
    fn seal(&mut self, params: &Params, input: &[u8], output: &mut [u8], tag: &mut Tag)
        -> Result;

    /// Returns [`Error::Authentication`] if `tag` doesn't authenticate `input`
    fn open(&mut self, params: &Params, input: &[u8], output: &mut [u8], tag: &Tag) -> Result;
}

/// The GCM shape an engine exposes
pub enum Model<'a> {
    Phased(&'a mut dyn Phased),
    Atomic(&'a mut dyn Atomic),
}

/// Encrypts `input` into `output` and returns the tag
///
/// `output` must be exactly as long as `input`. On failure `output` is cleared.
pub fn encrypt(model: Model, params: &Params, input: &[u8], output: &mut [u8]) -> Result<Tag> {
    debug_assert_eq!(input.len(), output.len());

    let mut tag = [0u8; TAG_LEN];

    let result = match model {
        Model::Phased(engine) => {
            sequence(engine, Direction::Encrypt, params, input, output, &mut tag)
        }
        Model::Atomic(engine) => engine.seal(params, input, output, &mut tag),
    };

    match result {
        Ok(()) => Ok(tag),
        Err(error) => {
            output.zeroize();
            Err(error)
        }
    }
}

/// Decrypts `input` into `output` after checking it against `tag`
///
/// `output` must be exactly as long as `input`. On failure, including
/// [`Error::Authentication`], `output` is cleared so unauthenticated plaintext is never
/// left behind.
pub fn decrypt(
    model: Model,
    params: &Params,
    input: &[u8],
    output: &mut [u8],
    tag: &Tag,
) -> Result {
    debug_assert_eq!(input.len(), output.len());

    let result = match model {
        Model::Phased(engine) => {
            let mut computed = [0u8; TAG_LEN];
            sequence(engine, Direction::Decrypt, params, input, output, &mut computed).and_then(
                |()| {
                    if computed[..].ct_eq(&tag[..]).into() {
                        Ok(())
                    } else {
                        Err(Error::Authentication)
                    }
                },
            )
        }
        Model::Atomic(engine) => engine.open(params, input, output, tag),
    };

    if let Err(error) = result {
        if error.is_authentication() {
            tracing::debug!("gcm tag mismatch");
        }
        output.zeroize();
        return Err(error);
    }

    Ok(())
}

/// Drives a [`Phased`] engine through every phase in order
///
/// A failed phase aborts the sequence immediately: the engine state is undefined after a
/// failure, so no later phase is attempted and nothing is retried.
fn sequence(
    engine: &mut dyn Phased,
    direction: Direction,
    params: &Params,
    input: &[u8],
    output: &mut [u8],
    tag: &mut Tag,
) -> Result {
    engine
        .configure(params.key, params.nonce, direction)
        .map_err(|error| {
            tracing::warn!(%error, ?direction, "gcm configuration failed");
            error
        })?;

    for phase in Phase::SEQUENCE {
        let result = match phase {
            Phase::Init => engine.run(phase, &[], &mut []),
            Phase::Header => engine.run(phase, params.header, &mut []),
            Phase::Payload => engine.run(phase, input, output),
            Phase::Final => engine.run(phase, &[], &mut tag[..]),
        };

        if let Err(error) = result {
            let error = error.at_phase(phase);
            tracing::warn!(%error, ?direction, "gcm sequence aborted");
            return Err(error);
        }

        tracing::trace!(%phase, ?direction, "gcm phase complete");
    }

    Ok(())
}
