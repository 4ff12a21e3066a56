// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::{
    config::{Backend, Config},
    ctr,
    engine::{self, Engine},
    error::{Error, InitError, Result},
    gcm::{self, Params},
    key::{self, CtrIv, Key, Nonce, Tag},
};
use std::sync::{Arc, Mutex, MutexGuard};

/// The public entry point for every cipher operation
///
/// A dispatcher is bound to one engine for its whole lifetime. The engine owns mutable
/// session state, so every operation takes `&mut self`; use [`Shared`] to hand a
/// dispatcher to several threads.
///
/// Arguments are validated here, once, before any engine is involved. Key material is
/// copied into zeroizing containers for the duration of the call and never kept.
pub struct Dispatcher {
    engine: Box<dyn Engine>,
    backend: Backend,
    header: Vec<u8>,
}

impl core::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("backend", &self.backend)
            .field("engine", &self.engine.name())
            .finish()
    }
}

impl Dispatcher {
    /// Selects and brings up the engine named by `config`
    pub fn try_new(config: &Config) -> Result<Self, InitError> {
        let mut engine = engine::new(config);
        engine.init()?;

        tracing::debug!(backend = %config.backend(), "engine selected");

        Ok(Self {
            engine,
            backend: config.backend(),
            header: config.header().to_vec(),
        })
    }

    /// Selects and brings up the engine named by `config`
    ///
    /// # Panics
    ///
    /// Panics if the engine can't be initialized. A backend that fails bring-up is unusable
    /// and the process should not continue with it.
    pub fn new(config: &Config) -> Self {
        match Self::try_new(config) {
            Ok(dispatcher) => dispatcher,
            Err(error) => panic!("{error}"),
        }
    }

    /// Re-initializes the engine after a mechanical failure
    ///
    /// Failed operations are never retried automatically; this is the only way back to a
    /// usable engine.
    pub fn reinit(&mut self) -> Result<(), InitError> {
        tracing::debug!(backend = %self.backend, "re-initializing engine");
        self.engine.init()
    }

    #[inline]
    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// The header authenticated by [`Self::gcm_encrypt`] and [`Self::gcm_decrypt`]
    #[inline]
    pub fn header(&self) -> &[u8] {
        &self.header
    }

    /// Encrypts `input` with AES-128-CTR into the first `input.len()` bytes of `output`
    ///
    /// `key` and `iv` must both be 16 bytes.
    pub fn ctr_encrypt(
        &mut self,
        key: &[u8],
        iv: &[u8],
        input: &[u8],
        output: &mut [u8],
    ) -> Result {
        let key = Key::try_from(key)?;
        let iv = CtrIv::try_from(iv)?;
        ctr::encrypt(&mut *self.engine, &key, &iv, input, output)
    }

    /// Decrypts `input` with AES-128-CTR into the first `input.len()` bytes of `output`
    pub fn ctr_decrypt(
        &mut self,
        key: &[u8],
        iv: &[u8],
        input: &[u8],
        output: &mut [u8],
    ) -> Result {
        let key = Key::try_from(key)?;
        let iv = CtrIv::try_from(iv)?;
        ctr::decrypt(&mut *self.engine, &key, &iv, input, output)
    }

    /// Encrypts `input` with AES-128-GCM over the configured header and returns the tag
    ///
    /// `key` must be 16 bytes and `iv` 12 bytes. The tag is not written to `output`.
    pub fn gcm_encrypt(
        &mut self,
        key: &[u8],
        iv: &[u8],
        input: &[u8],
        output: &mut [u8],
    ) -> Result<Tag> {
        seal(&mut *self.engine, key, iv, &self.header, input, output)
    }

    /// Decrypts `input` with AES-128-GCM over the configured header
    ///
    /// Returns [`Error::Authentication`] if `tag` doesn't match, in which case `output`
    /// holds no plaintext.
    pub fn gcm_decrypt(
        &mut self,
        key: &[u8],
        iv: &[u8],
        input: &[u8],
        output: &mut [u8],
        tag: &[u8],
    ) -> Result {
        open(&mut *self.engine, key, iv, &self.header, input, output, tag)
    }

    /// Same as [`Self::gcm_encrypt`] with a caller supplied header of any length
    pub fn gcm_encrypt_with_header(
        &mut self,
        key: &[u8],
        iv: &[u8],
        header: &[u8],
        input: &[u8],
        output: &mut [u8],
    ) -> Result<Tag> {
        seal(&mut *self.engine, key, iv, header, input, output)
    }

    /// Same as [`Self::gcm_decrypt`] with a caller supplied header of any length
    pub fn gcm_decrypt_with_header(
        &mut self,
        key: &[u8],
        iv: &[u8],
        header: &[u8],
        input: &[u8],
        output: &mut [u8],
        tag: &[u8],
    ) -> Result {
        open(&mut *self.engine, key, iv, header, input, output, tag)
    }
}

fn seal(
    engine: &mut dyn Engine,
    key: &[u8],
    iv: &[u8],
    header: &[u8],
    input: &[u8],
    output: &mut [u8],
) -> Result<Tag> {
    let key = Key::try_from(key)?;
    let nonce = Nonce::try_from(iv)?;
    let output = payload_output(input, output)?;

    let params = Params {
        key: &key,
        nonce: &nonce,
        header,
    };

    gcm::encrypt(engine.gcm(), &params, input, output)
}

fn open(
    engine: &mut dyn Engine,
    key: &[u8],
    iv: &[u8],
    header: &[u8],
    input: &[u8],
    output: &mut [u8],
    tag: &[u8],
) -> Result {
    let key = Key::try_from(key)?;
    let nonce = Nonce::try_from(iv)?;
    let tag = key::tag_from_slice(tag)?;
    let output = payload_output(input, output)?;

    let params = Params {
        key: &key,
        nonce: &nonce,
        header,
    };

    gcm::decrypt(engine.gcm(), &params, input, output, &tag)
}

/// Returns the part of `output` the payload is written to
#[inline]
fn payload_output<'a>(input: &[u8], output: &'a mut [u8]) -> Result<&'a mut [u8]> {
    output
        .get_mut(..input.len())
        .ok_or(Error::invalid_argument("output is shorter than the input"))
}

/// A [`Dispatcher`] that can be shared between threads
///
/// Every operation holds the lock for its whole duration, so at most one operation is in
/// flight on the engine at any time.
#[derive(Clone, Debug)]
pub struct Shared(Arc<Mutex<Dispatcher>>);

impl Shared {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self(Arc::new(Mutex::new(dispatcher)))
    }

    /// Locks the dispatcher for exclusive use
    pub fn lock(&self) -> Result<MutexGuard<'_, Dispatcher>> {
        self.0
            .lock()
            .map_err(|_| Error::engine("engine lock poisoned"))
    }

    /// Runs `f` with exclusive access to the dispatcher
    pub fn with<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Dispatcher) -> Result<R>,
    {
        let mut dispatcher = self.lock()?;
        f(&mut dispatcher)
    }
}

impl From<Dispatcher> for Shared {
    fn from(dispatcher: Dispatcher) -> Self {
        Self::new(dispatcher)
    }
}

#[cfg(test)]
mod tests;
