// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::{
    config::{Backend, Config},
    error::{InitError, Result},
    gcm,
    key::{CtrIv, Key},
};

pub mod hardware;
pub mod software;

/// A cipher engine a [`crate::Dispatcher`] can be bound to
///
/// Each engine owns its session state exclusively. Operations take `&mut self`, so at
/// most one operation is ever in flight per engine.
pub trait Engine: Send {
    fn name(&self) -> &'static str;

    /// Brings the engine up
    ///
    /// Must complete before any other call. It is also the only way to recover an engine
    /// after a mechanical failure.
    fn init(&mut self) -> Result<(), InitError>;

    /// Applies the AES-128-CTR keystream for `key` and `iv` to `input`
    ///
    /// `output` is exactly as long as `input`.
    fn ctr(&mut self, key: &Key, iv: &CtrIv, input: &[u8], output: &mut [u8]) -> Result;

    /// Returns the GCM shape of this engine
    fn gcm(&mut self) -> gcm::Model<'_>;
}

/// Creates the engine selected by `config`, without initializing it
pub fn new(config: &Config) -> Box<dyn Engine> {
    match config.backend() {
        Backend::Hardware => Box::new(hardware::Hardware::new(config.wait())),
        Backend::Software => Box::new(software::Software::new()),
    }
}
