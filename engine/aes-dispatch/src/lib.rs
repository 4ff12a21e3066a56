// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! AES-CTR and AES-GCM over two interchangeable engines.
//!
//! The [`Dispatcher`] owns exactly one [`Engine`], selected from a [`Config`] at
//! construction time:
//!
//! * [`engine::hardware::Hardware`] models the microcontroller crypto peripheral, which
//!   has to be driven through the GCM phases (INIT, HEADER, PAYLOAD, FINAL) one at a time.
//! * [`engine::software::Software`] calls into a crypto library that performs the whole
//!   AEAD operation in a single call.
//!
//! Both produce bit-identical ciphertext and tags for the same inputs.

pub mod config;
pub mod ctr;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod gcm;
pub mod key;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::{Backend, Config, Wait};
pub use dispatch::{Dispatcher, Shared};
pub use engine::Engine;
pub use error::{Error, InitError, Result};
pub use key::{CtrIv, Key, Nonce, Tag, DEFAULT_HEADER, TAG_LEN};
