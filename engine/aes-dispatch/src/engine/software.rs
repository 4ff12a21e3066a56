// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::{
    engine::Engine,
    error::{Error, InitError, Result},
    gcm::{self, Atomic, Params},
    key::{CtrIv, Key, Tag, TAG_LEN},
};
use aws_lc_rs::{
    aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_128_GCM},
    cipher::{EncryptingKey, EncryptionContext, UnboundCipherKey, AES_128},
    iv::FixedLength,
};
use zeroize::Zeroizing;

const NAME: &str = "software";

/// Engine backed by AWS-LC
///
/// The library performs every operation in a single call and keeps no state between
/// calls; keys are expanded per call and dropped before returning.
pub struct Software {
    initialized: bool,
}

impl Software {
    pub fn new() -> Self {
        Self { initialized: false }
    }

    fn ensure_ready(&self) -> Result {
        if self.initialized {
            Ok(())
        } else {
            Err(Error::engine("engine is not initialized"))
        }
    }

    fn aead_key(key: &Key) -> Result<LessSafeKey> {
        let key = UnboundKey::new(&AES_128_GCM, key.as_bytes())
            .map_err(|_| Error::engine("library rejected the key"))?;
        Ok(LessSafeKey::new(key))
    }
}

impl Default for Software {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for Software {
    fn name(&self) -> &'static str {
        NAME
    }

    fn init(&mut self) -> Result<(), InitError> {
        aws_lc_rs::init();
        self.initialized = true;
        tracing::debug!("software engine initialized");
        Ok(())
    }

    fn ctr(&mut self, key: &Key, iv: &CtrIv, input: &[u8], output: &mut [u8]) -> Result {
        self.ensure_ready()?;
        debug_assert_eq!(input.len(), output.len());

        let key = UnboundCipherKey::new(&AES_128, key.as_bytes())
            .map_err(|_| Error::engine("library rejected the key"))?;
        let key = EncryptingKey::ctr(key).map_err(|_| Error::engine("library rejected the key"))?;

        output.copy_from_slice(input);
        let context = EncryptionContext::Iv128(FixedLength::from(*iv.as_bytes()));
        key.less_safe_encrypt(output, context)
            .map_err(|_| Error::engine("library failed to apply the keystream"))?;

        Ok(())
    }

    fn gcm(&mut self) -> gcm::Model<'_> {
        gcm::Model::Atomic(self)
    }
}

impl Atomic for Software {
    fn seal(
        &mut self,
        params: &Params,
        input: &[u8],
        output: &mut [u8],
        tag: &mut Tag,
    ) -> Result {
        self.ensure_ready()?;
        debug_assert_eq!(input.len(), output.len());

        let key = Self::aead_key(params.key)?;
        let nonce = Nonce::assume_unique_for_key(*params.nonce.as_bytes());
        let aad = Aad::from(params.header);

        output.copy_from_slice(input);
        let computed = key
            .seal_in_place_separate_tag(nonce, aad, output)
            .map_err(|_| Error::engine("library failed to seal"))?;
        tag.copy_from_slice(computed.as_ref());

        Ok(())
    }

    fn open(&mut self, params: &Params, input: &[u8], output: &mut [u8], tag: &Tag) -> Result {
        self.ensure_ready()?;
        debug_assert_eq!(input.len(), output.len());

        let key = Self::aead_key(params.key)?;
        let nonce = Nonce::assume_unique_for_key(*params.nonce.as_bytes());
        let aad = Aad::from(params.header);

        // the library wants the tag right behind the ciphertext; the caller keeps it
        // detached, so assemble a contiguous copy
        let mut in_out = Zeroizing::new(Vec::with_capacity(input.len() + TAG_LEN));
        in_out.extend_from_slice(input);
        in_out.extend_from_slice(tag);

        // the library only reports that opening failed; with a well-formed key and
        // nonce that means the tag didn't authenticate
        let plaintext = key
            .open_in_place(nonce, aad, &mut in_out[..])
            .map_err(|_| Error::Authentication)?;
        output.copy_from_slice(plaintext);

        Ok(())
    }
}
