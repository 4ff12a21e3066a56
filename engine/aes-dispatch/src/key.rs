// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::error::Error;
use core::{convert::TryFrom, fmt};
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const KEY_LEN: usize = 16;
pub const CTR_IV_LEN: usize = 16;
pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;
pub const BLOCK_LEN: usize = 16;

/// Authentication header used for GCM when the caller doesn't provide one
pub const DEFAULT_HEADER: [u8; 16] = *b"0123456789ABCDEF";

pub type Tag = [u8; TAG_LEN];

macro_rules! impl_key_material {
    ($name:ident, $len:ident, $reason:literal) => {
        #[derive(Clone, Zeroize, ZeroizeOnDrop)]
        pub struct $name([u8; $len]);

        impl $name {
            pub const LEN: usize = $len;

            #[inline]
            pub fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            #[inline]
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }
        }

        impl From<[u8; $len]> for $name {
            #[inline]
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl TryFrom<&[u8]> for $name {
            type Error = Error;

            #[inline]
            fn try_from(bytes: &[u8]) -> Result<Self, Error> {
                let bytes = <[u8; $len]>::try_from(bytes)
                    .map_err(|_| Error::invalid_argument($reason))?;
                Ok(Self(bytes))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                // key material is never printed
                f.debug_tuple(stringify!($name)).field(&"<redacted>").finish()
            }
        }
    };
}

impl_key_material!(Key, KEY_LEN, "key must be 16 bytes");
impl_key_material!(CtrIv, CTR_IV_LEN, "CTR initialization vector must be 16 bytes");
impl_key_material!(Nonce, NONCE_LEN, "GCM initialization vector must be 12 bytes");

impl Nonce {
    /// Returns the pre-counter block `J0 = nonce || 0x00000001`
    #[inline]
    pub(crate) fn j0(&self) -> [u8; BLOCK_LEN] {
        let mut block = [0u8; BLOCK_LEN];
        block[..NONCE_LEN].copy_from_slice(&self.0);
        block[BLOCK_LEN - 1] = 1;
        block
    }
}

pub(crate) fn tag_from_slice(bytes: &[u8]) -> Result<Tag, Error> {
    Tag::try_from(bytes).map_err(|_| Error::invalid_argument("tag must be 16 bytes"))
}
