// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use cfg_if::cfg_if;
use lazy_static::lazy_static;

cfg_if! {
    if #[cfg(any(target_arch = "x86", target_arch = "x86_64"))] {
        lazy_static! {
            static ref IS_ACCELERATED: bool = std::is_x86_feature_detected!("aes")
                && std::is_x86_feature_detected!("pclmulqdq");
        }
    } else if #[cfg(target_arch = "aarch64")] {
        lazy_static! {
            static ref IS_ACCELERATED: bool = std::arch::is_aarch64_feature_detected!("aes")
                && std::arch::is_aarch64_feature_detected!("pmull");
        }
    } else {
        lazy_static! {
            static ref IS_ACCELERATED: bool = false;
        }
    }
}

/// Returns `true` if the block cipher and the GHASH multiply run on dedicated CPU
/// instructions
#[inline]
pub fn is_accelerated() -> bool {
    *IS_ACCELERATED
}
