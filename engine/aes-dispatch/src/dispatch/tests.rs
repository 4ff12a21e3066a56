// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use super::*;
use crate::key::{DEFAULT_HEADER, TAG_LEN};
use std::thread;

const KEY: [u8; 16] = [7; 16];
const CTR_IV: [u8; 16] = [9; 16];
const NONCE: [u8; 12] = [9; 12];

fn dispatchers() -> impl Iterator<Item = Dispatcher> {
    Backend::ALL.into_iter().map(|backend| {
        let config = Config::builder().with_backend(backend).build();
        Dispatcher::new(&config)
    })
}

#[test]
fn backend_selection_test() {
    for backend in Backend::ALL {
        let config = Config::builder().with_backend(backend).build();
        let dispatcher = Dispatcher::try_new(&config).unwrap();
        assert_eq!(dispatcher.backend(), backend);
        assert_eq!(dispatcher.header(), &DEFAULT_HEADER[..]);
    }
}

#[test]
fn argument_validation_test() {
    for mut dispatcher in dispatchers() {
        let input = [1u8; 32];
        let mut output = [0u8; 32];

        assert_eq!(
            dispatcher.ctr_encrypt(&KEY[..15], &CTR_IV, &input, &mut output),
            Err(Error::invalid_argument("key must be 16 bytes"))
        );
        assert_eq!(
            dispatcher.ctr_decrypt(&KEY, &NONCE, &input, &mut output),
            Err(Error::invalid_argument(
                "CTR initialization vector must be 16 bytes"
            ))
        );
        assert_eq!(
            dispatcher.gcm_encrypt(&KEY, &CTR_IV, &input, &mut output),
            Err(Error::invalid_argument(
                "GCM initialization vector must be 12 bytes"
            ))
        );
        assert_eq!(
            dispatcher.gcm_decrypt(&KEY, &NONCE, &input, &mut output, &[0; TAG_LEN - 1]),
            Err(Error::invalid_argument("tag must be 16 bytes"))
        );
        assert_eq!(
            dispatcher.gcm_encrypt(&KEY, &NONCE, &input, &mut output[..31]),
            Err(Error::invalid_argument("output is shorter than the input"))
        );

        // nothing was written
        assert_eq!(output, [0u8; 32], "{:?}", dispatcher);
    }
}

#[test]
fn configured_header_test() {
    let input = [3u8; 40];

    for backend in Backend::ALL {
        let mut default = Dispatcher::new(&Config::builder().with_backend(backend).build());
        let mut custom = Dispatcher::new(
            &Config::builder()
                .with_backend(backend)
                .with_header(b"another header")
                .unwrap()
                .build(),
        );

        let mut expected = [0u8; 40];
        let expected_tag = default
            .gcm_encrypt_with_header(&KEY, &NONCE, &DEFAULT_HEADER, &input, &mut expected)
            .unwrap();

        let mut output = [0u8; 40];
        let tag = default
            .gcm_encrypt(&KEY, &NONCE, &input, &mut output)
            .unwrap();
        assert_eq!(output, expected);
        assert_eq!(tag, expected_tag);

        // the header changes the tag but not the ciphertext
        let tag = custom
            .gcm_encrypt(&KEY, &NONCE, &input, &mut output)
            .unwrap();
        assert_eq!(output, expected);
        assert_ne!(tag, expected_tag);

        // and a message sealed under one header doesn't open under another
        let mut plaintext = [0u8; 40];
        assert_eq!(
            default.gcm_decrypt(&KEY, &NONCE, &output, &mut plaintext, &tag),
            Err(Error::Authentication)
        );
        custom
            .gcm_decrypt(&KEY, &NONCE, &output, &mut plaintext, &tag)
            .unwrap();
        assert_eq!(plaintext, input);
    }
}

#[test]
fn oversized_output_test() {
    for mut dispatcher in dispatchers() {
        let input = [5u8; 20];

        // room for an appended tag is fine, but only the payload is written
        let mut output = [0xaau8; 20 + TAG_LEN];
        dispatcher
            .gcm_encrypt(&KEY, &NONCE, &input, &mut output)
            .unwrap();
        assert_eq!(&output[20..], &[0xaa; TAG_LEN]);
    }
}

#[test]
fn reinit_test() {
    for mut dispatcher in dispatchers() {
        let mut output = [0u8; 16];
        dispatcher
            .ctr_encrypt(&KEY, &CTR_IV, &[1; 16], &mut output)
            .unwrap();

        dispatcher.reinit().unwrap();

        let mut again = [0u8; 16];
        dispatcher
            .ctr_encrypt(&KEY, &CTR_IV, &[1; 16], &mut again)
            .unwrap();
        assert_eq!(output, again);
    }
}

#[test]
fn shared_test() {
    for dispatcher in dispatchers() {
        let shared = Shared::from(dispatcher);

        let handles: Vec<_> = (0u8..4)
            .map(|id| {
                let shared = shared.clone();
                thread::spawn(move || {
                    let input = [id; 64];
                    let mut ciphertext = [0u8; 64];
                    let mut plaintext = [0u8; 64];

                    for _ in 0..8 {
                        let tag = shared
                            .with(|d| d.gcm_encrypt(&KEY, &NONCE, &input, &mut ciphertext))
                            .unwrap();
                        shared
                            .with(|d| {
                                d.gcm_decrypt(&KEY, &NONCE, &ciphertext, &mut plaintext, &tag)
                            })
                            .unwrap();
                        assert_eq!(plaintext, input);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
