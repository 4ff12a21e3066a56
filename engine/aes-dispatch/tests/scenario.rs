// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use aes_dispatch::{Backend, Config, Dispatcher, Error, TAG_LEN};
use hex_literal::hex;

const LENGTH: usize = 256;

const KEY: [u8; 32] = hex!(
    "
    000102030405060708090a0b0c0d0e0f
    000102030405060708090a0b0c0d0e0f
    "
);
const CTR_IV: [u8; 16] = hex!("000102030405060708090a0b00000000");
const HEADER: [u8; 16] = hex!("000102030405060708090a0b0c0d0e0f");

fn plaintext() -> Vec<u8> {
    (0..LENGTH).map(|i| i as u8).collect()
}

fn dispatcher(backend: Backend) -> Dispatcher {
    Dispatcher::new(&Config::builder().with_backend(backend).build())
}

/// The reference deployment: 256 bytes, buffers sized to hold an appended tag
#[test]
fn reference_round_trip() {
    let key = &KEY[..16];
    let nonce = &CTR_IV[..12];
    let plaintext = plaintext();

    for backend in Backend::ALL {
        let mut dispatcher = dispatcher(backend);

        let mut ciphertext = vec![0u8; LENGTH + TAG_LEN];
        let mut recovered = vec![0u8; LENGTH + TAG_LEN];

        dispatcher
            .ctr_encrypt(key, &CTR_IV, &plaintext, &mut ciphertext)
            .unwrap();
        assert_ne!(&ciphertext[..LENGTH], &plaintext[..], "{backend}");
        dispatcher
            .ctr_decrypt(key, &CTR_IV, &ciphertext[..LENGTH], &mut recovered)
            .unwrap();
        assert_eq!(&recovered[..LENGTH], &plaintext[..], "{backend}");

        recovered.fill(0);
        let tag = dispatcher
            .gcm_encrypt_with_header(key, nonce, &HEADER, &plaintext, &mut ciphertext)
            .unwrap();
        dispatcher
            .gcm_decrypt_with_header(
                key,
                nonce,
                &HEADER,
                &ciphertext[..LENGTH],
                &mut recovered,
                &tag,
            )
            .unwrap();
        assert_eq!(&recovered[..LENGTH], &plaintext[..], "{backend}");
    }
}

#[test]
fn backend_equivalence() {
    let key = &KEY[..16];
    let nonce = &CTR_IV[..12];
    let plaintext = plaintext();

    let outputs: Vec<_> = Backend::ALL
        .into_iter()
        .map(|backend| {
            let mut dispatcher = dispatcher(backend);

            let mut ctr = vec![0u8; LENGTH];
            dispatcher
                .ctr_encrypt(key, &CTR_IV, &plaintext, &mut ctr)
                .unwrap();

            let mut gcm = vec![0u8; LENGTH];
            let tag = dispatcher
                .gcm_encrypt_with_header(key, nonce, &HEADER, &plaintext, &mut gcm)
                .unwrap();

            let mut gcm_default = vec![0u8; LENGTH];
            let default_tag = dispatcher
                .gcm_encrypt(key, nonce, &plaintext, &mut gcm_default)
                .unwrap();

            (ctr, gcm, tag, default_tag)
        })
        .collect();

    let (hardware, software) = (&outputs[0], &outputs[1]);
    assert_eq!(hardware, software);
}

#[test]
fn tamper_detection() {
    let key = &KEY[..16];
    let nonce = &CTR_IV[..12];
    let plaintext = plaintext();

    for backend in Backend::ALL {
        let mut dispatcher = dispatcher(backend);

        let mut ciphertext = vec![0u8; LENGTH];
        let tag = dispatcher
            .gcm_encrypt(key, nonce, &plaintext, &mut ciphertext)
            .unwrap();

        // flip a single bit in every byte of the ciphertext and the tag
        for idx in 0..LENGTH + TAG_LEN {
            let mut ciphertext = ciphertext.clone();
            let mut tag = tag;
            let bit = 1 << (idx % 8);
            if idx < LENGTH {
                ciphertext[idx] ^= bit;
            } else {
                tag[idx - LENGTH] ^= bit;
            }

            let mut recovered = vec![0xffu8; LENGTH];
            assert_eq!(
                dispatcher.gcm_decrypt(key, nonce, &ciphertext, &mut recovered, &tag),
                Err(Error::Authentication),
                "{backend} accepted a modification at {idx}"
            );
            assert!(recovered.iter().all(|b| *b == 0), "{backend}");
        }

        // the engine is still usable after an authentication failure
        let mut recovered = vec![0u8; LENGTH];
        dispatcher
            .gcm_decrypt(key, nonce, &ciphertext, &mut recovered, &tag)
            .unwrap();
        assert_eq!(recovered, plaintext);
    }
}

#[test]
fn zero_length() {
    let key = &KEY[..16];
    let nonce = &CTR_IV[..12];

    let tags: Vec<_> = Backend::ALL
        .into_iter()
        .map(|backend| {
            let mut dispatcher = dispatcher(backend);

            let mut output: [u8; 0] = [];
            dispatcher
                .ctr_encrypt(key, &CTR_IV, &[], &mut output)
                .unwrap();

            // the tag covers the header alone
            let tag = dispatcher
                .gcm_encrypt_with_header(key, nonce, &HEADER, &[], &mut output)
                .unwrap();
            dispatcher
                .gcm_decrypt_with_header(key, nonce, &HEADER, &[], &mut output, &tag)
                .unwrap();

            let mut other = tag;
            other[0] ^= 1;
            assert_eq!(
                dispatcher.gcm_decrypt_with_header(key, nonce, &HEADER, &[], &mut output, &other),
                Err(Error::Authentication)
            );

            tag
        })
        .collect();

    assert_eq!(tags[0], tags[1]);
}
