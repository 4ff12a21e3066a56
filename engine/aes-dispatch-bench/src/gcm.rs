// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::{fixture, BLOCK_SIZES};
use aes_dispatch::{Backend, Config, Dispatcher};
use criterion::{BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

pub fn benchmarks(c: &mut Criterion) {
    let mut dispatchers: Vec<_> = Backend::ALL
        .into_iter()
        .map(|backend| Dispatcher::new(&Config::builder().with_backend(backend).build()))
        .collect();

    let mut encrypt = c.benchmark_group("gcm/encrypt");
    for dispatcher in dispatchers.iter_mut() {
        let name = dispatcher.backend().as_str();

        for size in BLOCK_SIZES {
            let input = fixture::plaintext(size);
            let mut output = vec![0u8; size];

            encrypt.throughput(Throughput::Bytes(size as _));
            encrypt.bench_with_input(BenchmarkId::new(name, size), &input, |b, input| {
                b.iter(|| {
                    let _ = black_box(dispatcher.gcm_encrypt(
                        &fixture::KEY,
                        fixture::nonce(),
                        input,
                        &mut output,
                    ));
                });
            });
        }
    }
    encrypt.finish();

    let mut decrypt = c.benchmark_group("gcm/decrypt");
    for dispatcher in dispatchers.iter_mut() {
        let name = dispatcher.backend().as_str();

        for size in BLOCK_SIZES {
            // create a valid encrypted payload
            let mut ciphertext = vec![0u8; size];
            let tag = dispatcher
                .gcm_encrypt(
                    &fixture::KEY,
                    fixture::nonce(),
                    &fixture::plaintext(size),
                    &mut ciphertext,
                )
                .expect("reference payload must encrypt");
            let mut output = vec![0u8; size];

            decrypt.throughput(Throughput::Bytes(size as _));
            decrypt.bench_with_input(BenchmarkId::new(name, size), &ciphertext, |b, input| {
                b.iter(|| {
                    let _ = black_box(dispatcher.gcm_decrypt(
                        &fixture::KEY,
                        fixture::nonce(),
                        input,
                        &mut output,
                        &tag,
                    ));
                });
            });
        }
    }
    decrypt.finish();
}
