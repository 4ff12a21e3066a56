// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::{fixture, BLOCK_SIZES};
use aes_dispatch::{Backend, Config, Dispatcher};
use criterion::{BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

pub fn benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("ctr/encrypt");

    for backend in Backend::ALL {
        let mut dispatcher = Dispatcher::new(&Config::builder().with_backend(backend).build());

        for size in BLOCK_SIZES {
            let input = fixture::plaintext(size);
            let mut output = vec![0u8; size];

            group.throughput(Throughput::Bytes(size as _));
            group.bench_with_input(
                BenchmarkId::new(backend.as_str(), size),
                &input,
                |b, input| {
                    b.iter(|| {
                        let _ = black_box(dispatcher.ctr_encrypt(
                            &fixture::KEY,
                            &fixture::IV,
                            input,
                            &mut output,
                        ));
                    });
                },
            );
        }
    }

    group.finish();
}
