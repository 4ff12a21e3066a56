// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use criterion::Criterion;

mod ctr;
pub mod fixture;
mod gcm;
pub mod report;

/// Payload sizes the engines are compared across
pub const BLOCK_SIZES: [usize; 5] = [16, 64, 256, 1024, 4096];

pub fn benchmarks(c: &mut Criterion) {
    ctr::benchmarks(c);
    gcm::benchmarks(c);
}
