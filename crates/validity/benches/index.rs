// This software is licensed under a dual license model:
//
// GNU Affero General Public License v3 (AGPLv3): You may use, modify, and
// distribute this software under the terms of the AGPLv3.
//
// Elastic License v2 (ELv2): You may also use, modify, and distribute this
// software under the Elastic License v2, which has specific restrictions.
//
// We welcome any commercial collaboration or support. For inquiries
// regarding the licenses, please contact us at:
// vectorchord-inquiry@tensorchord.ai
//
// Copyright (c) 2025 TensorChord Inc.

use criterion::{Criterion, criterion_group, criterion_main};
use parallel::{Reducer, Remainder};
use std::num::NonZero;
use vector::FeatureMatrix;

fn validity_index(c: &mut Criterion) {
    use rand::{Rng, SeedableRng};
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    let n = 40_000;
    let k = 5;
    let mut data = FeatureMatrix::with_capacity(2, n);
    for _ in 0..n {
        data.push_iter((0..2).map(|_| rng.random_range(-1.0..=1.0f64)));
    }
    let mut centroids = FeatureMatrix::with_capacity(2, k);
    for _ in 0..k {
        centroids.push_iter((0..2).map(|_| rng.random_range(-1.0..=1.0f64)));
    }
    let assignment = (0..n).map(|_| rng.random_range(0..k)).collect::<Vec<_>>();
    for threads in [1, 2, 4, 8] {
        let Some(p) = NonZero::new(threads) else {
            continue;
        };
        let reducer = Reducer::new(p, Remainder::Drop);
        c.bench_function(&format!("validity_index::{threads}"), |b| {
            b.iter(|| validity::validity_index(&data, &assignment, &centroids, &reducer, 2.0))
        });
    }
}

criterion_group!(benches, validity_index);
criterion_main!(benches);
