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

use crate::ClusterError;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Initial assignment for `n` rows and `c` clusters.
///
/// Row `i < c` goes to cluster `i`, so no cluster starts empty. Every other
/// row draws its cluster uniformly from a generator seeded with `seed`.
pub fn init_clustering(n: usize, c: usize, seed: u64) -> Result<Vec<usize>, ClusterError> {
    if c == 0 || c > n {
        return Err(ClusterError::InvalidClusterCount {
            clusters: c,
            rows: n,
        });
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut assign = Vec::with_capacity(n);
    assign.extend(0..c);
    assign.extend((c..n).map(|_| rng.random_range(0..c)));
    Ok(assign)
}
