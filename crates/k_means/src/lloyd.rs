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

use crate::{ClusterError, lookup};
use distance::Euclidean;
use parallel::{Reducer, Remainder};
use vector::FeatureMatrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cluster {cluster} has no members")]
pub struct DegenerateClustering {
    pub cluster: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reassign {
    /// The candidate assignment was committed; `moved` rows changed cluster.
    Changed { moved: usize },
    Unchanged,
    Rejected(DegenerateClustering),
}

pub struct Lloyd<'a> {
    samples: &'a FeatureMatrix,
    c: usize,
    reducer: Reducer,
    centroids: FeatureMatrix,
    assign: Vec<usize>,
}

impl<'a> Lloyd<'a> {
    pub fn new(samples: &'a FeatureMatrix, c: usize, assign: Vec<usize>, reducer: Reducer) -> Self {
        assert_eq!(samples.len(), assign.len());
        Self {
            samples,
            c,
            // centroid sums must see every row
            reducer: reducer.with_remainder(Remainder::LastWorker),
            centroids: FeatureMatrix::from_zeros(samples.d(), c),
            assign,
        }
    }

    /// Recomputes every centroid as the mean of its members. Centroids are
    /// left untouched if some cluster is empty.
    pub fn update_means(&mut self) -> Result<Result<(), DegenerateClustering>, ClusterError> {
        let (d, c) = (self.samples.d(), self.c);
        let samples = self.samples;
        let assign = &self.assign;
        let (mut sum, count) = self.reducer.reduce(
            samples.len(),
            (FeatureMatrix::from_zeros(d, c), vec![0usize; c]),
            |range| {
                let mut sum = FeatureMatrix::from_zeros(d, c);
                let mut count = vec![0usize; c];
                for i in range.iter() {
                    let target = assign[i];
                    f64::vector_add_inplace(&mut sum[target], &samples[i]);
                    count[target] += 1;
                }
                (sum, count)
            },
            |(mut sum, mut count), (sum_1, count_1)| {
                for i in 0..c {
                    f64::vector_add_inplace(&mut sum[i], &sum_1[i]);
                    count[i] += count_1[i];
                }
                (sum, count)
            },
        )?;
        if let Some(cluster) = count.iter().position(|&x| x == 0) {
            return Ok(Err(DegenerateClustering { cluster }));
        }
        for (centroid, &n) in (&mut sum).into_iter().zip(count.iter()) {
            for x in centroid.iter_mut() {
                *x /= n as f64;
            }
        }
        self.centroids = sum;
        Ok(Ok(()))
    }

    /// Moves every row to its nearest centroid, as long as at least one row
    /// moves and no cluster is left empty.
    pub fn update_clustering(&mut self) -> Result<Reassign, ClusterError> {
        let samples = self.samples;
        let centroids = &self.centroids;
        let candidate = self.reducer.reduce(
            samples.len(),
            Vec::with_capacity(samples.len()),
            |range| {
                range
                    .iter()
                    .map(|i| lookup(&samples[i], centroids))
                    .collect::<Vec<_>>()
            },
            |mut acc, part| {
                acc.extend(part);
                acc
            },
        )?;
        let moved = candidate
            .iter()
            .zip(self.assign.iter())
            .filter(|(x, y)| x != y)
            .count();
        if moved == 0 {
            return Ok(Reassign::Unchanged);
        }
        let mut count = vec![0usize; self.c];
        for &target in candidate.iter() {
            count[target] += 1;
        }
        if let Some(cluster) = count.iter().position(|&x| x == 0) {
            return Ok(Reassign::Rejected(DegenerateClustering { cluster }));
        }
        self.assign = candidate;
        Ok(Reassign::Changed { moved })
    }

    pub fn finish(self) -> (Vec<usize>, FeatureMatrix) {
        (self.assign, self.centroids)
    }
}
