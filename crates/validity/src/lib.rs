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

//! Maulik–Bandyopadhyay cluster validity index.
//!
//! `score = ((e1 / ec) * (d / k)) ^ pow`, where `ec` is the sum of distances
//! from every row to its centroid, `e1` the sum of distances from every row
//! to the center of the whole dataset, and `d` the smallest distance between
//! two centroids. Higher is better.
//!
//! `ec`, `e1` and the dataset center are computed with a [`Reducer`]. Under
//! [`parallel::Remainder::Drop`] the rows past the last full range are left
//! out of all three, so the score can drift slightly between concurrency
//! levels that do not divide the row count.

use distance::Euclidean;
use parallel::Reducer;
use vector::FeatureMatrix;

pub const DEFAULT_POW: f64 = 2.0;

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("validity index needs at least 2 clusters, got {0}")]
    InsufficientClusters(usize),
    #[error("assignment has {assignment} entries but data has {rows} rows")]
    LengthMismatch { assignment: usize, rows: usize },
    #[error("row {row} is assigned to cluster {cluster}, but there are {clusters} clusters")]
    ClusterOutOfRange {
        row: usize,
        cluster: usize,
        clusters: usize,
    },
    #[error("data has {data} features but centroids have {centroids}")]
    DimensionMismatch { data: usize, centroids: usize },
    #[error("failed to build thread pool")]
    ThreadPool(#[from] parallel::ThreadPoolBuildError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexParts {
    /// Sum of distances from every row to its centroid.
    pub ec: f64,
    /// Sum of distances from every row to the dataset center.
    pub e1: f64,
    /// Minimum distance between two centroids.
    pub d: f64,
    pub score: f64,
}

/// Scores a finished clustering. `NaN` or infinite scores are returned as-is
/// when `ec` or `d` is zero.
pub fn validity_index(
    data: &FeatureMatrix,
    assignment: &[usize],
    centroids: &FeatureMatrix,
    reducer: &Reducer,
    pow: f64,
) -> Result<f64, IndexError> {
    index_parts(data, assignment, centroids, reducer, pow).map(|parts| parts.score)
}

pub fn index_parts(
    data: &FeatureMatrix,
    assignment: &[usize],
    centroids: &FeatureMatrix,
    reducer: &Reducer,
    pow: f64,
) -> Result<IndexParts, IndexError> {
    let k = centroids.len();
    let d = min_distance(centroids)?;
    check(data, assignment, centroids)?;
    let ec = intra_cluster_sum(data, assignment, centroids, reducer)?;
    let e1 = total_scatter(data, reducer)?;
    let score = ((e1 / ec) * (d / k as f64)).powf(pow);
    log::debug!(
        "validity index with {} workers: ec = {ec}, e1 = {e1}, d = {d}, score = {score}",
        reducer.concurrency()
    );
    Ok(IndexParts { ec, e1, d, score })
}

fn check(
    data: &FeatureMatrix,
    assignment: &[usize],
    centroids: &FeatureMatrix,
) -> Result<(), IndexError> {
    if assignment.len() != data.len() {
        return Err(IndexError::LengthMismatch {
            assignment: assignment.len(),
            rows: data.len(),
        });
    }
    if data.d() != centroids.d() {
        return Err(IndexError::DimensionMismatch {
            data: data.d(),
            centroids: centroids.d(),
        });
    }
    let clusters = centroids.len();
    if let Some((row, &cluster)) = assignment.iter().enumerate().find(|(_, x)| **x >= clusters) {
        return Err(IndexError::ClusterOutOfRange {
            row,
            cluster,
            clusters,
        });
    }
    Ok(())
}

/// `ec`: distance from every covered row to its own centroid, summed.
pub fn intra_cluster_sum(
    data: &FeatureMatrix,
    assignment: &[usize],
    centroids: &FeatureMatrix,
    reducer: &Reducer,
) -> Result<f64, IndexError> {
    check(data, assignment, centroids)?;
    let sum = reducer.reduce(
        data.len(),
        0.0,
        |range| {
            let mut sum = 0.0;
            for i in range.iter() {
                sum += f64::distance(&data[i], &centroids[assignment[i]]);
            }
            sum
        },
        |a, b| a + b,
    )?;
    Ok(sum)
}

/// Per-dimension mean of the dataset. Each row contributes `x / n`, where
/// `n` is the full row count even if the reducer leaves some rows out.
pub fn global_center(data: &FeatureMatrix, reducer: &Reducer) -> Result<Vec<f64>, IndexError> {
    let (n, d) = (data.len(), data.d());
    let center = reducer.reduce(
        n,
        vec![f64::zero(); d],
        |range| {
            let mut center = vec![f64::zero(); d];
            for i in range.iter() {
                for (c, x) in center.iter_mut().zip(&data[i]) {
                    *c += x / n as f64;
                }
            }
            center
        },
        |mut center, part| {
            f64::vector_add_inplace(&mut center, &part);
            center
        },
    )?;
    Ok(center)
}

/// Distance from every covered row to `center`, summed.
pub fn scatter_sum(
    data: &FeatureMatrix,
    center: &[f64],
    reducer: &Reducer,
) -> Result<f64, IndexError> {
    if center.len() != data.d() {
        return Err(IndexError::DimensionMismatch {
            data: data.d(),
            centroids: center.len(),
        });
    }
    let sum = reducer.reduce(
        data.len(),
        0.0,
        |range| {
            let mut sum = 0.0;
            for i in range.iter() {
                sum += f64::distance(&data[i], center);
            }
            sum
        },
        |a, b| a + b,
    )?;
    Ok(sum)
}

/// `e1`: [`scatter_sum`] around [`global_center`].
pub fn total_scatter(data: &FeatureMatrix, reducer: &Reducer) -> Result<f64, IndexError> {
    let center = global_center(data, reducer)?;
    scatter_sum(data, &center, reducer)
}

/// `d`: the smallest distance between two distinct centroids.
pub fn min_distance(centroids: &FeatureMatrix) -> Result<f64, IndexError> {
    let k = centroids.len();
    if k < 2 {
        return Err(IndexError::InsufficientClusters(k));
    }
    let mut result = f64::MAX;
    for i in 0..k - 1 {
        for j in i + 1..k {
            let dis = f64::distance(&centroids[i], &centroids[j]);
            if dis < result {
                result = dis;
            }
        }
    }
    Ok(result)
}
