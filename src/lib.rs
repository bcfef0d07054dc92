//! K-Means clustering scored with a parallel Maulik–Bandyopadhyay validity
//! index.
//!
//! ```text
//! raw rows -> normalize -> cluster -> validity_index -> score
//! ```

mod error;
mod options;

pub use error::{Error, Result};
pub use k_means::{ClusterError, Clustering, KMeansOptions, Termination, lookup};
pub use options::ClusteringOptions;
pub use parallel::{Reducer, Remainder, WorkRange};
pub use validity::{DEFAULT_POW, IndexError, IndexParts};
pub use vector::{FeatureMatrix, MatrixError};

use std::num::NonZero;

pub fn normalize(matrix: &FeatureMatrix) -> Result<FeatureMatrix> {
    Ok(k_means::normalize(matrix)?)
}

/// Normalizes `matrix` and clusters it with `clusters` clusters.
///
/// Never fails on non-convergence: the returned [`Clustering`] tells how many
/// iterations ran and why the loop stopped.
pub fn cluster(matrix: &FeatureMatrix, clusters: usize, seed: u64) -> Result<Clustering> {
    Ok(k_means::cluster(matrix, clusters, seed)?)
}

/// Scores a clustering with `concurrency` workers, dropping the rows that do
/// not fill a whole worker range.
pub fn validity_index(
    normalized: &FeatureMatrix,
    assignment: &[usize],
    centroids: &FeatureMatrix,
    concurrency: usize,
    pow: f64,
) -> Result<f64> {
    let concurrency = NonZero::new(concurrency).ok_or(Error::InvalidConcurrency)?;
    let reducer = Reducer::new(concurrency, Remainder::Drop);
    Ok(validity::validity_index(
        normalized, assignment, centroids, &reducer, pow,
    )?)
}

#[derive(Debug, Clone)]
pub struct Report {
    pub clustering: Clustering,
    pub index: IndexParts,
    pub options: ClusteringOptions,
}

/// Normalizes, clusters and scores `matrix` as configured by `options`.
pub fn run(matrix: &FeatureMatrix, options: &ClusteringOptions) -> Result<Report> {
    use validator::Validate;
    options.validate()?;
    let threads = NonZero::new(options.threads as usize).ok_or(Error::InvalidConcurrency)?;
    let max_iterations_factor =
        NonZero::new(options.max_iterations_factor as usize).unwrap_or(NonZero::<usize>::MIN);
    let k_means_options = KMeansOptions {
        threads,
        max_iterations_factor,
    };
    let clustering = k_means::cluster_with(
        matrix,
        options.clusters as usize,
        options.seed,
        &k_means_options,
    )?;
    let reducer = Reducer::new(threads, options.remainder);
    let index = validity::index_parts(
        &clustering.data,
        &clustering.assignment,
        &clustering.centroids,
        &reducer,
        options.pow,
    )?;
    log::info!(
        "clustered {} rows into {} clusters: {:?} after {} iterations, index = {}",
        clustering.data.len(),
        clustering.clusters(),
        clustering.termination,
        clustering.iterations,
        index.score
    );
    Ok(Report {
        clustering,
        index,
        options: options.clone(),
    })
}
