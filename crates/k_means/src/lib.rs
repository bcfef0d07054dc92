mod init;
mod lloyd;
mod normalize;

pub use init::init_clustering;
pub use normalize::normalize;

use distance::Euclidean;
use lloyd::{Lloyd, Reassign};
use parallel::Reducer;
use std::num::NonZero;
use vector::FeatureMatrix;

#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    #[error("cannot normalize a matrix without rows")]
    EmptyInput,
    #[error("number of clusters must be between 1 and {rows}, got {clusters}")]
    InvalidClusterCount { clusters: usize, rows: usize },
    #[error("failed to build thread pool")]
    ThreadPool(#[from] parallel::ThreadPoolBuildError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    /// Reassigning every row to its nearest centroid changed nothing.
    Converged,
    /// A step would have emptied a cluster; the last valid state was kept.
    Degenerate,
    /// The iteration bound was reached before convergence.
    IterationLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KMeansOptions {
    /// Workers used for centroid sums and reassignment.
    pub threads: NonZero<usize>,
    /// The loop runs at most `max_iterations_factor * rows` times.
    pub max_iterations_factor: NonZero<usize>,
}

impl Default for KMeansOptions {
    fn default() -> Self {
        Self {
            threads: NonZero::<usize>::MIN,
            max_iterations_factor: NonZero::new(10).unwrap_or(NonZero::<usize>::MIN),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    /// Cluster id of every row.
    pub assignment: Vec<usize>,
    /// Mean of every cluster under `assignment`.
    pub centroids: FeatureMatrix,
    /// The normalized rows that were clustered.
    pub data: FeatureMatrix,
    pub iterations: usize,
    pub termination: Termination,
}

impl Clustering {
    pub fn clusters(&self) -> usize {
        self.centroids.len()
    }

    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.clusters()];
        for &target in self.assignment.iter() {
            sizes[target] += 1;
        }
        sizes
    }
}

/// Normalizes `raw` and partitions it into `c` clusters.
pub fn cluster(raw: &FeatureMatrix, c: usize, seed: u64) -> Result<Clustering, ClusterError> {
    cluster_with(raw, c, seed, &KMeansOptions::default())
}

pub fn cluster_with(
    raw: &FeatureMatrix,
    c: usize,
    seed: u64,
    options: &KMeansOptions,
) -> Result<Clustering, ClusterError> {
    let data = normalize(raw)?;
    let n = data.len();
    let assign = init_clustering(n, c, seed)?;
    let reducer = Reducer::new(options.threads, parallel::Remainder::LastWorker);
    let max_iterations = options.max_iterations_factor.get().saturating_mul(n);

    let mut lloyd = Lloyd::new(&data, c, assign, reducer);
    let (iterations, termination) = refine(&mut lloyd, max_iterations)?;
    let (assignment, centroids) = lloyd.finish();
    Ok(Clustering {
        assignment,
        centroids,
        data,
        iterations,
        termination,
    })
}

fn refine(
    lloyd: &mut Lloyd<'_>,
    max_iterations: usize,
) -> Result<(usize, Termination), ClusterError> {
    let mut iterations = 0;
    let termination = loop {
        if iterations >= max_iterations {
            log::warn!("k-means stopped after {iterations} iterations without converging");
            // the last committed assignment has no empty cluster
            if let Err(e) = lloyd.update_means()? {
                log::debug!("final means: {e}");
            }
            break Termination::IterationLimit;
        }
        iterations += 1;
        let means = lloyd.update_means()?;
        let reassign = lloyd.update_clustering()?;
        if let Err(e) = means {
            log::debug!("iteration {iterations}: {e}, keeping previous centroids");
            break Termination::Degenerate;
        }
        match reassign {
            Reassign::Changed { moved } => {
                log::debug!("iteration {iterations}: {moved} rows reassigned");
            }
            Reassign::Unchanged => break Termination::Converged,
            Reassign::Rejected(e) => {
                log::debug!("iteration {iterations}: {e}, keeping previous assignment");
                break Termination::Degenerate;
            }
        }
    };
    Ok((iterations, termination))
}

/// Index of the nearest centroid; ties go to the lowest index.
///
/// Panics if `centroids` is empty.
pub fn lookup(vector: &[f64], centroids: &FeatureMatrix) -> usize {
    assert_ne!(centroids.len(), 0, "lookup needs at least one centroid");
    let mut result = (f64::infinity(), 0);
    for (i, centroid) in centroids.into_iter().enumerate() {
        let dis = f64::distance(vector, centroid);
        if dis < result.0 {
            result = (dis, i);
        }
    }
    result.1
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    fn random_matrix(n: usize, d: usize, seed: u64) -> FeatureMatrix {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        let mut m = FeatureMatrix::with_capacity(d, n);
        for _ in 0..n {
            m.push_iter((0..d).map(|_| rng.random_range(-1000.0..1000.0)));
        }
        m
    }

    #[test]
    fn lookup_prefers_lowest_index_on_ties() {
        let centroids = FeatureMatrix::from_rows(2, [[1.0, 0.0], [-1.0, 0.0], [0.0, 5.0]]).unwrap();
        assert_eq!(lookup(&[0.0, 0.0], &centroids), 0);
        assert_eq!(lookup(&[-0.5, 0.0], &centroids), 1);
        assert_eq!(lookup(&[0.0, 4.0], &centroids), 2);
    }

    #[test]
    #[should_panic]
    fn lookup_without_centroids() {
        lookup(&[0.0, 0.0], &FeatureMatrix::new(2));
    }

    fn line() -> FeatureMatrix {
        FeatureMatrix::from_rows(1, [[0.0], [1.0], [2.0], [10.0], [11.0], [12.0]]).unwrap()
    }

    #[test]
    fn iteration_limit_keeps_last_assignment() {
        let samples = line();
        let mut lloyd = Lloyd::new(&samples, 2, vec![0, 0, 1, 1, 1, 1], Reducer::sequential());
        let (iterations, termination) = refine(&mut lloyd, 1).unwrap();
        assert_eq!(termination, Termination::IterationLimit);
        assert_eq!(iterations, 1);
        let (assignment, centroids) = lloyd.finish();
        assert_eq!(assignment, [0, 0, 0, 1, 1, 1]);
        assert_eq!(centroids.as_slice(), [1.0, 11.0]);
    }

    #[test]
    fn zero_iterations_returns_initial_means() {
        let samples = line();
        let mut lloyd = Lloyd::new(&samples, 2, vec![0, 0, 1, 1, 1, 1], Reducer::sequential());
        let (iterations, termination) = refine(&mut lloyd, 0).unwrap();
        assert_eq!(termination, Termination::IterationLimit);
        assert_eq!(iterations, 0);
        let (assignment, centroids) = lloyd.finish();
        assert_eq!(assignment, [0, 0, 1, 1, 1, 1]);
        assert_eq!(centroids.as_slice(), [0.5, 8.75]);
    }

    #[test]
    fn alternating_rows_are_degenerate() {
        let raw = FeatureMatrix::from_rows(1, [[-1.0], [1.0], [-1.0], [1.0]]).unwrap();
        let mut seen = 0;
        for seed in 0..64 {
            let initial = init_clustering(4, 2, seed).unwrap();
            if initial != [0, 1, 1, 0] {
                continue;
            }
            seen += 1;
            let clustering = cluster(&raw, 2, seed).unwrap();
            assert_eq!(clustering.termination, Termination::Degenerate);
            assert_eq!(clustering.iterations, 1);
            assert_eq!(clustering.cluster_sizes(), [2, 2]);
            assert_eq!(clustering.assignment, initial);
        }
        assert!(seen > 0);
    }

    #[test]
    fn two_pairs() {
        let raw = FeatureMatrix::from_rows(2, [[0.0, 0.0], [0.0, 0.0], [10.0, 10.0], [10.0, 10.0]])
            .unwrap();
        let clustering = cluster(&raw, 2, 0).unwrap();
        assert_eq!(clustering.cluster_sizes(), [2, 2]);
        assert!(clustering.iterations <= 3);
        assert_ne!(clustering.termination, Termination::IterationLimit);
    }

    #[test]
    fn separates_two_groups() {
        let raw = FeatureMatrix::from_rows(
            2,
            [[0.0, 0.0], [10.0, 10.0], [0.0, 0.0], [0.0, 0.0], [10.0, 10.0]],
        )
        .unwrap();
        for seed in 0..32 {
            let clustering = cluster(&raw, 2, seed).unwrap();
            assert_eq!(clustering.termination, Termination::Converged);
            let a = clustering.assignment[0];
            let b = clustering.assignment[1];
            assert_ne!(a, b);
            assert_eq!(clustering.assignment, [a, b, a, a, b]);
            for j in 0..2 {
                assert!((clustering.centroids[a][j] + 1.0 / 6.0).abs() < 1e-12);
                assert!((clustering.centroids[b][j] - 0.25).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn clusters_never_empty() {
        for seed in 0..20 {
            let raw = random_matrix(300, 2, seed);
            for c in [1, 2, 3, 5, 8] {
                let clustering = cluster(&raw, c, seed).unwrap();
                assert_eq!(clustering.clusters(), c);
                assert!(clustering.cluster_sizes().iter().all(|&x| x > 0));
                assert_eq!(clustering.cluster_sizes().iter().sum::<usize>(), 300);
            }
        }
    }

    #[test]
    fn deterministic_for_fixed_seed() {
        let raw = random_matrix(500, 3, 1);
        let first = cluster(&raw, 4, 17).unwrap();
        let second = cluster(&raw, 4, 17).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn converged_rows_sit_at_nearest_centroid() {
        let raw = random_matrix(400, 2, 3);
        let clustering = cluster(&raw, 4, 5).unwrap();
        if clustering.termination == Termination::Converged {
            for (i, row) in clustering.data.iter().enumerate() {
                assert_eq!(lookup(row, &clustering.centroids), clustering.assignment[i]);
            }
        }
    }

    #[test]
    fn threads_do_not_change_the_result() {
        let raw = random_matrix(256, 2, 11);
        let sequential = cluster(&raw, 3, 2).unwrap();
        for threads in [2, 3, 8] {
            let options = KMeansOptions {
                threads: NonZero::new(threads).unwrap(),
                ..Default::default()
            };
            let parallel = cluster_with(&raw, 3, 2, &options).unwrap();
            assert_eq!(parallel.assignment, sequential.assignment);
            assert_eq!(parallel.iterations, sequential.iterations);
            for (x, y) in parallel
                .centroids
                .as_slice()
                .iter()
                .zip(sequential.centroids.as_slice())
            {
                assert!((x - y).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn rejects_bad_input() {
        let raw = FeatureMatrix::new(2);
        assert!(matches!(cluster(&raw, 1, 0), Err(ClusterError::EmptyInput)));
        let raw = random_matrix(5, 2, 0);
        assert!(matches!(
            cluster(&raw, 6, 0),
            Err(ClusterError::InvalidClusterCount {
                clusters: 6,
                rows: 5
            })
        ));
        assert!(matches!(
            cluster(&raw, 0, 0),
            Err(ClusterError::InvalidClusterCount { .. })
        ));
    }

    #[test]
    fn single_cluster_is_the_mean() {
        let raw = FeatureMatrix::from_rows(1, [[1.0], [2.0], [3.0], [6.0]]).unwrap();
        let clustering = cluster(&raw, 1, 0).unwrap();
        assert_eq!(clustering.assignment, [0, 0, 0, 0]);
        assert_eq!(clustering.termination, Termination::Converged);
        assert_eq!(clustering.iterations, 1);
        assert!(clustering.centroids[0][0].abs() < 1e-12);
    }
}
