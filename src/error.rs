#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Matrix(#[from] vector::MatrixError),
    #[error(transparent)]
    Cluster(#[from] k_means::ClusterError),
    #[error(transparent)]
    Index(#[from] validity::IndexError),
    #[error("concurrency must be at least 1")]
    InvalidConcurrency,
    #[error("invalid options: {0}")]
    InvalidOptions(#[from] validator::ValidationErrors),
    #[error("failed to parse options: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
