use crate::Error;
use parallel::Remainder;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ClusteringOptions {
    #[validate(range(min = 1))]
    pub clusters: u32,
    #[serde(default = "ClusteringOptions::default_seed")]
    pub seed: u64,
    /// Workers for centroid sums, reassignment and the validity index.
    #[serde(default = "ClusteringOptions::default_threads")]
    #[validate(range(min = 1, max = 255))]
    pub threads: u16,
    #[serde(default = "ClusteringOptions::default_pow")]
    #[validate(custom(function = ClusteringOptions::validate_pow))]
    pub pow: f64,
    /// How the validity index treats rows past the last full worker range.
    #[serde(default)]
    pub remainder: Remainder,
    #[serde(default = "ClusteringOptions::default_max_iterations_factor")]
    #[validate(range(min = 1))]
    pub max_iterations_factor: u32,
}

impl ClusteringOptions {
    pub fn new(clusters: u32) -> Self {
        Self {
            clusters,
            seed: Self::default_seed(),
            threads: Self::default_threads(),
            pow: Self::default_pow(),
            remainder: Remainder::default(),
            max_iterations_factor: Self::default_max_iterations_factor(),
        }
    }
    pub fn from_toml(s: &str) -> Result<Self, Error> {
        let options: Self = toml::from_str(s)?;
        options.validate()?;
        Ok(options)
    }
    fn default_seed() -> u64 {
        0
    }
    fn default_threads() -> u16 {
        1
    }
    fn default_pow() -> f64 {
        validity::DEFAULT_POW
    }
    fn validate_pow(pow: f64) -> Result<(), ValidationError> {
        if !pow.is_finite() {
            return Err(ValidationError::new("`pow` should be a finite number"));
        }
        Ok(())
    }
    fn default_max_iterations_factor() -> u32 {
        10
    }
}
