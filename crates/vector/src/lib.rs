mod matrix;

pub use matrix::{FeatureMatrix, MatrixError};
