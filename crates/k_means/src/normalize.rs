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
use vector::FeatureMatrix;

/// Returns a copy of `raw` with every column mapped to
/// `(x - mean) / variance`, using the population variance of the column.
///
/// A column whose variance is zero is only centred.
pub fn normalize(raw: &FeatureMatrix) -> Result<FeatureMatrix, ClusterError> {
    let n = raw.len();
    if n == 0 {
        return Err(ClusterError::EmptyInput);
    }
    let mut result = raw.clone();
    for j in 0..raw.d() {
        let mean = raw.column(j).sum::<f64>() / n as f64;
        let variance = raw.column(j).map(|x| (x - mean) * (x - mean)).sum::<f64>() / n as f64;
        let scale = if variance == 0.0 { 1.0 } else { variance };
        for row in &mut result {
            row[j] = (row[j] - mean) / scale;
        }
    }
    Ok(result)
}
