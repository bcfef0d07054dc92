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

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatrixError {
    #[error("feature vectors must have at least one dimension")]
    ZeroDimension,
    #[error("row {row} has {actual} features, expected {expected}")]
    DimensionMismatch {
        expected: usize,
        actual: usize,
        row: usize,
    },
}

/// A dense, row-major matrix of feature vectors.
///
/// Rows are observations and columns are features. Centroids are stored in
/// the same shape, one row per cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    d: usize,
    p: Vec<f64>,
}

impl FeatureMatrix {
    pub fn d(&self) -> usize {
        self.d
    }
    pub fn len(&self) -> usize {
        self.p.len().checked_div(self.d).unwrap_or(0)
    }
    pub fn is_empty(&self) -> bool {
        self.p.is_empty()
    }
    pub fn new(d: usize) -> Self {
        Self { d, p: Vec::new() }
    }
    pub fn with_capacity(d: usize, n: usize) -> Self {
        Self {
            d,
            p: Vec::with_capacity(usize::saturating_mul(d, n)),
        }
    }
    pub fn from_zeros(d: usize, n: usize) -> Self {
        Self {
            d,
            p: vec![0.0; d * n],
        }
    }
    /// Builds a matrix from rows, checking that every row has `d` features.
    pub fn from_rows<R: AsRef<[f64]>>(
        d: usize,
        rows: impl IntoIterator<Item = R>,
    ) -> Result<Self, MatrixError> {
        if d == 0 {
            return Err(MatrixError::ZeroDimension);
        }
        let mut result = Self::new(d);
        for (i, row) in rows.into_iter().enumerate() {
            let row = row.as_ref();
            if row.len() != d {
                return Err(MatrixError::DimensionMismatch {
                    expected: d,
                    actual: row.len(),
                    row: i,
                });
            }
            result.p.extend_from_slice(row);
        }
        Ok(result)
    }
    pub fn push_slice(&mut self, slice: &[f64]) {
        assert_eq!(slice.len(), self.d);
        self.p.extend_from_slice(slice);
    }
    pub fn push_iter(&mut self, iter: impl ExactSizeIterator<Item = f64>) {
        assert_eq!(iter.len(), self.d);
        self.p.extend(iter);
    }
    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        let d = self.d;
        &self.p[i * d..(i + 1) * d]
    }
    #[inline]
    pub fn row_mut(&mut self, i: usize) -> &mut [f64] {
        let d = self.d;
        &mut self.p[i * d..(i + 1) * d]
    }
    /// Iterates over one feature across all observations.
    pub fn column(&self, j: usize) -> impl ExactSizeIterator<Item = f64> + '_ {
        assert!(j < self.d);
        self.p.chunks_exact(self.d).map(move |row| row[j])
    }
    pub fn iter(&self) -> std::slice::ChunksExact<'_, f64> {
        self.p.chunks_exact(self.d.max(1))
    }
    pub fn iter_mut(&mut self) -> std::slice::ChunksExactMut<'_, f64> {
        self.p.chunks_exact_mut(self.d.max(1))
    }
    pub fn as_slice(&self) -> &[f64] {
        self.p.as_slice()
    }
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.iter().map(<[f64]>::to_vec).collect()
    }
}

impl std::ops::Index<usize> for FeatureMatrix {
    type Output = [f64];

    fn index(&self, index: usize) -> &Self::Output {
        &self.p[self.d * index..][..self.d]
    }
}

impl std::ops::IndexMut<usize> for FeatureMatrix {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.p[self.d * index..][..self.d]
    }
}

impl<'a> IntoIterator for &'a FeatureMatrix {
    type Item = &'a [f64];

    type IntoIter = std::slice::ChunksExact<'a, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for &'a mut FeatureMatrix {
    type Item = &'a mut [f64];

    type IntoIter = std::slice::ChunksExactMut<'a, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
