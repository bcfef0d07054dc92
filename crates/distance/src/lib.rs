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

/// Scalar and slice operations used by the clustering kernels.
///
/// Reductions walk their operands front to back.
pub trait Euclidean:
    Copy + Send + Sync + std::fmt::Debug + Default + 'static + PartialEq + PartialOrd
{
    fn zero() -> Self;
    fn infinity() -> Self;

    fn reduce_sum_of_d2(lhs: &[Self], rhs: &[Self]) -> Self;
    /// Euclidean distance, the square root of [`Euclidean::reduce_sum_of_d2`].
    fn distance(lhs: &[Self], rhs: &[Self]) -> Self;

    fn vector_add_inplace(lhs: &mut [Self], rhs: &[Self]);
}

impl Euclidean for f64 {
    #[inline(always)]
    fn zero() -> Self {
        0.0f64
    }

    #[inline(always)]
    fn infinity() -> Self {
        f64::INFINITY
    }

    #[inline]
    fn reduce_sum_of_d2(lhs: &[f64], rhs: &[f64]) -> f64 {
        assert_eq!(lhs.len(), rhs.len());
        let mut sum = 0.0f64;
        for (x, y) in lhs.iter().zip(rhs) {
            let d = x - y;
            sum += d * d;
        }
        sum
    }

    #[inline]
    fn distance(lhs: &[f64], rhs: &[f64]) -> f64 {
        f64::reduce_sum_of_d2(lhs, rhs).sqrt()
    }

    #[inline]
    fn vector_add_inplace(lhs: &mut [f64], rhs: &[f64]) {
        assert_eq!(lhs.len(), rhs.len());
        for (x, y) in lhs.iter_mut().zip(rhs) {
            *x += y;
        }
    }
}

#[test]
fn distance_of_right_triangle() {
    assert_eq!(f64::reduce_sum_of_d2(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
    assert_eq!(f64::distance(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
    assert_eq!(f64::distance(&[1.5, -2.0], &[1.5, -2.0]), 0.0);
}

#[test]
fn distance_is_symmetric() {
    use rand::{Rng, SeedableRng};
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    for _ in 0..1000 {
        let d = rng.random_range(1..16);
        let x = (0..d)
            .map(|_| rng.random_range(-100.0..100.0))
            .collect::<Vec<f64>>();
        let y = (0..d)
            .map(|_| rng.random_range(-100.0..100.0))
            .collect::<Vec<f64>>();
        assert_eq!(f64::distance(&x, &y).to_bits(), f64::distance(&y, &x).to_bits());
        assert!(f64::distance(&x, &y) >= 0.0);
    }
}

#[test]
fn inplace_updates() {
    let mut x = vec![1.0, 2.0, 3.0];
    f64::vector_add_inplace(&mut x, &[1.0, 1.0, 1.0]);
    assert_eq!(x, [2.0, 3.0, 4.0]);
}
