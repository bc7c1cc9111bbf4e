// src/core/vector/similarity.rs

use crate::core::common::WordVecError;

/// Dot product of two equal-length slices.
///
/// Hot-path variant used by the forest, where lengths are validated once up front.
#[inline]
#[must_use]
pub fn dot(v1: &[f32], v2: &[f32]) -> f32 {
    debug_assert_eq!(v1.len(), v2.len());
    v1.iter().zip(v2.iter()).map(|(a, b)| a * b).sum()
}

/// Euclidean (L2) norm, accumulated in `f64` so tiny or huge components
/// neither underflow to 0 nor overflow to infinity.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn norm(v: &[f32]) -> f32 {
    v.iter().map(|&x| f64::from(x) * f64::from(x)).sum::<f64>().sqrt() as f32
}

/// Returns `v` scaled to unit length, or `None` for a zero (or non-finite) norm.
#[must_use]
pub fn normalized(v: &[f32]) -> Option<Vec<f32>> {
    let magnitude = norm(v);
    if magnitude == 0.0 || !magnitude.is_finite() {
        return None;
    }
    Some(v.iter().map(|x| x / magnitude).collect())
}

/// Calculates the cosine similarity `dot(v1, v2) / (|v1| * |v2|)`.
///
/// Sums and norms are accumulated in `f64`, so any finite `f32` input (however
/// large or small) gets a finite answer.
///
/// # Errors
/// `DimensionMismatch` for different lengths, `DegenerateVector` if either
/// vector has zero magnitude or a component is not finite. A zero vector never
/// yields a silent 0.0.
pub fn cosine_similarity(v1: &[f32], v2: &[f32]) -> Result<f32, WordVecError> {
    if v1.len() != v2.len() {
        return Err(WordVecError::DimensionMismatch { expected: v1.len(), actual: v2.len() });
    }
    let (mut dot_prod, mut sq1, mut sq2) = (0.0f64, 0.0f64, 0.0f64);
    for (&a, &b) in v1.iter().zip(v2) {
        let (a, b) = (f64::from(a), f64::from(b));
        dot_prod += a * b;
        sq1 += a * a;
        sq2 += b * b;
    }

    if sq1 == 0.0 || sq2 == 0.0 {
        return Err(WordVecError::DegenerateVector(
            "zero-norm vector has no cosine similarity".to_string(),
        ));
    }

    let similarity = dot_prod / (sq1.sqrt() * sq2.sqrt());
    if !similarity.is_finite() {
        return Err(WordVecError::DegenerateVector(
            "non-finite vector has no cosine similarity".to_string(),
        ));
    }
    #[allow(clippy::cast_possible_truncation)]
    Ok(similarity.clamp(-1.0, 1.0) as f32)
}

/// Adds `v` into `acc` elementwise.
///
/// # Errors
/// `DimensionMismatch` if the lengths differ; `acc` is left untouched.
pub fn add_assign(acc: &mut [f32], v: &[f32]) -> Result<(), WordVecError> {
    if acc.len() != v.len() {
        return Err(WordVecError::DimensionMismatch { expected: acc.len(), actual: v.len() });
    }
    for (a, b) in acc.iter_mut().zip(v) {
        *a += b;
    }
    Ok(())
}
