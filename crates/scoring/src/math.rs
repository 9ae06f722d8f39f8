//! Vector helpers for feature comparison.

/// Dot product of two equal-length vectors.
pub fn dot_product(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "Vectors must have same length");
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// L2 norm (magnitude) of a vector.
pub fn l2_norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Cosine similarity in [-1.0, 1.0].
///
/// Returns exactly 0.0 for mismatched lengths, empty input, a zero magnitude
/// on either side, or a non-finite result.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let norm_a = l2_norm(a);
    let norm_b = l2_norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let cos = dot_product(a, b) / (norm_a * norm_b);
    if cos.is_finite() { cos } else { 0.0 }
}
