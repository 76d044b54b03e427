use crate::embedding::EmbeddingVector;
use crate::error::EmbeddingError;

/// Score returned when either side has zero norm.
///
/// Strictly below -1.0, the lowest valid cosine similarity, so it can never
/// tie with a genuine bad match.
pub const INCOMPARABLE: f32 = -2.0;

/// Whether `score` is a real similarity rather than [`INCOMPARABLE`] or NaN.
pub fn is_comparable(score: f32) -> bool {
    (-1.0..=1.0).contains(&score)
}

/// Compute cosine similarity between two embeddings.
///
/// Returns a value in `[-1, 1]`, or [`INCOMPARABLE`] when either vector has
/// zero norm. Dimension mismatches are errors.
pub fn cosine_similarity(a: &EmbeddingVector, b: &EmbeddingVector) -> Result<f32, EmbeddingError> {
    let dot = a.dot(b)?;
    let norm_a = a.norm();
    let norm_b = b.norm();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(INCOMPARABLE);
    }

    // Clamp to [-1, 1] to absorb rounding error.
    let similarity = (dot / (norm_a * norm_b)).clamp(-1.0, 1.0);
    Ok(similarity as f32)
}
