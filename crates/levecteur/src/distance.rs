// Cosine distance
//
// *La Distance* (The Distance) - Cosine similarity and the blob layout of stored vectors

use crate::error::{Result, StoreError};

/// Size in bytes of one stored vector component (`f32`)
const COMPONENT_BYTES: usize = std::mem::size_of::<f32>();

/// Calculate cosine similarity between two vectors
///
/// Cosine similarity = (A · B) / (||A|| * ||B||)
/// Returns a value between -1.0 and 1.0, where 1.0 is identical direction.
/// Accumulation happens in `f64`; identical non-zero vectors score exactly 1.0.
///
/// # Returns
///
/// Cosine similarity, or 0.0 if the lengths differ or either vector has zero magnitude
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot_product = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;

    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot_product += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot_product / (norm_a * norm_b).sqrt()).clamp(-1.0, 1.0)
}

/// Cosine distance, `1 - cosine_similarity(a, b)`
///
/// Ranges from 0.0 (same direction) to 2.0 (opposite direction).
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    1.0 - cosine_similarity(a, b)
}

/// Encode an embedding as an `f32` blob (native byte order)
pub fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    bytemuck::cast_slice(embedding).to_vec()
}

/// Decode an `f32` blob back into an embedding
///
/// The blob need not be aligned; components are copied out.
///
/// # Returns
///
/// `Err(StoreError::InvalidEmbedding)` if the blob length is not a multiple of 4
pub fn decode_embedding(bytes: &[u8]) -> Result<Vec<f32>> {
    if bytes.len() % COMPONENT_BYTES != 0 {
        return Err(StoreError::InvalidEmbedding(format!(
            "blob of {} bytes is not a whole number of f32 components",
            bytes.len()
        )));
    }

    Ok(bytemuck::pod_collect_to_vec(bytes))
}
