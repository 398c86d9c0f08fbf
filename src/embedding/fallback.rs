//! Deterministic hash-based embedder.
//!
//! Used when the `fastembed-embeddings` feature is disabled, or in tests
//! that need reproducible vectors without downloading a model. Not
//! semantically meaningful, but stable: the same text always produces the
//! same vector, and textually similar strings tend to land nearby because
//! each token independently perturbs the same dimensions.

use super::Embedder;
use crate::error::Result;

/// A deterministic, dependency-free embedder based on token hashing.
#[derive(Debug, Clone)]
pub struct FallbackEmbedder {
    dimensions: usize,
}

impl FallbackEmbedder {
    /// Creates a fallback embedder producing vectors of `dimensions` length.
    #[must_use]
    pub const fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

impl Embedder for FallbackEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vec = vec![0.0f32; self.dimensions];
        let lowered = text.to_lowercase();

        for token in lowered.split_whitespace() {
            let h = fnv1a(token.as_bytes());
            let idx = (h as usize) % self.dimensions;
            let sign = if h & 1 == 0 { 1.0 } else { -1.0 };
            vec[idx] += sign;

            // Spread a little to neighboring dimensions so short texts don't
            // collapse onto a handful of buckets.
            let idx2 = (h.rotate_left(17) as usize) % self.dimensions;
            vec[idx2] += sign * 0.5;
        }

        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vec {
                *v /= norm;
            }
        }
        Ok(vec)
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01B3;
    let mut hash = OFFSET;
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_requested_dimensions() {
        let e = FallbackEmbedder::new(384);
        let v = e.embed("hello world").unwrap();
        assert_eq!(v.len(), 384);
    }

    #[test]
    fn is_deterministic() {
        let e = FallbackEmbedder::new(64);
        let a = e.embed("the grace period is thirty days").unwrap();
        let b = e.embed("the grace period is thirty days").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn is_unit_normalized() {
        let e = FallbackEmbedder::new(64);
        let v = e.embed("waiting period for pre-existing diseases").unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5 || norm == 0.0);
    }

    #[test]
    fn different_text_produces_different_vectors() {
        let e = FallbackEmbedder::new(64);
        let a = e.embed("grace period premium").unwrap();
        let b = e.embed("air ambulance distance").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn empty_text_yields_zero_vector() {
        let e = FallbackEmbedder::new(32);
        let v = e.embed("").unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }
}
