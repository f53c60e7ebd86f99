//! Deterministic hashed embedding provider.
//!
//! Stands in for a real embedding model: each token is hashed into a bucket
//! of a fixed-width vector, and the result is L2-normalized. The same text
//! always embeds to the same vector, and texts sharing tokens land close in
//! cosine space, which is all the naive vector index needs.

use anyhow::Result;

use super::{EmbeddingProvider, EMBEDDING_DIM};

/// Bag-of-tokens embedder using FNV-1a bucket hashing.
#[derive(Debug, Default)]
pub struct HashedEmbeddingProvider;

impl HashedEmbeddingProvider {
    pub fn new() -> Self {
        Self
    }
}

/// FNV-1a, 64-bit. Stable across processes, unlike `DefaultHasher` seeds
/// would be if built per-instance.
fn fnv1a(token: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in token.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

impl EmbeddingProvider for HashedEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; EMBEDDING_DIM];

        for token in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = fnv1a(token);
            let bucket = (hash % EMBEDDING_DIM as u64) as usize;
            // Second hash bit decides the sign so unrelated texts do not all
            // point into the positive orthant.
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        // L2 normalize; an all-zero vector (no tokens) stays zero.
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }

        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        if na == 0.0 || nb == 0.0 {
            0.0
        } else {
            dot / (na * nb)
        }
    }

    #[test]
    fn embedding_is_deterministic() {
        let provider = HashedEmbeddingProvider::new();
        let a = provider.embed("my favorite color is blue").unwrap();
        let b = provider.embed("my favorite color is blue").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn embedding_has_fixed_dimensions_and_unit_norm() {
        let provider = HashedEmbeddingProvider::new();
        let v = provider.embed("hello world").unwrap();
        assert_eq!(v.len(), EMBEDDING_DIM);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn overlapping_texts_score_higher_than_disjoint() {
        let provider = HashedEmbeddingProvider::new();
        let base = provider.embed("urgent meeting notes for friday").unwrap();
        let close = provider.embed("meeting notes").unwrap();
        let far = provider.embed("pancake recipe with maple syrup").unwrap();

        assert!(cosine(&base, &close) > cosine(&base, &far));
    }

    #[test]
    fn empty_text_embeds_to_zero_vector() {
        let provider = HashedEmbeddingProvider::new();
        let v = provider.embed("   ").unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }
}
