use anyhow::Result;
use std::hash::Hasher;
use twox_hash::XxHash64;

use docqa_core::traits::Embedder;

/// Hashed bag-of-words embedder.
///
/// Each lower-cased alphanumeric token lands in one of `dim` buckets. Vectors
/// are L2-normalized, deterministic across runs and need no model files, so
/// texts that share words end up close together.
pub struct FakeEmbedder {
    dim: usize,
    id: String,
}

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim, id: format!("fake:xxhash64:d{dim}") }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for token in text.split_whitespace() {
            let token: String = token
                .chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect();
            if token.is_empty() { continue; }
            let mut hasher = XxHash64::with_seed(0);
            hasher.write(token.as_bytes());
            let h = hasher.finish();
            let idx = (h % self.dim as u64) as usize;
            v[idx] += 1.0 + ((h >> 32) as u32) as f32 / u32::MAX as f32;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut v { *x /= norm; }
        v
    }
}

impl Embedder for FakeEmbedder {
    fn id(&self) -> &str { &self.id }

    fn dim(&self) -> usize { self.dim }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}
