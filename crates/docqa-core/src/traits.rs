use anyhow::anyhow;

/// Maps text to fixed-dimension vectors.
///
/// Implementations must be deterministic for a given `id()`: the same text
/// always yields the same vector, and every vector has `dim()` entries.
pub trait Embedder: Send + Sync {
    /// Stable identifier for the model (e.g. `bert:all-MiniLM-L6-v2:d384`).
    fn id(&self) -> &str;
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    fn embed_one(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| anyhow!("embedder returned no vector for a single input"))
    }
}
