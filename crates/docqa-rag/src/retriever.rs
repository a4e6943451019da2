use tracing::debug;

use docqa_core::error::Result;
use docqa_core::types::SearchHit;
use docqa_vector::VectorIndex;

/// The `k` chunks most similar to `question`, nearest first.
pub fn retrieve(index: &VectorIndex, question: &str, k: usize) -> Result<Vec<SearchHit>> {
    let hits = index.query(question, k)?;
    debug!("Retrieved {} of {} chunks (k={})", hits.len(), index.len(), k);
    Ok(hits)
}
