use anyhow::Result;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use docqa_core::config::EmbeddingConfig;
use docqa_core::traits::Embedder;

use crate::load_embedder;

static SHARED: OnceLock<Arc<dyn Embedder>> = OnceLock::new();
static INIT: Mutex<()> = Mutex::new(());

/// The process-wide embedder, loaded on first use.
///
/// Only the first successful call loads a model; later calls return the same
/// instance whatever `config` they pass. A failed load is not remembered, so
/// the next call tries again.
pub fn shared_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    if let Some(embedder) = SHARED.get() {
        return Ok(Arc::clone(embedder));
    }
    let _guard = INIT.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(embedder) = SHARED.get() {
        return Ok(Arc::clone(embedder));
    }
    let loaded: Arc<dyn Embedder> = Arc::from(load_embedder(config)?);
    Ok(Arc::clone(SHARED.get_or_init(|| loaded)))
}
