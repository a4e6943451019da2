//! docqa-embed
//!
//! Text embedders behind `docqa_core::traits::Embedder`: a candle BERT encoder
//! for real use and a hashed bag-of-words embedder for tests and offline work.

use anyhow::Result;
use tracing::info;

use docqa_core::config::EmbeddingConfig;

pub use docqa_core::traits::Embedder;

pub mod device;
pub mod fake;
pub mod model;
pub mod pool;
pub mod shared;
pub mod tokenize;

pub use fake::FakeEmbedder;
pub use model::BertEmbedder;
pub use pool::masked_mean_l2;
pub use shared::shared_embedder;

/// Build a fresh embedder from config.
///
/// `embedding.use_fake = true` or `APP_USE_FAKE_EMBEDDINGS=1` selects the
/// `FakeEmbedder`; otherwise the BERT model is loaded. Prefer
/// `shared_embedder` outside of tests.
pub fn load_embedder(config: &EmbeddingConfig) -> Result<Box<dyn Embedder>> {
    let env_fake = std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if config.use_fake || env_fake {
        info!("Using FakeEmbedder (d{})", config.fake_dim);
        return Ok(Box::new(FakeEmbedder::new(config.fake_dim)));
    }
    Ok(Box::new(BertEmbedder::load(config)?))
}
