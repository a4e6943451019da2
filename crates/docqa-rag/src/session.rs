use std::sync::Arc;

use tracing::{info, warn};

use docqa_core::config::{EmbeddingConfig, Settings};
use docqa_core::error::{Error, Result};
use docqa_core::traits::Embedder;
use docqa_core::types::{SearchHit, Upload};
use docqa_embed::shared_embedder;
use docqa_ingest::{load_documents, split_documents};
use docqa_vector::VectorIndex;

use crate::answer::format_answer;
use crate::retriever::retrieve;

/// Where a session gets its embedder when it builds an index.
pub enum EmbedderSource {
    /// The process-wide instance, loaded on first build.
    Shared(EmbeddingConfig),
    Fixed(Arc<dyn Embedder>),
}

impl EmbedderSource {
    fn resolve(&self) -> Result<Arc<dyn Embedder>> {
        match self {
            Self::Shared(config) => shared_embedder(config).map_err(|e| Error::Embedding(format!("{e:#}"))),
            Self::Fixed(embedder) => Ok(Arc::clone(embedder)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    Loading,
    Splitting,
    Indexing,
}

impl BuildStage {
    pub fn label(self) -> &'static str {
        match self {
            Self::Loading => "Loading documents...",
            Self::Splitting => "Splitting into chunks...",
            Self::Indexing => "Building vector index...",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub documents: usize,
    pub chunks: usize,
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub hits: Vec<SearchHit>,
}

/// One user's knowledge base: at most one index, replaced wholesale on rebuild.
pub struct Session {
    settings: Settings,
    embedder: EmbedderSource,
    index: Option<VectorIndex>,
}

impl Session {
    /// A session that embeds with the shared, lazily loaded model.
    pub fn new(settings: Settings) -> Result<Self> {
        let embedder = EmbedderSource::Shared(settings.embedding.clone());
        Self::with_source(settings, embedder)
    }

    pub fn with_embedder(settings: Settings, embedder: Arc<dyn Embedder>) -> Result<Self> {
        Self::with_source(settings, EmbedderSource::Fixed(embedder))
    }

    pub fn with_source(settings: Settings, embedder: EmbedderSource) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings, embedder, index: None })
    }

    pub fn build(&mut self, uploads: &[Upload]) -> Result<BuildReport> {
        self.build_with_progress(uploads, |_| {})
    }

    /// Load, split and index `uploads`, reporting each stage to `on_stage`.
    ///
    /// The held index is replaced only when every stage succeeds; on error the
    /// previous index (if any) stays in place.
    pub fn build_with_progress<F>(&mut self, uploads: &[Upload], mut on_stage: F) -> Result<BuildReport>
    where
        F: FnMut(BuildStage),
    {
        if uploads.is_empty() {
            return Err(Error::NoDocuments);
        }

        on_stage(BuildStage::Loading);
        let loaded = load_documents(uploads)?;

        on_stage(BuildStage::Splitting);
        let chunks = split_documents(&loaded.documents, &self.settings.chunking);
        if chunks.is_empty() {
            warn!("No text found in {} uploads", uploads.len());
            return Err(Error::NoDocuments);
        }

        on_stage(BuildStage::Indexing);
        let embedder = self.embedder.resolve()?;
        let chunk_count = chunks.len();
        let index = VectorIndex::build(chunks, embedder, self.settings.embedding.batch_size)?;

        if self.index.replace(index).is_some() {
            info!("Replaced knowledge base ({} chunks)", chunk_count);
        } else {
            info!("Built knowledge base ({} chunks)", chunk_count);
        }
        Ok(BuildReport { documents: loaded.documents.len(), chunks: chunk_count, skipped: loaded.skipped })
    }

    /// Answer `question` from the current index using the `k` nearest chunks,
    /// with `k` clamped to the configured range.
    pub fn ask(&self, question: &str, k: usize) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::EmptyQuestion);
        }
        let index = self.index.as_ref().ok_or(Error::NoIndex)?;
        let hits = retrieve(index, question, self.clamp_k(k))?;
        Ok(Answer { text: format_answer(question, &hits), hits })
    }

    /// Replace the held index, e.g. with a snapshot read back from disk.
    pub fn install(&mut self, index: VectorIndex) {
        self.index = Some(index);
    }

    pub fn clamp_k(&self, k: usize) -> usize {
        self.settings.retrieval.clamp_k(k)
    }

    pub fn default_k(&self) -> usize {
        self.settings.retrieval.default_k
    }

    pub fn index(&self) -> Option<&VectorIndex> {
        self.index.as_ref()
    }

    pub fn has_index(&self) -> bool {
        self.index.is_some()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
