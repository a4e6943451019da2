use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use docqa_core::error::{Error, Result};
use docqa_core::traits::Embedder;
use docqa_core::types::{Chunk, SearchHit};

/// Exact nearest-neighbour index over chunk embeddings.
///
/// Built once from a complete chunk sequence and never mutated afterwards.
/// Distances are squared Euclidean; queries scan every stored vector.
pub struct VectorIndex {
    embedder: Arc<dyn Embedder>,
    dim: usize,
    /// Row-major, `chunks.len() * dim` values.
    vectors: Vec<f32>,
    chunks: Vec<Chunk>,
}

impl VectorIndex {
    /// Embed every chunk and index it. Returns no index at all if any batch fails.
    pub fn build(chunks: Vec<Chunk>, embedder: Arc<dyn Embedder>, batch_size: usize) -> Result<Self> {
        if chunks.is_empty() {
            return Err(Error::NoDocuments);
        }
        let dim = checked_dim(embedder.as_ref())?;
        info!("Embedding {} chunks with {}", chunks.len(), embedder.id());

        let pb = ProgressBar::new(chunks.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%)")
                .map(|s| s.progress_chars("#>-"))
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let mut vectors = Vec::with_capacity(chunks.len() * dim);
        for (i, batch) in chunks.chunks(batch_size.max(1)).enumerate() {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let embeddings = embedder
                .embed_batch(&texts)
                .map_err(|e| Error::Embedding(format!("{e:#}")))?;
            if embeddings.len() != texts.len() {
                return Err(Error::Embedding(format!(
                    "embedder returned {} vectors for {} texts",
                    embeddings.len(),
                    texts.len()
                )));
            }
            for v in embeddings {
                check_len(&v, dim)?;
                vectors.extend(v);
            }
            pb.inc(batch.len() as u64);
            debug!("Embedded batch {} ({} chunks)", i + 1, batch.len());
        }
        pb.finish_and_clear();
        info!("Indexed {} chunks (d{})", chunks.len(), dim);
        Ok(Self { embedder, dim, vectors, chunks })
    }

    /// Reassemble an index from stored chunks and their vectors.
    pub fn from_parts(chunks: Vec<Chunk>, vectors: Vec<Vec<f32>>, embedder: Arc<dyn Embedder>) -> Result<Self> {
        if chunks.is_empty() {
            return Err(Error::NoDocuments);
        }
        if chunks.len() != vectors.len() {
            return Err(Error::Embedding(format!(
                "{} chunks but {} vectors",
                chunks.len(),
                vectors.len()
            )));
        }
        let dim = checked_dim(embedder.as_ref())?;
        let mut flat = Vec::with_capacity(chunks.len() * dim);
        for v in vectors {
            check_len(&v, dim)?;
            flat.extend(v);
        }
        Ok(Self { embedder, dim, vectors: flat, chunks })
    }

    /// The `k` chunks nearest to `text`, nearest first.
    ///
    /// Returns every chunk when `k` exceeds the index size and nothing when
    /// `k == 0`. Equal distances keep insertion order.
    pub fn query(&self, text: &str, k: usize) -> Result<Vec<SearchHit>> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let q = self.embedder.embed_one(text).map_err(|e| Error::Embedding(format!("{e:#}")))?;
        check_len(&q, self.dim)?;

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .chunks_exact(self.dim)
            .map(|v| l2_squared(&q, v))
            .enumerate()
            .collect();
        scored.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);
        Ok(scored
            .into_iter()
            .map(|(i, distance)| SearchHit { chunk: self.chunks[i].clone(), distance })
            .collect())
    }

    pub fn len(&self) -> usize { self.chunks.len() }

    pub fn is_empty(&self) -> bool { self.chunks.is_empty() }

    pub fn dim(&self) -> usize { self.dim }

    pub fn chunks(&self) -> &[Chunk] { &self.chunks }

    pub fn embedder_id(&self) -> &str { self.embedder.id() }

    /// Stored vectors in chunk order.
    pub fn vectors(&self) -> impl Iterator<Item = &[f32]> + '_ {
        self.vectors.chunks_exact(self.dim)
    }
}

impl fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorIndex")
            .field("embedder", &self.embedder.id())
            .field("dim", &self.dim)
            .field("chunks", &self.chunks.len())
            .finish()
    }
}

fn checked_dim(embedder: &dyn Embedder) -> Result<usize> {
    match embedder.dim() {
        0 => Err(Error::Embedding(format!("{} reports a zero dimension", embedder.id()))),
        d => Ok(d),
    }
}

fn check_len(v: &[f32], dim: usize) -> Result<()> {
    if v.len() != dim {
        return Err(Error::Embedding(format!("dim mismatch: got {} expected {}", v.len(), dim)));
    }
    Ok(())
}

fn l2_squared(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
