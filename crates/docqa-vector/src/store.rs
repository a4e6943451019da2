//! Persisted index snapshots.
//!
//! Each saved index is its own table, named `kb_<utc timestamp>_<content hash>`.
//! The `meta` table records the most recent id under `latest` and, per index,
//! the embedder id and chunk count under `<id>.embedder` / `<id>.chunks`.

use anyhow::{anyhow, bail, Context, Result};
use arrow_array::{Array, FixedSizeListArray, Float32Array, Int32Array, RecordBatch, RecordBatchIterator, StringArray};
use chrono::Utc;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::Connection;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use docqa_core::traits::Embedder;
use docqa_core::types::{Chunk, Metadata};

use crate::index::VectorIndex;
use crate::schema::build_chunk_schema;
use crate::table::{get_meta, open_db, set_meta, table_exists};

const INDEX_PREFIX: &str = "kb_";
const LATEST_KEY: &str = "latest";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredIndex {
    pub id: String,
    pub chunks: usize,
    pub embedder_id: String,
    pub latest: bool,
}

pub struct IndexStore {
    conn: Connection,
}

impl IndexStore {
    pub async fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        let conn = open_db(dir.to_string_lossy().as_ref()).await?;
        Ok(Self { conn })
    }

    /// Write `index` as a new snapshot and mark it as the latest. Returns its id.
    pub async fn save(&self, index: &VectorIndex) -> Result<String> {
        let id = snapshot_id(index);
        if table_exists(&self.conn, &id).await? {
            info!("Snapshot {} already stored", id);
        } else {
            let batch = to_record_batch(index)?;
            let schema = batch.schema();
            let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));
            self.conn.create_table(&id, reader).execute().await?;
            set_meta(&self.conn, &format!("{id}.embedder"), index.embedder_id()).await?;
            set_meta(&self.conn, &format!("{id}.chunks"), &index.len().to_string()).await?;
            info!("Saved {} chunks as {}", index.len(), id);
        }
        set_meta(&self.conn, LATEST_KEY, &id).await?;
        Ok(id)
    }

    pub async fn latest(&self) -> Result<Option<String>> {
        get_meta(&self.conn, LATEST_KEY).await
    }

    /// Read a snapshot back into memory. `embedder` must be the one it was built with.
    pub async fn load(&self, id: &str, embedder: Arc<dyn Embedder>) -> Result<VectorIndex> {
        if !table_exists(&self.conn, id).await? {
            bail!("no stored index named '{}'", id);
        }
        if let Some(stored) = get_meta(&self.conn, &format!("{id}.embedder")).await? {
            if stored != embedder.id() {
                bail!("index '{}' was built with {}, but the current embedder is {}", id, stored, embedder.id());
            }
        }
        let t = self.conn.open_table(id).execute().await?;
        let total = t.count_rows(None).await?;
        let mut stream = t.query().limit(total).execute().await?;
        let mut rows: Vec<(i32, Chunk, Vec<f32>)> = Vec::with_capacity(total);
        while let Some(batch) = futures::TryStreamExt::try_next(&mut stream).await? {
            read_rows(&batch, &mut rows)?;
        }
        rows.sort_by_key(|(i, _, _)| *i);
        let (chunks, vectors): (Vec<Chunk>, Vec<Vec<f32>>) = rows.into_iter().map(|(_, c, v)| (c, v)).unzip();
        info!("Loaded index {}", id);
        Ok(VectorIndex::from_parts(chunks, vectors, embedder)?)
    }

    pub async fn list(&self) -> Result<Vec<StoredIndex>> {
        let latest = self.latest().await?;
        let mut names: Vec<String> = self
            .conn
            .table_names()
            .execute()
            .await?
            .into_iter()
            .filter(|n| n.starts_with(INDEX_PREFIX))
            .collect();
        names.sort();
        let mut out = Vec::with_capacity(names.len());
        for id in names {
            let chunks = get_meta(&self.conn, &format!("{id}.chunks"))
                .await?
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            let embedder_id = get_meta(&self.conn, &format!("{id}.embedder")).await?.unwrap_or_default();
            let latest = latest.as_deref() == Some(id.as_str());
            out.push(StoredIndex { id, chunks, embedder_id, latest });
        }
        Ok(out)
    }
}

fn snapshot_id(index: &VectorIndex) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(index.embedder_id().as_bytes());
    for chunk in index.chunks() {
        hasher.update(chunk.metadata.source.as_bytes());
        hasher.update(chunk.text.as_bytes());
    }
    let hash = hasher.finalize().to_hex();
    format!("{}{}_{}", INDEX_PREFIX, Utc::now().format("%Y%m%d%H%M%S"), &hash.as_str()[..8])
}

fn to_record_batch(index: &VectorIndex) -> Result<RecordBatch> {
    let dim = i32::try_from(index.dim())?;
    let schema = build_chunk_schema(dim);
    let mut chunk_indices = Vec::new(); let mut sources = Vec::new(); let mut pages = Vec::new(); let mut texts = Vec::new();
    for (i, chunk) in index.chunks().iter().enumerate() {
        chunk_indices.push(i32::try_from(i)?);
        sources.push(chunk.metadata.source.clone());
        pages.push(chunk.metadata.page.map(i32::try_from).transpose()?);
        texts.push(chunk.text.clone());
    }
    let vectors = index.vectors().map(|v| Some(v.iter().map(|&x| Some(x)).collect::<Vec<_>>()));
    let batch = RecordBatch::try_new(schema, vec![
        Arc::new(Int32Array::from(chunk_indices)),
        Arc::new(StringArray::from(sources)),
        Arc::new(Int32Array::from(pages)),
        Arc::new(StringArray::from(texts)),
        Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(vectors, dim)),
    ])?;
    Ok(batch)
}

fn read_rows(batch: &RecordBatch, rows: &mut Vec<(i32, Chunk, Vec<f32>)>) -> Result<()> {
    fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
        batch
            .column_by_name(name)
            .and_then(|c| c.as_any().downcast_ref::<T>())
            .ok_or_else(|| anyhow!("missing or mistyped column '{}'", name))
    }
    let idx_col = column::<Int32Array>(batch, "chunk_index")?;
    let source_col = column::<StringArray>(batch, "source")?;
    let page_col = column::<Int32Array>(batch, "page")?;
    let text_col = column::<StringArray>(batch, "text")?;
    let vec_col = column::<FixedSizeListArray>(batch, "vector")?;
    for i in 0..batch.num_rows() {
        let mut metadata = Metadata::new(source_col.value(i));
        if !page_col.is_null(i) {
            metadata = metadata.with_page(usize::try_from(page_col.value(i))?);
        }
        let list = vec_col.value(i);
        let values = list
            .as_any()
            .downcast_ref::<Float32Array>()
            .ok_or_else(|| anyhow!("vector column is not Float32"))?;
        rows.push((idx_col.value(i), Chunk::new(text_col.value(i), metadata), values.values().to_vec()));
    }
    Ok(())
}
