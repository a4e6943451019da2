use std::any::Any;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use docqa_core::error::{Error, Result};
use docqa_core::types::{Document, Metadata, Upload};

/// How an upload is parsed, chosen from its file extension (case-insensitive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// `.pdf`: one document per page.
    Pdf,
    /// `.txt` / `.md`: one document for the whole file.
    Text,
    Unsupported,
}

impl DocumentKind {
    pub fn from_name(name: &str) -> Self {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("pdf") => Self::Pdf,
            Some("txt" | "md") => Self::Text,
            _ => Self::Unsupported,
        }
    }
}

fn extension_suffix(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}

/// Documents produced from a batch of uploads, plus the names that were skipped.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub documents: Vec<Document>,
    pub skipped: Vec<String>,
}

/// Convert uploads into documents.
///
/// Unsupported files are skipped with a warning and listed in
/// `LoadOutcome::skipped`. A decode or extraction failure aborts the batch.
pub fn load_documents(uploads: &[Upload]) -> Result<LoadOutcome> {
    let mut outcome = LoadOutcome::default();
    for (i, upload) in uploads.iter().enumerate() {
        let kind = DocumentKind::from_name(&upload.name);
        if kind == DocumentKind::Unsupported {
            warn!(file = %upload.name, "Unsupported file type (use PDF/TXT/MD), skipping");
            outcome.skipped.push(upload.name.clone());
            continue;
        }
        debug!("Loading file {}/{}: {} ({:?})", i + 1, uploads.len(), upload.name, kind);
        let docs = load_one(upload, kind)?;
        outcome.documents.extend(docs);
    }
    info!(
        "Loaded {} documents from {} uploads ({} skipped)",
        outcome.documents.len(),
        uploads.len(),
        outcome.skipped.len()
    );
    Ok(outcome)
}

fn load_one(upload: &Upload, kind: DocumentKind) -> Result<Vec<Document>> {
    // Removed from disk when `tmp` drops, on success or error.
    let tmp = materialize(upload)?;
    match kind {
        DocumentKind::Pdf => extract_pdf_pages(&upload.name, tmp.path()),
        DocumentKind::Text => read_text(&upload.name, tmp.path()),
        DocumentKind::Unsupported => Ok(Vec::new()),
    }
}

fn materialize(upload: &Upload) -> Result<NamedTempFile> {
    let io_err = |source: std::io::Error| Error::Io { file: upload.name.clone(), source };
    let mut tmp = tempfile::Builder::new()
        .prefix("docqa-upload-")
        .suffix(&extension_suffix(&upload.name))
        .tempfile()
        .map_err(io_err)?;
    tmp.write_all(&upload.bytes).map_err(io_err)?;
    tmp.flush().map_err(io_err)?;
    Ok(tmp)
}

fn read_text(name: &str, path: &Path) -> Result<Vec<Document>> {
    let bytes = std::fs::read(path).map_err(|source| Error::Io { file: name.to_string(), source })?;
    let text = String::from_utf8(bytes).map_err(|source| Error::Decode { file: name.to_string(), source })?;
    Ok(vec![Document::new(text, Metadata::new(name))])
}

fn extract_pdf_pages(name: &str, path: &Path) -> Result<Vec<Document>> {
    // pdf-extract panics on some malformed inputs; treat that like any other extraction error.
    let pages = panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_by_pages(path)))
        .map_err(|payload| Error::Extraction { file: name.to_string(), reason: panic_reason(&*payload) })?
        .map_err(|e| Error::Extraction { file: name.to_string(), reason: e.to_string() })?;
    debug!("Extracted {} pages from {}", pages.len(), name);
    Ok(pages
        .into_iter()
        .enumerate()
        .map(|(page, text)| Document::new(text, Metadata::new(name).with_page(page)))
        .collect())
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "PDF parser panicked".to_string()
    }
}
