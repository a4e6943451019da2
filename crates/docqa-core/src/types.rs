//! Domain types passed between the loader, splitter, index and session.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// A user-supplied file: its display name and raw bytes.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self { name: name.into(), bytes: bytes.into() }
    }
}

/// Provenance carried by every document and chunk.
///
/// - `source`: name of the uploaded file (never empty)
/// - `page`: zero-based page index, present only for paginated formats
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
}

impl Metadata {
    pub fn new(source: impl Into<String>) -> Self {
        Self { source: source.into(), page: None }
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    /// Last path component of `source`, used in citations.
    pub fn source_name(&self) -> &str {
        Path::new(&self.source)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.source)
    }
}

/// Text extracted from one upload (or one page of it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub metadata: Metadata,
}

impl Document {
    pub fn new(text: impl Into<String>, metadata: Metadata) -> Self {
        Self { text: text.into(), metadata }
    }
}

/// A bounded span of a document's text, the unit that gets embedded and retrieved.
///
/// `metadata` is the originating document's metadata, unmodified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub metadata: Metadata,
}

impl Chunk {
    pub fn new(text: impl Into<String>, metadata: Metadata) -> Self {
        Self { text: text.into(), metadata }
    }
}

/// One retrieved chunk and its distance to the query vector.
///
/// Lower `distance` is closer; results are always ordered nearest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub chunk: Chunk,
    pub distance: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_name_strips_directories() {
        let meta = Metadata::new("/tmp/uploads/report.pdf").with_page(2);
        assert_eq!(meta.source_name(), "report.pdf");
        assert_eq!(meta.page, Some(2));
        assert_eq!(Metadata::new("notes.md").source_name(), "notes.md");
    }
}
