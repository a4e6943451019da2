//! docqa-ingest
//!
//! Turns uploads into documents (`loader`) and documents into overlapping
//! chunks (`splitter`).

pub mod loader;
pub mod splitter;

pub use loader::{load_documents, DocumentKind, LoadOutcome};
pub use splitter::{split_documents, split_text};
