//! docqa-core
//!
//! Shared vocabulary for the docqa workspace: documents, chunks and hits,
//! the error taxonomy, layered configuration and the `Embedder` seam.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use types::{Chunk, Document, Metadata, SearchHit, Upload};
