//! docqa-rag
//!
//! Question answering over an uploaded document set: the session that owns the
//! current index, the retriever, and the citation formatter.

pub mod answer;
pub mod retriever;
pub mod session;

pub use answer::{format_answer, format_sources, NOT_FOUND, PREAMBLE};
pub use retriever::retrieve;
pub use session::{Answer, BuildReport, BuildStage, EmbedderSource, Session};
