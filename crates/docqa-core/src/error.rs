use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upload at least one file first.")]
    NoDocuments,

    #[error("Type a question first.")]
    EmptyQuestion,

    #[error("Upload documents and build the knowledge base to start.")]
    NoIndex,

    #[error("Failed to decode {file} as UTF-8: {source}")]
    Decode {
        file: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Failed to extract text from {file}: {reason}")]
    Extraction { file: String, reason: String },

    #[error("I/O error while loading {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Embedding failed: {0}")]
    Embedding(String),
}

pub type Result<T> = std::result::Result<T, Error>;
