//! Error types for persistence and settings

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed document JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Stored tree is not a document: {0}")]
    DocModel(#[from] doc_model::DocModelError),

    /// Wrong magic or a format version newer than this build reads
    #[error("Unsupported document file: {0}")]
    InvalidFormat(String),

    #[error("No document at {0}")]
    FileNotFound(String),

    #[error("Document store lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, StoreError>;
