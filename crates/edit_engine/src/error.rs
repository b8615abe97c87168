//! Error types for editing operations

use doc_model::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Step failed: {0}")]
    StepFailed(String),

    #[error("Document model error: {0}")]
    DocModel(#[from] doc_model::DocModelError),

    #[error("Schema error: {0}")]
    Schema(#[from] schema::SchemaError),

    #[error("Undo stack is empty")]
    UndoStackEmpty,

    #[error("Redo stack is empty")]
    RedoStackEmpty,
}

pub type Result<T> = std::result::Result<T, EditError>;
