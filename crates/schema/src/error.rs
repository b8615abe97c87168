//! Error types for schema construction and validation

use doc_model::NodeType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Invalid parse selector {selector:?}: {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Node type registered twice: {0}")]
    DuplicateNodeType(NodeType),

    #[error("Node type not registered: {0}")]
    UnknownNodeType(NodeType),

    #[error("{parent} cannot contain {child}")]
    ContentNotAllowed { parent: NodeType, child: NodeType },

    #[error("{node_type} has {found} children, expected {expected}")]
    ChildCount {
        node_type: NodeType,
        found: usize,
        expected: String,
    },

    #[error("Document model error: {0}")]
    DocModel(#[from] doc_model::DocModelError),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
