//! File I/O operations

use crate::{Result, StoreError};
use doc_model::Document;
use schema::SchemaRegistry;
use std::path::Path;

/// Save a document to a file
pub async fn save_document(schema: &SchemaRegistry, doc: &Document, path: impl AsRef<Path>) -> Result<()> {
    let json = crate::serialize(schema, doc)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

/// Load a document from a file
pub async fn load_document(schema: &SchemaRegistry, path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();

    if !tokio::fs::try_exists(path).await? {
        return Err(StoreError::FileNotFound(path.display().to_string()));
    }

    let json = tokio::fs::read_to_string(path).await?;
    crate::deserialize(schema, &json)
}

/// Save a document synchronously
pub fn save_document_sync(schema: &SchemaRegistry, doc: &Document, path: impl AsRef<Path>) -> Result<()> {
    let json = crate::serialize(schema, doc)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Load a document synchronously
pub fn load_document_sync(schema: &SchemaRegistry, path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(StoreError::FileNotFound(path.display().to_string()));
    }

    let json = std::fs::read_to_string(path)?;
    crate::deserialize(schema, &json)
}
