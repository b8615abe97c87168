//! Where saved documents go
//!
//! The editor never saves on its own. The host decides when to save and hands
//! the captured [`PersistedDocument`] to a [`DocumentSink`].

use crate::{PersistedDocument, Result, StoreError};
use chrono::{DateTime, Utc};
use doc_model::Document;
use schema::SchemaRegistry;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

pub trait DocumentSink: Send + Sync {
    fn persist(&self, key: &str, document: PersistedDocument) -> Result<()>;

    fn fetch(&self, key: &str) -> Result<Option<PersistedDocument>>;

    /// Capture and persist in one go
    fn save(&self, key: &str, schema: &SchemaRegistry, doc: &Document) -> Result<()> {
        self.persist(key, PersistedDocument::capture(schema, doc)?)
    }

    /// Fetch and restore; `None` when nothing is stored under `key`
    fn open(&self, key: &str, schema: &SchemaRegistry) -> Result<Option<Document>> {
        self.fetch(key)?.map(|p| p.restore(schema)).transpose()
    }
}

#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub document: PersistedDocument,
    pub saved_at: DateTime<Utc>,
}

/// Keeps documents in memory, keyed by record id
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, StoredDocument>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// When `key` was last saved
    pub fn saved_at(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).map(|e| e.saved_at))
    }

    pub fn remove(&self, key: &str) -> Result<Option<PersistedDocument>> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.remove(key).map(|e| e.document))
    }
}

impl DocumentSink for InMemoryStore {
    fn persist(&self, key: &str, document: PersistedDocument) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        debug!(key, bytes = document.html.len(), "persisting document");
        entries.insert(
            key.to_string(),
            StoredDocument {
                document,
                saved_at: Utc::now(),
            },
        );
        Ok(())
    }

    fn fetch(&self, key: &str) -> Result<Option<PersistedDocument>> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).map(|e| e.document.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::Node;

    #[test]
    fn test_save_and_open() {
        let schema = schema::default_schema().unwrap();
        let store = InMemoryStore::new();
        assert!(store.is_empty());
        assert!(store.open("article-1", &schema).unwrap().is_none());

        let doc = Document::with_blocks(vec![Node::paragraph("Saved text")]);
        store.save("article-1", &schema, &doc).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.saved_at("article-1").unwrap().is_some());

        let opened = store.open("article-1", &schema).unwrap().unwrap();
        assert_eq!(opened.text_content(), "Saved text");
    }

    #[test]
    fn test_persist_overwrites() {
        let store = InMemoryStore::new();
        store.persist("k", PersistedDocument::from_html("<p>one</p>")).unwrap();
        store.persist("k", PersistedDocument::from_html("<p>two</p>")).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.fetch("k").unwrap().unwrap().html, "<p>two</p>");

        assert!(store.remove("k").unwrap().is_some());
        assert!(store.fetch("k").unwrap().is_none());
    }
}
