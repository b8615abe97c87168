//! Document serialization
//!
//! A document is persisted twice: as HTML, which is what gets parsed back on
//! reload, and as its JSON tree, kept as a render cache. The tree is only
//! used when the HTML is missing.

use crate::{DocumentFile, Result, StoreError};
use doc_model::{Document, Node};
use schema::SchemaRegistry;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// The HTML and tree pair handed to the persistence layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedDocument {
    pub html: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree: Option<Value>,
}

impl PersistedDocument {
    /// Produce both forms from the same document
    pub fn capture(schema: &SchemaRegistry, doc: &Document) -> Result<Self> {
        Ok(Self {
            html: schema.to_html(doc),
            tree: Some(doc.to_json_value()?),
        })
    }

    /// HTML only, as older records store it
    pub fn from_html(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            tree: None,
        }
    }

    /// Rebuild the document, preferring the HTML
    pub fn restore(&self, schema: &SchemaRegistry) -> Result<Document> {
        let doc = if !self.html.trim().is_empty() {
            schema.parse_html(&self.html)
        } else if let Some(tree) = &self.tree {
            debug!("no HTML stored, restoring from tree");
            let root: Node = serde_json::from_value(tree.clone())?;
            Document::from_root(root)?
        } else {
            Document::new()
        };
        if let Err(e) = schema.check(&doc) {
            warn!("Restored document violates the schema: {}", e);
        }
        Ok(doc)
    }
}

/// Serialize a document to the file format
pub fn serialize(schema: &SchemaRegistry, doc: &Document) -> Result<String> {
    let file = DocumentFile::new(PersistedDocument::capture(schema, doc)?);
    let json = serde_json::to_string_pretty(&file)?;
    Ok(json)
}

/// Deserialize a document from the file format
pub fn deserialize(schema: &SchemaRegistry, json: &str) -> Result<Document> {
    let file: DocumentFile = serde_json::from_str(json)?;

    if !file.header.is_valid() {
        return Err(StoreError::InvalidFormat(format!(
            "Invalid or unsupported format version: {}",
            file.header.version
        )));
    }

    file.document.restore(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::NodeType;

    fn schema() -> SchemaRegistry {
        schema::default_schema().unwrap()
    }

    fn sample() -> Document {
        Document::with_blocks(vec![
            Node::new(NodeType::Heading)
                .with_attr("level", 2)
                .with_content(vec![Node::text("Title")]),
            Node::paragraph("Body text"),
        ])
    }

    #[test]
    fn test_round_trip() {
        let schema = schema();
        let doc = sample();
        let json = serialize(&schema, &doc).unwrap();
        let loaded = deserialize(&schema, &json).unwrap();

        assert_eq!(loaded.text_content(), doc.text_content());
        assert_eq!(loaded.blocks()[0].node_type(), NodeType::Heading);
    }

    #[test]
    fn test_tree_used_without_html() {
        let schema = schema();
        let doc = sample();
        let mut persisted = PersistedDocument::capture(&schema, &doc).unwrap();
        persisted.html.clear();

        let restored = persisted.restore(&schema).unwrap();
        assert_eq!(restored.root(), doc.root());
    }

    #[test]
    fn test_html_wins_over_tree() {
        let schema = schema();
        let mut persisted = PersistedDocument::capture(&schema, &sample()).unwrap();
        persisted.html = "<p>Edited elsewhere</p>".to_string();

        let restored = persisted.restore(&schema).unwrap();
        assert_eq!(restored.text_content(), "Edited elsewhere");
    }

    #[test]
    fn test_empty_record_gives_empty_document() {
        let restored = PersistedDocument::from_html("").restore(&schema()).unwrap();
        assert_eq!(restored.blocks().len(), 1);
        assert_eq!(restored.text_content(), "");
    }

    #[test]
    fn test_rejects_future_version() {
        let schema = schema();
        let json = serialize(&schema, &sample()).unwrap();
        let mut value: Value = serde_json::from_str(&json).unwrap();
        value["header"]["version"] = Value::from(99);

        let err = deserialize(&schema, &value.to_string()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidFormat(_)));
    }
}
