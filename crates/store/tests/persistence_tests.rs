//! Integration tests for saving and reopening edited documents
//!
//! Documents are edited through the engine, saved through the store and
//! reopened, checking that footnotes, quotes and direction survive the trip.

use doc_model::{NodeType, Position, Selection};
use edit_engine::rules::find_definition;
use edit_engine::{EditingEngine, EditorConfig, InsertFootnote, InsertQuote, InsertText};
use std::sync::Arc;
use store::{
    load_document, load_document_sync, save_document, save_document_sync, DocumentSink,
    InMemoryStore, StoreError, FILE_EXTENSION,
};
use tempfile::TempDir;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn schema() -> Arc<schema::SchemaRegistry> {
    Arc::new(schema::default_schema().unwrap())
}

/// An Arabic paragraph with one footnote, followed by a quote
fn edited_engine() -> EditingEngine {
    init_tracing();
    let mut engine = EditingEngine::new(schema(), EditorConfig::default()).unwrap();
    engine.execute(&InsertText::new("قال الشيخ")).unwrap();
    engine.execute(&InsertFootnote::with_id("fn-a")).unwrap();
    engine.execute(&InsertText::new("Source note")).unwrap();

    let first = engine.doc().blocks()[0].id();
    engine
        .set_selection(Selection::collapsed(Position::new(first, 0)))
        .unwrap();
    engine
        .execute(&InsertQuote::new("Knowledge is light").with_source("Proverb", None))
        .unwrap();
    engine
}

#[test]
fn test_file_round_trip_keeps_footnotes_and_direction() {
    let engine = edited_engine();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(format!("article.{}", FILE_EXTENSION));

    save_document_sync(engine.schema(), engine.doc(), &path).unwrap();
    let loaded = load_document_sync(engine.schema(), &path).unwrap();

    let para = &loaded.blocks()[0];
    assert_eq!(para.node_type(), NodeType::Paragraph);
    assert_eq!(para.attr_str("dir"), Some("rtl"));

    let reference = &loaded.nodes_of_type(NodeType::FootnoteReference)[0];
    assert_eq!(reference.attr_str("dataId"), Some("fn-a"));
    assert_eq!(reference.attr_i64("referenceNumber"), Some(1));

    let definition = find_definition(&loaded, "fn-a").unwrap();
    assert_eq!(definition.attr_str("id"), Some("fn:1"));
    assert_eq!(definition.text_content(), "Source note");

    let quote = &loaded.nodes_of_type(NodeType::Quote)[0];
    assert_eq!(quote.attr_str("original"), Some("Knowledge is light"));
    assert_eq!(quote.attr_str("sourceLabel"), Some("Proverb"));

    engine.schema().check(&loaded).unwrap();
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = load_document_sync(&schema(), dir.path().join("absent.mkdoc")).unwrap_err();
    assert!(matches!(err, StoreError::FileNotFound(_)));
}

#[tokio::test]
async fn test_async_round_trip() {
    let engine = edited_engine();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("async.mkdoc");

    save_document(engine.schema(), engine.doc(), &path).await.unwrap();
    let loaded = load_document(engine.schema(), &path).await.unwrap();
    assert_eq!(loaded.text_content(), engine.doc().text_content());
}

#[test]
fn test_sink_reopens_into_engine() {
    let engine = edited_engine();
    let store = InMemoryStore::new();
    store.save("post-7", engine.schema(), engine.doc()).unwrap();

    let html = store.fetch("post-7").unwrap().unwrap().html;
    let reopened = EditingEngine::from_html(schema(), EditorConfig::default(), &html).unwrap();
    assert_eq!(reopened.doc().text_content(), engine.doc().text_content());
    assert_eq!(
        reopened.doc().nodes_of_type(NodeType::FootnoteDefinition).len(),
        1
    );
}

#[test]
fn test_corrupt_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.mkdoc");
    std::fs::write(&path, "not a document").unwrap();

    let err = load_document_sync(&schema(), &path).unwrap_err();
    assert!(matches!(err, StoreError::Serialization(_)));
}
