//! Footnote Commands
//!
//! Commands for creating, deleting and navigating footnotes.
//!
//! ## Features
//!
//! - Insert a footnote at the cursor, creating the footnotes list on demand
//! - Delete a footnote by deleting its references
//! - Jump from a reference to its definition and back
//!
//! Numbering and orphan cleanup are not done here; the footnote rule fixes
//! both after every change.

use crate::block_commands::cursor_inside;
use crate::rules::{find_definition, find_reference};
use crate::{Command, CommandContext, EditingEngine, Result, Step, Transaction};
use doc_model::{Attrs, Document, NodeId, NodeType, Position, Selection};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Requests to the view that do not touch the document
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEffect {
    ScrollIntoView(Position),
    /// Briefly highlight a node
    Highlight { node_id: NodeId, duration: Duration },
}

// =============================================================================
// Insert Footnote Command
// =============================================================================

/// Insert a footnote reference at the cursor and an empty definition for it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InsertFootnote {
    /// Cross-reference id; a fresh one is generated when absent
    pub data_id: Option<String>,
}

impl InsertFootnote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(data_id: impl Into<String>) -> Self {
        Self {
            data_id: Some(data_id.into()),
        }
    }
}

impl Command for InsertFootnote {
    fn build(&self, ctx: &CommandContext<'_>) -> Result<Option<Transaction>> {
        let Some((_, from, _)) = ctx.block_range() else {
            return Ok(None);
        };
        let data_id = self
            .data_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let cursor = Position::new(ctx.selection.cursor().node_id, from);
        let before = references_before(ctx.doc, cursor);
        let number = before.len() + 1;

        let mut ref_attrs = Attrs::new();
        ref_attrs.insert("dataId".into(), Value::from(data_id.clone()));
        ref_attrs.insert("referenceNumber".into(), Value::from(number));
        let reference = ctx.schema.node(NodeType::FootnoteReference, ref_attrs)?;

        let mut def_attrs = Attrs::new();
        def_attrs.insert("dataId".into(), Value::from(data_id));
        def_attrs.insert("id".into(), Value::from(format!("fn:{}", number)));
        let definition = ctx
            .schema
            .create_and_fill(NodeType::FootnoteDefinition, def_attrs)?;
        let Some(selection) = cursor_inside(&definition) else {
            return Ok(None);
        };

        let Some(mut tr) = ctx.replace_selection(vec![reference]) else {
            return Ok(None);
        };
        match ctx.doc.footnotes_container() {
            Some(container) => {
                // keep definitions in reference order
                let index = container
                    .content()
                    .iter()
                    .filter(|d| d.attr_str("dataId").is_some_and(|id| before.contains(id)))
                    .count();
                tr.push(Step::insert_node(container.id(), index, definition));
            }
            None => {
                let container = ctx
                    .schema
                    .node(NodeType::FootnotesContainer, Attrs::new())?
                    .with_child(definition);
                tr.push(Step::insert_node(
                    ctx.doc.root_id(),
                    ctx.doc.blocks().len(),
                    container,
                ));
            }
        }
        tr.set_selection(selection);
        Ok(Some(tr))
    }

    fn display_name(&self) -> &str {
        "Insert Footnote"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

/// Ids of the footnotes referenced before `pos`, in document order
fn references_before(doc: &Document, pos: Position) -> HashSet<String> {
    let mut ids = HashSet::new();
    for node in doc.root().descendants() {
        if node.id() == pos.node_id {
            let mut offset = 0;
            for child in node.content() {
                if offset >= pos.offset {
                    break;
                }
                if child.node_type() == NodeType::FootnoteReference {
                    if let Some(id) = child.attr_str("dataId") {
                        ids.insert(id.to_string());
                    }
                }
                offset += child.inline_size();
            }
            break;
        }
        if node.node_type() == NodeType::FootnoteReference {
            if let Some(id) = node.attr_str("dataId") {
                ids.insert(id.to_string());
            }
        }
    }
    ids
}

// =============================================================================
// Delete Footnote Command
// =============================================================================

/// Delete a footnote through its references; the definition goes with them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteFootnote {
    pub data_id: String,
}

impl DeleteFootnote {
    pub fn new(data_id: impl Into<String>) -> Self {
        Self {
            data_id: data_id.into(),
        }
    }
}

impl Command for DeleteFootnote {
    fn build(&self, ctx: &CommandContext<'_>) -> Result<Option<Transaction>> {
        let positions: Vec<Position> = ctx
            .doc
            .nodes_of_type(NodeType::FootnoteReference)
            .into_iter()
            .filter(|r| r.attr_str("dataId") == Some(self.data_id.as_str()))
            .filter_map(|r| ctx.doc.position_after_inline(r.id()))
            .collect();
        if positions.is_empty() {
            debug!(data_id = %self.data_id, "no reference to delete");
            return Ok(None);
        }
        // last first, so earlier offsets in the same block stay valid
        let tr = positions.iter().rev().fold(Transaction::new(), |tr, pos| {
            tr.step(Step::remove_inline(pos.node_id, pos.offset - 1, pos.offset))
        });
        Ok(Some(tr))
    }

    fn display_name(&self) -> &str {
        "Delete Footnote"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

// =============================================================================
// Navigation
// =============================================================================

impl EditingEngine {
    /// Put the cursor at the end of a footnote's definition.
    ///
    /// Returns `None` when the definition does not exist.
    pub fn focus_footnote_definition(&mut self, data_id: &str) -> Result<Option<Vec<ViewEffect>>> {
        let doc = self.doc();
        let position = find_definition(doc, data_id)
            .and_then(|definition| doc.last_textblock_in(definition.id()))
            .and_then(|block| doc.end_of(block));
        let Some(position) = position else {
            debug!(data_id, "footnote definition not found");
            return Ok(None);
        };
        self.dispatch(Transaction::select(Selection::collapsed(position)).without_history())?;
        Ok(Some(vec![ViewEffect::ScrollIntoView(position)]))
    }

    /// Put the cursor right after a footnote's first reference and highlight it.
    ///
    /// Returns `None` when the reference does not exist.
    pub fn navigate_to_footnote_reference(&mut self, data_id: &str) -> Result<Option<Vec<ViewEffect>>> {
        let doc = self.doc();
        let found = find_reference(doc, data_id)
            .and_then(|reference| Some((reference.id(), doc.position_after_inline(reference.id())?)));
        let Some((reference_id, position)) = found else {
            debug!(data_id, "footnote reference not found");
            return Ok(None);
        };
        let duration = Duration::from_millis(self.config().footnotes.highlight_duration_ms);
        self.dispatch(Transaction::select(Selection::collapsed(position)).without_history())?;
        Ok(Some(vec![
            ViewEffect::ScrollIntoView(position),
            ViewEffect::Highlight {
                node_id: reference_id,
                duration,
            },
        ]))
    }
}
