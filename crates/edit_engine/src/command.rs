//! Command system for document editing
//!
//! A command inspects the current state and builds a [`Transaction`]; it
//! never mutates the document itself. Returning `Ok(None)` means the command
//! does not apply here and nothing happens.

use crate::{Result, Step, Transaction};
use doc_model::{Document, Node, NodeId, NodeType, Selection};
use schema::SchemaRegistry;

/// Read-only view of the editor handed to commands
pub struct CommandContext<'a> {
    pub doc: &'a Document,
    pub selection: Selection,
    pub schema: &'a SchemaRegistry,
}

/// Trait for all editing commands
pub trait Command: std::fmt::Debug + Send + Sync {
    /// Build the transaction for this command, or `None` when it does not apply
    fn build(&self, ctx: &CommandContext<'_>) -> Result<Option<Transaction>>;

    /// Get a display name for this command
    fn display_name(&self) -> &str;

    /// Clone this command into a box
    fn clone_box(&self) -> Box<dyn Command>;
}

impl Clone for Box<dyn Command> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

// ============================================================================
// Helper functions for working with document positions
// ============================================================================

impl CommandContext<'_> {
    /// The textblock holding the cursor
    pub fn cursor_block(&self) -> Option<&Node> {
        self.doc
            .find(self.selection.cursor().node_id)
            .filter(|n| n.is_textblock())
    }

    /// `(block, from, to)` of the selection inside one textblock
    pub fn block_range(&self) -> Option<(&Node, usize, usize)> {
        let (block_id, from, to) = self.selection.block_range()?;
        let block = self.doc.find(block_id).filter(|n| n.is_textblock())?;
        (to <= block.inline_len()).then_some((block, from, to))
    }

    /// Replace the selection with inline content; the cursor lands after it
    pub fn replace_selection(&self, content: Vec<Node>) -> Option<Transaction> {
        let (block, from, to) = self.block_range()?;
        let size: usize = content.iter().map(Node::inline_size).sum();
        let mut tr = Transaction::new();
        if from < to {
            tr.push(Step::remove_inline(block.id(), from, to));
        }
        tr.push(Step::InsertInline {
            block_id: block.id(),
            offset: from,
            content,
        });
        tr.set_selection(Selection::collapsed(doc_model::Position::new(
            block.id(),
            from + size,
        )));
        Some(tr)
    }
}

/// Where a new block of `node_type` goes relative to the cursor:
/// `(parent, index, replaces_cursor_block)`
fn insertion_point(ctx: &CommandContext<'_>, node_type: NodeType) -> Option<(NodeId, usize, bool)> {
    let block = ctx.cursor_block()?;
    let mut current = block.id();
    loop {
        let (parent_id, index) = ctx.doc.parent_of(current)?;
        let parent = ctx.doc.find(parent_id)?;
        if ctx.schema.allows(parent.node_type(), node_type) {
            if current == block.id() && block.node_type() == NodeType::Paragraph && block.inline_len() == 0 {
                return Some((parent_id, index, true));
            }
            let mut index = index + 1;
            // the footnotes container stays last
            if parent.node_type() == NodeType::Doc
                && parent.child(index - 1).map(Node::node_type) == Some(NodeType::FootnotesContainer)
            {
                index -= 1;
            }
            return Some((parent_id, index, false));
        }
        current = parent_id;
    }
}

/// Insert a block near the cursor, replacing the cursor's paragraph when it is
/// empty. The cursor moves into the new block, or into a fresh paragraph after
/// it when the block holds no text.
pub(crate) fn insert_block(ctx: &CommandContext<'_>, node: Node) -> Option<Transaction> {
    let (parent_id, index, replace) = insertion_point(ctx, node.node_type())?;
    let target = node.descendants().find(|n| n.is_textblock()).map(Node::id);
    let parent_type = ctx.doc.find(parent_id)?.node_type();

    let mut tr = Transaction::new();
    if replace {
        tr.push(Step::remove_node(ctx.selection.cursor().node_id));
    }
    tr.push(Step::insert_node(parent_id, index, node));
    match target {
        Some(id) => tr.set_selection(Selection::at_start_of(id)),
        None if replace && ctx.schema.allows(parent_type, NodeType::Paragraph) => {
            let paragraph = Node::new(NodeType::Paragraph);
            tr.set_selection(Selection::at_start_of(paragraph.id()));
            tr.push(Step::insert_node(parent_id, index + 1, paragraph));
        }
        None => {}
    }
    Some(tr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::Position;

    fn schema() -> SchemaRegistry {
        schema::default_schema().unwrap()
    }

    #[test]
    fn test_replace_selection() {
        let para = Node::paragraph("hello world");
        let id = para.id();
        let doc = Document::with_blocks(vec![para]);
        let schema = schema();
        let ctx = CommandContext {
            doc: &doc,
            selection: Selection::new(Position::new(id, 6), Position::new(id, 11)),
            schema: &schema,
        };
        let tr = ctx.replace_selection(vec![Node::text("there")]).unwrap();
        assert_eq!(tr.steps().len(), 2);
        assert_eq!(tr.selection().unwrap().cursor(), Position::new(id, 11));
    }

    #[test]
    fn test_insert_block_replaces_empty_paragraph() {
        let empty = Node::new(NodeType::Paragraph);
        let id = empty.id();
        let doc = Document::with_blocks(vec![Node::paragraph("a"), empty]);
        let schema = schema();
        let ctx = CommandContext {
            doc: &doc,
            selection: Selection::at_start_of(id),
            schema: &schema,
        };
        let tr = insert_block(&ctx, Node::new(NodeType::DynamicPostReference)).unwrap();
        // remove, insert the block, insert a paragraph for the cursor
        assert_eq!(tr.steps().len(), 3);
        assert!(matches!(tr.steps()[0], Step::RemoveNode { node_id } if node_id == id));
    }

    #[test]
    fn test_insert_block_before_footnotes() {
        let para = Node::paragraph("text");
        let id = para.id();
        let container = Node::new(NodeType::FootnotesContainer);
        let doc = Document::with_blocks(vec![para, container]);
        let schema = schema();
        let ctx = CommandContext {
            doc: &doc,
            selection: Selection::at_start_of(id),
            schema: &schema,
        };
        let (parent, index, replace) = insertion_point(&ctx, NodeType::Table).unwrap();
        assert_eq!(parent, doc.root_id());
        assert_eq!(index, 1);
        assert!(!replace);
    }
}
