//! Block structure commands
//!
//! ## Features
//!
//! - Switch a textblock between paragraph, heading and code block
//! - Wrap a textblock in a list or blockquote
//! - Insert tables, column layouts and post references
//! - Insert inline atoms (honorifics, glossary terms)
//! - Move a block by drag and drop

use crate::command::insert_block;
use crate::{Command, CommandContext, EditError, Result, Step, Transaction};
use doc_model::{Attrs, Node, NodeId, NodeType, Position, Selection};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Set Block Type
// =============================================================================

/// Change the cursor's textblock type; applying the current type again turns
/// it back into a paragraph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetBlockType {
    pub node_type: NodeType,
    pub attrs: Attrs,
}

impl SetBlockType {
    pub fn paragraph() -> Self {
        Self {
            node_type: NodeType::Paragraph,
            attrs: Attrs::new(),
        }
    }

    pub fn heading(level: u8) -> Self {
        let mut attrs = Attrs::new();
        attrs.insert("level".into(), Value::from(level.clamp(1, 6)));
        Self {
            node_type: NodeType::Heading,
            attrs,
        }
    }

    pub fn code_block() -> Self {
        Self {
            node_type: NodeType::CodeBlock,
            attrs: Attrs::new(),
        }
    }
}

impl Command for SetBlockType {
    fn build(&self, ctx: &CommandContext<'_>) -> Result<Option<Transaction>> {
        if !self.node_type.is_textblock() {
            return Err(EditError::InvalidCommand(format!(
                "{} is not a textblock type",
                self.node_type
            )));
        }
        let Some(block) = ctx.cursor_block() else {
            return Ok(None);
        };

        let same = block.node_type() == self.node_type
            && self.attrs.iter().all(|(k, v)| block.attr(k) == Some(v));
        let (node_type, attrs) = if same {
            (NodeType::Paragraph, Attrs::new())
        } else {
            (self.node_type, self.attrs.clone())
        };
        let mut all = ctx.schema.default_attrs(node_type);
        all.extend(attrs);
        if let Some(dir) = block.attr("dir").filter(|_| node_type != NodeType::CodeBlock) {
            all.insert("dir".into(), dir.clone());
        }

        let mut tr = Transaction::new();
        if node_type == NodeType::CodeBlock {
            let text = block.text_content();
            let content = if text.is_empty() { Vec::new() } else { vec![Node::text(text)] };
            tr.push(Step::ReplaceContent {
                node_id: block.id(),
                content,
            });
        }
        tr.push(Step::SetNodeType {
            node_id: block.id(),
            node_type,
            attrs: all,
        });
        Ok(Some(tr.with_selection(ctx.selection)))
    }

    fn display_name(&self) -> &str {
        "Set Block Type"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

// =============================================================================
// Wrap
// =============================================================================

/// Wrap the cursor's textblock in a bullet list, ordered list or blockquote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WrapIn {
    pub node_type: NodeType,
}

impl WrapIn {
    pub fn bullet_list() -> Self {
        Self { node_type: NodeType::BulletList }
    }

    pub fn ordered_list() -> Self {
        Self { node_type: NodeType::OrderedList }
    }

    pub fn blockquote() -> Self {
        Self { node_type: NodeType::Blockquote }
    }
}

impl Command for WrapIn {
    fn build(&self, ctx: &CommandContext<'_>) -> Result<Option<Transaction>> {
        let Some(block) = ctx.cursor_block() else {
            return Ok(None);
        };
        let Some((parent_id, index)) = ctx.doc.parent_of(block.id()) else {
            return Ok(None);
        };
        let parent_type = ctx.doc.get(parent_id)?.node_type();
        if !ctx.schema.allows(parent_type, self.node_type) {
            return Ok(None);
        }

        let wrapper = match self.node_type {
            NodeType::BulletList | NodeType::OrderedList => ctx
                .schema
                .node(self.node_type, Attrs::new())?
                .with_child(Node::new(NodeType::ListItem).with_child(block.clone())),
            NodeType::Blockquote => Node::new(NodeType::Blockquote).with_child(block.clone()),
            other => {
                return Err(EditError::InvalidCommand(format!("cannot wrap in {}", other)));
            }
        };
        Ok(Some(
            Transaction::new()
                .step(Step::remove_node(block.id()))
                .step(Step::insert_node(parent_id, index, wrapper))
                .with_selection(ctx.selection),
        ))
    }

    fn display_name(&self) -> &str {
        "Wrap"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

// =============================================================================
// Insert Table / Layout / Post Reference
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertTable {
    pub rows: usize,
    pub cols: usize,
    pub header_row: bool,
}

impl InsertTable {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows: rows.max(1),
            cols: cols.max(1),
            header_row: true,
        }
    }
}

impl Command for InsertTable {
    fn build(&self, ctx: &CommandContext<'_>) -> Result<Option<Transaction>> {
        let mut table = ctx.schema.node(NodeType::Table, Attrs::new())?;
        for row in 0..self.rows {
            let cell_type = if row == 0 && self.header_row {
                NodeType::TableHeader
            } else {
                NodeType::TableCell
            };
            let mut tr_node = Node::new(NodeType::TableRow);
            for _ in 0..self.cols {
                let cell = ctx
                    .schema
                    .node(cell_type, Attrs::new())?
                    .with_child(Node::new(NodeType::Paragraph));
                tr_node.content_mut().push(cell);
            }
            table.content_mut().push(tr_node);
        }
        Ok(insert_block(ctx, table))
    }

    fn display_name(&self) -> &str {
        "Insert Table"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertLayout {
    pub columns: usize,
}

impl InsertLayout {
    pub fn new(columns: usize) -> Self {
        Self { columns: columns.clamp(1, 4) }
    }
}

impl Command for InsertLayout {
    fn build(&self, ctx: &CommandContext<'_>) -> Result<Option<Transaction>> {
        let mut attrs = Attrs::new();
        attrs.insert("columns".into(), Value::from(self.columns));
        let layout = ctx.schema.node(NodeType::Layout, attrs)?.with_content(
            (0..self.columns)
                .map(|_| Node::new(NodeType::LayoutColumn).with_child(Node::new(NodeType::Paragraph)))
                .collect(),
        );
        Ok(insert_block(ctx, layout))
    }

    fn display_name(&self) -> &str {
        "Insert Layout"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

/// Insert a block pointing at another post; the title is cached at insertion time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertPostReference {
    pub post_id: String,
    pub post_type: String,
    pub title: String,
    pub slug: String,
}

impl Command for InsertPostReference {
    fn build(&self, ctx: &CommandContext<'_>) -> Result<Option<Transaction>> {
        let mut attrs = Attrs::new();
        attrs.insert("postId".into(), Value::from(self.post_id.clone()));
        attrs.insert("postType".into(), Value::from(self.post_type.clone()));
        attrs.insert("title".into(), Value::from(self.title.clone()));
        attrs.insert("slug".into(), Value::from(self.slug.clone()));
        let node = ctx.schema.node(NodeType::DynamicPostReference, attrs)?;
        Ok(insert_block(ctx, node))
    }

    fn display_name(&self) -> &str {
        "Insert Post Reference"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

// =============================================================================
// Insert Inline Atom
// =============================================================================

/// Insert an inline atom (honorific, glossary term, ...) at the selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertInlineAtom {
    pub node_type: NodeType,
    pub attrs: Attrs,
}

impl InsertInlineAtom {
    pub fn honorific(entry: &crate::Honorific) -> Self {
        let mut attrs = Attrs::new();
        attrs.insert("key".into(), Value::from(entry.key));
        attrs.insert("text".into(), Value::from(entry.text));
        attrs.insert("label".into(), Value::from(entry.label));
        Self {
            node_type: NodeType::Honorific,
            attrs,
        }
    }

    pub fn glossary_term(term_id: impl Into<String>, term: impl Into<String>, definition: impl Into<String>) -> Self {
        let mut attrs = Attrs::new();
        attrs.insert("termId".into(), Value::from(term_id.into()));
        attrs.insert("term".into(), Value::from(term.into()));
        attrs.insert("definition".into(), Value::from(definition.into()));
        Self {
            node_type: NodeType::GlossaryTerm,
            attrs,
        }
    }
}

impl Command for InsertInlineAtom {
    fn build(&self, ctx: &CommandContext<'_>) -> Result<Option<Transaction>> {
        if !self.node_type.is_inline() || self.node_type == NodeType::Text {
            return Err(EditError::InvalidCommand(format!(
                "{} is not an inline atom",
                self.node_type
            )));
        }
        let atom = ctx.schema.node(self.node_type, self.attrs.clone())?;
        Ok(ctx.replace_selection(vec![atom]))
    }

    fn display_name(&self) -> &str {
        "Insert Inline"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

// =============================================================================
// Move Node
// =============================================================================

/// Relocate a block, as recorded when a drag started.
///
/// Does nothing when the node is no longer where the drag found it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveNode {
    pub node_id: NodeId,
    pub from_parent: NodeId,
    pub from_index: usize,
    pub to_parent: NodeId,
    /// Index in the target parent before the node is removed
    pub to_index: usize,
}

impl Command for MoveNode {
    fn build(&self, ctx: &CommandContext<'_>) -> Result<Option<Transaction>> {
        if ctx.doc.parent_of(self.node_id) != Some((self.from_parent, self.from_index)) {
            return Ok(None);
        }
        let (Some(node), Some(target)) = (ctx.doc.find(self.node_id), ctx.doc.find(self.to_parent)) else {
            return Ok(None);
        };
        if node.node_type() == NodeType::FootnotesContainer
            || node.find(self.to_parent).is_some()
            || !ctx.schema.allows(target.node_type(), node.node_type())
        {
            return Ok(None);
        }
        let mut index = self.to_index;
        if self.to_parent == self.from_parent && index > self.from_index {
            index -= 1;
        }
        let limit = target.child_count() - usize::from(self.to_parent == self.from_parent);
        if index > limit {
            return Ok(None);
        }
        // the footnotes container stays the last top-level block
        if self.to_parent == ctx.doc.root_id() {
            let container = target
                .content()
                .iter()
                .filter(|n| n.id() != self.node_id)
                .position(|n| n.node_type() == NodeType::FootnotesContainer);
            if container.is_some_and(|c| index > c) {
                return Ok(None);
            }
        }
        if self.to_parent == self.from_parent && index == self.from_index {
            return Ok(None);
        }
        Ok(Some(
            Transaction::new()
                .step(Step::remove_node(self.node_id))
                .step(Step::insert_node(self.to_parent, index, node.clone()))
                .with_selection(ctx.selection),
        ))
    }

    fn display_name(&self) -> &str {
        "Move"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

/// Cursor at the start of the first textblock inside `node`
pub(crate) fn cursor_inside(node: &Node) -> Option<Selection> {
    node.descendants()
        .find(|n| n.is_textblock())
        .map(|n| Selection::collapsed(Position::start_of(n.id())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::Document;
    use schema::SchemaRegistry;

    fn apply(command: &dyn Command, doc: &Document, selection: Selection, schema: &SchemaRegistry) -> Option<(Document, Option<Selection>)> {
        let ctx = CommandContext { doc, selection, schema };
        let tr = command.build(&ctx).unwrap()?;
        let mut doc = doc.clone();
        for step in tr.steps() {
            step.apply(&mut doc).unwrap();
        }
        Some((doc, tr.selection()))
    }

    #[test]
    fn test_heading_toggle() {
        let schema = schema::default_schema().unwrap();
        let para = Node::paragraph("Title");
        let id = para.id();
        let doc = Document::with_blocks(vec![para]);
        let sel = Selection::at_start_of(id);

        let (heading, _) = apply(&SetBlockType::heading(2), &doc, sel, &schema).unwrap();
        let block = heading.get(id).unwrap();
        assert_eq!(block.node_type(), NodeType::Heading);
        assert_eq!(block.attr_i64("level"), Some(2));

        let (back, _) = apply(&SetBlockType::heading(2), &heading, sel, &schema).unwrap();
        assert_eq!(back.get(id).unwrap().node_type(), NodeType::Paragraph);
        assert_eq!(back, doc);
    }

    #[test]
    fn test_code_block_drops_marks() {
        let schema = schema::default_schema().unwrap();
        let para = Node::new(NodeType::Paragraph).with_content(vec![
            Node::marked_text("let", vec![doc_model::Mark::new(doc_model::MarkType::Bold)]),
            Node::text(" x"),
        ]);
        let id = para.id();
        let doc = Document::with_blocks(vec![para]);
        let (after, _) = apply(&SetBlockType::code_block(), &doc, Selection::at_start_of(id), &schema).unwrap();
        let block = after.get(id).unwrap();
        assert_eq!(block.node_type(), NodeType::CodeBlock);
        assert_eq!(block.child_count(), 1);
        assert!(block.content()[0].marks().is_empty());
    }

    #[test]
    fn test_wrap_in_list_keeps_block_identity() {
        let schema = schema::default_schema().unwrap();
        let para = Node::paragraph("item");
        let id = para.id();
        let doc = Document::with_blocks(vec![para]);
        let (after, _) = apply(&WrapIn::bullet_list(), &doc, Selection::at_start_of(id), &schema).unwrap();
        let list = &after.blocks()[0];
        assert_eq!(list.node_type(), NodeType::BulletList);
        assert!(after.contains(id));
        schema.check(&after).unwrap();
    }

    #[test]
    fn test_insert_table_replaces_empty_paragraph() {
        let schema = schema::default_schema().unwrap();
        let para = Node::new(NodeType::Paragraph);
        let id = para.id();
        let doc = Document::with_blocks(vec![para]);
        let (after, selection) = apply(&InsertTable::new(2, 3), &doc, Selection::at_start_of(id), &schema).unwrap();

        assert_eq!(after.blocks().len(), 1);
        let table = &after.blocks()[0];
        assert_eq!(table.child_count(), 2);
        assert_eq!(table.content()[0].content()[0].node_type(), NodeType::TableHeader);
        assert_eq!(table.content()[1].child_count(), 3);
        let first_cell_para = table.content()[0].content()[0].content()[0].id();
        assert_eq!(selection.unwrap().cursor().node_id, first_cell_para);
        schema.check(&after).unwrap();
    }

    #[test]
    fn test_insert_layout_after_text() {
        let schema = schema::default_schema().unwrap();
        let para = Node::paragraph("before");
        let id = para.id();
        let doc = Document::with_blocks(vec![para]);
        let (after, _) = apply(&InsertLayout::new(3), &doc, Selection::at_start_of(id), &schema).unwrap();
        assert_eq!(after.blocks().len(), 2);
        assert_eq!(after.blocks()[1].attr_i64("columns"), Some(3));
        assert_eq!(after.blocks()[1].child_count(), 3);
    }

    #[test]
    fn test_insert_honorific_atom() {
        let schema = schema::default_schema().unwrap();
        let para = Node::paragraph("Muhammad ");
        let id = para.id();
        let doc = Document::with_blocks(vec![para]);
        let entry = crate::honorific("saw").unwrap();
        let sel = Selection::collapsed(Position::new(id, 9));
        let (after, selection) = apply(&InsertInlineAtom::honorific(entry), &doc, sel, &schema).unwrap();
        let block = after.get(id).unwrap();
        assert_eq!(block.content()[1].node_type(), NodeType::Honorific);
        assert_eq!(block.content()[1].attr_str("key"), Some("saw"));
        assert_eq!(selection.unwrap().cursor().offset, 10);
    }

    #[test]
    fn test_inline_atom_rejects_blocks() {
        let schema = schema::default_schema().unwrap();
        let para = Node::paragraph("x");
        let id = para.id();
        let doc = Document::with_blocks(vec![para]);
        let ctx = CommandContext { doc: &doc, selection: Selection::at_start_of(id), schema: &schema };
        let command = InsertInlineAtom { node_type: NodeType::Table, attrs: Attrs::new() };
        assert!(command.build(&ctx).is_err());
    }

    #[test]
    fn test_move_node() {
        let schema = schema::default_schema().unwrap();
        let a = Node::paragraph("a");
        let b = Node::paragraph("b");
        let c = Node::paragraph("c");
        let a_id = a.id();
        let doc = Document::with_blocks(vec![a, b, c]);
        let root = doc.root_id();

        let command = MoveNode {
            node_id: a_id,
            from_parent: root,
            from_index: 0,
            to_parent: root,
            to_index: 3,
        };
        let (after, _) = apply(&command, &doc, Selection::at_start_of(a_id), &schema).unwrap();
        assert_eq!(after.text_content(), "bca");

        // the drag recorded a stale position
        let stale = MoveNode { from_index: 1, ..command };
        assert!(apply(&stale, &doc, Selection::at_start_of(a_id), &schema).is_none());
    }

    #[test]
    fn test_move_node_keeps_footnotes_last() {
        let schema = schema::default_schema().unwrap();
        let a = Node::paragraph("a");
        let b = Node::paragraph("b");
        let container = Node::new(NodeType::FootnotesContainer);
        let (a_id, container_id) = (a.id(), container.id());
        let doc = Document::with_blocks(vec![a, b, container]);
        let root = doc.root_id();
        let sel = Selection::at_start_of(a_id);

        let past_container = MoveNode {
            node_id: a_id,
            from_parent: root,
            from_index: 0,
            to_parent: root,
            to_index: 3,
        };
        assert!(apply(&past_container, &doc, sel, &schema).is_none());

        // dropping right before the container is fine
        let before_container = MoveNode { to_index: 2, ..past_container };
        let (after, _) = apply(&before_container, &doc, sel, &schema).unwrap();
        assert_eq!(after.blocks()[1].id(), a_id);
        assert_eq!(after.blocks()[2].id(), container_id);

        let container_up = MoveNode {
            node_id: container_id,
            from_parent: root,
            from_index: 2,
            to_parent: root,
            to_index: 0,
        };
        assert!(apply(&container_up, &doc, sel, &schema).is_none());
    }

    #[test]
    fn test_move_node_into_itself() {
        let schema = schema::default_schema().unwrap();
        let para = Node::paragraph("quoted");
        let para_id = para.id();
        let quote = Node::new(NodeType::Blockquote).with_content(vec![para]);
        let quote_id = quote.id();
        let doc = Document::with_blocks(vec![quote, Node::paragraph("after")]);

        let command = MoveNode {
            node_id: quote_id,
            from_parent: doc.root_id(),
            from_index: 0,
            to_parent: quote_id,
            to_index: 1,
        };
        assert!(apply(&command, &doc, Selection::at_start_of(para_id), &schema).is_none());
    }
}
