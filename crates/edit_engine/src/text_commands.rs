//! Text input, deletion and mark commands

use crate::{Command, CommandContext, Result, Step, Transaction};
use doc_model::{Mark, Node, NodeId, Position, Selection};
use serde::{Deserialize, Serialize};

// =============================================================================
// Insert Text
// =============================================================================

/// Type text at the selection, replacing any selected text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertText {
    pub text: String,
}

impl InsertText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Command for InsertText {
    fn build(&self, ctx: &CommandContext<'_>) -> Result<Option<Transaction>> {
        if self.text.is_empty() {
            return Ok(None);
        }
        let Some((block, from, _)) = ctx.block_range() else {
            return Ok(None);
        };
        let node = Node::marked_text(self.text.clone(), block.marks_at(from));
        Ok(ctx.replace_selection(vec![node]).map(|tr| tr.merge_key("typing")))
    }

    fn display_name(&self) -> &str {
        "Typing"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

// =============================================================================
// Delete
// =============================================================================

/// Delete an explicit range inside one textblock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRange {
    pub block_id: NodeId,
    pub from: usize,
    pub to: usize,
}

impl DeleteRange {
    pub fn new(block_id: NodeId, from: usize, to: usize) -> Self {
        Self { block_id, from, to }
    }
}

impl Command for DeleteRange {
    fn build(&self, ctx: &CommandContext<'_>) -> Result<Option<Transaction>> {
        let Some(block) = ctx.doc.find(self.block_id).filter(|n| n.is_textblock()) else {
            return Ok(None);
        };
        if self.from >= self.to || self.to > block.inline_len() {
            return Ok(None);
        }
        Ok(Some(
            Transaction::new()
                .step(Step::remove_inline(self.block_id, self.from, self.to))
                .with_selection(Selection::collapsed(Position::new(self.block_id, self.from))),
        ))
    }

    fn display_name(&self) -> &str {
        "Delete"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

/// Backspace: delete the selection, or the character before the cursor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteBackward;

impl Command for DeleteBackward {
    fn build(&self, ctx: &CommandContext<'_>) -> Result<Option<Transaction>> {
        let Some((block, from, to)) = ctx.block_range() else {
            return Ok(None);
        };
        let (from, to) = if from < to {
            (from, to)
        } else if from > 0 {
            (from - 1, from)
        } else {
            return Ok(None);
        };
        DeleteRange::new(block.id(), from, to)
            .build(ctx)
            .map(|tr| tr.map(|tr| tr.merge_key("delete")))
    }

    fn display_name(&self) -> &str {
        "Delete"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

// =============================================================================
// Toggle Mark
// =============================================================================

/// Add a mark to the selected text, or remove it when all of it already has it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleMark {
    pub mark: Mark,
}

impl ToggleMark {
    pub fn new(mark: Mark) -> Self {
        Self { mark }
    }
}

impl Command for ToggleMark {
    fn build(&self, ctx: &CommandContext<'_>) -> Result<Option<Transaction>> {
        let Some((block, from, to)) = ctx.block_range() else {
            return Ok(None);
        };
        if from == to {
            return Ok(None);
        }
        let mark_type = self.mark.mark_type();
        let step = if block.range_has_mark(from, to, mark_type) {
            Step::RemoveMark {
                block_id: block.id(),
                from,
                to,
                mark_type,
            }
        } else {
            Step::AddMark {
                block_id: block.id(),
                from,
                to,
                mark: self.mark.clone(),
            }
        };
        Ok(Some(Transaction::new().step(step).with_selection(ctx.selection)))
    }

    fn display_name(&self) -> &str {
        "Toggle Mark"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::{Document, MarkType};
    use schema::SchemaRegistry;

    fn run(command: &dyn Command, doc: &Document, selection: Selection, schema: &SchemaRegistry) -> Option<Document> {
        let ctx = CommandContext { doc, selection, schema };
        let tr = command.build(&ctx).unwrap()?;
        let mut doc = doc.clone();
        for step in tr.steps() {
            step.apply(&mut doc).unwrap();
        }
        Some(doc)
    }

    #[test]
    fn test_insert_text_inherits_marks() {
        let schema = schema::default_schema().unwrap();
        let para = Node::new(doc_model::NodeType::Paragraph)
            .with_child(Node::marked_text("bold", vec![Mark::new(MarkType::Bold)]));
        let id = para.id();
        let doc = Document::with_blocks(vec![para]);
        let sel = Selection::collapsed(Position::new(id, 4));

        let after = run(&InsertText::new("er"), &doc, sel, &schema).unwrap();
        let block = after.get(id).unwrap();
        assert_eq!(block.child_count(), 1);
        assert_eq!(block.content()[0].text_value(), Some("bolder"));
    }

    #[test]
    fn test_delete_backward_at_start_is_noop() {
        let schema = schema::default_schema().unwrap();
        let para = Node::paragraph("abc");
        let id = para.id();
        let doc = Document::with_blocks(vec![para]);
        assert!(run(&DeleteBackward, &doc, Selection::at_start_of(id), &schema).is_none());

        let after = run(
            &DeleteBackward,
            &doc,
            Selection::collapsed(Position::new(id, 3)),
            &schema,
        )
        .unwrap();
        assert_eq!(after.text_content(), "ab");
    }

    #[test]
    fn test_toggle_mark() {
        let schema = schema::default_schema().unwrap();
        let para = Node::paragraph("hello");
        let id = para.id();
        let doc = Document::with_blocks(vec![para]);
        let sel = Selection::new(Position::new(id, 0), Position::new(id, 5));
        let toggle = ToggleMark::new(Mark::new(MarkType::Italic));

        let marked = run(&toggle, &doc, sel, &schema).unwrap();
        assert!(marked.get(id).unwrap().range_has_mark(0, 5, MarkType::Italic));
        let unmarked = run(&toggle, &marked, sel, &schema).unwrap();
        assert_eq!(unmarked, doc);
    }

    #[test]
    fn test_delete_range_out_of_bounds() {
        let schema = schema::default_schema().unwrap();
        let para = Node::paragraph("abc");
        let id = para.id();
        let doc = Document::with_blocks(vec![para]);
        assert!(run(&DeleteRange::new(id, 1, 9), &doc, Selection::at_start_of(id), &schema).is_none());
    }
}
