//! Quote Commands
//!
//! A quote holds its text and source in attributes and at most one nested
//! translation. Translation and quote are inserted and removed independently;
//! removing the translation never touches the quote's attributes.

use crate::block_commands::cursor_inside;
use crate::command::insert_block;
use crate::{Command, CommandContext, Result, Step, Transaction};
use doc_model::{Attrs, Node, NodeId, NodeType};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const STYLE_VERSE: &str = "verse";
pub const STYLE_PROSE: &str = "prose";

fn find_quote<'a>(ctx: &'a CommandContext<'_>, quote_id: NodeId) -> Option<&'a Node> {
    ctx.doc
        .find(quote_id)
        .filter(|n| n.node_type() == NodeType::Quote)
}

fn translation_of(quote: &Node) -> Option<&Node> {
    quote
        .content()
        .iter()
        .find(|n| n.node_type() == NodeType::QuoteTranslation)
}

// =============================================================================
// Insert Quote
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InsertQuote {
    pub original: String,
    pub source_label: Option<String>,
    pub source_url: Option<String>,
    pub verse: bool,
}

impl InsertQuote {
    pub fn new(original: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            ..Self::default()
        }
    }

    pub fn with_source(mut self, label: impl Into<String>, url: Option<String>) -> Self {
        self.source_label = Some(label.into());
        self.source_url = url;
        self
    }
}

impl Command for InsertQuote {
    fn build(&self, ctx: &CommandContext<'_>) -> Result<Option<Transaction>> {
        let mut attrs = Attrs::new();
        attrs.insert("original".into(), Value::from(self.original.clone()));
        if let Some(label) = &self.source_label {
            attrs.insert("sourceLabel".into(), Value::from(label.clone()));
        }
        if let Some(url) = &self.source_url {
            attrs.insert("sourceUrl".into(), Value::from(url.clone()));
        }
        if self.verse {
            attrs.insert("styleType".into(), Value::from(STYLE_VERSE));
        }
        let quote = ctx.schema.node(NodeType::Quote, attrs)?;
        Ok(insert_block(ctx, quote))
    }

    fn display_name(&self) -> &str {
        "Insert Quote"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

// =============================================================================
// Verse Style
// =============================================================================

/// Flip a quote between verse and prose styling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleVerseStyle {
    pub quote_id: NodeId,
}

impl Command for ToggleVerseStyle {
    fn build(&self, ctx: &CommandContext<'_>) -> Result<Option<Transaction>> {
        let Some(quote) = find_quote(ctx, self.quote_id) else {
            return Ok(None);
        };
        let next = if quote.attr_str("styleType") == Some(STYLE_VERSE) {
            STYLE_PROSE
        } else {
            STYLE_VERSE
        };
        Ok(Some(
            Transaction::new()
                .step(Step::set_attr(quote.id(), "styleType", next))
                .with_selection(ctx.selection),
        ))
    }

    fn display_name(&self) -> &str {
        "Toggle Verse Style"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

// =============================================================================
// Translation
// =============================================================================

/// Add an empty translation to a quote that has none
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddQuoteTranslation {
    pub quote_id: NodeId,
}

impl Command for AddQuoteTranslation {
    fn build(&self, ctx: &CommandContext<'_>) -> Result<Option<Transaction>> {
        let Some(quote) = find_quote(ctx, self.quote_id) else {
            return Ok(None);
        };
        if translation_of(quote).is_some() {
            return Ok(None);
        }
        let translation = ctx
            .schema
            .create_and_fill(NodeType::QuoteTranslation, Attrs::new())?;
        let mut tr = Transaction::new();
        if let Some(selection) = cursor_inside(&translation) {
            tr.set_selection(selection);
        }
        tr.push(Step::insert_node(quote.id(), quote.child_count(), translation));
        Ok(Some(tr))
    }

    fn display_name(&self) -> &str {
        "Add Translation"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveQuoteTranslation {
    pub quote_id: NodeId,
}

impl Command for RemoveQuoteTranslation {
    fn build(&self, ctx: &CommandContext<'_>) -> Result<Option<Transaction>> {
        let Some(translation) = find_quote(ctx, self.quote_id).and_then(translation_of) else {
            return Ok(None);
        };
        Ok(Some(Transaction::new().step(Step::remove_node(translation.id()))))
    }

    fn display_name(&self) -> &str {
        "Remove Translation"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

// =============================================================================
// Source
// =============================================================================

/// Set or clear the quote's source label and link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetQuoteSource {
    pub quote_id: NodeId,
    pub label: Option<String>,
    pub url: Option<String>,
}

impl Command for SetQuoteSource {
    fn build(&self, ctx: &CommandContext<'_>) -> Result<Option<Transaction>> {
        let Some(quote) = find_quote(ctx, self.quote_id) else {
            return Ok(None);
        };
        let mut tr = Transaction::new();
        for (name, value) in [("sourceLabel", &self.label), ("sourceUrl", &self.url)] {
            let value = value.as_deref().filter(|v| !v.is_empty());
            if quote.attr_str(name) != value {
                let value = value.map(Value::from).unwrap_or(Value::Null);
                tr.push(Step::SetAttr {
                    node_id: quote.id(),
                    name: name.to_string(),
                    value,
                });
            }
        }
        if !tr.doc_changed() {
            return Ok(None);
        }
        Ok(Some(tr.with_selection(ctx.selection)))
    }

    fn display_name(&self) -> &str {
        "Set Quote Source"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::{Document, Selection};
    use schema::SchemaRegistry;

    fn fixture() -> (Document, NodeId, NodeId) {
        let quote = Node::new(NodeType::Quote)
            .with_attr("original", "Knowledge is light")
            .with_attr("sourceLabel", "Proverb")
            .with_attr("quoteType", "quote")
            .with_attr("styleType", "prose");
        let para = Node::paragraph("after");
        let (quote_id, para_id) = (quote.id(), para.id());
        (Document::with_blocks(vec![quote, para]), quote_id, para_id)
    }

    fn run(command: &dyn Command, doc: &Document, cursor: NodeId, schema: &SchemaRegistry) -> Option<Document> {
        let ctx = CommandContext { doc, selection: Selection::at_start_of(cursor), schema };
        let tr = command.build(&ctx).unwrap()?;
        let mut doc = doc.clone();
        for step in tr.steps() {
            step.apply(&mut doc).unwrap();
        }
        Some(doc)
    }

    #[test]
    fn test_toggle_verse() {
        let schema = schema::default_schema().unwrap();
        let (doc, quote_id, para_id) = fixture();
        let verse = run(&ToggleVerseStyle { quote_id }, &doc, para_id, &schema).unwrap();
        assert_eq!(verse.get(quote_id).unwrap().attr_str("styleType"), Some("verse"));
        let prose = run(&ToggleVerseStyle { quote_id }, &verse, para_id, &schema).unwrap();
        assert_eq!(prose, doc);
    }

    #[test]
    fn test_translation_add_twice_is_noop() {
        let schema = schema::default_schema().unwrap();
        let (doc, quote_id, para_id) = fixture();
        let with = run(&AddQuoteTranslation { quote_id }, &doc, para_id, &schema).unwrap();
        assert_eq!(with.get(quote_id).unwrap().child_count(), 1);
        assert!(run(&AddQuoteTranslation { quote_id }, &with, para_id, &schema).is_none());
        schema.check(&with).unwrap();
    }

    #[test]
    fn test_remove_translation_keeps_attrs() {
        let schema = schema::default_schema().unwrap();
        let (doc, quote_id, para_id) = fixture();
        let with = run(&AddQuoteTranslation { quote_id }, &doc, para_id, &schema).unwrap();
        let without = run(&RemoveQuoteTranslation { quote_id }, &with, para_id, &schema).unwrap();
        assert_eq!(without, doc);
        assert_eq!(without.get(quote_id).unwrap().attr_str("sourceLabel"), Some("Proverb"));
    }

    #[test]
    fn test_set_source() {
        let schema = schema::default_schema().unwrap();
        let (doc, quote_id, para_id) = fixture();
        let unchanged = SetQuoteSource {
            quote_id,
            label: Some("Proverb".into()),
            url: None,
        };
        assert!(run(&unchanged, &doc, para_id, &schema).is_none());

        let linked = SetQuoteSource {
            quote_id,
            label: Some("Book".into()),
            url: Some("https://example.org/book".into()),
        };
        let after = run(&linked, &doc, para_id, &schema).unwrap();
        let quote = after.get(quote_id).unwrap();
        assert_eq!(quote.attr_str("sourceLabel"), Some("Book"));
        assert_eq!(quote.attr_str("sourceUrl"), Some("https://example.org/book"));
    }

    #[test]
    fn test_not_a_quote() {
        let schema = schema::default_schema().unwrap();
        let (doc, _, para_id) = fixture();
        assert!(run(&ToggleVerseStyle { quote_id: para_id }, &doc, para_id, &schema).is_none());
    }
}
