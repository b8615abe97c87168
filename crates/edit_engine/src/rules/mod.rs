//! Document rules
//!
//! A rule observes each document change and may answer with one corrective
//! transaction. Rules run in a fixed order, each seeing the document with
//! the corrections of the rules before it, and each runs once per change so
//! a correction never triggers another pass.

mod auto_direction;
mod footnotes;

pub use auto_direction::AutoDirection;
pub use footnotes::{find_definition, find_reference, footnote_numbers, FootnoteConsistency};

use crate::{EditorConfig, Result, Step, Transaction};
use doc_model::Document;
use tracing::debug;

pub trait DocumentRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Corrective transaction for the change from `old` to `new`, or `None`
    /// when `new` is already consistent
    fn append_transaction(&self, old: &Document, new: &Document) -> Option<Transaction>;
}

/// Steps applied by the pipeline, with their inverses in application order
#[derive(Debug, Default)]
pub struct AppliedCorrections {
    pub steps: Vec<Step>,
    pub inverse: Vec<Step>,
}

/// Ordered list of rules run after every content change
#[derive(Default)]
pub struct RulePipeline {
    rules: Vec<Box<dyn DocumentRule>>,
}

impl RulePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Auto-direction first, then footnote consistency
    pub fn from_config(config: &EditorConfig) -> Self {
        let mut pipeline = Self::new();
        if config.auto_direction.enabled {
            pipeline = pipeline.with_rule(AutoDirection::new(&config.auto_direction));
        }
        if config.footnotes.enabled {
            pipeline = pipeline.with_rule(FootnoteConsistency);
        }
        pipeline
    }

    pub fn with_rule(mut self, rule: impl DocumentRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Run every rule against `doc`, applying each correction before the next rule runs
    pub fn apply(&self, old: &Document, doc: &mut Document) -> Result<AppliedCorrections> {
        let mut applied = AppliedCorrections::default();
        for rule in &self.rules {
            let Some(tr) = rule.append_transaction(old, doc) else {
                continue;
            };
            debug!(rule = rule.name(), steps = tr.steps().len(), "appending corrective transaction");
            for step in tr.steps() {
                applied.inverse.push(step.apply(doc)?);
                applied.steps.push(step.clone());
            }
        }
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::{Node, NodeType};

    #[test]
    fn test_order_follows_config() {
        let pipeline = RulePipeline::from_config(&EditorConfig::default());
        assert_eq!(pipeline.rule_names(), vec!["autoDirection", "footnotes"]);

        let mut config = EditorConfig::default();
        config.auto_direction.enabled = false;
        let pipeline = RulePipeline::from_config(&config);
        assert_eq!(pipeline.rule_names(), vec!["footnotes"]);
    }

    #[test]
    fn test_consistent_document_needs_nothing() {
        let pipeline = RulePipeline::from_config(&EditorConfig::default());
        let doc = Document::with_blocks(vec![Node::paragraph("plain")
            .with_attr("dir", "ltr")]);
        let mut new = doc.clone();
        let applied = pipeline.apply(&doc, &mut new).unwrap();
        assert!(applied.steps.is_empty());
        assert_eq!(new, doc);
    }

    #[test]
    fn test_corrections_are_reversible() {
        let pipeline = RulePipeline::from_config(&EditorConfig::default());
        let doc = Document::with_blocks(vec![
            Node::paragraph("שלום עולם"),
            Node::new(NodeType::FootnotesContainer).with_child(
                Node::new(NodeType::FootnoteDefinition)
                    .with_attr("dataId", "gone")
                    .with_child(Node::paragraph("orphan")),
            ),
        ]);
        let mut new = doc.clone();
        let applied = pipeline.apply(&doc, &mut new).unwrap();
        assert_eq!(new.blocks()[0].attr_str("dir"), Some("rtl"));
        assert_eq!(new.blocks()[1].child_count(), 0);

        for step in applied.inverse.iter().rev() {
            step.apply(&mut new).unwrap();
        }
        assert_eq!(new, doc);
    }
}
