//! Footnote consistency
//!
//! References are numbered by first appearance in document order. Each
//! definition carries the number of its reference in its `id` (`fn:<n>`), and
//! a definition without a live reference is removed. A reference without a
//! definition is left alone; it renders as unresolved.

use super::DocumentRule;
use crate::{Step, Transaction};
use doc_model::{Document, Node, NodeType};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

pub struct FootnoteConsistency;

impl FootnoteConsistency {
    pub fn corrections(&self, doc: &Document) -> Vec<Step> {
        let numbers = footnote_numbers(doc);
        let mut steps = Vec::new();

        for reference in doc.nodes_of_type(NodeType::FootnoteReference) {
            let Some(number) = reference.attr_str("dataId").and_then(|id| numbers.get(id)) else {
                continue;
            };
            if reference.attr_i64("referenceNumber") != Some(*number as i64) {
                steps.push(Step::SetAttr {
                    node_id: reference.id(),
                    name: "referenceNumber".to_string(),
                    value: Value::from(*number),
                });
            }
        }

        let mut seen = HashSet::new();
        for definition in doc.nodes_of_type(NodeType::FootnoteDefinition) {
            let live = definition
                .attr_str("dataId")
                .and_then(|id| numbers.get(id).map(|n| (id, *n)));
            match live {
                Some((data_id, number)) if seen.insert(data_id) => {
                    let wanted = format!("fn:{}", number);
                    if definition.attr_str("id") != Some(wanted.as_str()) {
                        steps.push(Step::set_attr(definition.id(), "id", wanted));
                    }
                }
                // orphaned, or a second definition for the same footnote
                _ => steps.push(Step::remove_node(definition.id())),
            }
        }
        steps
    }
}

impl DocumentRule for FootnoteConsistency {
    fn name(&self) -> &'static str {
        "footnotes"
    }

    fn append_transaction(&self, _old: &Document, new: &Document) -> Option<Transaction> {
        let steps = self.corrections(new);
        if steps.is_empty() {
            return None;
        }
        Some(
            steps
                .into_iter()
                .fold(Transaction::from_rule(self.name()), Transaction::step),
        )
    }
}

/// Display number of every referenced footnote id, by first appearance
pub fn footnote_numbers(doc: &Document) -> HashMap<String, usize> {
    let mut numbers = HashMap::new();
    for reference in doc.nodes_of_type(NodeType::FootnoteReference) {
        if let Some(id) = reference.attr_str("dataId") {
            let next = numbers.len() + 1;
            numbers.entry(id.to_string()).or_insert(next);
        }
    }
    numbers
}

pub fn find_definition<'a>(doc: &'a Document, data_id: &str) -> Option<&'a Node> {
    doc.root().descendants().find(|n| {
        n.node_type() == NodeType::FootnoteDefinition && n.attr_str("dataId") == Some(data_id)
    })
}

/// First reference to `data_id` in document order
pub fn find_reference<'a>(doc: &'a Document, data_id: &str) -> Option<&'a Node> {
    doc.root().descendants().find(|n| {
        n.node_type() == NodeType::FootnoteReference && n.attr_str("dataId") == Some(data_id)
    })
}
