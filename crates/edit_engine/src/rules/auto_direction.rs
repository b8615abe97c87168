//! Keeps the `dir` attribute of paragraphs and headings in step with their text

use super::DocumentRule;
use crate::{AutoDirectionConfig, Step, Transaction};
use doc_model::{Document, NodeType};
use serde_json::Value;
use text_engine::DirectionClassifier;

pub struct AutoDirection {
    classifier: DirectionClassifier,
    target_types: Vec<NodeType>,
}

impl AutoDirection {
    pub fn new(config: &AutoDirectionConfig) -> Self {
        Self {
            classifier: DirectionClassifier::new(config.threshold),
            target_types: config.target_types.clone(),
        }
    }

    /// One step per target node whose `dir` disagrees with its text
    pub fn corrections(&self, doc: &Document) -> Vec<Step> {
        doc.root()
            .descendants()
            .filter(|node| self.target_types.contains(&node.node_type()))
            .filter_map(|node| {
                let text = node.text_content();
                let wanted = self.classifier.classify(&text).as_attr();
                if node.attr_str("dir") == wanted {
                    return None;
                }
                let value = wanted.map(Value::from).unwrap_or(Value::Null);
                Some(Step::SetAttr {
                    node_id: node.id(),
                    name: "dir".to_string(),
                    value,
                })
            })
            .collect()
    }
}

impl DocumentRule for AutoDirection {
    fn name(&self) -> &'static str {
        "autoDirection"
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
