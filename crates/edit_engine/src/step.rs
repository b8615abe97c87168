//! Atomic document mutations
//!
//! Every change to a document goes through a [`Step`]. Applying a step
//! returns its inverse, so a list of applied steps can always be undone by
//! applying the inverses in reverse order.

use crate::{EditError, Result};
use doc_model::{Attrs, Document, Mark, MarkType, Node, NodeId, NodeType, Position};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Set one attribute; null removes it
    SetAttr {
        node_id: NodeId,
        name: String,
        value: Value,
    },
    /// Change a node's type and replace its attributes, keeping content and identity
    SetNodeType {
        node_id: NodeId,
        node_type: NodeType,
        attrs: Attrs,
    },
    /// Insert a block-level child (the node keeps its id)
    InsertNode {
        parent_id: NodeId,
        index: usize,
        node: Node,
    },
    RemoveNode { node_id: NodeId },
    /// Insert inline content into a textblock
    InsertInline {
        block_id: NodeId,
        offset: usize,
        content: Vec<Node>,
    },
    RemoveInline {
        block_id: NodeId,
        from: usize,
        to: usize,
    },
    AddMark {
        block_id: NodeId,
        from: usize,
        to: usize,
        mark: Mark,
    },
    RemoveMark {
        block_id: NodeId,
        from: usize,
        to: usize,
        mark_type: MarkType,
    },
    /// Replace all children of a node
    ReplaceContent { node_id: NodeId, content: Vec<Node> },
}

impl Step {
    pub fn set_attr(node_id: NodeId, name: impl Into<String>, value: impl Into<Value>) -> Self {
        Step::SetAttr {
            node_id,
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn clear_attr(node_id: NodeId, name: impl Into<String>) -> Self {
        Step::SetAttr {
            node_id,
            name: name.into(),
            value: Value::Null,
        }
    }

    pub fn insert_node(parent_id: NodeId, index: usize, node: Node) -> Self {
        Step::InsertNode { parent_id, index, node }
    }

    pub fn remove_node(node_id: NodeId) -> Self {
        Step::RemoveNode { node_id }
    }

    pub fn insert_inline(at: Position, content: Vec<Node>) -> Self {
        Step::InsertInline {
            block_id: at.node_id,
            offset: at.offset,
            content,
        }
    }

    pub fn remove_inline(block_id: NodeId, from: usize, to: usize) -> Self {
        Step::RemoveInline { block_id, from, to }
    }

    /// Apply the step and return the step that reverts it
    pub fn apply(&self, doc: &mut Document) -> Result<Step> {
        match self {
            Step::SetAttr { node_id, name, value } => {
                let node = doc.get_mut(*node_id)?;
                let previous = node.set_attr(name.clone(), value.clone());
                Ok(Step::SetAttr {
                    node_id: *node_id,
                    name: name.clone(),
                    value: previous,
                })
            }
            Step::SetNodeType { node_id, node_type, attrs } => {
                let node = doc.get_mut(*node_id)?;
                let inverse = Step::SetNodeType {
                    node_id: *node_id,
                    node_type: node.node_type(),
                    attrs: node.attrs().clone(),
                };
                node.set_node_type(*node_type);
                node.set_attrs(attrs.clone());
                Ok(inverse)
            }
            Step::InsertNode { parent_id, index, node } => {
                let parent = doc.get_mut(*parent_id)?;
                if *index > parent.child_count() {
                    return Err(EditError::StepFailed(format!(
                        "index {} out of bounds for {} with {} children",
                        index,
                        parent.node_type(),
                        parent.child_count()
                    )));
                }
                parent.content_mut().insert(*index, node.clone());
                Ok(Step::RemoveNode { node_id: node.id() })
            }
            Step::RemoveNode { node_id } => {
                let (parent_id, index) = doc
                    .parent_of(*node_id)
                    .ok_or(EditError::NodeNotFound(*node_id))?;
                let node = doc.get_mut(parent_id)?.content_mut().remove(index);
                Ok(Step::InsertNode { parent_id, index, node })
            }
            Step::InsertInline { block_id, offset, content } => {
                let size: usize = content.iter().map(Node::inline_size).sum();
                doc.get_mut(*block_id)?.insert_inline(*offset, content.clone())?;
                Ok(Step::RemoveInline {
                    block_id: *block_id,
                    from: *offset,
                    to: offset + size,
                })
            }
            Step::RemoveInline { block_id, from, to } => {
                let removed = doc.get_mut(*block_id)?.remove_inline(*from, *to)?;
                Ok(Step::InsertInline {
                    block_id: *block_id,
                    offset: *from,
                    content: removed,
                })
            }
            Step::AddMark { block_id, from, to, mark } => {
                let block = doc.get_mut(*block_id)?;
                let before = block.content().to_vec();
                block.add_mark(*from, *to, mark.clone())?;
                Ok(Step::ReplaceContent {
                    node_id: *block_id,
                    content: before,
                })
            }
            Step::RemoveMark { block_id, from, to, mark_type } => {
                let block = doc.get_mut(*block_id)?;
                let before = block.content().to_vec();
                block.remove_mark(*from, *to, *mark_type)?;
                Ok(Step::ReplaceContent {
                    node_id: *block_id,
                    content: before,
                })
            }
            Step::ReplaceContent { node_id, content } => {
                let node = doc.get_mut(*node_id)?;
                let before = std::mem::replace(node.content_mut(), content.clone());
                Ok(Step::ReplaceContent {
                    node_id: *node_id,
                    content: before,
                })
            }
        }
    }

    /// Map a position through this step
    pub fn map_position(&self, pos: Position) -> Position {
        match self {
            Step::InsertInline { block_id, offset, content } if *block_id == pos.node_id => {
                if pos.offset >= *offset {
                    let size: usize = content.iter().map(Node::inline_size).sum();
                    Position::new(pos.node_id, pos.offset + size)
                } else {
                    pos
                }
            }
            Step::RemoveInline { block_id, from, to } if *block_id == pos.node_id => {
                if pos.offset >= *to {
                    Position::new(pos.node_id, pos.offset - (to - from))
                } else if pos.offset > *from {
                    Position::new(pos.node_id, *from)
                } else {
                    pos
                }
            }
            _ => pos,
        }
    }

    /// Whether the step only touches attributes
    pub fn is_attr_only(&self) -> bool {
        matches!(self, Step::SetAttr { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc_with(text: &str) -> (Document, NodeId) {
        let para = Node::paragraph(text);
        let id = para.id();
        (Document::with_blocks(vec![para]), id)
    }

    #[test]
    fn test_set_attr_inverse_restores_absence() {
        let (mut doc, id) = doc_with("hi");
        let original = doc.clone();
        let inverse = Step::set_attr(id, "dir", "rtl").apply(&mut doc).unwrap();
        assert_eq!(doc.get(id).unwrap().attr_str("dir"), Some("rtl"));
        inverse.apply(&mut doc).unwrap();
        assert_eq!(doc, original);
    }

    #[test]
    fn test_insert_and_remove_inline() {
        let (mut doc, id) = doc_with("held");
        let inverse = Step::insert_inline(Position::new(id, 2), vec![Node::text("llo wor")])
            .apply(&mut doc)
            .unwrap();
        assert_eq!(doc.text_content(), "hello world");
        assert_eq!(inverse, Step::remove_inline(id, 2, 9));
        inverse.apply(&mut doc).unwrap();
        assert_eq!(doc.text_content(), "held");
    }

    #[test]
    fn test_remove_node_inverse_keeps_identity() {
        let first = Node::paragraph("a");
        let second = Node::paragraph("b");
        let second_id = second.id();
        let mut doc = Document::with_blocks(vec![first, second]);
        let inverse = Step::remove_node(second_id).apply(&mut doc).unwrap();
        assert!(!doc.contains(second_id));
        inverse.apply(&mut doc).unwrap();
        assert_eq!(doc.parent_of(second_id), Some((doc.root_id(), 1)));
    }

    #[test]
    fn test_mark_inverse() {
        let (mut doc, id) = doc_with("bold me");
        let original = doc.clone();
        let step = Step::AddMark {
            block_id: id,
            from: 0,
            to: 4,
            mark: Mark::new(MarkType::Bold),
        };
        let inverse = step.apply(&mut doc).unwrap();
        assert!(doc.get(id).unwrap().range_has_mark(0, 4, MarkType::Bold));
        inverse.apply(&mut doc).unwrap();
        assert_eq!(doc, original);
    }

    #[test]
    fn test_set_node_type_inverse() {
        let (mut doc, id) = doc_with("title");
        let mut attrs = Attrs::new();
        attrs.insert("level".into(), json!(2));
        let inverse = Step::SetNodeType { node_id: id, node_type: NodeType::Heading, attrs }
            .apply(&mut doc)
            .unwrap();
        assert_eq!(doc.get(id).unwrap().node_type(), NodeType::Heading);
        inverse.apply(&mut doc).unwrap();
        assert_eq!(doc.get(id).unwrap().node_type(), NodeType::Paragraph);
        assert!(doc.get(id).unwrap().attrs().is_empty());
    }

    #[test]
    fn test_missing_node_is_an_error() {
        let (mut doc, _) = doc_with("x");
        let result = Step::remove_node(NodeId::new()).apply(&mut doc);
        assert!(matches!(result, Err(EditError::NodeNotFound(_))));
    }

    #[test]
    fn test_map_position() {
        let id = NodeId::new();
        let insert = Step::insert_inline(Position::new(id, 2), vec![Node::text("abc")]);
        assert_eq!(insert.map_position(Position::new(id, 2)).offset, 5);
        assert_eq!(insert.map_position(Position::new(id, 1)).offset, 1);

        let remove = Step::remove_inline(id, 2, 6);
        assert_eq!(remove.map_position(Position::new(id, 8)).offset, 4);
        assert_eq!(remove.map_position(Position::new(id, 4)).offset, 2);
    }
}
