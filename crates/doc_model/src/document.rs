//! Document root and document-level lookups

use crate::{DocModelError, Node, NodeId, NodeType, Position, Result};
use serde::{Deserialize, Serialize};

/// The document being edited: a `doc` root node plus a change counter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    root: Node,
    #[serde(skip)]
    version: u64,
}

impl Document {
    /// A document holding a single empty paragraph
    pub fn new() -> Self {
        Self {
            root: Node::new(NodeType::Doc).with_content(vec![Node::paragraph("")]),
            version: 0,
        }
    }

    /// Wrap top-level blocks in a `doc` root
    pub fn with_blocks(blocks: Vec<Node>) -> Self {
        Self {
            root: Node::new(NodeType::Doc).with_content(blocks),
            version: 0,
        }
    }

    pub fn from_root(root: Node) -> Result<Self> {
        if root.node_type() != NodeType::Doc {
            return Err(DocModelError::InvalidOperation(format!(
                "document root must be doc, got {}",
                root.node_type()
            )));
        }
        Ok(Self { root, version: 0 })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let root: Node = serde_json::from_str(json)?;
        Self::from_root(root)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.root)?)
    }

    pub fn to_json_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(&self.root)?)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    pub fn root_id(&self) -> NodeId {
        self.root.id()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn increment_version(&mut self) {
        self.version += 1;
    }

    pub fn blocks(&self) -> &[Node] {
        self.root.content()
    }

    pub fn find(&self, id: NodeId) -> Option<&Node> {
        self.root.find(id)
    }

    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.root.find_mut(id)
    }

    pub fn get(&self, id: NodeId) -> Result<&Node> {
        self.find(id).ok_or(DocModelError::NodeNotFound(id))
    }

    pub fn get_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.find_mut(id).ok_or(DocModelError::NodeNotFound(id))
    }

    /// Parent id and child index of `id`
    pub fn parent_of(&self, id: NodeId) -> Option<(NodeId, usize)> {
        self.root
            .find_parent(id)
            .map(|(parent, index)| (parent.id(), index))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.find(id).is_some()
    }

    /// Every node of the given type, in document order
    pub fn nodes_of_type(&self, node_type: NodeType) -> Vec<&Node> {
        self.root
            .descendants()
            .filter(|n| n.node_type() == node_type)
            .collect()
    }

    /// The single footnotes container, if present
    pub fn footnotes_container(&self) -> Option<&Node> {
        self.blocks()
            .iter()
            .find(|n| n.node_type() == NodeType::FootnotesContainer)
    }

    pub fn first_textblock(&self) -> Option<NodeId> {
        self.root
            .descendants()
            .find(|n| n.is_textblock())
            .map(Node::id)
    }

    /// Last textblock inside the subtree rooted at `id`
    pub fn last_textblock_in(&self, id: NodeId) -> Option<NodeId> {
        self.find(id)?
            .descendants()
            .filter(|n| n.is_textblock())
            .last()
            .map(Node::id)
    }

    /// Position immediately after an inline node, inside its textblock
    pub fn position_after_inline(&self, id: NodeId) -> Option<Position> {
        let (parent, index) = self.root.find_parent(id)?;
        if !parent.is_textblock() {
            return None;
        }
        let offset: usize = parent.content()[..=index]
            .iter()
            .map(Node::inline_size)
            .sum();
        Some(Position::new(parent.id(), offset))
    }

    /// Position at the end of a textblock
    pub fn end_of(&self, id: NodeId) -> Option<Position> {
        let node = self.find(id)?;
        node.is_textblock()
            .then(|| Position::new(id, node.inline_len()))
    }

    pub fn text_content(&self) -> String {
        self.root.text_content()
    }
}

/// Documents compare by content; the change counter is ignored
impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
