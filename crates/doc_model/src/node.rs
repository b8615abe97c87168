//! Node types and the document tree node

use crate::{Mark, NodeId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Attribute map of a node or mark. Values are JSON scalars (or null).
pub type Attrs = BTreeMap<String, Value>;

/// Enumeration of all node types in the document tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
    Doc,
    Paragraph,
    Heading,
    Text,
    HardBreak,
    BulletList,
    OrderedList,
    ListItem,
    CodeBlock,
    Blockquote,
    Table,
    TableRow,
    TableCell,
    TableHeader,
    Image,
    Audio,
    Video,
    DocumentFile,
    Layout,
    LayoutColumn,
    FootnotesContainer,
    FootnoteDefinition,
    FootnoteReference,
    Quote,
    QuoteTranslation,
    GlossaryTerm,
    DynamicPostReference,
    Honorific,
}

impl NodeType {
    pub const ALL: [NodeType; 28] = [
        NodeType::Doc,
        NodeType::Paragraph,
        NodeType::Heading,
        NodeType::Text,
        NodeType::HardBreak,
        NodeType::BulletList,
        NodeType::OrderedList,
        NodeType::ListItem,
        NodeType::CodeBlock,
        NodeType::Blockquote,
        NodeType::Table,
        NodeType::TableRow,
        NodeType::TableCell,
        NodeType::TableHeader,
        NodeType::Image,
        NodeType::Audio,
        NodeType::Video,
        NodeType::DocumentFile,
        NodeType::Layout,
        NodeType::LayoutColumn,
        NodeType::FootnotesContainer,
        NodeType::FootnoteDefinition,
        NodeType::FootnoteReference,
        NodeType::Quote,
        NodeType::QuoteTranslation,
        NodeType::GlossaryTerm,
        NodeType::DynamicPostReference,
        NodeType::Honorific,
    ];

    /// Name used in the JSON tree
    pub fn name(&self) -> &'static str {
        match self {
            NodeType::Doc => "doc",
            NodeType::Paragraph => "paragraph",
            NodeType::Heading => "heading",
            NodeType::Text => "text",
            NodeType::HardBreak => "hardBreak",
            NodeType::BulletList => "bulletList",
            NodeType::OrderedList => "orderedList",
            NodeType::ListItem => "listItem",
            NodeType::CodeBlock => "codeBlock",
            NodeType::Blockquote => "blockquote",
            NodeType::Table => "table",
            NodeType::TableRow => "tableRow",
            NodeType::TableCell => "tableCell",
            NodeType::TableHeader => "tableHeader",
            NodeType::Image => "image",
            NodeType::Audio => "audio",
            NodeType::Video => "video",
            NodeType::DocumentFile => "documentFile",
            NodeType::Layout => "layout",
            NodeType::LayoutColumn => "layoutColumn",
            NodeType::FootnotesContainer => "footnotesContainer",
            NodeType::FootnoteDefinition => "footnoteDefinition",
            NodeType::FootnoteReference => "footnoteReference",
            NodeType::Quote => "quote",
            NodeType::QuoteTranslation => "quoteTranslation",
            NodeType::GlossaryTerm => "glossaryTerm",
            NodeType::DynamicPostReference => "dynamicPostReference",
            NodeType::Honorific => "honorific",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == name)
    }

    /// Inline nodes live inside textblocks and occupy offsets there
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            NodeType::Text
                | NodeType::HardBreak
                | NodeType::FootnoteReference
                | NodeType::GlossaryTerm
                | NodeType::Honorific
        )
    }

    /// Blocks whose content is inline
    pub fn is_textblock(&self) -> bool {
        matches!(self, NodeType::Paragraph | NodeType::Heading | NodeType::CodeBlock)
    }

    /// Nodes that never hold children
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            NodeType::Text
                | NodeType::HardBreak
                | NodeType::Image
                | NodeType::Audio
                | NodeType::Video
                | NodeType::DocumentFile
                | NodeType::FootnoteReference
                | NodeType::GlossaryTerm
                | NodeType::DynamicPostReference
                | NodeType::Honorific
        )
    }

    /// Nodes that reference an asset in the external media library
    pub fn is_media(&self) -> bool {
        matches!(
            self,
            NodeType::Image | NodeType::Audio | NodeType::Video | NodeType::DocumentFile
        )
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A node in the document tree.
///
/// The same struct represents blocks, inline atoms and text; `text` and
/// `marks` are only populated on [`NodeType::Text`] nodes. Equality ignores
/// the session id so that trees can be compared by content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    #[serde(skip)]
    id: NodeId,
    #[serde(rename = "type")]
    node_type: NodeType,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attrs: Attrs,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    content: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    marks: Vec<Mark>,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.node_type == other.node_type
            && self.attrs == other.attrs
            && self.content == other.content
            && self.text == other.text
            && self.marks == other.marks
    }
}

impl Node {
    pub fn new(node_type: NodeType) -> Self {
        Self {
            id: NodeId::new(),
            node_type,
            attrs: Attrs::new(),
            content: Vec::new(),
            text: None,
            marks: Vec::new(),
        }
    }

    /// Create a text node
    pub fn text(text: impl Into<String>) -> Self {
        let mut node = Self::new(NodeType::Text);
        node.text = Some(text.into());
        node
    }

    /// Create a text node carrying marks
    pub fn marked_text(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        let mut node = Self::text(text);
        node.set_marks(marks);
        node
    }

    /// Create a paragraph holding a single text node (or nothing for "")
    pub fn paragraph(text: impl Into<String>) -> Self {
        let text = text.into();
        let node = Self::new(NodeType::Paragraph);
        if text.is_empty() {
            node
        } else {
            node.with_content(vec![Self::text(text)])
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs.extend(attrs);
        self
    }

    pub fn with_content(mut self, content: Vec<Node>) -> Self {
        self.content = content;
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.content.push(child);
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    pub fn is_textblock(&self) -> bool {
        self.node_type.is_textblock()
    }

    /// Change the type in place, keeping identity and content
    pub fn set_node_type(&mut self, node_type: NodeType) {
        self.node_type = node_type;
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn set_attrs(&mut self, attrs: Attrs) {
        self.attrs = attrs;
    }

    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name).filter(|v| !v.is_null())
    }

    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attr(name).and_then(Value::as_str)
    }

    pub fn attr_i64(&self, name: &str) -> Option<i64> {
        self.attr(name).and_then(Value::as_i64)
    }

    pub fn attr_bool(&self, name: &str) -> bool {
        self.attr(name).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Set an attribute, returning the previous value (null if absent).
    /// Setting null removes the attribute.
    pub fn set_attr(&mut self, name: impl Into<String>, value: Value) -> Value {
        let name = name.into();
        let previous = if value.is_null() {
            self.attrs.remove(&name)
        } else {
            self.attrs.insert(name, value)
        };
        previous.unwrap_or(Value::Null)
    }

    pub fn content(&self) -> &[Node] {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut Vec<Node> {
        &mut self.content
    }

    pub fn child_count(&self) -> usize {
        self.content.len()
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.content.get(index)
    }

    pub fn text_value(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub(crate) fn text_mut(&mut self) -> Option<&mut String> {
        self.text.as_mut()
    }

    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    /// Replace the marks of a text node, keeping them in canonical order
    pub fn set_marks(&mut self, mut marks: Vec<Mark>) {
        marks.sort_by_key(|m| m.mark_type());
        marks.dedup_by(|a, b| a.mark_type() == b.mark_type());
        self.marks = marks;
    }

    /// Concatenated text of every descendant text node
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in &self.content {
            child.collect_text(out);
        }
    }

    /// Number of offsets this node occupies inside a textblock
    pub fn inline_size(&self) -> usize {
        match &self.text {
            Some(text) => text.chars().count(),
            None => 1,
        }
    }

    /// Pre-order (document order) iterator over this node and its descendants
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    pub fn find(&self, id: NodeId) -> Option<&Node> {
        self.descendants().find(|n| n.id == id)
    }

    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if self.id == id {
            return Some(self);
        }
        self.content.iter_mut().find_map(|child| child.find_mut(id))
    }

    /// Locate the parent of `id` and the child index within it
    pub fn find_parent(&self, id: NodeId) -> Option<(&Node, usize)> {
        for (index, child) in self.content.iter().enumerate() {
            if child.id == id {
                return Some((self, index));
            }
            if let Some(found) = child.find_parent(id) {
                return Some(found);
            }
        }
        None
    }

    /// Deep copy with fresh ids for this node and every descendant
    pub fn fresh_copy(&self) -> Node {
        let mut copy = self.clone();
        copy.refresh_ids();
        copy
    }

    fn refresh_ids(&mut self) {
        self.id = NodeId::new();
        for child in &mut self.content {
            child.refresh_ids();
        }
    }
}

/// Iterator returned by [`Node::descendants`]
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.content.iter().rev());
        Some(node)
    }
}
