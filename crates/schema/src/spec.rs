//! Node and mark type descriptors

use crate::{AttributeSpec, DomOutput, RenderedAttrs};
use doc_model::{Attrs, Mark, MarkType, Node, NodeType};
use scraper::ElementRef;
use std::fmt;
use std::sync::Arc;

/// Priority given to parse rules that do not set one
pub const DEFAULT_PRIORITY: i32 = 50;

/// Extra attribute extraction for a parse rule.
///
/// `None` rejects the match so the parser falls through to the next rule;
/// `Some(attrs)` overlays `attrs` on the declared attribute values.
pub type GetAttrs = Arc<dyn Fn(&ElementRef<'_>) -> Option<Attrs> + Send + Sync>;

/// Render rule for a node: receives the merged HTML attributes of its declared attributes
pub type RenderNode = fn(&Node, RenderedAttrs) -> DomOutput;

/// Render rule for a mark; the output must contain a hole for the marked text
pub type RenderMark = fn(&Mark, RenderedAttrs) -> DomOutput;

/// Where a node may appear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeGroup {
    /// Top-level-capable block content
    Block,
    /// Content of textblocks
    Inline,
    /// Only valid inside a specific parent (list items, table rows, ...)
    Structural,
}

/// What a node may contain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentRule {
    /// Leaf / atom
    Empty,
    /// Inline nodes and marked text
    Inline,
    /// Plain text only (code block)
    Text,
    /// Any block-group node, at least `min`
    Blocks { min: usize },
    /// Listed node types only, with cardinality bounds
    Children {
        types: &'static [NodeType],
        min: usize,
        max: Option<usize>,
    },
    /// Root: blocks followed by at most one footnotes container
    DocumentBody,
}

impl ContentRule {
    pub fn is_inline(&self) -> bool {
        matches!(self, ContentRule::Inline | ContentRule::Text)
    }

    pub fn min(&self) -> usize {
        match self {
            ContentRule::Blocks { min } | ContentRule::Children { min, .. } => *min,
            ContentRule::DocumentBody => 1,
            _ => 0,
        }
    }

    pub fn max(&self) -> Option<usize> {
        match self {
            ContentRule::Empty => Some(0),
            ContentRule::Children { max, .. } => *max,
            _ => None,
        }
    }
}

/// One way of recognising a node or mark in HTML
#[derive(Clone)]
pub struct ParseRule {
    pub selector: &'static str,
    pub priority: i32,
    pub get_attrs: Option<GetAttrs>,
}

impl fmt::Debug for ParseRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseRule")
            .field("selector", &self.selector)
            .field("priority", &self.priority)
            .field("get_attrs", &self.get_attrs.is_some())
            .finish()
    }
}

impl ParseRule {
    pub fn new(selector: &'static str) -> Self {
        Self {
            selector,
            priority: DEFAULT_PRIORITY,
            get_attrs: None,
        }
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn get_attrs<F>(mut self, get_attrs: F) -> Self
    where
        F: Fn(&ElementRef<'_>) -> Option<Attrs> + Send + Sync + 'static,
    {
        self.get_attrs = Some(Arc::new(get_attrs));
        self
    }
}

/// Declarative description of a node type
#[derive(Clone)]
pub struct NodeSpec {
    pub node_type: NodeType,
    pub group: NodeGroup,
    pub content: ContentRule,
    pub attributes: Vec<AttributeSpec>,
    pub parse_rules: Vec<ParseRule>,
    pub render: RenderNode,
}

impl fmt::Debug for NodeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeSpec")
            .field("node_type", &self.node_type)
            .field("group", &self.group)
            .field("content", &self.content)
            .field("attributes", &self.attributes)
            .field("parse_rules", &self.parse_rules)
            .finish()
    }
}

impl NodeSpec {
    pub fn new(node_type: NodeType, group: NodeGroup, content: ContentRule, render: RenderNode) -> Self {
        Self {
            node_type,
            group,
            content,
            attributes: Vec::new(),
            parse_rules: Vec::new(),
            render,
        }
    }

    pub fn attribute(mut self, attribute: AttributeSpec) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn parse_rule(mut self, rule: ParseRule) -> Self {
        self.parse_rules.push(rule);
        self
    }

    pub fn is_atom(&self) -> bool {
        self.content == ContentRule::Empty
    }

    /// Declared defaults; null defaults are left out of the map
    pub fn default_attrs(&self) -> Attrs {
        self.attributes
            .iter()
            .filter(|a| !a.default.is_null())
            .map(|a| (a.name.to_string(), a.default.clone()))
            .collect()
    }

    /// Declared attribute values read from `element`, defaults filling the gaps
    pub fn parse_attrs(&self, element: &ElementRef<'_>) -> Attrs {
        self.attributes
            .iter()
            .map(|a| (a.name.to_string(), a.parse_or_default(element)))
            .filter(|(_, v)| !v.is_null())
            .collect()
    }

    /// Merge of every declared attribute's rendered HTML attributes.
    ///
    /// Attributes missing on the node render from their declared default.
    pub fn render_attrs(&self, attrs: &Attrs) -> RenderedAttrs {
        let mut rendered = RenderedAttrs::new();
        for spec in &self.attributes {
            let value = attrs.get(spec.name).unwrap_or(&spec.default);
            rendered.merge((spec.render)(value));
        }
        rendered
    }

    /// Full render of a node to its element descriptor
    pub fn render_node(&self, node: &Node) -> DomOutput {
        (self.render)(node, self.render_attrs(node.attrs()))
    }
}

/// Declarative description of a mark type
#[derive(Clone)]
pub struct MarkSpec {
    pub mark_type: MarkType,
    pub attributes: Vec<AttributeSpec>,
    pub parse_rules: Vec<ParseRule>,
    pub render: RenderMark,
}

impl fmt::Debug for MarkSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkSpec")
            .field("mark_type", &self.mark_type)
            .field("parse_rules", &self.parse_rules)
            .finish()
    }
}

impl MarkSpec {
    pub fn new(mark_type: MarkType, render: RenderMark) -> Self {
        Self {
            mark_type,
            attributes: Vec::new(),
            parse_rules: Vec::new(),
            render,
        }
    }

    pub fn attribute(mut self, attribute: AttributeSpec) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn parse_rule(mut self, rule: ParseRule) -> Self {
        self.parse_rules.push(rule);
        self
    }

    pub fn parse_attrs(&self, element: &ElementRef<'_>) -> Attrs {
        self.attributes
            .iter()
            .map(|a| (a.name.to_string(), a.parse_or_default(element)))
            .filter(|(_, v)| !v.is_null())
            .collect()
    }

    pub fn render_mark(&self, mark: &Mark) -> DomOutput {
        let mut rendered = RenderedAttrs::new();
        for spec in &self.attributes {
            let value = mark.attrs().get(spec.name).unwrap_or(&spec.default);
            rendered.merge((spec.render)(value));
        }
        (self.render)(mark, rendered)
    }
}
