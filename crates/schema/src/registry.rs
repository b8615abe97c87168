//! Schema registry: one dispatch table from node/mark type to its descriptor

use crate::{marks, nodes, ContentRule, MarkSpec, NodeGroup, NodeSpec, ParseRule, Result, SchemaError};
use doc_model::{Attrs, Document, MarkType, Node, NodeType};
use scraper::Selector;
use std::cmp::Reverse;
use std::collections::HashMap;
use tracing::debug;

/// What a compiled parse rule produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RuleTarget {
    Node(NodeType),
    Mark(MarkType),
}

/// A parse rule with its selector parsed once at build time
#[derive(Debug, Clone)]
pub(crate) struct CompiledRule {
    pub target: RuleTarget,
    pub selector: Selector,
    pub rule: ParseRule,
}

/// Collects node and mark descriptors and builds a [`SchemaRegistry`]
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    nodes: Vec<NodeSpec>,
    marks: Vec<MarkSpec>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(mut self, spec: NodeSpec) -> Self {
        self.nodes.push(spec);
        self
    }

    pub fn nodes(mut self, specs: impl IntoIterator<Item = NodeSpec>) -> Self {
        self.nodes.extend(specs);
        self
    }

    pub fn mark(mut self, spec: MarkSpec) -> Self {
        self.marks.push(spec);
        self
    }

    pub fn marks(mut self, specs: impl IntoIterator<Item = MarkSpec>) -> Self {
        self.marks.extend(specs);
        self
    }

    /// Validate the descriptors and compile every parse rule.
    ///
    /// Rules are ordered by descending priority; equal priorities keep
    /// registration order.
    pub fn build(self) -> Result<SchemaRegistry> {
        let mut nodes = HashMap::new();
        let mut node_rules = Vec::new();
        for spec in self.nodes {
            for rule in &spec.parse_rules {
                node_rules.push(compile(RuleTarget::Node(spec.node_type), rule)?);
            }
            let node_type = spec.node_type;
            if nodes.insert(node_type, spec).is_some() {
                return Err(SchemaError::DuplicateNodeType(node_type));
            }
        }

        for spec in nodes.values() {
            if let ContentRule::Children { types, .. } = &spec.content {
                if let Some(missing) = types.iter().find(|t| !nodes.contains_key(*t)) {
                    return Err(SchemaError::UnknownNodeType(*missing));
                }
            }
        }
        for required in [NodeType::Doc, NodeType::Text, NodeType::Paragraph] {
            if !nodes.contains_key(&required) {
                return Err(SchemaError::UnknownNodeType(required));
            }
        }

        let mut marks = HashMap::new();
        let mut mark_rules = Vec::new();
        for spec in self.marks {
            for rule in &spec.parse_rules {
                mark_rules.push(compile(RuleTarget::Mark(spec.mark_type), rule)?);
            }
            marks.insert(spec.mark_type, spec);
        }

        node_rules.sort_by_key(|r| Reverse(r.rule.priority));
        mark_rules.sort_by_key(|r| Reverse(r.rule.priority));

        debug!(
            nodes = nodes.len(),
            marks = marks.len(),
            rules = node_rules.len() + mark_rules.len(),
            "schema built"
        );

        Ok(SchemaRegistry {
            nodes,
            marks,
            node_rules,
            mark_rules,
        })
    }
}

fn compile(target: RuleTarget, rule: &ParseRule) -> Result<CompiledRule> {
    let selector = Selector::parse(rule.selector).map_err(|e| SchemaError::InvalidSelector {
        selector: rule.selector.to_string(),
        message: format!("{:?}", e),
    })?;
    Ok(CompiledRule {
        target,
        selector,
        rule: rule.clone(),
    })
}

/// The editor schema with every built-in node and mark registered
pub fn default_schema() -> Result<SchemaRegistry> {
    SchemaBuilder::new()
        .nodes(nodes::node_specs())
        .marks(marks::mark_specs())
        .build()
}

/// Immutable schema: descriptors keyed by type plus compiled parse rules
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    nodes: HashMap<NodeType, NodeSpec>,
    marks: HashMap<MarkType, MarkSpec>,
    node_rules: Vec<CompiledRule>,
    mark_rules: Vec<CompiledRule>,
}

impl SchemaRegistry {
    pub fn spec(&self, node_type: NodeType) -> Option<&NodeSpec> {
        self.nodes.get(&node_type)
    }

    pub fn mark_spec(&self, mark_type: MarkType) -> Option<&MarkSpec> {
        self.marks.get(&mark_type)
    }

    pub fn is_registered(&self, node_type: NodeType) -> bool {
        self.nodes.contains_key(&node_type)
    }

    pub(crate) fn node_rules(&self) -> &[CompiledRule] {
        &self.node_rules
    }

    pub(crate) fn mark_rules(&self) -> &[CompiledRule] {
        &self.mark_rules
    }

    pub fn group(&self, node_type: NodeType) -> Option<NodeGroup> {
        self.spec(node_type).map(|s| s.group)
    }

    /// Whether `child` may appear directly inside `parent`
    pub fn allows(&self, parent: NodeType, child: NodeType) -> bool {
        let (Some(parent_spec), Some(child_spec)) = (self.spec(parent), self.spec(child)) else {
            return false;
        };
        match &parent_spec.content {
            ContentRule::Empty => false,
            ContentRule::Inline => child_spec.group == NodeGroup::Inline,
            ContentRule::Text => child == NodeType::Text,
            ContentRule::Blocks { .. } => child_spec.group == NodeGroup::Block,
            ContentRule::Children { types, .. } => types.contains(&child),
            ContentRule::DocumentBody => {
                child_spec.group == NodeGroup::Block || child == NodeType::FootnotesContainer
            }
        }
    }

    pub fn default_attrs(&self, node_type: NodeType) -> Attrs {
        self.spec(node_type)
            .map(NodeSpec::default_attrs)
            .unwrap_or_default()
    }

    /// A node with declared defaults overlaid by `attrs`
    pub fn node(&self, node_type: NodeType, attrs: Attrs) -> Result<Node> {
        let spec = self
            .spec(node_type)
            .ok_or(SchemaError::UnknownNodeType(node_type))?;
        let mut all = spec.default_attrs();
        all.extend(attrs);
        Ok(Node::new(node_type).with_attrs(all))
    }

    /// Like [`node`](Self::node), with the minimum required content filled in
    pub fn create_and_fill(&self, node_type: NodeType, attrs: Attrs) -> Result<Node> {
        let mut node = self.node(node_type, attrs)?;
        self.fill_required(&mut node)?;
        Ok(node)
    }

    /// Append default children until the node's minimum child count is met
    pub(crate) fn fill_required(&self, node: &mut Node) -> Result<()> {
        let Some(spec) = self.spec(node.node_type()) else {
            return Ok(());
        };
        let filler = match &spec.content {
            ContentRule::Blocks { .. } | ContentRule::DocumentBody => NodeType::Paragraph,
            ContentRule::Children { types, .. } => match types.first() {
                Some(first) => *first,
                None => return Ok(()),
            },
            _ => return Ok(()),
        };
        while node.child_count() < spec.content.min() {
            let child = self.create_and_fill(filler, Attrs::new())?;
            node.content_mut().push(child);
        }
        Ok(())
    }

    /// Validate every content constraint in the document
    pub fn check(&self, doc: &Document) -> Result<()> {
        self.check_node(doc.root())
    }

    fn check_node(&self, node: &Node) -> Result<()> {
        let node_type = node.node_type();
        let spec = self
            .spec(node_type)
            .ok_or(SchemaError::UnknownNodeType(node_type))?;

        for child in node.content() {
            if !self.allows(node_type, child.node_type()) {
                return Err(SchemaError::ContentNotAllowed {
                    parent: node_type,
                    child: child.node_type(),
                });
            }
        }

        let mut found = node.child_count();
        if spec.content == ContentRule::DocumentBody {
            let containers: Vec<usize> = node
                .content()
                .iter()
                .enumerate()
                .filter(|(_, n)| n.node_type() == NodeType::FootnotesContainer)
                .map(|(i, _)| i)
                .collect();
            let misplaced = containers.len() > 1
                || containers.first().is_some_and(|i| *i + 1 != node.child_count());
            if misplaced {
                return Err(SchemaError::ContentNotAllowed {
                    parent: node_type,
                    child: NodeType::FootnotesContainer,
                });
            }
            found -= containers.len();
        }

        let min = spec.content.min();
        let max = spec.content.max();
        if found < min || max.is_some_and(|m| found > m) {
            let expected = match max {
                Some(max) => format!("{}..={}", min, max),
                None => format!("at least {}", min),
            };
            return Err(SchemaError::ChildCount {
                node_type,
                found,
                expected,
            });
        }

        if node_type == NodeType::Text && node.text_value().is_none() {
            return Err(SchemaError::ChildCount {
                node_type,
                found: 0,
                expected: "text".to_string(),
            });
        }

        node.content().iter().try_for_each(|child| self.check_node(child))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DomOutput;
    use serde_json::Value;

    fn schema() -> SchemaRegistry {
        default_schema().unwrap()
    }

    #[test]
    fn test_every_node_type_registered() {
        let schema = schema();
        for node_type in NodeType::ALL {
            assert!(schema.is_registered(node_type), "{}", node_type);
        }
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let result = SchemaBuilder::new()
            .nodes(nodes::node_specs())
            .node(NodeSpec::new(NodeType::Paragraph, NodeGroup::Block, ContentRule::Inline, |_, a| {
                DomOutput::element("p").attrs(a).hole()
            }))
            .build();
        assert!(matches!(result, Err(SchemaError::DuplicateNodeType(NodeType::Paragraph))));
    }

    #[test]
    fn test_invalid_selector_rejected() {
        let result = SchemaBuilder::new()
            .nodes(nodes::node_specs())
            .mark(
                MarkSpec::new(MarkType::Bold, |_, a| DomOutput::element("b").attrs(a).hole())
                    .parse_rule(ParseRule::new("b[[")),
            )
            .build();
        assert!(matches!(result, Err(SchemaError::InvalidSelector { .. })));
    }

    #[test]
    fn test_rules_sorted_by_priority_then_registration() {
        let schema = schema();
        let li_rules: Vec<_> = schema
            .node_rules()
            .iter()
            .filter(|r| r.rule.selector == "li")
            .map(|r| r.target)
            .collect();
        assert_eq!(
            li_rules,
            vec![
                RuleTarget::Node(NodeType::FootnoteDefinition),
                RuleTarget::Node(NodeType::ListItem)
            ]
        );
        let priorities: Vec<i32> = schema.node_rules().iter().map(|r| r.rule.priority).collect();
        assert!(priorities.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_allows() {
        let schema = schema();
        assert!(schema.allows(NodeType::Doc, NodeType::Paragraph));
        assert!(schema.allows(NodeType::Doc, NodeType::FootnotesContainer));
        assert!(!schema.allows(NodeType::Doc, NodeType::ListItem));
        assert!(schema.allows(NodeType::Paragraph, NodeType::FootnoteReference));
        assert!(!schema.allows(NodeType::Paragraph, NodeType::Image));
        assert!(schema.allows(NodeType::Quote, NodeType::QuoteTranslation));
        assert!(!schema.allows(NodeType::Quote, NodeType::Paragraph));
        assert!(!schema.allows(NodeType::FootnotesContainer, NodeType::ListItem));
        assert!(schema.allows(NodeType::CodeBlock, NodeType::Text));
        assert!(!schema.allows(NodeType::CodeBlock, NodeType::HardBreak));
    }

    #[test]
    fn test_node_applies_defaults() {
        let schema = schema();
        let image = schema.node(NodeType::Image, Attrs::new()).unwrap();
        assert_eq!(image.attr_str("alignment"), Some("center"));
        let quote = schema.node(NodeType::Quote, Attrs::new()).unwrap();
        assert_eq!(quote.attr_str("styleType"), Some("prose"));
        assert_eq!(quote.attr_str("quoteType"), Some("quote"));
        assert_eq!(quote.attrs().get("autoOpen"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_create_and_fill_table() {
        let schema = schema();
        let table = schema.create_and_fill(NodeType::Table, Attrs::new()).unwrap();
        let row = table.child(0).unwrap();
        assert_eq!(row.node_type(), NodeType::TableRow);
        let cell = row.child(0).unwrap();
        assert_eq!(cell.node_type(), NodeType::TableCell);
        assert_eq!(cell.child(0).unwrap().node_type(), NodeType::Paragraph);
    }

    #[test]
    fn test_check_accepts_valid_document() {
        let schema = schema();
        let doc = Document::with_blocks(vec![
            Node::paragraph("body"),
            Node::new(NodeType::Quote).with_content(vec![
                Node::new(NodeType::QuoteTranslation).with_content(vec![Node::paragraph("t")])
            ]),
            Node::new(NodeType::FootnotesContainer),
        ]);
        schema.check(&doc).unwrap();
    }

    #[test]
    fn test_check_rejects_two_translations() {
        let schema = schema();
        let translation = || Node::new(NodeType::QuoteTranslation).with_content(vec![Node::paragraph("t")]);
        let doc = Document::with_blocks(vec![
            Node::new(NodeType::Quote).with_content(vec![translation(), translation()])
        ]);
        assert!(matches!(
            schema.check(&doc),
            Err(SchemaError::ChildCount { node_type: NodeType::Quote, found: 2, .. })
        ));
    }

    #[test]
    fn test_check_rejects_container_before_blocks() {
        let schema = schema();
        let doc = Document::with_blocks(vec![
            Node::new(NodeType::FootnotesContainer),
            Node::paragraph("after"),
        ]);
        assert!(matches!(
            schema.check(&doc),
            Err(SchemaError::ContentNotAllowed { child: NodeType::FootnotesContainer, .. })
        ));
    }

    #[test]
    fn test_check_rejects_empty_document() {
        let schema = schema();
        let doc = Document::with_blocks(vec![Node::new(NodeType::FootnotesContainer)]);
        assert!(schema.check(&doc).is_err());
    }

    #[test]
    fn test_check_rejects_definition_outside_container() {
        let schema = schema();
        let doc = Document::with_blocks(vec![Node::new(NodeType::FootnoteDefinition)
            .with_content(vec![Node::paragraph("x")])]);
        assert!(matches!(
            schema.check(&doc),
            Err(SchemaError::ContentNotAllowed { child: NodeType::FootnoteDefinition, .. })
        ));
    }
}
