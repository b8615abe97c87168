use super::span_attribute;
use crate::{ContentRule, DomOutput, NodeGroup, NodeSpec, ParseRule, RenderNode};
use doc_model::NodeType;

const CELL_TYPES: &[NodeType] = &[NodeType::TableCell, NodeType::TableHeader];

pub(super) fn specs() -> Vec<NodeSpec> {
    vec![
        NodeSpec::new(
            NodeType::Table,
            NodeGroup::Block,
            ContentRule::Children { types: &[NodeType::TableRow], min: 1, max: None },
            |_, attrs| {
                DomOutput::element("table")
                    .attrs(attrs)
                    .child(DomOutput::element("tbody").hole())
                    .leaf()
            },
        )
        .parse_rule(ParseRule::new("table")),
        NodeSpec::new(
            NodeType::TableRow,
            NodeGroup::Structural,
            ContentRule::Children { types: CELL_TYPES, min: 1, max: None },
            |_, attrs| DomOutput::element("tr").attrs(attrs).hole(),
        )
        .parse_rule(ParseRule::new("tr")),
        cell(NodeType::TableCell, "td"),
        cell(NodeType::TableHeader, "th"),
    ]
}

fn cell(node_type: NodeType, tag: &'static str) -> NodeSpec {
    let render: RenderNode = if tag == "th" {
        |_, attrs| DomOutput::element("th").attrs(attrs).hole()
    } else {
        |_, attrs| DomOutput::element("td").attrs(attrs).hole()
    };
    NodeSpec::new(node_type, NodeGroup::Structural, ContentRule::Blocks { min: 1 }, render)
        .attribute(span_attribute("colspan", "colspan"))
        .attribute(span_attribute("rowspan", "rowspan"))
        .parse_rule(ParseRule::new(tag))
}
