use crate::{AttributeSpec, ContentRule, DomOutput, NodeGroup, NodeSpec, ParseRule};
use doc_model::NodeType;

pub(super) fn specs() -> Vec<NodeSpec> {
    vec![
        NodeSpec::new(
            NodeType::Layout,
            NodeGroup::Block,
            ContentRule::Children { types: &[NodeType::LayoutColumn], min: 1, max: None },
            |node, attrs| {
                let columns = node.attr_i64("columns").unwrap_or(2).max(1);
                DomOutput::element("div")
                    .attr("data-layout", "")
                    .attrs(attrs)
                    .attr(
                        "style",
                        format!("display: grid; grid-template-columns: repeat({}, 1fr); gap: 1rem", columns),
                    )
                    .hole()
            },
        )
        .attribute(AttributeSpec::integer("columns", "data-columns").default_value(2))
        .parse_rule(ParseRule::new("div[data-layout]")),
        NodeSpec::new(
            NodeType::LayoutColumn,
            NodeGroup::Structural,
            ContentRule::Blocks { min: 1 },
            |_, attrs| {
                DomOutput::element("div")
                    .attr("data-layout-column", "")
                    .attrs(attrs)
                    .hole()
            },
        )
        .parse_rule(ParseRule::new("div[data-layout-column]")),
    ]
}
