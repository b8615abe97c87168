use super::attr_text;
use crate::{html_attr, AttributeSpec, ContentRule, DomOutput, NodeGroup, NodeSpec, ParseRule};
use doc_model::{Attrs, NodeType};

/// Class marking the current footnotes list format
pub const FOOTNOTES_CLASS: &str = "footnotes-v2";

pub(super) fn specs() -> Vec<NodeSpec> {
    vec![container(), definition(), reference()]
}

fn container() -> NodeSpec {
    NodeSpec::new(
        NodeType::FootnotesContainer,
        NodeGroup::Structural,
        ContentRule::Children { types: &[NodeType::FootnoteDefinition], min: 0, max: None },
        |_, attrs| {
            DomOutput::element("ol")
                .attr("class", FOOTNOTES_CLASS)
                .attrs(attrs)
                .hole()
        },
    )
    .parse_rule(ParseRule::new("ol.footnotes-v2").priority(100))
}

fn definition() -> NodeSpec {
    NodeSpec::new(
        NodeType::FootnoteDefinition,
        NodeGroup::Structural,
        ContentRule::Children { types: &[NodeType::Paragraph], min: 1, max: None },
        |_, attrs| DomOutput::element("li").attrs(attrs).hole(),
    )
    .attribute(AttributeSpec::string("id", "id"))
    .attribute(AttributeSpec::string("dataId", "data-id"))
    .parse_rule(
        ParseRule::new("li")
            .priority(100)
            .get_attrs(|el| html_attr(el, "data-id").map(|_| Attrs::new())),
    )
}

fn reference() -> NodeSpec {
    NodeSpec::new(NodeType::FootnoteReference, NodeGroup::Inline, ContentRule::Empty, |node, attrs| {
        let number = attr_text(node, "referenceNumber");
        let label = if number.is_empty() { "*".to_string() } else { number.clone() };
        DomOutput::element("sup")
            .attr("class", "footnote-ref")
            .attrs(attrs)
            .child(
                DomOutput::element("a")
                    .attr("href", format!("#fn:{}", number))
                    .attr("id", format!("fnref:{}", number))
                    .child(DomOutput::text(label)),
            )
            .leaf()
    })
    .attribute(AttributeSpec::string("dataId", "data-id"))
    .attribute(AttributeSpec::integer("referenceNumber", "data-reference-number"))
    .parse_rule(
        ParseRule::new("sup.footnote-ref").get_attrs(|el| html_attr(el, "data-id").map(|_| Attrs::new())),
    )
}
