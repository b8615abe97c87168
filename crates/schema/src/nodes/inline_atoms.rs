use super::{attr_text, element_text};
use crate::{html_attr, AttributeSpec, ContentRule, DomOutput, NodeGroup, NodeSpec, ParseRule};
use doc_model::NodeType;
use serde_json::Value;

pub(super) fn specs() -> Vec<NodeSpec> {
    vec![glossary_term(), honorific(), post_reference()]
}

fn glossary_term() -> NodeSpec {
    NodeSpec::new(NodeType::GlossaryTerm, NodeGroup::Inline, ContentRule::Empty, |node, attrs| {
        DomOutput::element("span")
            .attr("data-glossary-term", "")
            .attr("class", "glossary-term")
            .attrs(attrs)
            .child(DomOutput::text(attr_text(node, "term")))
            .leaf()
    })
    .attribute(AttributeSpec::string("termId", "data-term-id"))
    .attribute(AttributeSpec::string("term", "data-term").parse_with(|el| {
        html_attr(el, "data-term")
            .map(str::to_string)
            .or_else(|| element_text(el))
            .map(Value::from)
    }))
    .attribute(AttributeSpec::string("definition", "title"))
    .parse_rule(ParseRule::new("span[data-glossary-term]"))
}

/// Honorific text lives in the element body, not in an attribute
fn honorific() -> NodeSpec {
    NodeSpec::new(NodeType::Honorific, NodeGroup::Inline, ContentRule::Empty, |node, attrs| {
        DomOutput::element("span")
            .attr("data-honorific", "")
            .attr("class", "honorific")
            .attrs(attrs)
            .child(DomOutput::text(attr_text(node, "text")))
            .leaf()
    })
    .attribute(AttributeSpec::string("key", "data-key"))
    .attribute(
        AttributeSpec::string("text", "data-text")
            .parse_with(|el| element_text(el).map(Value::from))
            .shadow(),
    )
    .attribute(AttributeSpec::string("label", "title"))
    .parse_rule(ParseRule::new("span[data-honorific]"))
}

fn post_reference() -> NodeSpec {
    NodeSpec::new(NodeType::DynamicPostReference, NodeGroup::Block, ContentRule::Empty, |node, attrs| {
        let title = attr_text(node, "title");
        DomOutput::element("div")
            .attr("data-post-reference", "")
            .attr("class", "post-reference")
            .attrs(attrs)
            .child(DomOutput::element("span").attr("class", "post-reference-title").child(DomOutput::text(title)))
            .leaf()
    })
    .attribute(AttributeSpec::string("postId", "data-post-id"))
    .attribute(AttributeSpec::string("postType", "data-post-type"))
    .attribute(AttributeSpec::string("title", "data-title"))
    .attribute(AttributeSpec::string("slug", "data-slug"))
    .parse_rule(ParseRule::new("div[data-post-reference]"))
}
