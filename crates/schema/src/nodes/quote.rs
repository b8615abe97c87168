use super::{attr_text, element_text};
use crate::{html_attr, AttributeSpec, ContentRule, DomOutput, NodeGroup, NodeSpec, ParseRule, RenderedAttrs};
use doc_model::NodeType;
use scraper::ElementRef;
use serde_json::Value;

/// The only quote type written; legacy documents used `quote-with-translation`
pub const QUOTE_TYPE: &str = "quote";

pub(super) fn specs() -> Vec<NodeSpec> {
    vec![quote(), translation()]
}

fn quote() -> NodeSpec {
    NodeSpec::new(
        NodeType::Quote,
        NodeGroup::Block,
        ContentRule::Children { types: &[NodeType::QuoteTranslation], min: 0, max: Some(1) },
        |node, attrs| {
            let mut el = DomOutput::element("blockquote")
                .attr("class", "quote")
                .attrs(attrs)
                .child(
                    DomOutput::element("p")
                        .attr("class", "quote-original")
                        .child(DomOutput::text(attr_text(node, "original"))),
                )
                .child(DomOutput::Hole);
            if let Some(label) = node.attr_str("sourceLabel").filter(|l| !l.is_empty()) {
                let cite = match node.attr_str("sourceUrl").filter(|u| !u.is_empty()) {
                    Some(url) => DomOutput::element("cite").child(
                        DomOutput::element("a")
                            .attr("href", url)
                            .attr("target", "_blank")
                            .attr("rel", "noopener noreferrer")
                            .child(DomOutput::text(label)),
                    ),
                    None => DomOutput::element("cite").child(DomOutput::text(label)),
                };
                el = el.child(cite);
            }
            el.leaf()
        },
    )
    .attribute(AttributeSpec::string("original", "data-original").parse_with(|el| {
        html_attr(el, "data-original")
            .map(str::to_string)
            .or_else(|| original_paragraph(el))
            .map(Value::from)
    }))
    .attribute(AttributeSpec::string("translation", "data-translation"))
    .attribute(AttributeSpec::string("sourceLabel", "data-source-label"))
    .attribute(AttributeSpec::string("sourceUrl", "data-source-url"))
    .attribute(
        AttributeSpec::string("quoteType", "data-quote-type")
            .default_value(QUOTE_TYPE)
            .parse_with(|_| Some(Value::from(QUOTE_TYPE)))
            .render_with(|_| RenderedAttrs::new().with("data-quote-type", QUOTE_TYPE)),
    )
    .attribute(AttributeSpec::string("styleType", "data-style").default_value("prose"))
    .attribute(AttributeSpec::internal("autoOpen", false))
    .parse_rule(ParseRule::new(r#"blockquote[data-quote-type="quote"]"#).priority(60))
    .parse_rule(ParseRule::new(r#"blockquote[data-quote-type="quote-with-translation"]"#).priority(60))
}

/// Older markup kept the quoted text only in the `p.quote-original` child
fn original_paragraph(element: &ElementRef<'_>) -> Option<String> {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| {
            child.value().name() == "p" && child.value().classes().any(|c| c == "quote-original")
        })
        .and_then(|p| element_text(&p))
}

fn translation() -> NodeSpec {
    NodeSpec::new(
        NodeType::QuoteTranslation,
        NodeGroup::Structural,
        ContentRule::Children { types: &[NodeType::Paragraph], min: 1, max: None },
        |_, attrs| {
            DomOutput::element("div")
                .attr("data-quote-translation", "")
                .attr("class", "quote-translation")
                .attrs(attrs)
                .hole()
        },
    )
    .parse_rule(ParseRule::new("div[data-quote-translation]"))
}
