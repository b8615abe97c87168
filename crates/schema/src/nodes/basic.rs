use super::{dir_attribute, span_attribute};
use crate::{html_attr, AttributeSpec, ContentRule, DomOutput, NodeGroup, NodeSpec, ParseRule};
use doc_model::NodeType;
use serde_json::Value;

pub(super) fn specs() -> Vec<NodeSpec> {
    vec![
        NodeSpec::new(NodeType::Doc, NodeGroup::Structural, ContentRule::DocumentBody, |_, _| {
            DomOutput::Hole
        }),
        NodeSpec::new(NodeType::Text, NodeGroup::Inline, ContentRule::Empty, |node, _| {
            DomOutput::text(node.text_value().unwrap_or_default())
        }),
        NodeSpec::new(NodeType::Paragraph, NodeGroup::Block, ContentRule::Inline, |_, attrs| {
            DomOutput::element("p").attrs(attrs).hole()
        })
        .attribute(dir_attribute())
        .parse_rule(ParseRule::new("p")),
        heading(),
        NodeSpec::new(NodeType::HardBreak, NodeGroup::Inline, ContentRule::Empty, |_, _| {
            DomOutput::element("br").leaf()
        })
        .parse_rule(ParseRule::new("br")),
        NodeSpec::new(
            NodeType::BulletList,
            NodeGroup::Block,
            ContentRule::Children { types: &[NodeType::ListItem], min: 1, max: None },
            |_, attrs| DomOutput::element("ul").attrs(attrs).hole(),
        )
        .parse_rule(ParseRule::new("ul")),
        NodeSpec::new(
            NodeType::OrderedList,
            NodeGroup::Block,
            ContentRule::Children { types: &[NodeType::ListItem], min: 1, max: None },
            |_, attrs| DomOutput::element("ol").attrs(attrs).hole(),
        )
        .attribute(span_attribute("start", "start"))
        .parse_rule(ParseRule::new("ol")),
        NodeSpec::new(
            NodeType::ListItem,
            NodeGroup::Structural,
            ContentRule::Blocks { min: 1 },
            |_, attrs| DomOutput::element("li").attrs(attrs).hole(),
        )
        .parse_rule(ParseRule::new("li")),
        code_block(),
        NodeSpec::new(
            NodeType::Blockquote,
            NodeGroup::Block,
            ContentRule::Blocks { min: 1 },
            |_, attrs| DomOutput::element("blockquote").attrs(attrs).hole(),
        )
        .parse_rule(ParseRule::new("blockquote").priority(40)),
    ]
}

fn heading() -> NodeSpec {
    let spec = NodeSpec::new(NodeType::Heading, NodeGroup::Block, ContentRule::Inline, |node, attrs| {
        let level = node.attr_i64("level").unwrap_or(1).clamp(1, 6);
        DomOutput::element(format!("h{}", level)).attrs(attrs).hole()
    })
    .attribute(
        AttributeSpec::internal("level", 1).parse_with(|el| {
            el.value().name()[1..]
                .parse::<i64>()
                .ok()
                .map(Value::from)
        }),
    )
    .attribute(dir_attribute());

    ["h1", "h2", "h3", "h4", "h5", "h6"]
        .into_iter()
        .fold(spec, |spec, tag| spec.parse_rule(ParseRule::new(tag)))
}

fn code_block() -> NodeSpec {
    NodeSpec::new(NodeType::CodeBlock, NodeGroup::Block, ContentRule::Text, |node, attrs| {
        let code = match node.attr_str("language") {
            Some(language) => DomOutput::element("code").attr("class", format!("language-{}", language)),
            None => DomOutput::element("code"),
        };
        DomOutput::element("pre").attrs(attrs).child(code.hole()).leaf()
    })
    .attribute(
        AttributeSpec::string("language", "data-language")
            .parse_with(|el| {
                let from_code = el
                    .children()
                    .filter_map(scraper::ElementRef::wrap)
                    .find(|child| child.value().name() == "code")
                    .and_then(|code| {
                        code.value()
                            .classes()
                            .find_map(|class| class.strip_prefix("language-"))
                            .map(str::to_string)
                    });
                from_code
                    .or_else(|| html_attr(el, "data-language").map(str::to_string))
                    .map(Value::from)
            })
            .shadow(),
    )
    .parse_rule(ParseRule::new("pre"))
}
