use super::attr_text;
use crate::{html_attr, AttributeSpec, ContentRule, DomOutput, NodeGroup, NodeSpec, ParseRule, RenderedAttrs};
use doc_model::NodeType;
use scraper::ElementRef;
use serde_json::Value;

pub(super) fn specs() -> Vec<NodeSpec> {
    vec![image(), audio(), video(), document_file()]
}

fn media_id() -> AttributeSpec {
    AttributeSpec::string("mediaId", "data-media-id")
}

fn image() -> NodeSpec {
    NodeSpec::new(NodeType::Image, NodeGroup::Block, ContentRule::Empty, |_, attrs| {
        DomOutput::element("img").attrs(attrs).leaf()
    })
    .attribute(AttributeSpec::string("src", "src"))
    .attribute(AttributeSpec::string("alt", "alt"))
    .attribute(AttributeSpec::string("title", "title"))
    .attribute(AttributeSpec::integer("width", "width"))
    .attribute(AttributeSpec::integer("height", "height"))
    .attribute(media_id())
    .attribute(
        AttributeSpec::string("alignment", "data-alignment")
            .default_value("center")
            .parse_with(|el| parse_alignment(el).map(Value::from))
            .render_with(|value| {
                let alignment = value.as_str().unwrap_or("center");
                RenderedAttrs::new()
                    .with("data-alignment", alignment)
                    .with("style", format!("margin: {}", alignment_margin(alignment)))
            }),
    )
    .parse_rule(ParseRule::new("img[src]"))
}

/// Margin shorthand an image alignment renders as
pub fn alignment_margin(alignment: &str) -> &'static str {
    match alignment {
        "left" => "0 auto 0 0",
        "right" => "0 0 0 auto",
        _ => "0 auto",
    }
}

/// Wrapping container marker, then the element's own marker, then the margin style
fn parse_alignment(element: &ElementRef<'_>) -> Option<&'static str> {
    let wrapper = element
        .parent()
        .and_then(ElementRef::wrap)
        .and_then(|parent| html_attr(&parent, "data-alignment"));
    if let Some(alignment) = wrapper.or_else(|| html_attr(element, "data-alignment")) {
        return Some(normalize_alignment(alignment));
    }

    let style = html_attr(element, "style")?;
    let margin = style
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .find(|(prop, _)| prop.trim() == "margin")
        .map(|(_, value)| value.trim())?;
    match margin {
        "0 auto 0 0" => Some("left"),
        "0 0 0 auto" => Some("right"),
        _ => None,
    }
}

fn normalize_alignment(value: &str) -> &'static str {
    match value.trim() {
        "left" => "left",
        "right" => "right",
        _ => "center",
    }
}

fn audio() -> NodeSpec {
    NodeSpec::new(NodeType::Audio, NodeGroup::Block, ContentRule::Empty, |_, attrs| {
        DomOutput::element("audio")
            .attr("data-audio", "")
            .attrs(attrs)
            .attr("controls", "")
            .leaf()
    })
    .attribute(AttributeSpec::string("src", "src"))
    .attribute(AttributeSpec::string("title", "title"))
    .attribute(media_id())
    .parse_rule(ParseRule::new("audio[data-audio]"))
}

fn video() -> NodeSpec {
    NodeSpec::new(NodeType::Video, NodeGroup::Block, ContentRule::Empty, |_, attrs| {
        DomOutput::element("video")
            .attr("data-video", "")
            .attrs(attrs)
            .attr("controls", "")
            .attr("preload", "metadata")
            .leaf()
    })
    .attribute(media_id())
    .attribute(AttributeSpec::string("src", "src"))
    .attribute(AttributeSpec::string("title", "title"))
    .attribute(AttributeSpec::string("poster", "poster"))
    .parse_rule(ParseRule::new("video[data-video]"))
}

/// Document attributes are parsed from `data-*` but written by the node's own render rule
fn document_file() -> NodeSpec {
    NodeSpec::new(NodeType::DocumentFile, NodeGroup::Block, ContentRule::Empty, |node, _| {
        let mut el = DomOutput::element("div").attr("data-document", "");
        for (attr, html) in [
            ("mediaId", "data-media-id"),
            ("src", "data-src"),
            ("title", "data-title"),
            ("fileType", "data-file-type"),
            ("fileSize", "data-file-size"),
        ] {
            if node.attr(attr).is_some() {
                el = el.attr(html, attr_text(node, attr));
            }
        }

        let title = node
            .attr_str("title")
            .filter(|t| !t.is_empty())
            .unwrap_or("Document")
            .to_string();
        let mut link = DomOutput::element("a")
            .attr("href", attr_text(node, "src"))
            .attr("target", "_blank")
            .attr("rel", "noopener noreferrer")
            .child(DomOutput::text(title));
        if let Some(size) = node.attr_i64("fileSize").filter(|s| *s > 0) {
            link = link.child(DomOutput::text(format!(" ({})", format_file_size(size as u64))));
        }
        el.child(link).leaf()
    })
    .attribute(media_id().shadow())
    .attribute(AttributeSpec::string("src", "data-src").shadow())
    .attribute(AttributeSpec::string("title", "data-title").shadow())
    .attribute(AttributeSpec::string("fileType", "data-file-type").shadow())
    .attribute(AttributeSpec::integer("fileSize", "data-file-size").shadow())
    .parse_rule(ParseRule::new("div[data-document]"))
}

/// Human readable byte count: `512 B`, `1.5 KB`, `2.0 MB`
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(1023), "1023 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_alignment_margin() {
        assert_eq!(alignment_margin("left"), "0 auto 0 0");
        assert_eq!(alignment_margin("right"), "0 0 0 auto");
        assert_eq!(alignment_margin("center"), "0 auto");
        assert_eq!(alignment_margin("bogus"), "0 auto");
    }
}
