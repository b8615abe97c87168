//! Node type descriptors, one module per family of node types

mod basic;
mod footnote;
mod inline_atoms;
mod layout;
mod media;
mod quote;
mod table;

pub use media::format_file_size;

use crate::{html_attr, render_plain, AttributeSpec, NodeSpec, RenderedAttrs};
use scraper::ElementRef;
use serde_json::Value;

/// Descriptors for every node type, in registration order
pub fn node_specs() -> Vec<NodeSpec> {
    let mut specs = Vec::new();
    specs.extend(basic::specs());
    specs.extend(table::specs());
    specs.extend(media::specs());
    specs.extend(layout::specs());
    specs.extend(footnote::specs());
    specs.extend(quote::specs());
    specs.extend(inline_atoms::specs());
    specs
}

/// `dir` on textblocks: only `rtl` and `ltr` survive parsing
pub(crate) fn dir_attribute() -> AttributeSpec {
    AttributeSpec::string("dir", "dir").parse_with(|el| {
        html_attr(el, "dir")
            .filter(|d| matches!(*d, "rtl" | "ltr"))
            .map(Value::from)
    })
}

/// Integer attribute defaulting to 1 that is only written when it differs from 1
pub(crate) fn span_attribute(name: &'static str, html_name: &'static str) -> AttributeSpec {
    AttributeSpec::integer(name, html_name)
        .default_value(1)
        .render_with(move |value| match value.as_i64() {
            Some(1) | None => RenderedAttrs::new(),
            Some(_) => render_plain(html_name, value),
        })
}

/// Concatenated text of an element, trimmed; `None` when empty
pub(crate) fn element_text(element: &ElementRef<'_>) -> Option<String> {
    let text: String = element.text().collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// String attribute value, or empty for null
pub(crate) fn attr_text(node: &doc_model::Node, name: &str) -> String {
    node.attr(name)
        .and_then(crate::value_to_html)
        .unwrap_or_default()
}
