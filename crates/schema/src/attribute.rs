//! Attribute codec: per-attribute parse/render between node attributes and HTML

use scraper::ElementRef;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Reads one attribute value out of an HTML element; `None` means "use the default"
pub type AttrParser = Arc<dyn Fn(&ElementRef<'_>) -> Option<Value> + Send + Sync>;

/// Turns one attribute value into the HTML attributes it contributes
pub type AttrRenderer = Arc<dyn Fn(&Value) -> RenderedAttrs + Send + Sync>;

/// Ordered HTML attributes produced by rendering.
///
/// `style` and `class` contributions from several node attributes are merged
/// rather than overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedAttrs {
    entries: Vec<(String, String)>,
}

impl RenderedAttrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) if name == "style" && !existing.is_empty() => {
                existing.push_str("; ");
                existing.push_str(&value);
            }
            Some((_, existing)) if name == "class" && !existing.is_empty() => {
                existing.push(' ');
                existing.push_str(&value);
            }
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn merge(&mut self, other: RenderedAttrs) {
        for (name, value) in other.entries {
            self.set(name, value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// Declaration of one node or mark attribute
#[derive(Clone)]
pub struct AttributeSpec {
    pub name: &'static str,
    pub default: Value,
    pub parse: AttrParser,
    pub render: AttrRenderer,
}

impl fmt::Debug for AttributeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeSpec")
            .field("name", &self.name)
            .field("default", &self.default)
            .finish()
    }
}

impl AttributeSpec {
    /// String attribute mirrored to the HTML attribute `html_name`
    pub fn string(name: &'static str, html_name: &'static str) -> Self {
        Self {
            name,
            default: Value::Null,
            parse: parser(move |el| html_attr(el, html_name).map(Value::from)),
            render: renderer(move |value| render_plain(html_name, value)),
        }
    }

    /// Integer attribute mirrored to the HTML attribute `html_name`; malformed numbers fall back to the default
    pub fn integer(name: &'static str, html_name: &'static str) -> Self {
        Self {
            name,
            default: Value::Null,
            parse: parser(move |el| {
                html_attr(el, html_name)
                    .and_then(|v| v.trim().parse::<i64>().ok())
                    .map(Value::from)
            }),
            render: renderer(move |value| render_plain(html_name, value)),
        }
    }

    /// Attribute that is never read from or written to HTML
    pub fn internal(name: &'static str, default: impl Into<Value>) -> Self {
        Self {
            name,
            default: default.into(),
            parse: parser(|_| None),
            render: renderer(|_| RenderedAttrs::new()),
        }
    }

    pub fn default_value(mut self, default: impl Into<Value>) -> Self {
        self.default = default.into();
        self
    }

    pub fn parse_with<F>(mut self, parse: F) -> Self
    where
        F: Fn(&ElementRef<'_>) -> Option<Value> + Send + Sync + 'static,
    {
        self.parse = parser(parse);
        self
    }

    pub fn render_with<F>(mut self, render: F) -> Self
    where
        F: Fn(&Value) -> RenderedAttrs + Send + Sync + 'static,
    {
        self.render = renderer(render);
        self
    }

    /// Parsed but not rendered: the node's render rule writes the HTML itself
    pub fn shadow(self) -> Self {
        self.render_with(|_| RenderedAttrs::new())
    }

    /// Value for this attribute from `element`, or the declared default
    pub fn parse_or_default(&self, element: &ElementRef<'_>) -> Value {
        (self.parse)(element).unwrap_or_else(|| self.default.clone())
    }
}

fn parser<F>(parse: F) -> AttrParser
where
    F: Fn(&ElementRef<'_>) -> Option<Value> + Send + Sync + 'static,
{
    Arc::new(parse)
}

fn renderer<F>(render: F) -> AttrRenderer
where
    F: Fn(&Value) -> RenderedAttrs + Send + Sync + 'static,
{
    Arc::new(render)
}

/// Raw HTML attribute value
pub fn html_attr<'a>(element: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    element.value().attr(name)
}

/// Render a scalar as a single HTML attribute; null renders nothing
pub fn render_plain(html_name: &str, value: &Value) -> RenderedAttrs {
    match value_to_html(value) {
        Some(text) => RenderedAttrs::new().with(html_name, text),
        None => RenderedAttrs::new(),
    }
}

/// String form of an attribute value; `None` for null
pub fn value_to_html(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn with_element<F: FnOnce(ElementRef<'_>)>(html: &str, selector: &str, f: F) {
        let fragment = Html::parse_fragment(html);
        let selector = Selector::parse(selector).unwrap();
        let element = fragment.select(&selector).next().unwrap();
        f(element);
    }

    #[test]
    fn test_style_and_class_merge() {
        let mut attrs = RenderedAttrs::new().with("style", "margin: 0 auto").with("class", "a");
        attrs.merge(RenderedAttrs::new().with("style", "width: 10px").with("class", "b"));
        attrs.set("id", "x");
        attrs.set("id", "y");
        assert_eq!(attrs.get("style"), Some("margin: 0 auto; width: 10px"));
        assert_eq!(attrs.get("class"), Some("a b"));
        assert_eq!(attrs.get("id"), Some("y"));
    }

    #[test]
    fn test_string_attribute_round_trip() {
        let spec = AttributeSpec::string("sourceLabel", "data-source-label");
        with_element(r#"<div data-source-label="Bukhari"></div>"#, "div", |el| {
            let value = spec.parse_or_default(&el);
            assert_eq!(value, Value::from("Bukhari"));
            let rendered = (spec.render)(&value);
            assert_eq!(rendered.get("data-source-label"), Some("Bukhari"));
        });
    }

    #[test]
    fn test_missing_attribute_uses_default() {
        let spec = AttributeSpec::string("alignment", "data-alignment").default_value("center");
        with_element("<img src=a.png>", "img", |el| {
            assert_eq!(spec.parse_or_default(&el), Value::from("center"));
        });
    }

    #[test]
    fn test_malformed_integer_uses_default() {
        let spec = AttributeSpec::integer("width", "width").default_value(Value::Null);
        with_element(r#"<img src=a.png width="wide">"#, "img", |el| {
            assert_eq!(spec.parse_or_default(&el), Value::Null);
        });
        with_element(r#"<img src=a.png width=" 640 ">"#, "img", |el| {
            assert_eq!(spec.parse_or_default(&el), Value::from(640));
        });
    }

    #[test]
    fn test_null_renders_nothing() {
        let spec = AttributeSpec::string("title", "title");
        assert!((spec.render)(&Value::Null).is_empty());
    }

    #[test]
    fn test_shadow_attribute_parses_but_does_not_render() {
        let spec = AttributeSpec::string("fileType", "data-file-type").shadow();
        with_element(r#"<div data-file-type="pdf"></div>"#, "div", |el| {
            let value = spec.parse_or_default(&el);
            assert_eq!(value, Value::from("pdf"));
            assert!((spec.render)(&value).is_empty());
        });
    }
}
