//! Serialized element descriptors produced by render rules, and their HTML writer

use crate::RenderedAttrs;

/// Elements written without a closing tag
const VOID_ELEMENTS: [&str; 6] = ["img", "br", "hr", "source", "input", "wbr"];

/// What a render rule returns: a tag with attributes and children, where a
/// [`DomOutput::Hole`] marks the spot the node's own content is written.
#[derive(Debug, Clone, PartialEq)]
pub enum DomOutput {
    Element(DomElement),
    Text(String),
    Hole,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DomElement {
    pub tag: String,
    pub attrs: RenderedAttrs,
    pub children: Vec<DomOutput>,
}

impl DomOutput {
    pub fn element(tag: impl Into<String>) -> DomElement {
        DomElement {
            tag: tag.into(),
            attrs: RenderedAttrs::new(),
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        DomOutput::Text(text.into())
    }

    /// Whether a content hole appears anywhere in this output
    pub fn has_hole(&self) -> bool {
        match self {
            DomOutput::Hole => true,
            DomOutput::Text(_) => false,
            DomOutput::Element(el) => el.children.iter().any(DomOutput::has_hole),
        }
    }
}

impl DomElement {
    pub fn attrs(mut self, attrs: RenderedAttrs) -> Self {
        self.attrs.merge(attrs);
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.set(name, value);
        self
    }

    pub fn child(mut self, child: impl Into<DomOutput>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn hole(self) -> DomOutput {
        self.child(DomOutput::Hole).into()
    }

    pub fn leaf(self) -> DomOutput {
        self.into()
    }
}

impl From<DomElement> for DomOutput {
    fn from(element: DomElement) -> Self {
        DomOutput::Element(element)
    }
}

/// Write `output`, calling `fill` where the content hole sits
pub fn write_dom(output: &DomOutput, out: &mut String, fill: &mut dyn FnMut(&mut String)) {
    match output {
        DomOutput::Hole => fill(out),
        DomOutput::Text(text) => out.push_str(&escape_text(text)),
        DomOutput::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (name, value) in el.attrs.iter() {
                out.push(' ');
                out.push_str(name);
                if !value.is_empty() {
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&el.tag.as_str()) {
                return;
            }
            for child in &el.children {
                write_dom(child, out, fill);
            }
            out.push_str("</");
            out.push_str(&el.tag);
            out.push('>');
        }
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(output: &DomOutput, content: &str) -> String {
        let mut out = String::new();
        write_dom(output, &mut out, &mut |o| o.push_str(content));
        out
    }

    #[test]
    fn test_hole_is_filled() {
        let output = DomOutput::element("p").attr("dir", "rtl").hole();
        assert!(output.has_hole());
        assert_eq!(render(&output, "hi"), r#"<p dir="rtl">hi</p>"#);
    }

    #[test]
    fn test_void_element_has_no_close_tag() {
        let output = DomOutput::element("img").attr("src", "a.png").leaf();
        assert!(!output.has_hole());
        assert_eq!(render(&output, ""), r#"<img src="a.png">"#);
    }

    #[test]
    fn test_empty_value_renders_bare_attribute() {
        let output = DomOutput::element("video").attr("data-video", "").attr("controls", "").leaf();
        assert_eq!(render(&output, ""), "<video data-video controls></video>");
    }

    #[test]
    fn test_escaping() {
        let output = DomOutput::element("span")
            .attr("title", r#"a "b" & <c>"#)
            .child(DomOutput::text("x < y & z"))
            .leaf();
        assert_eq!(
            render(&output, ""),
            r#"<span title="a &quot;b&quot; &amp; &lt;c&gt;">x &lt; y &amp; z</span>"#
        );
    }

    #[test]
    fn test_nested_hole() {
        let output = DomOutput::element("pre")
            .child(DomOutput::element("code").hole())
            .leaf();
        assert!(output.has_hole());
        assert_eq!(render(&output, "fn"), "<pre><code>fn</code></pre>");
    }
}
