//! Inline mark descriptors

use crate::{AttributeSpec, DomOutput, MarkSpec, ParseRule, RenderMark};
use doc_model::MarkType;

fn simple(mark_type: MarkType, render: RenderMark, selectors: &[&'static str]) -> MarkSpec {
    selectors
        .iter()
        .fold(MarkSpec::new(mark_type, render), |spec, selector| {
            spec.parse_rule(ParseRule::new(*selector))
        })
}

/// Every mark the editor knows, in nesting order
pub fn mark_specs() -> Vec<MarkSpec> {
    vec![
        MarkSpec::new(MarkType::Link, |_, attrs| {
            DomOutput::element("a").attrs(attrs).hole()
        })
        .attribute(AttributeSpec::string("href", "href"))
        .attribute(AttributeSpec::string("target", "target"))
        .parse_rule(ParseRule::new("a[href]")),
        simple(MarkType::Bold, |_, a| DomOutput::element("strong").attrs(a).hole(), &["strong", "b"]),
        simple(MarkType::Italic, |_, a| DomOutput::element("em").attrs(a).hole(), &["em", "i"]),
        simple(MarkType::Underline, |_, a| DomOutput::element("u").attrs(a).hole(), &["u"]),
        simple(MarkType::Strike, |_, a| DomOutput::element("s").attrs(a).hole(), &["s", "del", "strike"]),
        simple(MarkType::Highlight, |_, a| DomOutput::element("mark").attrs(a).hole(), &["mark"]),
        // Footnote references are <sup class="footnote-ref">; node rules run before marks
        simple(MarkType::Superscript, |_, a| DomOutput::element("sup").attrs(a).hole(), &["sup"]),
        simple(MarkType::Subscript, |_, a| DomOutput::element("sub").attrs(a).hole(), &["sub"]),
        simple(MarkType::Code, |_, a| DomOutput::element("code").attrs(a).hole(), &["code"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_mark_has_a_spec() {
        let specs = mark_specs();
        for mark_type in MarkType::ALL {
            assert!(specs.iter().any(|s| s.mark_type == mark_type), "{:?}", mark_type);
        }
    }

    #[test]
    fn test_renders_contain_hole() {
        for spec in mark_specs() {
            let mark = doc_model::Mark::new(spec.mark_type);
            assert!(spec.render_mark(&mark).has_hole());
        }
    }
}
