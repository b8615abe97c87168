//! Inline formatting marks

use crate::Attrs;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Mark types, in the order they nest when rendered (outermost first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkType {
    Link,
    Bold,
    Italic,
    Underline,
    Strike,
    Highlight,
    Superscript,
    Subscript,
    Code,
}

impl MarkType {
    pub const ALL: [MarkType; 9] = [
        MarkType::Link,
        MarkType::Bold,
        MarkType::Italic,
        MarkType::Underline,
        MarkType::Strike,
        MarkType::Highlight,
        MarkType::Superscript,
        MarkType::Subscript,
        MarkType::Code,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MarkType::Link => "link",
            MarkType::Bold => "bold",
            MarkType::Italic => "italic",
            MarkType::Underline => "underline",
            MarkType::Strike => "strike",
            MarkType::Highlight => "highlight",
            MarkType::Superscript => "superscript",
            MarkType::Subscript => "subscript",
            MarkType::Code => "code",
        }
    }
}

/// A mark applied to a text node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    mark_type: MarkType,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attrs: Attrs,
}

impl Mark {
    pub fn new(mark_type: MarkType) -> Self {
        Self {
            mark_type,
            attrs: Attrs::new(),
        }
    }

    pub fn link(href: impl Into<String>) -> Self {
        Self::new(MarkType::Link).with_attr("href", href.into())
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn mark_type(&self) -> MarkType {
        self.mark_type
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).and_then(Value::as_str)
    }
}
