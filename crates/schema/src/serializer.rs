//! Document to HTML serialization through the registered render rules

use crate::{write_dom, DomOutput, SchemaRegistry};
use doc_model::{Document, Mark, Node};
use tracing::warn;

impl SchemaRegistry {
    /// Serialize the whole document body
    pub fn to_html(&self, doc: &Document) -> String {
        let mut out = String::new();
        for block in doc.blocks() {
            self.write_node(block, &mut out);
        }
        out
    }

    /// Serialize a single node and its content
    pub fn node_to_html(&self, node: &Node) -> String {
        let mut out = String::new();
        self.write_node(node, &mut out);
        out
    }

    fn write_node(&self, node: &Node, out: &mut String) {
        if let Some(text) = node.text_value() {
            self.write_marked(text, node.marks(), out);
            return;
        }
        let Some(spec) = self.spec(node.node_type()) else {
            warn!(node_type = %node.node_type(), "no render rule, writing content only");
            self.write_children(node, out);
            return;
        };
        let dom = spec.render_node(node);
        write_dom(&dom, out, &mut |out| self.write_children(node, out));
    }

    fn write_children(&self, node: &Node, out: &mut String) {
        for child in node.content() {
            self.write_node(child, out);
        }
    }

    /// Marks are stored outermost first, so each one wraps the rest
    fn write_marked(&self, text: &str, marks: &[Mark], out: &mut String) {
        let Some((outer, inner)) = marks.split_first() else {
            write_dom(&DomOutput::text(text), out, &mut |_| {});
            return;
        };
        match self.mark_spec(outer.mark_type()) {
            Some(spec) => {
                let dom = spec.render_mark(outer);
                write_dom(&dom, out, &mut |out| self.write_marked(text, inner, out));
            }
            None => self.write_marked(text, inner, out),
        }
    }
}
