//! HTML to document parsing driven by the registered parse rules
//!
//! Rejected or unmatched elements never fail the parse: unknown wrappers are
//! descended into, and loose inline content is collected into paragraphs
//! where the surrounding node allows them.

use crate::registry::{CompiledRule, RuleTarget};
use crate::{ContentRule, NodeGroup, SchemaRegistry};
use doc_model::{normalize_inline, Attrs, Document, Mark, Node, NodeType};
use scraper::{ElementRef, Html};
use tracing::debug;

/// Unknown elements that still end the current run of loose inline content
const BLOCK_TAGS: &[&str] = &[
    "div", "section", "article", "header", "footer", "main", "aside", "nav", "figure",
    "figcaption", "dl", "dt", "dd", "hr", "address",
];

/// Output of inline parsing: inline content, or a block found inside inline markup
enum Piece {
    Inline(Node),
    Block(Node),
}

impl SchemaRegistry {
    /// Parse an HTML fragment into a document
    pub fn parse_html(&self, html: &str) -> Document {
        let fragment = Html::parse_fragment(html);
        let mut blocks = Vec::new();
        let mut pending = Vec::new();
        self.parse_blocks(fragment.root_element(), NodeType::Doc, &mut blocks, &mut pending);
        self.flush_inline(NodeType::Doc, &mut pending, &mut blocks);
        Document::with_blocks(normalize_document(blocks))
    }

    fn parse_blocks(
        &self,
        parent: ElementRef<'_>,
        parent_type: NodeType,
        out: &mut Vec<Node>,
        pending: &mut Vec<Node>,
    ) {
        for child in parent.children() {
            if let scraper::Node::Text(text) = child.value() {
                push_text(pending, &collapse_whitespace(text), &[]);
                continue;
            }
            let Some(element) = ElementRef::wrap(child) else {
                continue;
            };

            let block = self.match_node(&element, |node_type| {
                self.group(node_type) != Some(NodeGroup::Inline)
                    && self.allows(parent_type, node_type)
            });
            if let Some((node_type, extra)) = block {
                self.flush_inline(parent_type, pending, out);
                self.parse_block_element(element, node_type, extra, out);
                continue;
            }

            if self.is_inline_element(&element) {
                let mut pieces = Vec::new();
                self.parse_inline_element(element, &[], &mut pieces);
                for piece in pieces {
                    match piece {
                        Piece::Inline(node) => pending.push(node),
                        Piece::Block(node) => {
                            self.flush_inline(parent_type, pending, out);
                            self.push_block(parent_type, node, out);
                        }
                    }
                }
                continue;
            }

            let breaks_run = BLOCK_TAGS.contains(&element.value().name());
            if breaks_run {
                self.flush_inline(parent_type, pending, out);
            }
            self.parse_blocks(element, parent_type, out, pending);
            if breaks_run {
                self.flush_inline(parent_type, pending, out);
            }
        }
    }

    /// Parse an element already matched to a block-level node type
    fn parse_block_element(&self, element: ElementRef<'_>, node_type: NodeType, extra: Attrs, out: &mut Vec<Node>) {
        let Some(spec) = self.spec(node_type) else {
            return;
        };
        let mut attrs = spec.parse_attrs(&element);
        attrs.extend(extra.into_iter().filter(|(_, v)| !v.is_null()));
        let mut node = Node::new(node_type).with_attrs(attrs);

        match &spec.content {
            ContentRule::Empty => out.push(node),
            ContentRule::Text => {
                let text: String = element.text().collect();
                if !text.is_empty() {
                    node.content_mut().push(Node::text(text));
                }
                out.push(node);
            }
            ContentRule::Inline => {
                let mut pieces = Vec::new();
                self.parse_inline_children(element, &[], &mut pieces);
                self.split_textblock(node, pieces, out);
            }
            ContentRule::Blocks { .. } | ContentRule::Children { .. } | ContentRule::DocumentBody => {
                let mut children = Vec::new();
                let mut pending = Vec::new();
                self.parse_blocks(element, node_type, &mut children, &mut pending);
                self.flush_inline(node_type, &mut pending, &mut children);
                if let Some(max) = spec.content.max() {
                    if children.len() > max {
                        debug!(%node_type, found = children.len(), max, "dropping extra children");
                        children.truncate(max);
                    }
                }
                *node.content_mut() = children;
                if let Err(e) = self.fill_required(&mut node) {
                    debug!(%node_type, error = %e, "could not fill required content");
                }
                out.push(node);
            }
        }
    }

    /// Emit a textblock; blocks found inside it are hoisted out as siblings
    fn split_textblock(&self, template: Node, pieces: Vec<Piece>, out: &mut Vec<Node>) {
        let attrs = template.attrs().clone();
        let node_type = template.node_type();
        let mut current = template;
        let mut emitted = false;
        for piece in pieces {
            match piece {
                Piece::Inline(node) => current.content_mut().push(node),
                Piece::Block(block) => {
                    if !current.content().is_empty() {
                        finish_inline(current.content_mut());
                        out.push(current);
                    }
                    out.push(block);
                    emitted = true;
                    current = Node::new(node_type).with_attrs(attrs.clone());
                }
            }
        }
        finish_inline(current.content_mut());
        if !current.content().is_empty() || !emitted {
            out.push(current);
        }
    }

    fn parse_inline_children(&self, element: ElementRef<'_>, marks: &[Mark], pieces: &mut Vec<Piece>) {
        for child in element.children() {
            if let scraper::Node::Text(text) = child.value() {
                let mut run = Vec::new();
                push_text(&mut run, &collapse_whitespace(text), marks);
                pieces.extend(run.into_iter().map(Piece::Inline));
            } else if let Some(element) = ElementRef::wrap(child) {
                self.parse_inline_element(element, marks, pieces);
            }
        }
    }

    fn parse_inline_element(&self, element: ElementRef<'_>, marks: &[Mark], pieces: &mut Vec<Piece>) {
        let inline = self.match_node(&element, |t| {
            t != NodeType::Text && self.group(t) == Some(NodeGroup::Inline)
        });
        if let Some((node_type, extra)) = inline {
            if let Some(spec) = self.spec(node_type) {
                let mut attrs = spec.parse_attrs(&element);
                attrs.extend(extra.into_iter().filter(|(_, v)| !v.is_null()));
                pieces.push(Piece::Inline(Node::new(node_type).with_attrs(attrs)));
            }
            return;
        }

        if let Some(mark) = self.match_mark(&element) {
            let mut nested: Vec<Mark> = marks
                .iter()
                .filter(|m| m.mark_type() != mark.mark_type())
                .cloned()
                .collect();
            nested.push(mark);
            self.parse_inline_children(element, &nested, pieces);
            return;
        }

        let block = self.match_node(&element, |t| self.group(t) == Some(NodeGroup::Block));
        if let Some((node_type, extra)) = block {
            let mut blocks = Vec::new();
            self.parse_block_element(element, node_type, extra, &mut blocks);
            pieces.extend(blocks.into_iter().map(Piece::Block));
            return;
        }

        self.parse_inline_children(element, marks, pieces);
    }

    /// First node rule (in priority order) that accepts the element
    fn match_node(&self, element: &ElementRef<'_>, accept: impl Fn(NodeType) -> bool) -> Option<(NodeType, Attrs)> {
        self.node_rules().iter().find_map(|compiled| {
            let RuleTarget::Node(node_type) = compiled.target else {
                return None;
            };
            if !accept(node_type) {
                return None;
            }
            apply_rule(compiled, element).map(|attrs| (node_type, attrs))
        })
    }

    fn match_mark(&self, element: &ElementRef<'_>) -> Option<Mark> {
        self.mark_rules().iter().find_map(|compiled| {
            let RuleTarget::Mark(mark_type) = compiled.target else {
                return None;
            };
            let extra = apply_rule(compiled, element)?;
            let mut attrs = self
                .mark_spec(mark_type)
                .map(|spec| spec.parse_attrs(element))
                .unwrap_or_default();
            attrs.extend(extra);
            Some(Mark::new(mark_type).with_attrs(attrs))
        })
    }

    fn is_inline_element(&self, element: &ElementRef<'_>) -> bool {
        self.match_node(element, |t| {
            t != NodeType::Text && self.group(t) == Some(NodeGroup::Inline)
        })
        .is_some()
            || self.match_mark(element).is_some()
    }

    /// Wrap loose inline content in a paragraph, or drop it where paragraphs are not allowed
    fn flush_inline(&self, parent_type: NodeType, pending: &mut Vec<Node>, out: &mut Vec<Node>) {
        if pending.is_empty() {
            return;
        }
        let mut content = std::mem::take(pending);
        finish_inline(&mut content);
        if content.is_empty() {
            return;
        }
        if self.allows(parent_type, NodeType::Paragraph) {
            out.push(Node::new(NodeType::Paragraph).with_content(content));
        } else {
            debug!(%parent_type, "dropping loose inline content");
        }
    }

    fn push_block(&self, parent_type: NodeType, block: Node, out: &mut Vec<Node>) {
        if self.allows(parent_type, block.node_type()) {
            out.push(block);
        } else {
            debug!(%parent_type, block = %block.node_type(), "dropping misplaced block");
        }
    }
}

/// Run a rule's selector and attribute hook; `None` means the rule does not apply
fn apply_rule(compiled: &CompiledRule, element: &ElementRef<'_>) -> Option<Attrs> {
    if !compiled.selector.matches(element) {
        return None;
    }
    match &compiled.rule.get_attrs {
        Some(get_attrs) => get_attrs(element),
        None => Some(Attrs::new()),
    }
}

/// Collapse runs of HTML whitespace to a single space
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn push_text(out: &mut Vec<Node>, text: &str, marks: &[Mark]) {
    if !text.is_empty() {
        out.push(Node::marked_text(text, marks.to_vec()));
    }
}

/// Drop spaces at the edges of an inline run and spaces repeated across node
/// boundaries, then merge adjacent text
fn finish_inline(content: &mut Vec<Node>) {
    let mut after_space = true;
    for node in content.iter_mut() {
        let Some(text) = node.text_value() else {
            after_space = node.node_type() == NodeType::HardBreak;
            continue;
        };
        let trimmed = if after_space { text.trim_start_matches(' ') } else { text };
        if trimmed.is_empty() {
            *node = Node::text("");
            continue;
        }
        after_space = trimmed.ends_with(' ');
        if trimmed.len() != text.len() {
            let trimmed = trimmed.to_string();
            let marks = node.marks().to_vec();
            *node = Node::marked_text(trimmed, marks);
        }
    }
    normalize_inline(content);

    if let Some(last) = content.last_mut() {
        if let Some(text) = last.text_value().filter(|t| t.ends_with(' ')) {
            let trimmed = text.trim_end_matches(' ').to_string();
            let marks = last.marks().to_vec();
            *last = Node::marked_text(trimmed, marks);
        }
    }
    normalize_inline(content);
}

/// Footnote containers move to the end, merged into one; an empty document gets a paragraph
fn normalize_document(blocks: Vec<Node>) -> Vec<Node> {
    let (containers, mut body): (Vec<Node>, Vec<Node>) = blocks
        .into_iter()
        .partition(|n| n.node_type() == NodeType::FootnotesContainer);
    if body.is_empty() {
        body.push(Node::new(NodeType::Paragraph));
    }
    let mut containers = containers.into_iter();
    if let Some(mut container) = containers.next() {
        for extra in containers {
            debug!(definitions = extra.child_count(), "merging footnotes container");
            container.content_mut().extend(extra.content().iter().cloned());
        }
        body.push(container);
    }
    body
}
