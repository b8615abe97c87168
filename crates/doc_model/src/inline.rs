//! Inline content operations on textblocks
//!
//! Offsets inside a textblock count one per character of text (Unicode scalar
//! values) and one per inline atom (footnote reference, honorific, ...).

use crate::{DocModelError, Mark, MarkType, Node, Result};

impl Node {
    /// Total number of inline offsets in this node's content
    pub fn inline_len(&self) -> usize {
        self.content().iter().map(Node::inline_size).sum()
    }

    /// Text between two offsets, with every inline atom replaced by `leaf_text`
    pub fn text_between(&self, from: usize, to: usize, leaf_text: &str) -> String {
        let mut out = String::new();
        let mut pos = 0;
        for child in self.content() {
            let size = child.inline_size();
            let (start, end) = (pos, pos + size);
            pos = end;
            if end <= from {
                continue;
            }
            if start >= to {
                break;
            }
            match child.text_value() {
                Some(text) => {
                    let skip = from.saturating_sub(start);
                    let take = to.min(end) - start.max(from);
                    out.extend(text.chars().skip(skip).take(take));
                }
                None => out.push_str(leaf_text),
            }
        }
        out
    }

    /// Marks a character typed at `offset` should inherit
    pub fn marks_at(&self, offset: usize) -> Vec<Mark> {
        let mut pos = 0;
        for child in self.content() {
            let size = child.inline_size();
            if offset > pos && offset <= pos + size {
                return child.marks().to_vec();
            }
            pos += size;
        }
        Vec::new()
    }

    /// Insert inline nodes at `offset`
    pub fn insert_inline(&mut self, offset: usize, items: Vec<Node>) -> Result<()> {
        self.check_inline_range(offset, offset)?;
        let index = self.split_inline_at(offset);
        self.content_mut().splice(index..index, items);
        normalize_inline(self.content_mut());
        Ok(())
    }

    /// Remove the inline content between two offsets and return it
    pub fn remove_inline(&mut self, from: usize, to: usize) -> Result<Vec<Node>> {
        self.check_inline_range(from, to)?;
        let start = self.split_inline_at(from);
        let end = self.split_inline_at(to);
        let removed: Vec<Node> = self.content_mut().drain(start..end).collect();
        normalize_inline(self.content_mut());
        Ok(removed)
    }

    /// Add `mark` to every text node between two offsets, replacing a mark of the same type
    pub fn add_mark(&mut self, from: usize, to: usize, mark: Mark) -> Result<()> {
        self.check_inline_range(from, to)?;
        let start = self.split_inline_at(from);
        let end = self.split_inline_at(to);
        for child in &mut self.content_mut()[start..end] {
            if child.is_text() {
                let mut marks: Vec<Mark> = child
                    .marks()
                    .iter()
                    .filter(|m| m.mark_type() != mark.mark_type())
                    .cloned()
                    .collect();
                marks.push(mark.clone());
                child.set_marks(marks);
            }
        }
        normalize_inline(self.content_mut());
        Ok(())
    }

    /// Remove marks of `mark_type` from text between two offsets
    pub fn remove_mark(&mut self, from: usize, to: usize, mark_type: MarkType) -> Result<()> {
        self.check_inline_range(from, to)?;
        let start = self.split_inline_at(from);
        let end = self.split_inline_at(to);
        for child in &mut self.content_mut()[start..end] {
            let marks: Vec<Mark> = child
                .marks()
                .iter()
                .filter(|m| m.mark_type() != mark_type)
                .cloned()
                .collect();
            child.set_marks(marks);
        }
        normalize_inline(self.content_mut());
        Ok(())
    }

    /// Whether every text character between two offsets carries `mark_type`
    pub fn range_has_mark(&self, from: usize, to: usize, mark_type: MarkType) -> bool {
        let mut pos = 0;
        let mut saw_text = false;
        for child in self.content() {
            let size = child.inline_size();
            let overlaps = pos < to && pos + size > from;
            pos += size;
            if !overlaps || !child.is_text() {
                continue;
            }
            saw_text = true;
            if !child.marks().iter().any(|m| m.mark_type() == mark_type) {
                return false;
            }
        }
        saw_text
    }

    fn check_inline_range(&self, from: usize, to: usize) -> Result<()> {
        if !self.is_textblock() {
            return Err(DocModelError::NotInlineContainer(self.id()));
        }
        let len = self.inline_len();
        if from > to || to > len {
            return Err(DocModelError::InvalidPosition {
                node_id: self.id(),
                offset: to.max(from),
            });
        }
        Ok(())
    }

    /// Make sure a child boundary exists at `offset`; returns the index of the
    /// first child starting at or after it
    fn split_inline_at(&mut self, offset: usize) -> usize {
        let mut pos = 0;
        let mut index = 0;
        while index < self.child_count() {
            if pos == offset {
                return index;
            }
            let size = self.content()[index].inline_size();
            if offset < pos + size {
                let child = &mut self.content_mut()[index];
                let marks = child.marks().to_vec();
                let Some(text) = child.text_mut() else {
                    return index;
                };
                let byte = char_to_byte(text, offset - pos);
                let tail = text.split_off(byte);
                self.content_mut()
                    .insert(index + 1, Node::marked_text(tail, marks));
                return index + 1;
            }
            pos += size;
            index += 1;
        }
        self.child_count()
    }
}

/// Drop empty text nodes and merge adjacent text nodes with identical marks
pub fn normalize_inline(content: &mut Vec<Node>) {
    content.retain(|n| !n.is_text() || n.text_value().is_some_and(|t| !t.is_empty()));
    let mut index = 1;
    while index < content.len() {
        let mergeable = content[index - 1].is_text()
            && content[index].is_text()
            && content[index - 1].marks() == content[index].marks();
        if mergeable {
            let next = content.remove(index);
            if let (Some(text), Some(extra)) = (content[index - 1].text_mut(), next.text_value()) {
                text.push_str(extra);
            }
        } else {
            index += 1;
        }
    }
}

fn char_to_byte(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeType;

    fn para_with_ref() -> Node {
        Node::new(NodeType::Paragraph).with_content(vec![
            Node::text("abc"),
            Node::new(NodeType::FootnoteReference).with_attr("dataId", "x"),
            Node::text("def"),
        ])
    }

    #[test]
    fn test_inline_len_counts_atoms_once() {
        assert_eq!(para_with_ref().inline_len(), 7);
    }

    #[test]
    fn test_text_between_uses_leaf_text() {
        let para = para_with_ref();
        assert_eq!(para.text_between(1, 6, "\u{FFFC}"), "bc\u{FFFC}de");
        assert_eq!(para.text_between(0, 7, ""), "abcdef");
    }

    #[test]
    fn test_insert_text_inside_text_node_merges() {
        let mut para = Node::paragraph("held");
        para.insert_inline(2, vec![Node::text("XY")]).unwrap();
        assert_eq!(para.child_count(), 1);
        assert_eq!(para.text_content(), "heXYld");
    }

    #[test]
    fn test_insert_multibyte() {
        let mut para = Node::paragraph("مرحبا");
        para.insert_inline(2, vec![Node::text("-")]).unwrap();
        assert_eq!(para.text_content(), "مر-حبا");
    }

    #[test]
    fn test_remove_inline_returns_slice() {
        let mut para = para_with_ref();
        let removed = para.remove_inline(2, 5).unwrap();
        assert_eq!(removed.len(), 3);
        assert_eq!(removed[1].node_type(), NodeType::FootnoteReference);
        assert_eq!(para.text_content(), "abef");
        assert_eq!(para.child_count(), 1);
    }

    #[test]
    fn test_out_of_range_is_error() {
        let mut para = Node::paragraph("ab");
        assert!(para.insert_inline(3, vec![Node::text("x")]).is_err());
        assert!(para.remove_inline(2, 1).is_err());
    }

    #[test]
    fn test_non_textblock_rejected() {
        let mut quote = Node::new(NodeType::Quote);
        assert!(matches!(
            quote.insert_inline(0, vec![Node::text("x")]),
            Err(DocModelError::NotInlineContainer(_))
        ));
    }

    #[test]
    fn test_add_and_remove_mark() {
        let mut para = Node::paragraph("hello world");
        para.add_mark(0, 5, Mark::new(MarkType::Bold)).unwrap();
        assert_eq!(para.child_count(), 2);
        assert!(para.range_has_mark(0, 5, MarkType::Bold));
        assert!(!para.range_has_mark(0, 6, MarkType::Bold));

        para.remove_mark(0, 11, MarkType::Bold).unwrap();
        assert_eq!(para.child_count(), 1);
    }

    #[test]
    fn test_marks_at_inherits_previous_character() {
        let mut para = Node::paragraph("ab");
        para.add_mark(0, 1, Mark::new(MarkType::Italic)).unwrap();
        assert_eq!(para.marks_at(1).len(), 1);
        assert!(para.marks_at(2).is_empty());
        assert!(para.marks_at(0).is_empty());
    }
}
