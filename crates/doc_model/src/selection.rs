//! Cursor positions and selections

use crate::NodeId;
use serde::{Deserialize, Serialize};

/// A position inside a textblock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// The textblock containing this position
    pub node_id: NodeId,
    /// Inline offset within the textblock
    pub offset: usize,
}

impl Position {
    pub fn new(node_id: NodeId, offset: usize) -> Self {
        Self { node_id, offset }
    }

    pub fn start_of(node_id: NodeId) -> Self {
        Self { node_id, offset: 0 }
    }
}

/// A selection in the document
///
/// `anchor` is where the selection started, `focus` is where the caret is.
/// A collapsed selection is a plain caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Position,
    pub focus: Position,
}

impl Selection {
    pub fn new(anchor: Position, focus: Position) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(position: Position) -> Self {
        Self {
            anchor: position,
            focus: position,
        }
    }

    pub fn at_start_of(node_id: NodeId) -> Self {
        Self::collapsed(Position::start_of(node_id))
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// The caret position
    pub fn cursor(&self) -> Position {
        self.focus
    }

    /// `(block, from, to)` when both ends sit in the same textblock
    pub fn block_range(&self) -> Option<(NodeId, usize, usize)> {
        if self.anchor.node_id != self.focus.node_id {
            return None;
        }
        let from = self.anchor.offset.min(self.focus.offset);
        let to = self.anchor.offset.max(self.focus.offset);
        Some((self.anchor.node_id, from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapsed() {
        let id = NodeId::new();
        let sel = Selection::collapsed(Position::new(id, 3));
        assert!(sel.is_collapsed());
        assert_eq!(sel.cursor().offset, 3);
    }

    #[test]
    fn test_backward_block_range_is_ordered() {
        let id = NodeId::new();
        let sel = Selection::new(Position::new(id, 7), Position::new(id, 2));
        assert!(!sel.is_collapsed());
        assert_eq!(sel.block_range(), Some((id, 2, 7)));
    }

    #[test]
    fn test_cross_block_range_is_none() {
        let sel = Selection::new(Position::start_of(NodeId::new()), Position::start_of(NodeId::new()));
        assert!(sel.block_range().is_none());
    }
}
