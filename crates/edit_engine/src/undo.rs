//! Undo/redo manager with transaction batching

use crate::{EditError, Result, Step};
use doc_model::Selection;
use std::time::{Duration, Instant};

/// One undoable unit: a user transaction together with the rule corrections
/// it triggered
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Forward steps, in application order
    pub steps: Vec<Step>,
    /// Inverse steps, in the order they must be applied to undo
    pub inverse: Vec<Step>,
    pub selection_before: Selection,
    pub selection_after: Selection,
}

struct UndoEntry {
    entry: HistoryEntry,
    merge_key: Option<&'static str>,
    timestamp: Instant,
}

/// Manages undo and redo stacks
pub struct UndoManager {
    undo_stack: Vec<UndoEntry>,
    redo_stack: Vec<UndoEntry>,
    max_entries: usize,
    /// Entries with the same merge key closer than this are merged
    batch_threshold: Duration,
    in_composition: bool,
}

impl UndoManager {
    pub fn new() -> Self {
        Self::with_limits(100, Duration::from_millis(500))
    }

    pub fn with_limits(max_entries: usize, batch_threshold: Duration) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_entries,
            batch_threshold,
            in_composition: false,
        }
    }

    /// Record an entry; clears the redo stack
    pub fn push(&mut self, entry: HistoryEntry, merge_key: Option<&'static str>) {
        self.redo_stack.clear();
        let now = Instant::now();

        if let Some(last) = self.undo_stack.last_mut() {
            let mergeable = merge_key.is_some()
                && last.merge_key == merge_key
                && !self.in_composition
                && now.duration_since(last.timestamp) < self.batch_threshold;
            if mergeable {
                last.entry.steps.extend(entry.steps);
                let mut inverse = entry.inverse;
                inverse.append(&mut last.entry.inverse);
                last.entry.inverse = inverse;
                last.entry.selection_after = entry.selection_after;
                last.timestamp = now;
                return;
            }
        }

        self.undo_stack.push(UndoEntry {
            entry,
            merge_key,
            timestamp: now,
        });
        if self.undo_stack.len() > self.max_entries {
            let excess = self.undo_stack.len() - self.max_entries;
            self.undo_stack.drain(..excess);
        }
    }

    /// Take the latest entry for undo; it moves to the redo stack
    pub fn pop_undo(&mut self) -> Result<HistoryEntry> {
        let entry = self.undo_stack.pop().ok_or(EditError::UndoStackEmpty)?;
        let history = entry.entry.clone();
        self.redo_stack.push(entry);
        Ok(history)
    }

    /// Take the latest undone entry for redo; it moves back to the undo stack
    pub fn pop_redo(&mut self) -> Result<HistoryEntry> {
        let mut entry = self.redo_stack.pop().ok_or(EditError::RedoStackEmpty)?;
        let history = entry.entry.clone();
        // a redone entry never merges with what comes next
        entry.merge_key = None;
        self.undo_stack.push(entry);
        Ok(history)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Start IME composition (disables batching)
    pub fn begin_composition(&mut self) {
        self.in_composition = true;
    }

    pub fn end_composition(&mut self) {
        self.in_composition = false;
    }

    pub fn in_composition(&self) -> bool {
        self.in_composition
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::NodeId;

    fn entry(name: &str) -> HistoryEntry {
        let id = NodeId::new();
        HistoryEntry {
            steps: vec![Step::set_attr(id, name, "x")],
            inverse: vec![Step::clear_attr(id, name)],
            selection_before: Selection::at_start_of(id),
            selection_after: Selection::at_start_of(id),
        }
    }

    #[test]
    fn test_undo_redo_cycle() {
        let mut undo = UndoManager::new();
        assert!(!undo.can_undo());
        undo.push(entry("a"), None);
        assert!(undo.can_undo());

        let popped = undo.pop_undo().unwrap();
        assert_eq!(popped.steps.len(), 1);
        assert!(undo.can_redo());
        assert!(!undo.can_undo());

        undo.pop_redo().unwrap();
        assert!(undo.can_undo());
        assert!(!undo.can_redo());
    }

    #[test]
    fn test_push_clears_redo() {
        let mut undo = UndoManager::new();
        undo.push(entry("a"), None);
        undo.pop_undo().unwrap();
        undo.push(entry("b"), None);
        assert!(!undo.can_redo());
    }

    #[test]
    fn test_max_entries() {
        let mut undo = UndoManager::with_limits(2, Duration::ZERO);
        for name in ["a", "b", "c"] {
            undo.push(entry(name), None);
        }
        assert_eq!(undo.undo_depth(), 2);
    }

    #[test]
    fn test_merge_by_key() {
        let mut undo = UndoManager::with_limits(10, Duration::from_secs(60));
        undo.push(entry("a"), Some("typing"));
        undo.push(entry("b"), Some("typing"));
        assert_eq!(undo.undo_depth(), 1);
        let merged = undo.pop_undo().unwrap();
        assert_eq!(merged.steps.len(), 2);
        // newest inverse first
        assert!(matches!(&merged.inverse[0], Step::SetAttr { name, .. } if name == "b"));
    }

    #[test]
    fn test_no_merge_during_composition() {
        let mut undo = UndoManager::with_limits(10, Duration::from_secs(60));
        undo.begin_composition();
        undo.push(entry("a"), Some("typing"));
        undo.push(entry("b"), Some("typing"));
        assert_eq!(undo.undo_depth(), 2);
        undo.end_composition();
        assert!(!undo.in_composition());
    }

    #[test]
    fn test_empty_stacks_error() {
        let mut undo = UndoManager::new();
        assert!(matches!(undo.pop_undo(), Err(EditError::UndoStackEmpty)));
        assert!(matches!(undo.pop_redo(), Err(EditError::RedoStackEmpty)));
    }
}
