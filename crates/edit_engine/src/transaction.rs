//! Transactions: ordered steps plus selection and metadata

use crate::{Step, SuggestionState};
use doc_model::Selection;

/// Where a transaction came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Typing or an explicit command
    User,
    /// A corrective transaction appended by a document rule
    Rule(&'static str),
    /// Undo or redo
    History,
}

#[derive(Debug, Clone)]
pub struct Transaction {
    steps: Vec<Step>,
    selection: Option<Selection>,
    origin: Origin,
    add_to_history: bool,
    merge_key: Option<&'static str>,
    suggestion: Option<SuggestionState>,
}

impl Transaction {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            selection: None,
            origin: Origin::User,
            add_to_history: true,
            merge_key: None,
            suggestion: None,
        }
    }

    /// An empty corrective transaction for the named rule
    pub fn from_rule(rule: &'static str) -> Self {
        Self {
            origin: Origin::Rule(rule),
            ..Self::new()
        }
    }

    /// A transaction that only moves the selection
    pub fn select(selection: Selection) -> Self {
        Self::new().with_selection(selection)
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = Some(selection);
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub(crate) fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    /// Keep this transaction out of the undo history
    pub fn without_history(mut self) -> Self {
        self.add_to_history = false;
        self
    }

    pub fn adds_to_history(&self) -> bool {
        self.add_to_history
    }

    /// Consecutive history entries with the same key may be merged
    pub fn merge_key(mut self, key: &'static str) -> Self {
        self.merge_key = Some(key);
        self
    }

    pub fn merge_group(&self) -> Option<&'static str> {
        self.merge_key
    }

    /// Force the slash suggestion state instead of deriving it from the cursor
    pub fn with_suggestion(mut self, state: SuggestionState) -> Self {
        self.suggestion = Some(state);
        self
    }

    pub fn suggestion_override(&self) -> Option<&SuggestionState> {
        self.suggestion.as_ref()
    }

    pub fn doc_changed(&self) -> bool {
        !self.steps.is_empty()
    }

    /// No steps, no selection and no metadata worth dispatching
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.selection.is_none() && self.suggestion.is_none()
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}
