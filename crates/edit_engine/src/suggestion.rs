//! Slash trigger tracking
//!
//! After every transaction the tracker looks at the text just before the
//! cursor. A trigger character followed by non-whitespace at the very end
//! makes the suggestion active, with the text after the trigger as the query.

use crate::{EditError, Result, SlashConfig, Transaction};
use doc_model::{Document, NodeId, Position, Selection};
use regex_lite::Regex;
use tracing::trace;

/// Stand-in for inline atoms when reading text before the cursor
const ATOM_PLACEHOLDER: &str = "\u{FFFC}";

/// Unicode whitespace beyond the ASCII `\s` class
const WIDE_WHITESPACE: &str =
    "\u{85}\u{A0}\u{1680}\u{2000}-\u{200A}\u{2028}\u{2029}\u{202F}\u{205F}\u{3000}";

/// The span from the trigger to the cursor, inside one textblock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestionRange {
    pub block_id: NodeId,
    pub from: usize,
    pub to: usize,
}

impl SuggestionRange {
    pub fn start(&self) -> Position {
        Position::new(self.block_id, self.from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SuggestionState {
    pub active: bool,
    pub range: Option<SuggestionRange>,
    /// Text typed after the trigger
    pub query: String,
    /// The whole match, trigger included
    pub text: String,
}

impl SuggestionState {
    pub fn inactive() -> Self {
        Self::default()
    }
}

pub struct SuggestionTracker {
    enabled: bool,
    pattern: Regex,
    max_lookback: usize,
    state: SuggestionState,
}

impl SuggestionTracker {
    pub fn new(config: &SlashConfig) -> Result<Self> {
        let trigger = regex_lite::escape(&config.trigger.to_string());
        let pattern = Regex::new(&format!(r"{}([^\s{}]*)$", trigger, WIDE_WHITESPACE))
            .map_err(|e| EditError::InvalidCommand(format!("slash trigger: {}", e)))?;
        Ok(Self {
            enabled: config.enabled,
            pattern,
            max_lookback: config.max_lookback,
            state: SuggestionState::inactive(),
        })
    }

    pub fn state(&self) -> &SuggestionState {
        &self.state
    }

    /// Advance the state after a transaction; returns whether it changed
    pub fn update(
        &mut self,
        tr: &Transaction,
        selection_changed: bool,
        doc: &Document,
        selection: Selection,
    ) -> bool {
        let next = if let Some(forced) = tr.suggestion_override() {
            forced.clone()
        } else if !tr.doc_changed() && !selection_changed {
            return false;
        } else {
            self.match_at(doc, selection)
        };
        if next == self.state {
            return false;
        }
        trace!(active = next.active, query = %next.query, "suggestion state");
        self.state = next;
        true
    }

    /// Derive the state from the text before the cursor
    pub fn match_at(&self, doc: &Document, selection: Selection) -> SuggestionState {
        if !self.enabled || !selection.is_collapsed() {
            return SuggestionState::inactive();
        }
        let cursor = selection.cursor();
        let Some(block) = doc.find(cursor.node_id).filter(|n| n.is_textblock()) else {
            return SuggestionState::inactive();
        };
        let start = cursor.offset.saturating_sub(self.max_lookback);
        let before = block.text_between(start, cursor.offset, ATOM_PLACEHOLDER);

        let Some(captures) = self.pattern.captures(&before) else {
            return SuggestionState::inactive();
        };
        let (Some(whole), Some(query)) = (captures.get(0), captures.get(1)) else {
            return SuggestionState::inactive();
        };
        let length = whole.as_str().chars().count();
        SuggestionState {
            active: true,
            range: Some(SuggestionRange {
                block_id: cursor.node_id,
                from: cursor.offset - length,
                to: cursor.offset,
            }),
            query: query.as_str().to_string(),
            text: whole.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Step;
    use doc_model::Node;

    fn tracker() -> SuggestionTracker {
        SuggestionTracker::new(&SlashConfig::default()).unwrap()
    }

    fn at_end(text: &str) -> (Document, Selection) {
        let para = Node::paragraph(text);
        let sel = Selection::collapsed(Position::new(para.id(), text.chars().count()));
        (Document::with_blocks(vec![para]), sel)
    }

    #[test]
    fn test_match_after_slash() {
        let (doc, sel) = at_end("insert a /tab");
        let state = tracker().match_at(&doc, sel);
        assert!(state.active);
        assert_eq!(state.query, "tab");
        assert_eq!(state.text, "/tab");
        let range = state.range.unwrap();
        assert_eq!((range.from, range.to), (9, 13));
    }

    #[test]
    fn test_bare_slash_is_active_with_empty_query() {
        let (doc, sel) = at_end("/");
        let state = tracker().match_at(&doc, sel);
        assert!(state.active);
        assert_eq!(state.query, "");
    }

    #[test]
    fn test_whitespace_ends_the_query() {
        let (doc, sel) = at_end("/tab ");
        assert!(!tracker().match_at(&doc, sel).active);
    }

    #[test]
    fn test_unicode_whitespace_ends_the_query() {
        for text in ["/tab\u{A0}", "/tab\u{3000}", "/tab\u{2009}"] {
            let (doc, sel) = at_end(text);
            assert!(!tracker().match_at(&doc, sel).active, "{:?}", text);
        }
        let (doc, sel) = at_end("\u{A0}/tab");
        let state = tracker().match_at(&doc, sel);
        assert!(state.active);
        assert_eq!(state.query, "tab");
    }

    #[test]
    fn test_range_selection_is_inactive() {
        let para = Node::paragraph("/tab");
        let sel = Selection::new(Position::new(para.id(), 0), Position::new(para.id(), 4));
        let doc = Document::with_blocks(vec![para]);
        assert!(!tracker().match_at(&doc, sel).active);
    }

    #[test]
    fn test_lookback_limit() {
        let text = format!("/{}", "x".repeat(150));
        let (doc, sel) = at_end(&text);
        assert!(!tracker().match_at(&doc, sel).active);
    }

    #[test]
    fn test_non_latin_query() {
        let (doc, sel) = at_end("نص /صلى");
        let state = tracker().match_at(&doc, sel);
        assert_eq!(state.query, "صلى");
        assert_eq!(state.range.unwrap().from, 3);
    }

    #[test]
    fn test_custom_trigger() {
        let config = SlashConfig {
            trigger: '+',
            ..SlashConfig::default()
        };
        let tracker = SuggestionTracker::new(&config).unwrap();
        let (doc, sel) = at_end("a +foo");
        assert_eq!(tracker.match_at(&doc, sel).query, "foo");
    }

    #[test]
    fn test_update_keeps_state_without_changes() {
        let mut tracker = tracker();
        let (doc, sel) = at_end("/q");
        let typed = Transaction::new().step(Step::set_attr(doc.blocks()[0].id(), "x", 1));
        assert!(tracker.update(&typed, true, &doc, sel));
        assert!(!tracker.update(&Transaction::new(), false, &doc, sel));
        assert!(tracker.state().active);
    }

    #[test]
    fn test_override_wins() {
        let mut tracker = tracker();
        let (doc, sel) = at_end("/q");
        tracker.update(&Transaction::select(sel), true, &doc, sel);
        let dismiss = Transaction::new().with_suggestion(SuggestionState::inactive());
        assert!(tracker.update(&dismiss, false, &doc, sel));
        assert!(!tracker.state().active);
    }
}
