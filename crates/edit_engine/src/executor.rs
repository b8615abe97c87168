//! Command execution engine
//!
//! Every change goes through [`EditingEngine::dispatch`]. A dispatch applies
//! the transaction's steps, lets the document rules append their corrections,
//! records the whole thing as one history entry and refreshes the slash
//! suggestion state. If any step fails, the document is left as it was.

use crate::{
    Command, CommandContext, Coords, CoordsProvider, EditorCallbacks, EditorConfig, HistoryEntry,
    NoopCallbacks, Origin, Result, RulePipeline, Step, SuggestionState, SuggestionTracker,
    Transaction, UndoManager,
};
use doc_model::{Document, NodeId, Position, Selection};
use schema::SchemaRegistry;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// The main editing engine that manages document state and command execution
pub struct EditingEngine {
    doc: Document,
    selection: Selection,
    schema: Arc<SchemaRegistry>,
    config: EditorConfig,
    rules: RulePipeline,
    undo_manager: UndoManager,
    suggestion: SuggestionTracker,
    callbacks: Arc<dyn EditorCallbacks>,
    coords: Option<Arc<dyn CoordsProvider>>,
}

impl EditingEngine {
    /// Create a new editing engine with an empty document
    pub fn new(schema: Arc<SchemaRegistry>, config: EditorConfig) -> Result<Self> {
        Self::with_document(schema, config, Document::new())
    }

    /// Create an editing engine for an existing document
    pub fn with_document(
        schema: Arc<SchemaRegistry>,
        config: EditorConfig,
        doc: Document,
    ) -> Result<Self> {
        let selection = initial_selection(&doc);
        let undo_manager = UndoManager::with_limits(
            config.history.max_entries,
            Duration::from_millis(config.history.batch_threshold_ms),
        );
        Ok(Self {
            rules: RulePipeline::from_config(&config),
            suggestion: SuggestionTracker::new(&config.slash)?,
            doc,
            selection,
            schema,
            config,
            undo_manager,
            callbacks: Arc::new(NoopCallbacks),
            coords: None,
        })
    }

    /// Parse stored HTML into a new engine
    pub fn from_html(schema: Arc<SchemaRegistry>, config: EditorConfig, html: &str) -> Result<Self> {
        let doc = schema.parse_html(html);
        Self::with_document(schema, config, doc)
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn callbacks(&self) -> &dyn EditorCallbacks {
        self.callbacks.as_ref()
    }

    pub fn set_callbacks(&mut self, callbacks: Arc<dyn EditorCallbacks>) {
        self.callbacks = callbacks;
    }

    pub fn set_coords_provider(&mut self, coords: Arc<dyn CoordsProvider>) {
        self.coords = Some(coords);
    }

    /// Screen coordinates of a position, when a view is attached
    pub fn coords_at(&self, position: Position) -> Option<Coords> {
        self.coords.as_ref()?.coords_at(position)
    }

    pub fn suggestion(&self) -> &SuggestionState {
        self.suggestion.state()
    }

    /// Move the selection without touching the document or history
    pub fn set_selection(&mut self, selection: Selection) -> Result<()> {
        self.dispatch(Transaction::select(selection).without_history())
    }

    /// Serialize the current document
    pub fn to_html(&self) -> String {
        self.schema.to_html(&self.doc)
    }

    /// Start an input method composition; history entries are not merged
    /// until it ends
    pub fn begin_composition(&mut self) {
        self.undo_manager.begin_composition();
    }

    pub fn end_composition(&mut self) {
        self.undo_manager.end_composition();
    }

    /// Execute a command. Returns `false` when the command did not apply.
    pub fn execute(&mut self, command: &dyn Command) -> Result<bool> {
        let tr = {
            let ctx = CommandContext {
                doc: &self.doc,
                selection: self.selection,
                schema: &self.schema,
            };
            command.build(&ctx)?
        };
        let Some(tr) = tr else {
            debug!(command = command.display_name(), "command not applicable");
            return Ok(false);
        };
        debug!(command = command.display_name(), steps = tr.steps().len(), "executing");
        self.dispatch(tr)?;
        Ok(true)
    }

    /// Apply a transaction atomically
    pub fn dispatch(&mut self, tr: Transaction) -> Result<()> {
        let old = self.doc.clone();
        let selection_before = self.selection;

        let mut steps = Vec::with_capacity(tr.steps().len());
        let mut inverse = Vec::with_capacity(tr.steps().len());
        for step in tr.steps() {
            match step.apply(&mut self.doc) {
                Ok(inv) => {
                    inverse.push(inv);
                    steps.push(step.clone());
                }
                Err(err) => {
                    warn!(error = %err, "step failed; transaction rolled back");
                    self.doc = old;
                    return Err(err);
                }
            }
        }

        if tr.doc_changed() {
            self.doc.increment_version();
            if tr.origin() != Origin::History {
                match self.rules.apply(&old, &mut self.doc) {
                    Ok(applied) => {
                        steps.extend(applied.steps);
                        inverse.extend(applied.inverse);
                    }
                    Err(err) => {
                        warn!(error = %err, "rule correction failed; transaction rolled back");
                        self.doc = old;
                        return Err(err);
                    }
                }
            }
        }

        let selection = match tr.selection() {
            Some(selection) => selection,
            None => map_selection(selection_before, &steps),
        };
        self.selection = self.validate(selection, &old);

        if tr.adds_to_history() && !steps.is_empty() {
            inverse.reverse();
            self.undo_manager.push(
                HistoryEntry {
                    steps,
                    inverse,
                    selection_before,
                    selection_after: self.selection,
                },
                tr.merge_group(),
            );
        }

        let selection_changed = self.selection != selection_before;
        if self
            .suggestion
            .update(&tr, selection_changed, &self.doc, self.selection)
        {
            self.callbacks.suggestion_changed(self.suggestion.state());
        }
        Ok(())
    }

    /// Undo the last history entry, rule corrections included
    pub fn undo(&mut self) -> Result<()> {
        let entry = self.undo_manager.pop_undo()?;
        self.replay(&entry.inverse, entry.selection_before)
    }

    /// Redo the last undone entry
    pub fn redo(&mut self) -> Result<()> {
        let entry = self.undo_manager.pop_redo()?;
        self.replay(&entry.steps, entry.selection_after)
    }

    pub fn can_undo(&self) -> bool {
        self.undo_manager.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo_manager.can_redo()
    }

    fn replay(&mut self, steps: &[Step], selection: Selection) -> Result<()> {
        let tr = steps
            .iter()
            .cloned()
            .fold(Transaction::new(), Transaction::step)
            .with_origin(Origin::History)
            .with_selection(selection)
            .without_history();
        self.dispatch(tr)
    }

    /// Keep the selection inside existing textblocks
    fn validate(&self, selection: Selection, old: &Document) -> Selection {
        let anchor = self.clamp(selection.anchor, old);
        let focus = self.clamp(selection.focus, old);
        if anchor.node_id == focus.node_id || (self.doc.contains(anchor.node_id) && self.doc.contains(focus.node_id)) {
            Selection::new(anchor, focus)
        } else {
            Selection::collapsed(focus)
        }
    }

    fn clamp(&self, position: Position, old: &Document) -> Position {
        match self.doc.find(position.node_id).filter(|n| n.is_textblock()) {
            Some(block) => Position::new(position.node_id, position.offset.min(block.inline_len())),
            None => {
                let block = nearest_textblock(&self.doc, old, position.node_id);
                Position::start_of(block)
            }
        }
    }
}

fn initial_selection(doc: &Document) -> Selection {
    Selection::at_start_of(doc.first_textblock().unwrap_or_else(|| doc.root_id()))
}

fn map_selection(selection: Selection, steps: &[Step]) -> Selection {
    let map = |pos: Position| steps.iter().fold(pos, |pos, step| step.map_position(pos));
    Selection::new(map(selection.anchor), map(selection.focus))
}

/// Textblock closest to where `lost` used to be: the first one at or after its
/// old top-level block, else the last one before it
fn nearest_textblock(doc: &Document, old: &Document, lost: NodeId) -> NodeId {
    let mut top = lost;
    while let Some((parent, index)) = old.parent_of(top) {
        if parent == old.root_id() {
            let blocks = doc.blocks();
            let start = index.min(blocks.len());
            let after = blocks[start..]
                .iter()
                .find_map(|b| b.descendants().find(|n| n.is_textblock()));
            let before = blocks[..start]
                .iter()
                .rev()
                .find_map(|b| b.descendants().filter(|n| n.is_textblock()).last());
            if let Some(block) = after.or(before) {
                return block.id();
            }
            break;
        }
        top = parent;
    }
    doc.first_textblock().unwrap_or_else(|| doc.root_id())
}
