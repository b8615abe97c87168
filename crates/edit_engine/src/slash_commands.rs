//! Slash command catalog and menu
//!
//! The catalog is a flat list of commands. A query filters it, the matches
//! are grouped by category in a fixed order, and the menu navigates the
//! flattened groups with the keyboard. The menu renders nothing itself; it
//! hands the host a [`MenuView`] describing what to draw and where.

use crate::{
    Coords, EditingEngine, InsertFootnote, InsertInlineAtom, InsertLayout, InsertQuote,
    InsertTable, Result, SetBlockType, Step, SuggestionState, Transaction, WrapIn, HONORIFICS,
};
use doc_model::{Position, Selection};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlashCategory {
    Formatting,
    Blocks,
    References,
    Honorific,
}

impl SlashCategory {
    /// Display order of the groups
    pub const ORDER: [SlashCategory; 4] = [
        SlashCategory::Formatting,
        SlashCategory::Blocks,
        SlashCategory::References,
        SlashCategory::Honorific,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SlashCategory::Formatting => "Formatting",
            SlashCategory::Blocks => "Blocks",
            SlashCategory::References => "References",
            SlashCategory::Honorific => "Honorifics",
        }
    }
}

/// What a slash command does once the trigger text is gone
pub type SlashAction = Arc<dyn Fn(&mut EditingEngine) -> Result<()> + Send + Sync>;

#[derive(Clone)]
pub struct SlashCommand {
    pub id: String,
    pub label: String,
    pub description: String,
    pub icon: String,
    pub category: SlashCategory,
    pub keywords: Vec<String>,
    action: SlashAction,
}

impl fmt::Debug for SlashCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlashCommand")
            .field("id", &self.id)
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

impl SlashCommand {
    pub fn new<F>(
        id: impl Into<String>,
        label: impl Into<String>,
        description: impl Into<String>,
        category: SlashCategory,
        action: F,
    ) -> Self
    where
        F: Fn(&mut EditingEngine) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            label: label.into(),
            description: description.into(),
            icon: String::new(),
            category,
            keywords: Vec::new(),
            action: Arc::new(action),
        }
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords = keywords.iter().map(|k| k.to_string()).collect();
        self
    }

    /// Substring match on label, description, keywords and id. Case is folded,
    /// and the raw query is tried too for scripts without case.
    pub fn matches(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let folded = query.to_lowercase();
        let contains = |field: &str| field.to_lowercase().contains(&folded) || field.contains(query);
        contains(&self.label)
            || contains(&self.description)
            || self.keywords.iter().any(|k| contains(k))
            || contains(&self.id)
    }

    pub fn run(&self, engine: &mut EditingEngine) -> Result<()> {
        (self.action)(engine)
    }
}

/// Matches of one category, in catalog order
#[derive(Debug, Clone)]
pub struct SlashGroup<'a> {
    pub category: SlashCategory,
    pub commands: Vec<&'a SlashCommand>,
}

/// Groups flattened back into navigation order
pub fn flatten<'a>(groups: &[SlashGroup<'a>]) -> Vec<&'a SlashCommand> {
    groups.iter().flat_map(|g| g.commands.iter().copied()).collect()
}

#[derive(Debug, Clone, Default)]
pub struct SlashCatalog {
    commands: Vec<SlashCommand>,
}

impl SlashCatalog {
    pub fn new(commands: Vec<SlashCommand>) -> Self {
        Self { commands }
    }

    /// Built-in commands followed by one command per honorific
    pub fn standard() -> Self {
        let mut commands = builtin_commands();
        commands.extend(honorific_commands());
        Self::new(commands)
    }

    pub fn push(&mut self, command: SlashCommand) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[SlashCommand] {
        &self.commands
    }

    pub fn get(&self, id: &str) -> Option<&SlashCommand> {
        self.commands.iter().find(|c| c.id == id)
    }

    pub fn filter(&self, query: &str) -> Vec<&SlashCommand> {
        self.commands.iter().filter(|c| c.matches(query)).collect()
    }

    /// Matches grouped by category; empty categories are left out
    pub fn grouped(&self, query: &str) -> Vec<SlashGroup<'_>> {
        let matches = self.filter(query);
        SlashCategory::ORDER
            .iter()
            .map(|category| SlashGroup {
                category: *category,
                commands: matches
                    .iter()
                    .copied()
                    .filter(|c| c.category == *category)
                    .collect(),
            })
            .filter(|group| !group.commands.is_empty())
            .collect()
    }
}

fn builtin_commands() -> Vec<SlashCommand> {
    use SlashCategory::*;
    vec![
        SlashCommand::new("paragraph", "Text", "Plain paragraph text", Formatting, |e| {
            e.execute(&SetBlockType::paragraph()).map(drop)
        })
        .icon("pilcrow")
        .keywords(&["p", "plain", "body"]),
        SlashCommand::new("heading1", "Heading 1", "Large section heading", Formatting, |e| {
            e.execute(&SetBlockType::heading(1)).map(drop)
        })
        .icon("heading-1")
        .keywords(&["h1", "title"]),
        SlashCommand::new("heading2", "Heading 2", "Medium section heading", Formatting, |e| {
            e.execute(&SetBlockType::heading(2)).map(drop)
        })
        .icon("heading-2")
        .keywords(&["h2", "subtitle"]),
        SlashCommand::new("heading3", "Heading 3", "Small section heading", Formatting, |e| {
            e.execute(&SetBlockType::heading(3)).map(drop)
        })
        .icon("heading-3")
        .keywords(&["h3"]),
        SlashCommand::new("bulletList", "Bullet List", "Unordered list of items", Formatting, |e| {
            e.execute(&WrapIn::bullet_list()).map(drop)
        })
        .icon("list")
        .keywords(&["ul", "unordered", "points"]),
        SlashCommand::new("orderedList", "Numbered List", "Ordered list of items", Formatting, |e| {
            e.execute(&WrapIn::ordered_list()).map(drop)
        })
        .icon("list-ordered")
        .keywords(&["ol", "ordered", "numbers"]),
        SlashCommand::new("blockquote", "Blockquote", "Indented quotation block", Formatting, |e| {
            e.execute(&WrapIn::blockquote()).map(drop)
        })
        .icon("text-quote")
        .keywords(&["indent"]),
        SlashCommand::new("codeBlock", "Code Block", "Preformatted code", Formatting, |e| {
            e.execute(&SetBlockType::code_block()).map(drop)
        })
        .icon("code")
        .keywords(&["pre", "snippet"]),
        SlashCommand::new("table", "Table", "Insert a table with a header row", Blocks, |e| {
            e.execute(&InsertTable::new(3, 3)).map(drop)
        })
        .icon("table")
        .keywords(&["grid", "rows", "cells"]),
        SlashCommand::new("layout", "Two Columns", "Side-by-side column layout", Blocks, |e| {
            e.execute(&InsertLayout::new(2)).map(drop)
        })
        .icon("columns")
        .keywords(&["columns", "layout", "side"]),
        SlashCommand::new("quote", "Quote", "Quotation with source and translation", Blocks, |e| {
            e.execute(&InsertQuote::default()).map(drop)
        })
        .icon("quote")
        .keywords(&["citation", "verse", "translation"]),
        SlashCommand::new("media", "Media", "Image, audio, video or file from the library", Blocks, |e| {
            e.callbacks().open_media_library();
            Ok(())
        })
        .icon("image")
        .keywords(&["image", "picture", "audio", "video", "file", "upload"]),
        SlashCommand::new("footnote", "Footnote", "Numbered note at the end of the text", References, |e| {
            e.execute(&InsertFootnote::new()).map(drop)
        })
        .icon("superscript")
        .keywords(&["note", "reference", "citation"]),
        SlashCommand::new("glossaryTerm", "Glossary Term", "Link a term to its definition", References, |e| {
            e.callbacks().open_glossary_selector();
            Ok(())
        })
        .icon("book-open")
        .keywords(&["term", "definition", "dictionary"]),
        SlashCommand::new("postReference", "Post Reference", "Embed a link card to another post", References, |e| {
            e.callbacks().open_post_selector();
            Ok(())
        })
        .icon("link")
        .keywords(&["post", "article", "link"]),
    ]
}

fn honorific_commands() -> Vec<SlashCommand> {
    HONORIFICS
        .iter()
        .map(|entry| {
            SlashCommand::new(
                format!("honorific-{}", entry.key),
                entry.text,
                entry.label,
                SlashCategory::Honorific,
                move |e| e.execute(&InsertInlineAtom::honorific(entry)).map(drop),
            )
            .icon("sparkles")
            .keywords(&[entry.key, "honorific"])
        })
        .collect()
}

// =============================================================================
// Menu
// =============================================================================

/// Keys the menu reacts to while open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKey {
    Up,
    Down,
    Enter,
    Escape,
}

/// What the host should show
#[derive(Debug)]
pub enum MenuView<'a> {
    Inactive,
    /// The trigger is active but nothing matches
    NoResults { query: String, coords: Option<Coords> },
    Results {
        groups: Vec<SlashGroup<'a>>,
        /// Index into the flattened groups
        selected: usize,
        coords: Option<Coords>,
    },
}

pub struct SlashMenu {
    catalog: SlashCatalog,
    selected: usize,
    last_query: Option<String>,
}

impl SlashMenu {
    pub fn new(catalog: SlashCatalog) -> Self {
        Self {
            catalog,
            selected: 0,
            last_query: None,
        }
    }

    pub fn catalog(&self) -> &SlashCatalog {
        &self.catalog
    }

    pub fn view(&mut self, engine: &EditingEngine) -> MenuView<'_> {
        let state = engine.suggestion();
        if !state.active {
            self.last_query = None;
            return MenuView::Inactive;
        }
        self.sync_query(state);
        let coords = state.range.and_then(|r| engine.coords_at(r.start()));
        let groups = self.catalog.grouped(&state.query);
        if groups.is_empty() {
            return MenuView::NoResults {
                query: state.query.clone(),
                coords,
            };
        }
        let count = flatten(&groups).len();
        MenuView::Results {
            groups,
            selected: self.selected.min(count - 1),
            coords,
        }
    }

    /// Handle a key; returns whether the menu consumed it
    pub fn on_key(&mut self, engine: &mut EditingEngine, key: MenuKey) -> Result<bool> {
        let state = engine.suggestion().clone();
        if !state.active {
            return Ok(false);
        }
        self.sync_query(&state);
        let count = self.catalog.filter(&state.query).len();
        match key {
            MenuKey::Up if count > 0 => {
                self.selected = (self.selected + count - 1) % count;
                Ok(true)
            }
            MenuKey::Down if count > 0 => {
                self.selected = (self.selected + 1) % count;
                Ok(true)
            }
            MenuKey::Up | MenuKey::Down => Ok(true),
            MenuKey::Enter => self.commit(engine, self.selected),
            MenuKey::Escape => {
                self.cancel(engine)?;
                Ok(true)
            }
        }
    }

    /// Delete the trigger text, then run the command at `index` of the
    /// flattened matches. Returns `false` when there is nothing to run.
    pub fn commit(&mut self, engine: &mut EditingEngine, index: usize) -> Result<bool> {
        let state = engine.suggestion().clone();
        let command = {
            let groups = self.catalog.grouped(&state.query);
            flatten(&groups).get(index).map(|c| (*c).clone())
        };
        let (Some(command), true) = (command, state.active) else {
            return Ok(false);
        };
        debug!(command = %command.id, query = %state.query, "slash command");
        self.reset();
        engine.dispatch(remove_trigger(&state))?;
        command.run(engine)?;
        Ok(true)
    }

    /// Escape: delete the trigger text and close
    pub fn cancel(&mut self, engine: &mut EditingEngine) -> Result<()> {
        let state = engine.suggestion().clone();
        self.reset();
        if state.active {
            engine.dispatch(remove_trigger(&state))?;
        }
        Ok(())
    }

    /// Click outside: close without touching the text
    pub fn dismiss(&mut self, engine: &mut EditingEngine) -> Result<()> {
        self.reset();
        engine.dispatch(
            Transaction::new()
                .with_suggestion(SuggestionState::inactive())
                .without_history(),
        )
    }

    fn sync_query(&mut self, state: &SuggestionState) {
        if self.last_query.as_deref() != Some(state.query.as_str()) {
            self.last_query = Some(state.query.clone());
            self.selected = 0;
        }
    }

    fn reset(&mut self) {
        self.selected = 0;
        self.last_query = None;
    }
}

/// Transaction deleting the trigger text and closing the menu
fn remove_trigger(state: &SuggestionState) -> Transaction {
    let mut tr = Transaction::new().with_suggestion(SuggestionState::inactive());
    if let Some(range) = state.range {
        tr.push(Step::remove_inline(range.block_id, range.from, range.to));
        tr.set_selection(Selection::collapsed(Position::new(range.block_id, range.from)));
    }
    tr
}
