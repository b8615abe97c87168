//! Hooks into the host UI

use crate::SuggestionState;
use doc_model::Position;

/// Screen coordinates of a document position
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coords {
    pub left: f64,
    pub top: f64,
    pub bottom: f64,
}

/// Maps document positions to screen coordinates; supplied by the view
pub trait CoordsProvider: Send + Sync {
    fn coords_at(&self, position: Position) -> Option<Coords>;
}

/// Side effects the editor asks the host to perform.
///
/// Every method has a no-op default so hosts implement only what they show.
pub trait EditorCallbacks: Send + Sync {
    fn open_glossary_selector(&self) {}

    fn open_post_selector(&self) {}

    fn open_media_library(&self) {}

    /// The slash suggestion state changed
    fn suggestion_changed(&self, _state: &SuggestionState) {}
}

/// Callbacks that ignore every request
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCallbacks;

impl EditorCallbacks for NoopCallbacks {}
