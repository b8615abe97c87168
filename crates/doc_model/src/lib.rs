//! Document Model - the editor's document tree
//!
//! Nodes form an owned tree rooted at a `doc` node. Every node carries a
//! session-stable [`NodeId`], a type, an attribute map, and either children or
//! (for text) a string with marks. Textblocks (paragraph, heading, code block)
//! hold inline content addressed by [`Position`] offsets.

mod document;
mod error;
mod inline;
mod mark;
mod node;
mod node_id;
mod selection;

pub use document::*;
pub use error::*;
pub use inline::normalize_inline;
pub use mark::*;
pub use node::*;
pub use node_id::*;
pub use selection::*;
