//! Edit Engine - Steps, transactions, commands and undo/redo
//!
//! Commands build transactions, the engine applies them atomically, and the
//! document rules (text direction, footnote numbering) append their
//! corrections to the same history entry.

mod block_commands;
mod callbacks;
mod command;
mod config;
mod error;
mod executor;
mod footnote_commands;
mod honorifics;
mod media_commands;
mod quote_commands;
pub mod rules;
mod slash_commands;
mod step;
mod suggestion;
mod text_commands;
mod transaction;
mod undo;

pub use block_commands::*;
pub use callbacks::*;
pub use command::*;
pub use config::*;
pub use error::*;
pub use executor::*;
pub use footnote_commands::*;
pub use honorifics::*;
pub use media_commands::*;
pub use quote_commands::*;
pub use rules::{DocumentRule, RulePipeline};
pub use slash_commands::*;
pub use step::*;
pub use suggestion::*;
pub use text_commands::*;
pub use transaction::*;
pub use undo::*;
