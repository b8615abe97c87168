//! Text Engine - script analysis for editor content
//!
//! Provides the majority-threshold direction classifier used to keep the
//! `dir` attribute of paragraphs and headings in step with their text.

mod direction;

pub use direction::*;
