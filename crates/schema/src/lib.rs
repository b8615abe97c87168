//! Schema - Node type registry and attribute codec
//!
//! This crate describes every node and mark type of the editor:
//! - Attribute declarations with defaults and HTML parse/render rules
//! - Parse rules keyed by CSS selector with priorities
//! - Render rules producing element descriptors
//! - A registry that validates content constraints and converts documents
//!   to and from HTML

mod attribute;
mod dom;
mod error;
mod marks;
mod nodes;
mod parser;
mod registry;
mod serializer;
mod spec;

pub use attribute::*;
pub use dom::*;
pub use error::*;
pub use marks::mark_specs;
pub use nodes::{format_file_size, node_specs};
pub use registry::{default_schema, SchemaBuilder, SchemaRegistry};
pub use spec::*;
