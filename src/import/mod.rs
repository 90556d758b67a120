//! Server-form import
//!
//! Converts a server form document (a recursive tree of fqn-tagged nodes)
//! into the visual element forest, with canvas layout for every element.

pub mod converter;
pub mod labels;
pub mod types;

pub use converter::{import_server_json, transform_raw_data, transform_server_form, ImportContext};
pub use types::{ImportReport, ServerDocument, SkippedNode};
