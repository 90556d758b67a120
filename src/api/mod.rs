//! Form Builder WASM API
//!
//! This module provides the JavaScript-facing API for the form builder.
//! All state lives in one WASM-owned form store; JavaScript reads it back
//! through the getters after each call.
//!
//! # Module Structure
//!
//! - `helpers`: Shared utilities for serialization, error handling, and logging
//! - `types`: Result records returned to JavaScript
//! - `core`: Form lifecycle, element editing, selection and dirty state
//! - `drag`: Drag session and drop handling
//! - `persistence`: Saving, loading and publishing through localStorage

pub mod helpers;
pub mod types;
pub mod core;
pub mod drag;
pub mod persistence;

pub use self::core::*;
pub use drag::{end_drag, get_drag_state, handle_drop, start_external_drag, start_internal_drag};
pub use persistence::{
    clear_all_forms, delete_form_everywhere, export_form, get_storage_stats, import_form,
    load_all_forms, load_draft_forms, load_form, load_published_forms, publish_form,
    save_active_form, unpublish_form,
};
