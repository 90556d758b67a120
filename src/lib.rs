//! Form Builder WASM Module
//!
//! Editing engine for a visual form builder: a tree of form elements with
//! structural mutations, an importer for server form documents, a store of
//! managed forms with dirty tracking, and localStorage persistence.

pub mod models;
pub mod tree;
pub mod import;
pub mod store;
pub mod persistence;
pub mod api;

// Re-export commonly used types
pub use models::elements::*;
pub use models::form::*;
pub use tree::TreeError;
pub use store::FormStore;
pub use persistence::{FormPersistence, PersistenceError};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(feature = "console_log")]
    if let Err(e) = console_log::init_with_level(log::Level::Debug) {
        crate::wasm_warn!("logger already initialized: {}", e);
    }

    log::info!("Form Builder WASM module initialized");
}
