//! Form record persistence
//!
//! Save, load, export and publish whole `ManagedForm` records through a
//! pluggable key-value backend: in-memory for native builds and tests,
//! `window.localStorage` in the browser.

pub mod adapter;
pub mod errors;
pub mod storage;

pub use adapter::{
    form_key, generate_form_id, now_iso, timestamp_millis, FormMetadata, FormPersistence,
    StorageStats, FORM_VERSION, METADATA_KEY, STORAGE_PREFIX,
};
pub use errors::{ErrorInfo, PersistenceError};
pub use storage::{BrowserStorage, MemoryStorage, StorageBackend};
