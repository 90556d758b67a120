//! Key-value storage backends
//!
//! The persistence adapter talks to storage only through `StorageBackend`,
//! mirroring the browser `localStorage` surface: string keys, string
//! values, synchronous calls that may fail.

use std::collections::BTreeMap;

/// Synchronous string key-value store
pub trait StorageBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, String>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), String>;
    fn remove_item(&mut self, key: &str) -> Result<(), String>;
}

/// In-memory storage for native builds and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, String> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), String> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), String> {
        self.items.remove(key);
        Ok(())
    }
}

/// `window.localStorage`
pub struct BrowserStorage {
    storage: web_sys::Storage,
}

impl BrowserStorage {
    /// Open the page's local storage
    pub fn local() -> Result<Self, String> {
        let window = web_sys::window().ok_or_else(|| "no global window".to_string())?;
        let storage = window
            .local_storage()
            .map_err(|e| format!("localStorage unavailable: {:?}", e))?
            .ok_or_else(|| "localStorage unavailable".to_string())?;
        Ok(Self { storage })
    }
}

impl StorageBackend for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, String> {
        self.storage
            .get_item(key)
            .map_err(|e| format!("getItem({}) failed: {:?}", key, e))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), String> {
        self.storage
            .set_item(key, value)
            .map_err(|e| format!("setItem({}) failed: {:?}", key, e))
    }

    fn remove_item(&mut self, key: &str) -> Result<(), String> {
        self.storage
            .remove_item(key)
            .map_err(|e| format!("removeItem({}) failed: {:?}", key, e))
    }
}
