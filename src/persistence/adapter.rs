//! Form persistence over a key-value backend
//!
//! Each form record is stored as JSON under `form-builder-form_<id>`; an
//! id → metadata index under `form-builder-metadata` lists what exists.
//! The call surface mirrors a remote forms API so the backend can later be
//! swapped for server communication.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::models::ManagedForm;

use super::errors::PersistenceError;
use super::storage::StorageBackend;

pub const STORAGE_PREFIX: &str = "form-builder-";
pub const METADATA_KEY: &str = "form-builder-metadata";
/// Record format version stamped on every save
pub const FORM_VERSION: &str = "1.0.0";
pub const IMPORTED_SUFFIX: &str = " (Imported)";

/// One entry of the metadata index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormMetadata {
    pub name: String,
    pub last_modified: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageStats {
    pub form_count: usize,
    /// Sum of stored record lengths in bytes
    pub total_size: usize,
    pub formatted_size: String,
}

/// Storage key of a form record
pub fn form_key(id: &str) -> String {
    format!("{}form_{}", STORAGE_PREFIX, id)
}

/// Mint a persistence id: `form_<millis>_<9 random chars>`
pub fn generate_form_id() -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(9).collect();
    format!("form_{}_{}", Utc::now().timestamp_millis(), suffix)
}

/// Current time as an ISO-8601 string with millisecond precision
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Milliseconds since the epoch of an ISO timestamp; 0 when absent or invalid
pub fn timestamp_millis(value: Option<&str>) -> i64 {
    value
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.timestamp_millis())
        .unwrap_or(0)
}

pub struct FormPersistence<S: StorageBackend> {
    storage: S,
    last_error: Option<PersistenceError>,
}

impl<S: StorageBackend> FormPersistence<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            last_error: None,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Most recent failure; cleared by the next successful call
    pub fn last_error(&self) -> Option<&PersistenceError> {
        self.last_error.as_ref()
    }

    fn track<T>(&mut self, context: &str, result: Result<T, PersistenceError>) -> Result<T, PersistenceError> {
        match &result {
            Ok(_) => self.last_error = None,
            Err(e) => {
                log::error!("form persistence error [{}]: {}", context, e);
                self.last_error = Some(e.clone());
            }
        }
        result
    }

    // ------------------------------------------------------------------
    // Metadata index
    // ------------------------------------------------------------------

    /// Read the metadata index. A missing or corrupt index reads as empty.
    pub fn metadata(&self) -> Result<BTreeMap<String, FormMetadata>, PersistenceError> {
        let raw = self
            .storage
            .get_item(METADATA_KEY)
            .map_err(|e| PersistenceError::storage("Read Metadata", e))?;
        match raw {
            None => Ok(BTreeMap::new()),
            Some(text) => Ok(serde_json::from_str(&text).unwrap_or_else(|e| {
                log::warn!("ignoring corrupt forms metadata: {}", e);
                BTreeMap::new()
            })),
        }
    }

    fn write_metadata(&mut self, metadata: &BTreeMap<String, FormMetadata>) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(metadata)
            .map_err(|e| PersistenceError::storage("Write Metadata", e.to_string()))?;
        self.storage
            .set_item(METADATA_KEY, &json)
            .map_err(|e| PersistenceError::storage("Write Metadata", e))
    }

    /// Index update after a save; failures are logged, never fatal
    fn update_metadata(&mut self, id: &str, entry: FormMetadata) {
        let result = self.metadata().and_then(|mut all| {
            all.insert(id.to_string(), entry);
            self.write_metadata(&all)
        });
        if let Err(e) = result {
            log::warn!("failed to update forms metadata: {}", e);
        }
    }

    // ------------------------------------------------------------------
    // Record access
    // ------------------------------------------------------------------

    fn read_record(&self, id: &str) -> Result<ManagedForm, PersistenceError> {
        let text = self
            .storage
            .get_item(&form_key(id))
            .map_err(|e| PersistenceError::storage("Load Form", e))?
            .ok_or_else(|| PersistenceError::NotFound { id: id.to_string() })?;

        let invalid = |reason: String| PersistenceError::InvalidStructure {
            id: id.to_string(),
            reason,
        };
        let value: Value = serde_json::from_str(&text).map_err(|e| invalid(e.to_string()))?;
        let has_text = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .map_or(false, |s| !s.is_empty())
        };
        if !has_text("id") || !has_text("name") {
            return Err(invalid("missing id or name".to_string()));
        }
        if !value.get("visualElements").map_or(false, Value::is_array) {
            return Err(invalid("visualElements is not an array".to_string()));
        }
        serde_json::from_value(value).map_err(|e| invalid(e.to_string()))
    }

    /// Stamp and write a record; returns what was stored
    fn write_record(&mut self, form: &ManagedForm) -> Result<ManagedForm, PersistenceError> {
        let now = now_iso();
        let mut record = form.clone();
        if record.id.is_empty() {
            record.id = generate_form_id();
        }
        record.version = Some(FORM_VERSION.to_string());
        record.last_modified = Some(now.clone());
        if record.created_at.is_none() {
            record.created_at = Some(now.clone());
        }

        let json = serde_json::to_string(&record)
            .map_err(|e| PersistenceError::storage("Save Form", e.to_string()))?;
        self.storage
            .set_item(&form_key(&record.id), &json)
            .map_err(|e| PersistenceError::storage("Save Form", e))?;

        self.update_metadata(
            &record.id,
            FormMetadata {
                name: record.name.clone(),
                last_modified: now,
                version: FORM_VERSION.to_string(),
            },
        );
        log::debug!("saved form {} ({})", record.id, record.name);
        Ok(record)
    }

    // ------------------------------------------------------------------
    // Public operations
    // ------------------------------------------------------------------

    /// Save a form and return the stored record (id minted if empty)
    pub fn save_form(&mut self, form: &ManagedForm) -> Result<ManagedForm, PersistenceError> {
        let result = self.write_record(form);
        self.track("Save Form", result)
    }

    pub fn save(&mut self, form: &ManagedForm) -> Result<String, PersistenceError> {
        self.save_form(form).map(|record| record.id)
    }

    pub fn load(&mut self, id: &str) -> Result<ManagedForm, PersistenceError> {
        let result = self.read_record(id);
        self.track("Load Form", result)
    }

    /// Every indexed form that loads, newest `lastModified` first.
    /// Records that fail to load are skipped.
    pub fn load_all(&mut self) -> Result<Vec<ManagedForm>, PersistenceError> {
        let result = self.metadata().map(|metadata| {
            let mut forms: Vec<ManagedForm> = metadata
                .keys()
                .filter_map(|id| match self.read_record(id) {
                    Ok(form) => Some(form),
                    Err(e) => {
                        log::warn!("skipping stored form {}: {}", id, e);
                        None
                    }
                })
                .collect();
            forms.sort_by_key(|f| Reverse(timestamp_millis(f.last_modified.as_deref())));
            forms
        });
        self.track("Load All Forms", result)
    }

    /// Published forms, newest `publishedAt` first
    pub fn load_published(&mut self) -> Result<Vec<ManagedForm>, PersistenceError> {
        let mut forms = self.load_all()?;
        forms.retain(|f| f.published);
        forms.sort_by_key(|f| Reverse(timestamp_millis(f.published_at.as_deref())));
        Ok(forms)
    }

    /// Unpublished forms, newest `lastModified` first
    pub fn load_drafts(&mut self) -> Result<Vec<ManagedForm>, PersistenceError> {
        let mut forms = self.load_all()?;
        forms.retain(|f| !f.published);
        Ok(forms)
    }

    /// Remove a record and its index entry. Deleting an absent id succeeds.
    pub fn delete(&mut self, id: &str) -> Result<(), PersistenceError> {
        let result = self
            .storage
            .remove_item(&form_key(id))
            .map_err(|e| PersistenceError::storage("Delete Form", e))
            .and_then(|_| self.metadata())
            .and_then(|mut metadata| {
                metadata.remove(id);
                self.write_metadata(&metadata)
            });
        self.track("Delete Form", result)
    }

    /// Merge `patch` into the stored record and save it. The id never changes.
    pub fn update(&mut self, id: &str, patch: &Map<String, Value>) -> Result<String, PersistenceError> {
        let result = self.read_record(id).and_then(|form| {
            let invalid = |e: serde_json::Error| PersistenceError::InvalidStructure {
                id: id.to_string(),
                reason: e.to_string(),
            };
            let mut value = serde_json::to_value(&form).map_err(invalid)?;
            if let Some(fields) = value.as_object_mut() {
                for (key, new_value) in patch {
                    if key != "id" {
                        fields.insert(key.clone(), new_value.clone());
                    }
                }
            }
            let updated: ManagedForm = serde_json::from_value(value).map_err(invalid)?;
            self.write_record(&updated).map(|record| record.id)
        });
        self.track("Update Form", result)
    }

    /// The stored record as pretty-printed JSON
    pub fn export(&mut self, id: &str) -> Result<String, PersistenceError> {
        let result = self.read_record(id).and_then(|form| {
            serde_json::to_string_pretty(&form)
                .map_err(|e| PersistenceError::storage("Export Form", e.to_string()))
        });
        self.track("Export Form", result)
    }

    /// Store a form from exported JSON under a new id
    pub fn import(&mut self, json: &str) -> Result<String, PersistenceError> {
        let result = serde_json::from_str::<ManagedForm>(json)
            .map_err(|e| PersistenceError::storage("Import Form", e.to_string()))
            .and_then(|mut form| {
                form.id = generate_form_id();
                form.name = format!("{}{}", form.name, IMPORTED_SUFFIX);
                form.created_at = None;
                self.write_record(&form).map(|record| record.id)
            });
        self.track("Import Form", result)
    }

    pub fn publish(&mut self, id: &str) -> Result<String, PersistenceError> {
        let result = self.read_record(id).and_then(|mut form| {
            form.published = true;
            form.published_at = Some(now_iso());
            self.write_record(&form).map(|record| record.id)
        });
        self.track("Publish Form", result)
    }

    pub fn unpublish(&mut self, id: &str) -> Result<String, PersistenceError> {
        let result = self.read_record(id).and_then(|mut form| {
            form.published = false;
            form.published_at = None;
            self.write_record(&form).map(|record| record.id)
        });
        self.track("Unpublish Form", result)
    }

    /// Remove every indexed record and the index itself
    pub fn clear_all(&mut self) -> Result<(), PersistenceError> {
        let result = self.metadata().and_then(|metadata| {
            for id in metadata.keys() {
                self.storage
                    .remove_item(&form_key(id))
                    .map_err(|e| PersistenceError::storage("Clear All Forms", e))?;
            }
            self.storage
                .remove_item(METADATA_KEY)
                .map_err(|e| PersistenceError::storage("Clear All Forms", e))
        });
        self.track("Clear All Forms", result)
    }

    pub fn storage_stats(&self) -> StorageStats {
        let metadata = self.metadata().unwrap_or_default();
        let total_size: usize = metadata
            .keys()
            .filter_map(|id| self.storage.get_item(&form_key(id)).ok().flatten())
            .map(|record| record.len())
            .sum();
        StorageStats {
            form_count: metadata.len(),
            total_size,
            formatted_size: format!("{:.2} KB", total_size as f64 / 1024.0),
        }
    }
}
