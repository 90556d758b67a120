//! WASM API for saved forms
//!
//! Every call opens `window.localStorage` and answers with a result record
//! (`{success, id?, data?, error?}`) rather than throwing.

use wasm_bindgen::prelude::*;

use crate::api::core::with_store;
use crate::api::helpers::serialize;
use crate::api::types::{LoadResult, PersistResult};
use crate::persistence::{BrowserStorage, FormPersistence, PersistenceError};
use crate::{wasm_error, wasm_info};

fn open_persistence() -> Result<FormPersistence<BrowserStorage>, PersistenceError> {
    BrowserStorage::local()
        .map(FormPersistence::new)
        .map_err(|e| PersistenceError::storage("open", e))
}

fn persist_result(result: Result<String, PersistenceError>, context: &str) -> Result<JsValue, JsValue> {
    if let Err(e) = &result {
        wasm_error!("{} failed: {}", context, e);
    }
    serialize(&PersistResult::from(result), context)
}

fn load_result<T: serde::Serialize>(
    result: Result<T, PersistenceError>,
    context: &str,
) -> Result<JsValue, JsValue> {
    if let Err(e) = &result {
        wasm_error!("{} failed: {}", context, e);
    }
    serialize(&LoadResult::from(result), context)
}

/// Save the active form with its current working tree
#[wasm_bindgen(js_name = saveActiveForm)]
pub fn save_active_form() -> Result<JsValue, JsValue> {
    wasm_info!("saveActiveForm called");
    let result = match open_persistence() {
        Ok(mut persistence) => with_store(|store| store.save_active_form(&mut persistence))?,
        Err(e) => Err(e),
    };
    persist_result(result, "saveActiveForm")
}

/// Load a stored form into the store and activate it
#[wasm_bindgen(js_name = loadForm)]
pub fn load_form(form_id: &str) -> Result<JsValue, JsValue> {
    wasm_info!("loadForm called: id={}", form_id);
    let result = match open_persistence() {
        Ok(mut persistence) => {
            with_store(|store| store.load_and_activate_form(&mut persistence, form_id))?
        }
        Err(e) => Err(e),
    };
    persist_result(result, "loadForm")
}

/// Merge every stored form into the store
///
/// # Returns
/// `{success, data: <number of records taken>}`
#[wasm_bindgen(js_name = loadAllForms)]
pub fn load_all_forms() -> Result<JsValue, JsValue> {
    let result = match open_persistence() {
        Ok(mut persistence) => with_store(|store| store.load_all_saved_forms(&mut persistence))?,
        Err(e) => Err(e),
    };
    load_result(result, "loadAllForms")
}

/// Stored published forms, newest first
#[wasm_bindgen(js_name = loadPublishedForms)]
pub fn load_published_forms() -> Result<JsValue, JsValue> {
    let result = open_persistence().and_then(|mut p| p.load_published());
    load_result(result, "loadPublishedForms")
}

/// Stored draft forms, newest first
#[wasm_bindgen(js_name = loadDraftForms)]
pub fn load_draft_forms() -> Result<JsValue, JsValue> {
    let result = open_persistence().and_then(|mut p| p.load_drafts());
    load_result(result, "loadDraftForms")
}

#[wasm_bindgen(js_name = deleteFormEverywhere)]
pub fn delete_form_everywhere(form_id: &str) -> Result<JsValue, JsValue> {
    wasm_info!("deleteFormEverywhere called: id={}", form_id);
    let result = match open_persistence() {
        Ok(mut persistence) => {
            with_store(|store| store.delete_form_everywhere(&mut persistence, form_id))?
        }
        Err(e) => Err(e),
    };
    serialize(&PersistResult::from(result), "deleteFormEverywhere")
}

#[wasm_bindgen(js_name = publishForm)]
pub fn publish_form(form_id: &str) -> Result<JsValue, JsValue> {
    let result = match open_persistence() {
        Ok(mut persistence) => with_store(|store| store.publish_form(&mut persistence, form_id))?,
        Err(e) => Err(e),
    };
    persist_result(result, "publishForm")
}

#[wasm_bindgen(js_name = unpublishForm)]
pub fn unpublish_form(form_id: &str) -> Result<JsValue, JsValue> {
    let result = match open_persistence() {
        Ok(mut persistence) => {
            with_store(|store| store.unpublish_form(&mut persistence, form_id))?
        }
        Err(e) => Err(e),
    };
    persist_result(result, "unpublishForm")
}

/// Pretty-printed JSON of a stored form
#[wasm_bindgen(js_name = exportForm)]
pub fn export_form(form_id: &str) -> Result<JsValue, JsValue> {
    let result = open_persistence().and_then(|mut p| p.export(form_id));
    load_result(result, "exportForm")
}

/// Store an exported form under a fresh id and add it to the store
#[wasm_bindgen(js_name = importForm)]
pub fn import_form(json: &str) -> Result<JsValue, JsValue> {
    let result = match open_persistence() {
        Ok(mut persistence) => match persistence.import(json) {
            Ok(id) => with_store(|store| store.load_and_activate_form(&mut persistence, &id))?,
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    };
    persist_result(result, "importForm")
}

#[wasm_bindgen(js_name = getStorageStats)]
pub fn get_storage_stats() -> Result<JsValue, JsValue> {
    let result = open_persistence().map(|p| p.storage_stats());
    load_result(result, "getStorageStats")
}

/// Remove every stored form; forms in the store are kept
#[wasm_bindgen(js_name = clearAllForms)]
pub fn clear_all_forms() -> Result<JsValue, JsValue> {
    let result = open_persistence().and_then(|mut p| p.clear_all());
    serialize(&PersistResult::from(result), "clearAllForms")
}
