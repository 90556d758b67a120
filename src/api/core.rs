//! WASM API for forms, elements and selection
//!
//! This module owns the process-wide form store and exposes its form
//! lifecycle, element editing, selection and dirty-state queries to
//! JavaScript.

use wasm_bindgen::prelude::*;
use serde_json::{Map, Value};
use std::sync::Mutex;
use lazy_static::lazy_static;

use crate::api::helpers::{deserialize, js_error, serialize};
use crate::api::types::{FoundElementInfo, ServerFormFile};
use crate::import;
use crate::models::{Element, ElementType, ServerRawData};
use crate::store::FormStore;
use crate::tree;
use crate::{wasm_info, wasm_warn};

// WASM-owned form store (canonical source of truth)
lazy_static! {
    static ref STORE: Mutex<FormStore> = Mutex::new(FormStore::new());
}

/// Run `f` against the global store
pub(crate) fn with_store<T>(f: impl FnOnce(&mut FormStore) -> T) -> Result<T, JsValue> {
    let mut guard = STORE
        .lock()
        .map_err(|_| js_error("Form store", "lock poisoned"))?;
    Ok(f(&mut guard))
}

// ============================================================================
// Form lifecycle
// ============================================================================

/// Create a blank form and make it active
///
/// # Returns
/// The new form's id
#[wasm_bindgen(js_name = createBlankForm)]
pub fn create_blank_form(name: Option<String>) -> Result<String, JsValue> {
    wasm_info!("createBlankForm called: name={:?}", name);
    with_store(|store| store.create_blank_form(name.as_deref()))
}

/// Import server documents `[{fileName, data}]` as forms
///
/// # Returns
/// Array of the ids of the forms added
#[wasm_bindgen(js_name = loadServerForms)]
pub fn load_server_forms(files_js: JsValue) -> Result<JsValue, JsValue> {
    let files: Vec<ServerFormFile> = deserialize(files_js, "loadServerForms: invalid files")?;
    wasm_info!("loadServerForms called with {} documents", files.len());
    let files = files.into_iter().map(|f| (f.file_name, f.data)).collect();
    let added = with_store(|store| store.load_server_forms(files))?;
    serialize(&added, "loadServerForms")
}

/// Import one server document as a new form
#[wasm_bindgen(js_name = adoptServerForm)]
pub fn adopt_server_form(name: &str, raw_js: JsValue) -> Result<String, JsValue> {
    let raw: ServerRawData = deserialize(raw_js, "adoptServerForm: invalid server data")?;
    with_store(|store| store.adopt_server_form(name, raw))
}

/// Activate a form by id, or clear activation with `null`
#[wasm_bindgen(js_name = setActiveForm)]
pub fn set_active_form(form_id: Option<String>) -> Result<bool, JsValue> {
    let activated = with_store(|store| store.activate(form_id.as_deref()))?;
    if !activated {
        wasm_warn!("setActiveForm: form {:?} not found", form_id);
    }
    Ok(activated)
}

#[wasm_bindgen(js_name = deleteForm)]
pub fn delete_form(form_id: &str) -> Result<bool, JsValue> {
    with_store(|store| store.delete_form(form_id))
}

#[wasm_bindgen(js_name = renameActiveForm)]
pub fn rename_active_form(name: &str) -> Result<bool, JsValue> {
    with_store(|store| store.rename_active_form(name))
}

/// Restore a form to its last loaded or saved state
#[wasm_bindgen(js_name = discardChanges)]
pub fn discard_changes(form_id: &str) -> Result<bool, JsValue> {
    with_store(|store| store.discard_changes(form_id))
}

#[wasm_bindgen(js_name = getFormList)]
pub fn get_form_list() -> Result<JsValue, JsValue> {
    let list = with_store(|store| store.form_list())?;
    serialize(&list, "getFormList")
}

#[wasm_bindgen(js_name = getFormsWithUnsavedStatus)]
pub fn get_forms_with_unsaved_status() -> Result<JsValue, JsValue> {
    let list = with_store(|store| store.forms_with_unsaved_status())?;
    serialize(&list, "getFormsWithUnsavedStatus")
}

/// The active form record, or `undefined`
#[wasm_bindgen(js_name = getActiveForm)]
pub fn get_active_form() -> Result<JsValue, JsValue> {
    let form = with_store(|store| store.active_form().cloned())?;
    serialize(&form, "getActiveForm")
}

#[wasm_bindgen(js_name = getActiveFormId)]
pub fn get_active_form_id() -> Result<Option<String>, JsValue> {
    with_store(|store| store.active_form_id().map(str::to_string))
}

// ============================================================================
// Working tree
// ============================================================================

/// The working tree of the active form
#[wasm_bindgen(js_name = getElements)]
pub fn get_elements() -> Result<JsValue, JsValue> {
    let elements = with_store(|store| store.elements().to_vec())?;
    serialize(&elements, "getElements")
}

#[wasm_bindgen(js_name = setFormElements)]
pub fn set_form_elements(elements_js: JsValue) -> Result<(), JsValue> {
    let elements: Vec<Element> = deserialize(elements_js, "setFormElements: invalid elements")?;
    with_store(|store| store.set_form_elements(elements))?
        .map_err(|e| js_error("setFormElements", e))
}

#[wasm_bindgen(js_name = setFormElementsAndSelect)]
pub fn set_form_elements_and_select(elements_js: JsValue, element_id: &str) -> Result<(), JsValue> {
    let elements: Vec<Element> =
        deserialize(elements_js, "setFormElementsAndSelect: invalid elements")?;
    with_store(|store| store.set_form_elements_and_select(elements, element_id))?
        .map_err(|e| js_error("setFormElementsAndSelect", e))
}

/// Locate an element with its parent and position
///
/// # Returns
/// `{element, parentId, indexInContainer, path}` or `undefined`
#[wasm_bindgen(js_name = findElementWithParent)]
pub fn find_element_with_parent(element_id: &str) -> Result<JsValue, JsValue> {
    let info = with_store(|store| {
        tree::find_with_parent(store.elements(), element_id).map(|found| FoundElementInfo {
            element: found.element.clone(),
            parent_id: found.parent.map(|p| p.id.clone()),
            index_in_container: found.index,
            path: found.path.indices().to_vec(),
        })
    })?;
    serialize(&info, "findElementWithParent")
}

// ============================================================================
// Element editing
// ============================================================================

#[wasm_bindgen(js_name = addElement)]
pub fn add_element(element_js: JsValue) -> Result<String, JsValue> {
    let element: Element = deserialize(element_js, "addElement: invalid element")?;
    with_store(|store| store.add_element(element))?.map_err(|e| js_error("addElement", e))
}

/// Create a palette widget at canvas position (x, y) and select it
#[wasm_bindgen(js_name = createAndAddElement)]
pub fn create_and_add_element(element_type: &str, x: f64, y: f64) -> Result<String, JsValue> {
    let element_type: ElementType = element_type
        .parse()
        .map_err(|e| js_error("createAndAddElement", e))?;
    with_store(|store| store.create_and_add_element(element_type, x, y))?
        .map_err(|e| js_error("createAndAddElement", e))
}

#[wasm_bindgen(js_name = addElementAtPosition)]
pub fn add_element_at_position(
    element_js: JsValue,
    position: usize,
    parent_id: Option<String>,
) -> Result<usize, JsValue> {
    let element: Element = deserialize(element_js, "addElementAtPosition: invalid element")?;
    with_store(|store| store.add_element_at_position(element, position, parent_id.as_deref()))?
        .map_err(|e| js_error("addElementAtPosition", e))
}

#[wasm_bindgen(js_name = addElementToFieldset)]
pub fn add_element_to_fieldset(
    fieldset_id: &str,
    element_js: JsValue,
    position: usize,
) -> Result<usize, JsValue> {
    let element: Element = deserialize(element_js, "addElementToFieldset: invalid element")?;
    with_store(|store| store.add_element_to_fieldset(fieldset_id, element, position))?
        .map_err(|e| js_error("addElementToFieldset", e))
}

/// Move an element to `to_position` inside `to_parent_id` (root when null)
#[wasm_bindgen(js_name = moveElement)]
pub fn move_element(
    element_id: &str,
    to_position: usize,
    to_parent_id: Option<String>,
) -> Result<usize, JsValue> {
    wasm_info!(
        "moveElement called: id={}, position={}, parent={:?}",
        element_id,
        to_position,
        to_parent_id
    );
    with_store(|store| store.move_element(element_id, to_position, to_parent_id.as_deref()))?
        .map_err(|e| js_error("moveElement", e))
}

/// Remove an element (and its subtree)
///
/// # Returns
/// The removed element
#[wasm_bindgen(js_name = removeElement)]
pub fn remove_element(element_id: &str) -> Result<JsValue, JsValue> {
    let removed = with_store(|store| store.remove_element(element_id))?
        .map_err(|e| js_error("removeElement", e))?;
    serialize(&removed, "removeElement")
}

/// Merge a patch object into an element
#[wasm_bindgen(js_name = updateElement)]
pub fn update_element(element_id: &str, patch_js: JsValue) -> Result<(), JsValue> {
    let patch: Map<String, Value> = deserialize(patch_js, "updateElement: invalid patch")?;
    with_store(|store| store.update_element(element_id, &patch))?
        .map_err(|e| js_error("updateElement", e))
}

#[wasm_bindgen(js_name = updateElementProperty)]
pub fn update_element_property(element_id: &str, key: &str, value_js: JsValue) -> Result<(), JsValue> {
    let value: Value = deserialize(value_js, "updateElementProperty: invalid value")?;
    with_store(|store| store.update_element_property(element_id, key, value))?
        .map_err(|e| js_error("updateElementProperty", e))
}

#[wasm_bindgen(js_name = updateElementPosition)]
pub fn update_element_position(element_id: &str, x: f64, y: f64) -> Result<(), JsValue> {
    with_store(|store| store.update_element_position(element_id, x, y))?
        .map_err(|e| js_error("updateElementPosition", e))
}

// ============================================================================
// Selection
// ============================================================================

#[wasm_bindgen(js_name = selectElement)]
pub fn select_element(element_id: Option<String>) -> Result<bool, JsValue> {
    with_store(|store| store.select_element(element_id.as_deref()))
}

#[wasm_bindgen(js_name = getSelectedElement)]
pub fn get_selected_element() -> Result<JsValue, JsValue> {
    let element = with_store(|store| store.selected_element().cloned())?;
    serialize(&element, "getSelectedElement")
}

// ============================================================================
// Dirty state
// ============================================================================

#[wasm_bindgen(js_name = hasUnsavedChanges)]
pub fn has_unsaved_changes() -> Result<bool, JsValue> {
    with_store(|store| store.has_unsaved_changes())
}

#[wasm_bindgen(js_name = formHasUnsavedChanges)]
pub fn form_has_unsaved_changes(form_id: &str) -> Result<bool, JsValue> {
    with_store(|store| store.form_has_unsaved_changes(form_id))
}

#[wasm_bindgen(js_name = elementHasUnsavedChanges)]
pub fn element_has_unsaved_changes(element_id: &str) -> Result<bool, JsValue> {
    with_store(|store| store.element_has_unsaved_changes(element_id))
}

#[wasm_bindgen(js_name = activeFormNameChanged)]
pub fn active_form_name_changed() -> Result<bool, JsValue> {
    with_store(|store| store.active_form_name_changed())
}

#[wasm_bindgen(js_name = markFormDirty)]
pub fn mark_form_dirty(form_id: &str, element_id: Option<String>) -> Result<(), JsValue> {
    with_store(|store| store.mark_form_dirty(form_id, element_id.as_deref()))
}

#[wasm_bindgen(js_name = markFormClean)]
pub fn mark_form_clean(form_id: &str) -> Result<(), JsValue> {
    with_store(|store| store.mark_form_clean(form_id))
}

#[wasm_bindgen(js_name = clearElementChanges)]
pub fn clear_element_changes(element_id: &str) -> Result<(), JsValue> {
    with_store(|store| store.clear_element_changes(element_id))
}

// ============================================================================
// Server-form import
// ============================================================================

/// Transform a server document JSON string into an import report
///
/// # Returns
/// `{elements, nextY, skipped}`; an unparseable document yields no elements
#[wasm_bindgen(js_name = transformServerForm)]
pub fn transform_server_form(server_json: &str) -> Result<JsValue, JsValue> {
    let report = import::import_server_json(server_json);
    wasm_info!(
        "transformServerForm: {} elements, {} skipped",
        report.elements.len(),
        report.skipped.len()
    );
    serialize(&report, "transformServerForm")
}
