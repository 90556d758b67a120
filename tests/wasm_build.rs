//! WASM build test
//!
//! This module tests that the WASM module can be built and the exported API
//! works against the shared form store.

#![cfg(target_arch = "wasm32")]

use form_builder_wasm::api::*;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

/// Plain JS object from a JSON value
fn js_object(value: serde_json::Value) -> JsValue {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    serde::Serialize::serialize(&value, &serializer).unwrap()
}

#[wasm_bindgen_test]
fn test_create_form_and_add_elements() {
    let form_id = create_blank_form(Some("Wasm Form".to_string())).unwrap();
    assert_eq!(get_active_form_id().unwrap(), Some(form_id));

    let id = create_and_add_element("input", 40.0, 60.0).unwrap();
    assert!(get_selected_element().unwrap().is_object());
    assert!(has_unsaved_changes().unwrap());

    let fieldset = create_and_add_element("fieldset", 40.0, 200.0).unwrap();
    move_element(&id, 0, Some(fieldset.clone())).unwrap();
    assert!(find_element_with_parent(&id).unwrap().is_object());

    assert!(create_and_add_element("slider", 0.0, 0.0).is_err());
    assert!(move_element(&fieldset, 0, Some(id)).is_err());
}

#[wasm_bindgen_test]
fn test_drag_and_drop_creates_element() {
    create_blank_form(None).unwrap();
    start_external_drag("checkbox").unwrap();

    let created = handle_drop(js_object(serde_json::json!({ "elementType": "checkbox" }))).unwrap();
    assert!(created.is_some());

    // The session ended with the drop
    assert_eq!(handle_drop(js_object(serde_json::json!({}))).unwrap(), None);
}

#[wasm_bindgen_test]
fn test_transform_server_form_returns_report() {
    let report = transform_server_form(
        r#"{"children": [{"fqn": "Easy\\Form\\Item\\Input\\Text", "attributes": {"name": "email"}}]}"#,
    )
    .unwrap();
    assert!(report.is_object());
    assert!(transform_server_form("garbage").unwrap().is_object());
}

#[wasm_bindgen_test]
fn test_save_and_reload_through_local_storage() {
    create_blank_form(Some("Persisted".to_string())).unwrap();
    create_and_add_element("textarea", 10.0, 10.0).unwrap();

    let saved = save_active_form().unwrap();
    assert!(saved.is_object());
    assert!(!has_unsaved_changes().unwrap());

    assert!(get_storage_stats().unwrap().is_object());
    assert!(clear_all_forms().unwrap().is_object());
}
