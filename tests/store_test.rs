// Form store: multi-form sessions, drag and drop, persistence orchestration

use form_builder_wasm::models::{Element, ElementType, ServerRawData};
use form_builder_wasm::persistence::{
    FormPersistence, MemoryStorage, PersistenceError, StorageBackend,
};
use form_builder_wasm::store::{DragSession, DropPosition, DropTarget, FormStore};
use form_builder_wasm::tree;
use serde_json::json;

fn el(id: &str, element_type: ElementType) -> Element {
    let mut e = Element::new(element_type);
    e.id = id.to_string();
    e
}

/// Backend whose writes always fail, as a full localStorage would
struct FullStorage;

impl StorageBackend for FullStorage {
    fn get_item(&self, _key: &str) -> Result<Option<String>, String> {
        Ok(None)
    }

    fn set_item(&mut self, _key: &str, _value: &str) -> Result<(), String> {
        Err("QuotaExceededError".to_string())
    }

    fn remove_item(&mut self, _key: &str) -> Result<(), String> {
        Ok(())
    }
}

fn raw_form(name: &str) -> ServerRawData {
    serde_json::from_value(json!({
        "fqn": "Easy\\Form",
        "attributes": { "name": name },
        "children": [
            { "fqn": "Easy\\Form\\Item\\Input\\Text", "attributes": { "name": "first" } },
            { "fqn": "Easy\\Form\\Fieldset", "attributes": { "id": "group", "label": "Group" } }
        ]
    }))
    .unwrap()
}

#[test]
fn test_switching_forms_keeps_each_working_tree() {
    let mut store = FormStore::new();
    let first = store.create_blank_form(Some("First"));
    store.add_element(el("a", ElementType::Input)).unwrap();

    let second = store.create_blank_form(Some("Second"));
    assert!(store.elements().is_empty());
    store.add_element(el("b", ElementType::Checkbox)).unwrap();

    assert!(store.activate(Some(&first)));
    assert_eq!(tree::collect_ids(store.elements()), vec!["a"]);
    assert!(store.has_unsaved_changes());

    assert!(store.activate(Some(&second)));
    assert_eq!(tree::collect_ids(store.elements()), vec!["b"]);
    assert!(!store.activate(Some("missing")));
    assert_eq!(store.active_form_id(), Some(second.as_str()));
}

#[test]
fn test_deleting_active_form_falls_back_to_first() {
    let mut store = FormStore::new();
    let first = store.create_blank_form(Some("First"));
    let second = store.create_blank_form(Some("Second"));

    assert!(store.delete_form(&second));
    assert_eq!(store.active_form_id(), Some(first.as_str()));

    assert!(store.delete_form(&first));
    assert!(store.active_form_id().is_none());
    assert!(store.elements().is_empty());
    assert!(!store.delete_form(&first));
}

#[test]
fn test_server_forms_import_with_names_from_documents() {
    let mut store = FormStore::new();
    let added = store.load_server_forms(vec![
        ("contact.json".to_string(), raw_form("Contact")),
        ("copy.json".to_string(), raw_form("Contact")),
        ("survey.json".to_string(), raw_form("")),
    ]);
    assert_eq!(added.len(), 2);

    let names: Vec<String> = store.form_list().into_iter().map(|f| f.name).collect();
    assert_eq!(names, vec!["Contact", "survey"]);

    let contact = store.form(&added[0]).unwrap();
    assert_eq!(contact.file_path.as_deref(), Some("contact.json"));
    assert_eq!(contact.visual_elements.len(), 2);
    assert!(!store.form_has_unsaved_changes(&added[0]));
}

#[test]
fn test_external_drop_creates_widget_inside_fieldset() {
    let mut store = FormStore::new();
    let added = store.load_server_forms(vec![("c.json".to_string(), raw_form("Contact"))]);
    store.activate(Some(&added[0]));

    let mut drag = DragSession::new();
    drag.start_external_drag("date");
    let action = drag
        .handle_drop(DropTarget {
            parent_id: Some("group".to_string()),
            element_type: Some("date".to_string()),
            ..Default::default()
        })
        .expect("drop should resolve");
    assert!(!drag.is_dragging);

    let id = store.apply_drop(action).unwrap();
    let group = tree::find(store.elements(), "group").unwrap();
    assert_eq!(group.children().unwrap()[0].id, id);
    assert_eq!(store.selected_element_id(), Some(id.as_str()));
    assert!(store.has_unsaved_changes());
}

#[test]
fn test_internal_drop_before_sibling_reorders_root() {
    let mut store = FormStore::new();
    store.create_blank_form(None);
    for id in ["a", "b", "c"] {
        store.add_element(el(id, ElementType::Input)).unwrap();
    }

    let mut drag = DragSession::new();
    drag.start_internal_drag("c", "input");
    let action = drag
        .handle_drop(DropTarget {
            position: DropPosition::Before,
            sibling_id: Some("a".to_string()),
            element_id: Some("c".to_string()),
            ..Default::default()
        })
        .unwrap();
    store.apply_drop(action).unwrap();

    assert_eq!(tree::collect_ids(store.elements()), vec!["c", "a", "b"]);
    assert!(tree::orders_are_dense(store.elements()));
}

#[test]
fn test_drop_without_drag_does_nothing() {
    let mut drag = DragSession::new();
    assert!(drag.handle_drop(DropTarget::default()).is_none());
}

#[test]
fn test_failed_save_leaves_store_untouched() {
    let mut store = FormStore::new();
    let id = store.create_blank_form(Some("Draft"));
    store.add_element(el("a", ElementType::Input)).unwrap();
    let before = store.active_form().cloned();

    let mut persistence = FormPersistence::new(FullStorage);
    let err = store.save_active_form(&mut persistence).unwrap_err();
    assert!(matches!(err, PersistenceError::Storage { .. }));
    assert_eq!(err.code(), "STORAGE_ERROR");

    assert_eq!(store.active_form().cloned(), before);
    assert!(store.form_has_unsaved_changes(&id));
    assert!(persistence.last_error().is_some());
}

#[test]
fn test_save_reload_round_trip_through_storage() {
    let mut persistence = FormPersistence::new(MemoryStorage::new());

    let mut store = FormStore::new();
    let id = store.create_blank_form(Some("Saved"));
    store.add_element(el("a", ElementType::Input)).unwrap();
    store.add_element(el("fs", ElementType::Fieldset)).unwrap();
    store.move_element("a", 0, Some("fs")).unwrap();
    store.save_active_form(&mut persistence).unwrap();
    assert!(!store.has_unsaved_changes());

    let mut fresh = FormStore::new();
    let loaded = fresh.load_and_activate_form(&mut persistence, &id).unwrap();
    assert_eq!(loaded, id);
    assert_eq!(fresh.elements(), store.elements());
    assert_eq!(fresh.active_form().unwrap().version.as_deref(), Some("1.0.0"));
    assert!(!fresh.has_unsaved_changes());
}

#[test]
fn test_load_all_takes_only_newer_records() {
    let mut persistence = FormPersistence::new(MemoryStorage::new());

    let mut store = FormStore::new();
    let id = store.create_blank_form(Some("Shared"));
    store.save_active_form(&mut persistence).unwrap();

    // Another session saved a second form; the first is already current
    let mut other = FormStore::new();
    let other_id = other.create_blank_form(Some("Other"));
    other.save_active_form(&mut persistence).unwrap();

    let taken = store.load_all_saved_forms(&mut persistence).unwrap();
    assert_eq!(taken, 1);
    assert!(store.form(&other_id).is_some());
    assert!(store.form(&id).is_some());
    assert_eq!(store.forms().len(), 2);
}

#[test]
fn test_delete_everywhere_and_publish() {
    let mut persistence = FormPersistence::new(MemoryStorage::new());
    let mut store = FormStore::new();
    let id = store.create_blank_form(Some("Survey"));
    store.save_active_form(&mut persistence).unwrap();

    store.publish_form(&mut persistence, &id).unwrap();
    assert!(store.form(&id).unwrap().published);
    assert!(store.form(&id).unwrap().published_at.is_some());
    assert_eq!(persistence.load_published().unwrap().len(), 1);

    store.unpublish_form(&mut persistence, &id).unwrap();
    assert!(!store.form(&id).unwrap().published);
    assert_eq!(persistence.load_drafts().unwrap().len(), 1);

    store.delete_form_everywhere(&mut persistence, &id).unwrap();
    assert!(store.form(&id).is_none());
    assert!(matches!(
        persistence.load(&id),
        Err(PersistenceError::NotFound { .. })
    ));
}

#[test]
fn test_sync_then_reactivate_reproduces_working_tree() {
    let mut store = FormStore::new();
    let id = store.create_blank_form(Some("Tree"));
    store.add_element(el("fs", ElementType::Fieldset)).unwrap();
    store.add_element_to_fieldset("fs", el("a", ElementType::Input), 0).unwrap();
    store.add_element(el("b", ElementType::Radio)).unwrap();
    store.sync_to_form();

    let working = store.elements().to_vec();
    assert!(store.activate(Some(&id)));
    assert_eq!(store.elements(), working.as_slice());
}

#[test]
fn test_replacing_tree_with_repeated_ids_is_rejected() {
    let mut store = FormStore::new();
    store.create_blank_form(Some("Guarded"));
    store.add_element(el("a", ElementType::Input)).unwrap();
    store.select_element(Some("a"));
    let before = store.elements().to_vec();

    let twins = vec![el("same", ElementType::Input), el("same", ElementType::Checkbox)];
    let err = store.set_form_elements(twins).unwrap_err();
    assert_eq!(err, tree::TreeError::DuplicateId("same".to_string()));

    let mut group = el("group", ElementType::Fieldset);
    group.children_mut().unwrap().push(el("a", ElementType::Date));
    let nested = vec![el("a", ElementType::Input), group];
    assert!(store.set_form_elements_and_select(nested, "a").is_err());

    assert_eq!(store.elements(), before.as_slice());
    assert_eq!(store.selected_element_id(), Some("a"));

    store
        .set_form_elements(vec![el("x", ElementType::Input), el("y", ElementType::Radio)])
        .unwrap();
    assert_eq!(tree::collect_ids(store.elements()), vec!["x", "y"]);
    assert!(store.selected_element_id().is_none());
}
