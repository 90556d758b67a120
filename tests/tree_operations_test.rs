// Tree mutation engine: structural edits over nested fieldsets

use form_builder_wasm::models::{Element, ElementKind, ElementType};
use form_builder_wasm::tree::{self, TreeError};
use serde_json::{json, Map, Value};

/// Create an element with a fixed id
fn el(id: &str, element_type: ElementType) -> Element {
    let mut e = Element::new(element_type);
    e.id = id.to_string();
    e
}

fn fieldset(id: &str, children: Vec<Element>) -> Element {
    let mut fs = el(id, ElementType::Fieldset);
    if let Some(slot) = fs.children_mut() {
        *slot = children;
    }
    fs
}

/// a, fs1[b, fs2[c]], d
fn sample_forest() -> Vec<Element> {
    let mut forest = vec![
        el("a", ElementType::Input),
        fieldset(
            "fs1",
            vec![
                el("b", ElementType::Checkbox),
                fieldset("fs2", vec![el("c", ElementType::Select)]),
            ],
        ),
        el("d", ElementType::Button),
    ];
    tree::renumber(&mut forest);
    forest
}

fn ids(elements: &[Element]) -> Vec<&str> {
    elements.iter().map(|e| e.id.as_str()).collect()
}

fn patch(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

#[test]
fn test_find_with_parent_reports_nested_position() {
    let forest = sample_forest();
    let found = tree::find_with_parent(&forest, "c").expect("c should be found");
    assert_eq!(found.element.id, "c");
    assert_eq!(found.parent.map(|p| p.id.as_str()), Some("fs2"));
    assert_eq!(found.index, 0);
    assert_eq!(found.path.indices(), &[1, 1, 0]);

    let root = tree::find_with_parent(&forest, "d").unwrap();
    assert!(root.parent.is_none());
    assert_eq!(root.index, 2);
    assert_eq!(ids(root.container), vec!["a", "fs1", "d"]);

    assert!(tree::find_with_parent(&forest, "missing").is_none());
}

#[test]
fn test_move_root_element_into_nested_fieldset() {
    let mut forest = sample_forest();
    let index = tree::move_element(&mut forest, "a", 0, Some("fs2")).unwrap();
    assert_eq!(index, 0);

    assert_eq!(ids(&forest), vec!["fs1", "d"]);
    let fs2 = tree::find(&forest, "fs2").unwrap();
    assert_eq!(ids(fs2.children().unwrap()), vec!["a", "c"]);
    assert_eq!(tree::count(&forest), 6);
    assert!(tree::orders_are_dense(&forest));
}

#[test]
fn test_move_nested_element_out_to_root_end() {
    let mut forest = sample_forest();
    let index = tree::move_element(&mut forest, "c", usize::MAX, None).unwrap();
    assert_eq!(index, 3);
    assert_eq!(ids(&forest), vec!["a", "fs1", "d", "c"]);
    assert_eq!(forest[3].order, 3);

    let fs2 = tree::find(&forest, "fs2").unwrap();
    assert!(fs2.children().unwrap().is_empty());
}

#[test]
fn test_move_within_same_container_reorders() {
    let mut forest = sample_forest();
    tree::move_element(&mut forest, "d", 0, None).unwrap();
    assert_eq!(ids(&forest), vec!["d", "a", "fs1"]);
    assert_eq!(
        forest.iter().map(|e| e.order).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
}

#[test]
fn test_move_into_own_subtree_is_rejected_without_change() {
    let mut forest = sample_forest();
    let before = forest.clone();

    let err = tree::move_element(&mut forest, "fs1", 0, Some("fs2")).unwrap_err();
    assert!(matches!(err, TreeError::WouldCreateCycle { .. }));
    let err = tree::move_element(&mut forest, "fs1", 0, Some("fs1")).unwrap_err();
    assert!(matches!(err, TreeError::WouldCreateCycle { .. }));

    assert_eq!(forest, before);
}

#[test]
fn test_move_into_leaf_or_missing_parent_is_rejected() {
    let mut forest = sample_forest();
    let before = forest.clone();

    assert_eq!(
        tree::move_element(&mut forest, "a", 0, Some("d")),
        Err(TreeError::NotAContainer("d".to_string()))
    );
    assert_eq!(
        tree::move_element(&mut forest, "a", 0, Some("nope")),
        Err(TreeError::NotFound("nope".to_string()))
    );
    assert_eq!(
        tree::move_element(&mut forest, "ghost", 0, None),
        Err(TreeError::NotFound("ghost".to_string()))
    );
    assert_eq!(forest, before);
}

#[test]
fn test_insert_clamps_position_and_rejects_duplicates() {
    let mut forest = sample_forest();
    let index = tree::insert_at(&mut forest, el("e", ElementType::Date), 99, Some("fs1")).unwrap();
    assert_eq!(index, 2);
    let fs1 = tree::find(&forest, "fs1").unwrap();
    assert_eq!(ids(fs1.children().unwrap()), vec!["b", "fs2", "e"]);

    let err = tree::insert_at(&mut forest, el("c", ElementType::Input), 0, None).unwrap_err();
    assert_eq!(err, TreeError::DuplicateId("c".to_string()));

    // A fieldset carrying an existing id deeper inside is rejected too
    let carrier = fieldset("new-fs", vec![el("b", ElementType::Input)]);
    assert!(tree::insert_at(&mut forest, carrier, 0, None).is_err());
    assert!(!tree::contains(&forest, "new-fs"));
}

#[test]
fn test_remove_fieldset_takes_its_subtree() {
    let mut forest = sample_forest();
    let removed = tree::remove(&mut forest, "fs1").unwrap();
    assert_eq!(removed.id, "fs1");
    assert_eq!(ids(&forest), vec!["a", "d"]);
    assert!(!tree::contains(&forest, "c"));
    assert_eq!(forest[1].order, 1);

    assert!(tree::remove(&mut forest, "fs1").unwrap_err().is_not_found());
}

#[test]
fn test_update_content_ignores_protected_keys() {
    let mut forest = sample_forest();
    tree::update_content(
        &mut forest,
        "b",
        &patch(json!({
            "id": "hijacked",
            "type": "select",
            "order": 7,
            "label": "Accept terms",
            "required": true,
            "checked": true
        })),
    )
    .unwrap();

    let b = tree::find(&forest, "b").unwrap();
    assert_eq!(b.label, "Accept terms");
    assert!(b.required);
    assert_eq!(b.order, 0);
    assert_eq!(b.element_type(), ElementType::Checkbox);
    assert!(matches!(b.kind, ElementKind::Checkbox(ref props) if props.checked));
    assert!(!tree::contains(&forest, "hijacked"));
}

#[test]
fn test_update_content_cannot_replace_fieldset_children() {
    let mut forest = sample_forest();
    tree::update_content(&mut forest, "fs1", &patch(json!({ "children": [], "label": "Group" })))
        .unwrap();
    let fs1 = tree::find(&forest, "fs1").unwrap();
    assert_eq!(fs1.label, "Group");
    assert_eq!(fs1.children().unwrap().len(), 2);
}

#[test]
fn test_ill_typed_patch_is_rejected() {
    let mut forest = sample_forest();
    let before = forest.clone();
    let err = tree::update_property(&mut forest, "a", "label", json!(42)).unwrap_err();
    assert!(matches!(err, TreeError::InvalidPatch(_)));
    assert_eq!(forest, before);
}

#[test]
fn test_update_position_reaches_nested_elements() {
    let mut forest = sample_forest();
    tree::update_position(&mut forest, "c", 120.0, 340.0).unwrap();
    let c = tree::find(&forest, "c").unwrap();
    assert_eq!((c.x, c.y), (120.0, 340.0));
    assert!(tree::update_position(&mut forest, "zzz", 0.0, 0.0).is_err());
}

#[test]
fn test_extract_missing_id_leaves_forest_alone() {
    let mut forest = sample_forest();
    let before = forest.clone();
    assert!(tree::extract(&mut forest, "missing").is_none());
    assert_eq!(forest, before);

    let c = tree::extract(&mut forest, "c").unwrap();
    assert_eq!(c.id, "c");
    assert_eq!(tree::count(&forest), 5);
}

#[test]
fn test_insert_rejects_subtree_repeating_its_own_id() {
    let mut forest = vec![el("a", ElementType::Input)];
    let before = forest.clone();

    let twins = fieldset(
        "twins",
        vec![el("dup", ElementType::Input), el("dup", ElementType::Checkbox)],
    );
    let err = tree::insert_at(&mut forest, twins, 0, None).unwrap_err();
    assert_eq!(err, TreeError::DuplicateId("dup".to_string()));

    let nested = fieldset("outer", vec![fieldset("outer", vec![])]);
    let err = tree::insert_at(&mut forest, nested, 1, None).unwrap_err();
    assert_eq!(err, TreeError::DuplicateId("outer".to_string()));

    assert_eq!(forest, before);
    assert!(tree::check_unique_ids(&forest).is_ok());
}

/// Assert the forest is consistent and holds exactly `expected` elements
fn assert_consistent(forest: &[Element], expected: usize, step: &str) {
    assert!(tree::orders_are_dense(forest), "orders not dense after {}", step);
    assert_eq!(tree::count(forest), expected, "element count after {}", step);
    assert!(tree::check_unique_ids(forest).is_ok(), "duplicate id after {}", step);
}

#[test]
fn test_mixed_edit_sequence_keeps_orders_dense_and_counts_exact() {
    let mut forest = sample_forest();
    assert_consistent(&forest, 6, "setup");

    // leaf into a fieldset two levels down: +1
    tree::insert_at(&mut forest, el("e", ElementType::Date), 0, Some("fs2")).unwrap();
    assert_consistent(&forest, 7, "insert e");

    // fieldset with two children at the root: +3
    let fs3 = fieldset(
        "fs3",
        vec![el("f", ElementType::Input), el("g", ElementType::Radio)],
    );
    tree::insert_at(&mut forest, fs3, 1, None).unwrap();
    assert_consistent(&forest, 10, "insert fs3");
    assert_eq!(ids(&forest), vec!["a", "fs3", "fs1", "d"]);

    // moves never change the count
    tree::move_element(&mut forest, "a", usize::MAX, Some("fs3")).unwrap();
    assert_consistent(&forest, 10, "move a into fs3");
    tree::move_element(&mut forest, "fs2", 0, Some("fs3")).unwrap();
    assert_consistent(&forest, 10, "move fs2 into fs3");
    let fs3 = tree::find(&forest, "fs3").unwrap();
    assert_eq!(ids(fs3.children().unwrap()), vec!["fs2", "f", "g", "a"]);

    // fs2 now sits under fs3
    tree::insert_at(&mut forest, el("h", ElementType::Textarea), 1, Some("fs2")).unwrap();
    assert_consistent(&forest, 11, "insert h");
    let fs2 = tree::find(&forest, "fs2").unwrap();
    assert_eq!(ids(fs2.children().unwrap()), vec!["e", "h", "c"]);

    // fs2 with e, h and c: -4
    tree::remove(&mut forest, "fs2").unwrap();
    assert_consistent(&forest, 7, "remove fs2");
    assert!(!tree::contains(&forest, "c"));

    tree::move_element(&mut forest, "b", 0, None).unwrap();
    assert_consistent(&forest, 7, "move b to root");
    assert_eq!(ids(&forest), vec!["b", "fs3", "fs1", "d"]);

    tree::remove(&mut forest, "d").unwrap();
    assert_consistent(&forest, 6, "remove d");

    // fieldset nested in a fieldset, into fs1 (left empty by earlier moves): +3
    let fs4 = fieldset("fs4", vec![fieldset("fs5", vec![el("i", ElementType::Select)])]);
    tree::insert_at(&mut forest, fs4, 0, Some("fs1")).unwrap();
    assert_consistent(&forest, 9, "insert fs4");

    tree::move_element(&mut forest, "i", usize::MAX, None).unwrap();
    assert_consistent(&forest, 9, "move i to root");
    assert_eq!(ids(&forest), vec!["b", "fs3", "fs1", "i"]);

    tree::remove(&mut forest, "fs1").unwrap();
    assert_consistent(&forest, 6, "remove fs1");
    assert_eq!(
        tree::collect_ids(&forest),
        vec!["b", "fs3", "f", "g", "a", "i"]
    );
}
