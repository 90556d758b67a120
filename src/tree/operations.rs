//! Structural and content edits on an element forest
//!
//! All operations address elements by id, at any depth. Sibling order is
//! array position; the `order` field is a projection that every structural
//! operation recomputes before returning. Failures are reported as values
//! and leave the forest exactly as it was.

use serde_json::{Map, Value};

use crate::models::Element;

use super::errors::TreeError;
use super::path::{self, ElementPath};
use super::walk;

/// Keys an update patch can never change
pub const PROTECTED_KEYS: [&str; 4] = ["id", "type", "order", "children"];

/// Result of `find_with_parent`
#[derive(Debug, Clone)]
pub struct FoundElement<'a> {
    pub element: &'a Element,
    /// Enclosing fieldset, `None` at root level
    pub parent: Option<&'a Element>,
    /// The sequence holding the element (root or the parent's children)
    pub container: &'a [Element],
    pub index: usize,
    pub path: ElementPath,
}

/// Locate an element together with its parent and containing sequence
pub fn find_with_parent<'a>(forest: &'a [Element], id: &str) -> Option<FoundElement<'a>> {
    let path = path::locate(forest, id)?;
    let index = path.index()?;
    let parent_path = path.parent();
    let parent = if parent_path.is_empty() {
        None
    } else {
        Some(path::get(forest, parent_path)?)
    };
    let container = path::container_at(forest, parent_path)?;
    let element = container.get(index)?;
    Some(FoundElement {
        element,
        parent,
        container,
        index,
        path,
    })
}

/// Insert `element` at `position` in the root sequence or in the children of
/// the fieldset `parent_id`. The position is clamped into `[0, len]`.
///
/// Returns the index the element ended up at.
pub fn insert_at(
    forest: &mut Vec<Element>,
    element: Element,
    position: usize,
    parent_id: Option<&str>,
) -> Result<usize, TreeError> {
    if let Some(duplicate) = walk::first_duplicate_id(walk::subtree(&element)) {
        return Err(TreeError::DuplicateId(duplicate.to_string()));
    }
    if let Some(duplicate) = walk::subtree(&element).find(|e| walk::contains(forest, &e.id)) {
        return Err(TreeError::DuplicateId(duplicate.id.clone()));
    }

    let container = path::container_for_mut(forest, parent_id)?;
    let index = position.min(container.len());
    container.insert(index, element);
    renumber_level(container);

    log::debug!(
        "inserted element at {} in {}",
        index,
        parent_id.unwrap_or("root")
    );
    Ok(index)
}

/// Remove the element with `id` from wherever it is nested and return it.
///
/// Returns `None` and leaves the forest untouched when the id is absent.
pub fn extract(forest: &mut Vec<Element>, id: &str) -> Option<Element> {
    let path = path::locate(forest, id)?;
    let index = path.index()?;
    let container = path::container_at_mut(forest, path.parent())?;
    let element = container.remove(index);
    renumber_level(container);
    Some(element)
}

/// Move an element to `to_position` inside `to_parent_id` (or the root).
///
/// Composed as extract then insert against one working snapshot, which is
/// only committed when both halves succeed. Moving an element into itself
/// or into one of its own descendants is rejected.
pub fn move_element(
    forest: &mut Vec<Element>,
    id: &str,
    to_position: usize,
    to_parent_id: Option<&str>,
) -> Result<usize, TreeError> {
    if !walk::contains(forest, id) {
        return Err(TreeError::NotFound(id.to_string()));
    }
    if let Some(parent_id) = to_parent_id {
        if parent_id == id || walk::is_descendant_of(forest, id, parent_id) {
            return Err(TreeError::WouldCreateCycle {
                id: id.to_string(),
                parent: parent_id.to_string(),
            });
        }
    }

    let mut working = forest.clone();
    let element = extract(&mut working, id).ok_or_else(|| TreeError::NotFound(id.to_string()))?;
    let index = insert_at(&mut working, element, to_position, to_parent_id)?;
    renumber(&mut working);
    *forest = working;

    log::debug!(
        "moved {} to {} in {}",
        id,
        index,
        to_parent_id.unwrap_or("root")
    );
    Ok(index)
}

/// Merge field changes into the element with `id`.
///
/// `patch` uses the element's wire keys (`label`, `placeholder`, `options`,
/// ...). Protected keys are ignored, so id, type, and tree position never
/// change. A patch that leaves the element ill-typed is rejected.
pub fn update_content(
    forest: &mut [Element],
    id: &str,
    patch: &Map<String, Value>,
) -> Result<(), TreeError> {
    let path = path::locate(forest, id).ok_or_else(|| TreeError::NotFound(id.to_string()))?;
    let element = path::get_mut(forest, path.indices())
        .ok_or_else(|| TreeError::NotFound(id.to_string()))?;

    let mut value =
        serde_json::to_value(&*element).map_err(|e| TreeError::InvalidPatch(e.to_string()))?;
    let fields = value
        .as_object_mut()
        .ok_or_else(|| TreeError::InvalidPatch("element is not an object".to_string()))?;
    for (key, new_value) in patch {
        if PROTECTED_KEYS.contains(&key.as_str()) {
            continue;
        }
        fields.insert(key.clone(), new_value.clone());
    }

    let updated: Element =
        serde_json::from_value(value).map_err(|e| TreeError::InvalidPatch(e.to_string()))?;
    *element = updated;
    Ok(())
}

/// Reject a forest in which any id occurs twice, at any depth
pub fn check_unique_ids(forest: &[Element]) -> Result<(), TreeError> {
    match walk::first_duplicate_id(walk::iter(forest)) {
        Some(duplicate) => Err(TreeError::DuplicateId(duplicate.to_string())),
        None => Ok(()),
    }
}

/// Set a single field; shorthand for a one-key `update_content`
pub fn update_property(
    forest: &mut [Element],
    id: &str,
    key: &str,
    value: Value,
) -> Result<(), TreeError> {
    let mut patch = Map::new();
    patch.insert(key.to_string(), value);
    update_content(forest, id, &patch)
}

/// Set canvas coordinates of an element, root or nested
pub fn update_position(forest: &mut [Element], id: &str, x: f64, y: f64) -> Result<(), TreeError> {
    let path = path::locate(forest, id).ok_or_else(|| TreeError::NotFound(id.to_string()))?;
    let element = path::get_mut(forest, path.indices())
        .ok_or_else(|| TreeError::NotFound(id.to_string()))?;
    element.set_position(x, y);
    Ok(())
}

/// Delete the element with `id` (and its subtree) wherever nested
pub fn remove(forest: &mut Vec<Element>, id: &str) -> Result<Element, TreeError> {
    extract(forest, id).ok_or_else(|| TreeError::NotFound(id.to_string()))
}

/// Reassign dense zero-based `order` at every level of the forest
pub fn renumber(forest: &mut [Element]) {
    for (i, element) in forest.iter_mut().enumerate() {
        element.order = i;
        if let Some(children) = element.children_mut() {
            renumber(children);
        }
    }
}

/// Reassign `order` within one sequence only
pub fn renumber_level(container: &mut [Element]) {
    for (i, element) in container.iter_mut().enumerate() {
        element.order = i;
    }
}
