//! Form/session store
//!
//! Owns the managed forms, the working tree of the active form, the
//! selection and per-form dirty state. Every edit runs against the working
//! tree through the tree engine, is copied back into the active form
//! record, and then updates the dirty state.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::import;
use crate::models::{Element, ElementType, ManagedForm, ServerRawData};
use crate::persistence::{timestamp_millis, FormPersistence, PersistenceError, StorageBackend};
use crate::tree::{self, TreeError};

use super::dirty::{ChangeTracker, FormChanges};
use super::drag::{DropAction, DropPosition, DropTarget};

pub const DEFAULT_FORM_NAME: &str = "Untitled Form";
/// Created when loading leaves the store without any form
pub const FIRST_FORM_NAME: &str = "My First Form";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormStatus {
    pub id: String,
    pub name: String,
    pub has_unsaved_changes: bool,
}

#[derive(Debug, Default)]
pub struct FormStore {
    forms: Vec<ManagedForm>,
    active_form_id: Option<String>,
    /// Working copy of the active form's elements
    elements: Vec<Element>,
    selected_element_id: Option<String>,
    /// Mirrors the active form's dirty flag
    has_unsaved_changes: bool,
    changes: ChangeTracker,
    /// Last adopted or saved record per form, restored by `discard_changes`
    snapshots: HashMap<String, ManagedForm>,
}

impl FormStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn forms(&self) -> &[ManagedForm] {
        &self.forms
    }

    pub fn form(&self, form_id: &str) -> Option<&ManagedForm> {
        self.forms.iter().find(|f| f.id == form_id)
    }

    fn form_mut(&mut self, form_id: &str) -> Option<&mut ManagedForm> {
        self.forms.iter_mut().find(|f| f.id == form_id)
    }

    pub fn active_form_id(&self) -> Option<&str> {
        self.active_form_id.as_deref()
    }

    pub fn active_form(&self) -> Option<&ManagedForm> {
        self.active_form_id.as_deref().and_then(|id| self.form(id))
    }

    /// The working tree
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn selected_element_id(&self) -> Option<&str> {
        self.selected_element_id.as_deref()
    }

    pub fn selected_element(&self) -> Option<&Element> {
        self.selected_element_id
            .as_deref()
            .and_then(|id| tree::find(&self.elements, id))
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.has_unsaved_changes
    }

    pub fn form_list(&self) -> Vec<FormSummary> {
        self.forms
            .iter()
            .map(|f| FormSummary {
                id: f.id.clone(),
                name: f.name.clone(),
            })
            .collect()
    }

    pub fn forms_with_unsaved_status(&self) -> Vec<FormStatus> {
        self.forms
            .iter()
            .map(|f| FormStatus {
                id: f.id.clone(),
                name: f.name.clone(),
                has_unsaved_changes: self.changes.has_changes(&f.id),
            })
            .collect()
    }

    pub fn form_changes(&self, form_id: &str) -> Option<&FormChanges> {
        self.changes.get(form_id)
    }

    // ========================================================================
    // Form lifecycle
    // ========================================================================

    fn push_form(&mut self, form: ManagedForm) -> String {
        let id = form.id.clone();
        self.snapshots.insert(id.clone(), form.clone());
        self.forms.push(form);
        id
    }

    /// Create and activate an empty form
    pub fn create_blank_form(&mut self, name: Option<&str>) -> String {
        let name = name.filter(|n| !n.is_empty()).unwrap_or(DEFAULT_FORM_NAME);
        let id = self.push_form(ManagedForm::blank(Uuid::new_v4().to_string(), name));
        log::info!("created form {} ({})", id, name);
        self.activate(Some(&id));
        id
    }

    /// Import one server document as a new (inactive) form
    pub fn adopt_server_form(&mut self, name: &str, raw: ServerRawData) -> String {
        self.import_form(name, raw, None)
    }

    fn import_form(&mut self, name: &str, raw: ServerRawData, file_path: Option<String>) -> String {
        let report = import::transform_raw_data(&raw);
        let mut form = ManagedForm::new(Uuid::new_v4().to_string(), name, raw, report.elements);
        form.file_path = file_path;
        self.push_form(form)
    }

    /// Import a batch of server documents given as `(file_name, document)`.
    ///
    /// Documents whose form name already exists are skipped. When the store
    /// ends up empty a blank `My First Form` is created. Returns the ids of
    /// the forms added from documents.
    pub fn load_server_forms(&mut self, files: Vec<(String, ServerRawData)>) -> Vec<String> {
        let mut added = Vec::new();
        for (file_name, raw) in files {
            let name = raw
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| file_name.replace(".json", ""));
            if self.forms.iter().any(|f| f.name == name) {
                log::warn!(
                    "form named \"{}\" from {} already exists, skipping",
                    name,
                    file_name
                );
                continue;
            }
            added.push(self.import_form(&name, raw, Some(file_name)));
        }

        if self.forms.is_empty() {
            self.create_blank_form(Some(FIRST_FORM_NAME));
        }

        if let Some(active_id) = self.active_form_id.clone() {
            if !self.activate(Some(&active_id)) {
                self.activate(None);
            }
        }
        added
    }

    /// Make a form the active one, or clear activation with `None`.
    ///
    /// Unknown ids are a no-op returning false.
    pub fn activate(&mut self, form_id: Option<&str>) -> bool {
        let Some(form_id) = form_id else {
            self.active_form_id = None;
            self.elements.clear();
            self.selected_element_id = None;
            self.has_unsaved_changes = false;
            return true;
        };

        let Some(form) = self.form(form_id) else {
            log::warn!("form with id {} not found", form_id);
            return false;
        };
        self.elements = form.visual_elements.clone();
        self.active_form_id = Some(form_id.to_string());
        self.selected_element_id = None;
        self.has_unsaved_changes = self.changes.has_changes(form_id);
        true
    }

    /// Rename the active form, keeping the server document's name in step
    pub fn rename_active_form(&mut self, name: &str) -> bool {
        let Some(active_id) = self.active_form_id.clone() else {
            return false;
        };
        let Some(form) = self.form_mut(&active_id) else {
            return false;
        };
        form.name = name.to_string();
        form.raw_server_data.set_name(name);
        self.mark_form_name_changed();
        true
    }

    /// Remove a form. Deleting the active form activates the first remaining
    /// form, or clears activation when none remain.
    pub fn delete_form(&mut self, form_id: &str) -> bool {
        let Some(index) = self.forms.iter().position(|f| f.id == form_id) else {
            log::warn!("form with id {} not found for deletion", form_id);
            return false;
        };
        self.forms.remove(index);
        self.changes.remove(form_id);
        self.snapshots.remove(form_id);

        if self.active_form_id.as_deref() == Some(form_id) {
            let next = self.forms.first().map(|f| f.id.clone());
            self.activate(next.as_deref());
        }
        true
    }

    /// Restore a form to its last adopted or saved state and mark it clean
    pub fn discard_changes(&mut self, form_id: &str) -> bool {
        let Some(snapshot) = self.snapshots.get(form_id).cloned() else {
            return false;
        };
        let Some(form) = self.form_mut(form_id) else {
            return false;
        };
        *form = snapshot;
        self.mark_form_clean(form_id);
        if self.active_form_id.as_deref() == Some(form_id) {
            self.activate(Some(form_id));
        }
        true
    }

    // ========================================================================
    // Working tree synchronization
    // ========================================================================

    /// Renumber the working tree and copy it into the active form record
    pub fn sync_to_form(&mut self) {
        tree::renumber(&mut self.elements);
        let Some(active_id) = self.active_form_id.clone() else {
            return;
        };
        let elements = self.elements.clone();
        if let Some(form) = self.form_mut(&active_id) {
            form.visual_elements = elements;
        }
    }

    /// Replace the working tree wholesale and clear the selection.
    ///
    /// A forest with a repeated id is rejected and the working tree kept.
    pub fn set_form_elements(&mut self, elements: Vec<Element>) -> Result<(), TreeError> {
        tree::check_unique_ids(&elements)?;
        self.elements = elements;
        self.selected_element_id = None;
        self.sync_to_form();
        Ok(())
    }

    /// Replace the working tree and select `element_id` in one step
    pub fn set_form_elements_and_select(
        &mut self,
        elements: Vec<Element>,
        element_id: &str,
    ) -> Result<(), TreeError> {
        tree::check_unique_ids(&elements)?;
        self.elements = elements;
        self.sync_to_form();
        self.select_element(Some(element_id));
        Ok(())
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Select an element of the working tree; unknown ids clear the selection
    pub fn select_element(&mut self, element_id: Option<&str>) -> bool {
        self.selected_element_id = element_id
            .filter(|id| tree::contains(&self.elements, id))
            .map(str::to_string);
        self.selected_element_id.is_some()
    }

    fn drop_stale_selection(&mut self) {
        if let Some(id) = &self.selected_element_id {
            if !tree::contains(&self.elements, id) {
                self.selected_element_id = None;
            }
        }
    }

    // ========================================================================
    // Dirty tracking
    // ========================================================================

    pub fn mark_form_dirty(&mut self, form_id: &str, element_id: Option<&str>) {
        self.changes.mark_dirty(form_id, element_id);
        if self.active_form_id.as_deref() == Some(form_id) {
            self.has_unsaved_changes = true;
        }
    }

    pub fn mark_form_clean(&mut self, form_id: &str) {
        self.changes.mark_clean(form_id);
        if self.active_form_id.as_deref() == Some(form_id) {
            self.has_unsaved_changes = false;
        }
    }

    /// Form-level change of the active form
    fn mark_active_dirty(&mut self) {
        if let Some(active_id) = self.active_form_id.clone() {
            self.mark_form_dirty(&active_id, None);
        }
    }

    pub fn mark_element_content_changed(&mut self, element_id: &str) {
        if let Some(active_id) = self.active_form_id.clone() {
            self.mark_form_dirty(&active_id, Some(element_id));
        }
    }

    pub fn mark_form_name_changed(&mut self) {
        if let Some(active_id) = self.active_form_id.clone() {
            self.changes.mark_name_changed(&active_id);
            self.has_unsaved_changes = true;
        }
    }

    /// Forget one element's change; the form turns clean when nothing else
    /// is pending
    pub fn clear_element_changes(&mut self, element_id: &str) {
        let Some(active_id) = self.active_form_id.clone() else {
            return;
        };
        if self.changes.clear_element(&active_id, element_id) {
            self.has_unsaved_changes = false;
        }
    }

    pub fn form_has_unsaved_changes(&self, form_id: &str) -> bool {
        self.changes.has_changes(form_id)
    }

    pub fn element_has_unsaved_changes(&self, element_id: &str) -> bool {
        self.active_form_id
            .as_deref()
            .map_or(false, |form_id| self.changes.element_changed(form_id, element_id))
    }

    pub fn active_form_name_changed(&self) -> bool {
        self.active_form_id
            .as_deref()
            .map_or(false, |form_id| self.changes.name_changed(form_id))
    }

    // ========================================================================
    // Structural edits
    // ========================================================================

    /// Append an element at the root
    pub fn add_element(&mut self, element: Element) -> Result<String, TreeError> {
        let id = element.id.clone();
        let end = self.elements.len();
        tree::insert_at(&mut self.elements, element, end, None)?;
        self.sync_to_form();
        self.mark_element_content_changed(&id);
        Ok(id)
    }

    /// Create a palette widget at canvas position (x, y), append and select it
    pub fn create_and_add_element(
        &mut self,
        element_type: ElementType,
        x: f64,
        y: f64,
    ) -> Result<String, TreeError> {
        let id = self.add_element(Element::new_at(element_type, x, y))?;
        self.select_element(Some(&id));
        Ok(id)
    }

    pub fn add_element_at_position(
        &mut self,
        element: Element,
        position: usize,
        parent_id: Option<&str>,
    ) -> Result<usize, TreeError> {
        let id = element.id.clone();
        let index = tree::insert_at(&mut self.elements, element, position, parent_id)?;
        self.sync_to_form();
        self.mark_element_content_changed(&id);
        Ok(index)
    }

    pub fn add_element_to_fieldset(
        &mut self,
        fieldset_id: &str,
        element: Element,
        position: usize,
    ) -> Result<usize, TreeError> {
        self.add_element_at_position(element, position, Some(fieldset_id))
    }

    /// Move an element and select it
    pub fn move_element(
        &mut self,
        element_id: &str,
        to_position: usize,
        to_parent_id: Option<&str>,
    ) -> Result<usize, TreeError> {
        let index = tree::move_element(&mut self.elements, element_id, to_position, to_parent_id)?;
        self.sync_to_form();
        self.select_element(Some(element_id));
        self.mark_active_dirty();
        Ok(index)
    }

    pub fn remove_element(&mut self, element_id: &str) -> Result<Element, TreeError> {
        let removed = tree::remove(&mut self.elements, element_id)?;
        self.sync_to_form();
        self.mark_active_dirty();
        self.drop_stale_selection();
        Ok(removed)
    }

    // ========================================================================
    // Content edits
    // ========================================================================

    pub fn update_element(&mut self, element_id: &str, patch: &Map<String, Value>) -> Result<(), TreeError> {
        tree::update_content(&mut self.elements, element_id, patch)?;
        self.sync_to_form();
        self.mark_element_content_changed(element_id);
        Ok(())
    }

    pub fn update_element_property(
        &mut self,
        element_id: &str,
        key: &str,
        value: Value,
    ) -> Result<(), TreeError> {
        tree::update_property(&mut self.elements, element_id, key, value)?;
        self.sync_to_form();
        self.mark_element_content_changed(element_id);
        Ok(())
    }

    /// Geometry only; never marks the form dirty
    pub fn update_element_position(&mut self, element_id: &str, x: f64, y: f64) -> Result<(), TreeError> {
        tree::update_position(&mut self.elements, element_id, x, y)?;
        self.sync_to_form();
        Ok(())
    }

    // ========================================================================
    // Drag and drop
    // ========================================================================

    /// Index a drop lands at inside the container of `parent_id`, ignoring
    /// the dragged element itself
    fn drop_index(&self, target: &DropTarget, moving_id: Option<&str>) -> Result<usize, TreeError> {
        let container: &[Element] = match target.parent_id.as_deref() {
            None => self.elements.as_slice(),
            Some(parent_id) => {
                let parent = tree::find(&self.elements, parent_id)
                    .ok_or_else(|| TreeError::NotFound(parent_id.to_string()))?;
                parent
                    .children()
                    .ok_or_else(|| TreeError::NotAContainer(parent_id.to_string()))?
                    .as_slice()
            }
        };
        let siblings: Vec<&str> = container
            .iter()
            .map(|e| e.id.as_str())
            .filter(|id| Some(*id) != moving_id)
            .collect();

        let index = target
            .sibling_id
            .as_deref()
            .and_then(|sibling| siblings.iter().position(|id| *id == sibling))
            .map(|i| match target.position {
                DropPosition::Before => i,
                DropPosition::After => i + 1,
            })
            .unwrap_or(siblings.len());
        Ok(index)
    }

    /// Apply a resolved drop: move the dragged element or create the dropped
    /// widget. Returns the id of the element that ends up selected.
    pub fn apply_drop(&mut self, action: DropAction) -> Result<String, TreeError> {
        match action {
            DropAction::Move { element_id, target } => {
                if target.sibling_id.as_deref() == Some(element_id.as_str()) {
                    self.select_element(Some(&element_id));
                    return Ok(element_id);
                }
                let index = self.drop_index(&target, Some(&element_id))?;
                self.move_element(&element_id, index, target.parent_id.as_deref())?;
                Ok(element_id)
            }
            DropAction::Create { element_type, target } => {
                let index = self.drop_index(&target, None)?;
                let element = Element::new_at(element_type, 0.0, 0.0);
                let id = element.id.clone();
                self.add_element_at_position(element, index, target.parent_id.as_deref())?;
                self.select_element(Some(&id));
                Ok(id)
            }
        }
    }

    // ========================================================================
    // Persistence orchestration
    // ========================================================================

    /// Replace (or add) a form record with a persisted one and mark it clean
    fn adopt_persisted(&mut self, record: ManagedForm) {
        let id = record.id.clone();
        self.snapshots.insert(id.clone(), record.clone());
        match self.form_mut(&id) {
            Some(form) => *form = record,
            None => self.forms.push(record),
        }
        self.mark_form_clean(&id);
    }

    /// Save the active form including the current working tree.
    ///
    /// On failure nothing in the store changes.
    pub fn save_active_form<S: StorageBackend>(
        &mut self,
        persistence: &mut FormPersistence<S>,
    ) -> Result<String, PersistenceError> {
        let form = self.active_form().ok_or(PersistenceError::NoActiveForm)?;
        let mut record = form.clone();
        record.visual_elements = self.elements.clone();
        tree::renumber(&mut record.visual_elements);

        let stored = persistence.save_form(&record)?;
        let id = stored.id.clone();
        self.adopt_persisted(stored);
        log::info!("saved active form {}", id);
        Ok(id)
    }

    /// Load a stored form into the store and activate it
    pub fn load_and_activate_form<S: StorageBackend>(
        &mut self,
        persistence: &mut FormPersistence<S>,
        form_id: &str,
    ) -> Result<String, PersistenceError> {
        let record = persistence.load(form_id)?;
        let id = record.id.clone();
        self.adopt_persisted(record);
        self.activate(Some(&id));
        Ok(id)
    }

    /// Merge every stored form into the store. A stored record replaces a
    /// local one only when its `lastModified` is newer. Returns the number
    /// of records taken from storage.
    pub fn load_all_saved_forms<S: StorageBackend>(
        &mut self,
        persistence: &mut FormPersistence<S>,
    ) -> Result<usize, PersistenceError> {
        let stored = persistence.load_all()?;
        let mut taken = 0;
        for record in stored {
            let newer = match self.form(&record.id) {
                Some(local) => {
                    timestamp_millis(record.last_modified.as_deref())
                        > timestamp_millis(local.last_modified.as_deref())
                }
                None => true,
            };
            if newer {
                let reload = self.active_form_id.as_deref() == Some(record.id.as_str());
                let id = record.id.clone();
                self.adopt_persisted(record);
                if reload {
                    self.activate(Some(&id));
                }
                taken += 1;
            }
        }
        Ok(taken)
    }

    /// Delete a form from storage and from the store
    pub fn delete_form_everywhere<S: StorageBackend>(
        &mut self,
        persistence: &mut FormPersistence<S>,
        form_id: &str,
    ) -> Result<(), PersistenceError> {
        persistence.delete(form_id)?;
        self.delete_form(form_id);
        Ok(())
    }

    /// Copy the publication fields of the stored record onto the local one
    fn refresh_publication<S: StorageBackend>(
        &mut self,
        persistence: &mut FormPersistence<S>,
        form_id: &str,
    ) -> Result<(), PersistenceError> {
        let stored = persistence.load(form_id)?;
        if let Some(form) = self.form_mut(form_id) {
            form.published = stored.published;
            form.published_at = stored.published_at.clone();
            form.last_modified = stored.last_modified.clone();
        }
        if let Some(snapshot) = self.snapshots.get_mut(form_id) {
            snapshot.published = stored.published;
            snapshot.published_at = stored.published_at;
            snapshot.last_modified = stored.last_modified;
        }
        Ok(())
    }

    pub fn publish_form<S: StorageBackend>(
        &mut self,
        persistence: &mut FormPersistence<S>,
        form_id: &str,
    ) -> Result<String, PersistenceError> {
        let id = persistence.publish(form_id)?;
        self.refresh_publication(persistence, &id)?;
        Ok(id)
    }

    pub fn unpublish_form<S: StorageBackend>(
        &mut self,
        persistence: &mut FormPersistence<S>,
        form_id: &str,
    ) -> Result<String, PersistenceError> {
        let id = persistence.unpublish(form_id)?;
        self.refresh_publication(persistence, &id)?;
        Ok(id)
    }
}
