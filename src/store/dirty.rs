//! Per-form unsaved-change tracking

use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use serde::Serialize;

/// Unsaved-change state of one form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormChanges {
    pub has_changes: bool,
    /// Ids of elements whose content changed since the last save
    pub changed_elements: BTreeSet<String>,
    pub name_changed: bool,
    /// Millis since the epoch of the last transition
    pub last_modified: i64,
}

impl FormChanges {
    fn touch(&mut self) {
        self.last_modified = Utc::now().timestamp_millis();
    }
}

/// Change state for every form, keyed by form id
#[derive(Debug, Clone, Default)]
pub struct ChangeTracker {
    forms: HashMap<String, FormChanges>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, form_id: &str) -> Option<&FormChanges> {
        self.forms.get(form_id)
    }

    /// Flag a form dirty, optionally recording which element changed
    pub fn mark_dirty(&mut self, form_id: &str, element_id: Option<&str>) {
        let changes = self.forms.entry(form_id.to_string()).or_default();
        changes.has_changes = true;
        if let Some(id) = element_id {
            changes.changed_elements.insert(id.to_string());
        }
        changes.touch();
    }

    /// Reset a form to the clean state
    pub fn mark_clean(&mut self, form_id: &str) {
        let mut changes = FormChanges::default();
        changes.touch();
        self.forms.insert(form_id.to_string(), changes);
    }

    pub fn mark_name_changed(&mut self, form_id: &str) {
        let changes = self.forms.entry(form_id.to_string()).or_default();
        changes.has_changes = true;
        changes.name_changed = true;
        changes.touch();
    }

    /// Forget one element's change. Returns true when the form became clean.
    pub fn clear_element(&mut self, form_id: &str, element_id: &str) -> bool {
        let Some(changes) = self.forms.get_mut(form_id) else {
            return false;
        };
        changes.changed_elements.remove(element_id);
        if changes.changed_elements.is_empty() && !changes.name_changed {
            self.mark_clean(form_id);
            return true;
        }
        false
    }

    pub fn has_changes(&self, form_id: &str) -> bool {
        self.forms.get(form_id).map_or(false, |c| c.has_changes)
    }

    pub fn element_changed(&self, form_id: &str, element_id: &str) -> bool {
        self.forms
            .get(form_id)
            .map_or(false, |c| c.changed_elements.contains(element_id))
    }

    pub fn name_changed(&self, form_id: &str) -> bool {
        self.forms.get(form_id).map_or(false, |c| c.name_changed)
    }

    pub fn remove(&mut self, form_id: &str) {
        self.forms.remove(form_id);
    }
}
