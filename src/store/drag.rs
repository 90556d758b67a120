//! Shared drag-and-drop session
//!
//! One `DragSession` describes the gesture in progress, whether it moves an
//! existing element (internal) or drops a palette widget (external). A drop
//! resolves to a `DropAction` the store applies, and always ends the session.

use serde::{Deserialize, Serialize};

use crate::models::ElementType;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragSource {
    /// An element already on the canvas
    Internal,
    /// A widget from the palette
    External,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPosition {
    Before,
    #[default]
    After,
}

/// Where a dragged item was released
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropTarget {
    #[serde(default)]
    pub position: DropPosition,
    /// Sibling the drop is relative to; absent means the end of the container
    #[serde(default)]
    pub sibling_id: Option<String>,
    /// Fieldset receiving the drop; absent means the root
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Element being moved (internal drags)
    #[serde(default)]
    pub element_id: Option<String>,
    /// Widget type being created (external drags)
    #[serde(default)]
    pub element_type: Option<String>,
}

/// What a completed drop asks the store to do
#[derive(Clone, Debug, PartialEq)]
pub enum DropAction {
    Move { element_id: String, target: DropTarget },
    Create { element_type: ElementType, target: DropTarget },
}

#[derive(Clone, Debug, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DragSession {
    pub is_dragging: bool,
    pub dragged_element_id: Option<String>,
    pub dragged_element_type: Option<String>,
    pub drag_source: Option<DragSource>,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_internal_drag(&mut self, element_id: &str, element_type: &str) {
        self.is_dragging = true;
        self.dragged_element_id = Some(element_id.to_string());
        self.dragged_element_type = Some(element_type.to_string());
        self.drag_source = Some(DragSource::Internal);
    }

    pub fn start_external_drag(&mut self, element_type: &str) {
        self.is_dragging = true;
        self.dragged_element_id = None;
        self.dragged_element_type = Some(element_type.to_string());
        self.drag_source = Some(DragSource::External);
    }

    pub fn end_drag(&mut self) {
        *self = Self::default();
    }

    pub fn is_internal(&self) -> bool {
        self.drag_source == Some(DragSource::Internal)
    }

    pub fn is_external(&self) -> bool {
        self.drag_source == Some(DragSource::External)
    }

    /// Resolve a drop against the current session, then reset it.
    ///
    /// Returns `None` when nothing was being dragged, when the target does
    /// not carry what the drag source needs, or when an external drop names
    /// an unknown widget type.
    pub fn handle_drop(&mut self, target: DropTarget) -> Option<DropAction> {
        if !self.is_dragging {
            return None;
        }

        let action = match (self.drag_source, &target.element_id, &target.element_type) {
            (Some(DragSource::Internal), Some(element_id), _) => Some(DropAction::Move {
                element_id: element_id.clone(),
                target: target.clone(),
            }),
            (Some(DragSource::External), _, Some(element_type)) => {
                match element_type.parse::<ElementType>() {
                    Ok(element_type) => Some(DropAction::Create {
                        element_type,
                        target: target.clone(),
                    }),
                    Err(e) => {
                        log::warn!("ignoring drop: {}", e);
                        None
                    }
                }
            }
            _ => None,
        };

        self.end_drag();
        action
    }
}
