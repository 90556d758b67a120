//! Type definitions for server-form import
//!
//! This module defines:
//! - Layout constants used when placing imported elements on the canvas
//! - The public result type (ImportReport) and skipped-node records

use serde::{Deserialize, Serialize};

use crate::models::{Element, ElementType, ServerNode};

// ============================================================================
// LAYOUT CONSTANTS
// ============================================================================

/// Vertical gap between consecutive elements
pub const Y_SPACING: f64 = 20.0;
/// Left offset of top-level elements
pub const INITIAL_X_OFFSET: f64 = 50.0;
/// Cursor position of the first top-level element
pub const INITIAL_Y_OFFSET: f64 = 50.0;

/// Space reserved above fieldset content for a visible legend
pub const FIELDSET_LABEL_HEIGHT: f64 = 30.0;
pub const FIELDSET_PADDING_TOP: f64 = 10.0;
pub const FIELDSET_PADDING_BOTTOM: f64 = 10.0;
pub const FIELDSET_PADDING_HORIZONTAL: f64 = 15.0;

/// Fieldsets labelled with this text render without a legend
pub const HIDDEN_FIELDSET_LABEL: &str = "Untitled Fieldset";

/// Size of an imported fieldset with no recognized children, and the
/// minimum height of any fieldset
pub const EMPTY_FIELDSET_WIDTH: f64 = 250.0;
pub const MIN_FIELDSET_HEIGHT: f64 = 85.0;

/// Default (width, height) of an imported leaf element.
///
/// These differ from the canvas-creation defaults: imported text inputs
/// reserve room for a label above the field.
pub fn import_size(element_type: ElementType) -> (f64, f64) {
    match element_type {
        ElementType::Input => (250.0, 85.0),
        ElementType::Textarea => (300.0, 120.0),
        ElementType::Checkbox => (200.0, 40.0),
        ElementType::Select => (250.0, 48.0),
        ElementType::Number => (150.0, 48.0),
        ElementType::Date => (200.0, 48.0),
        ElementType::File => (300.0, 48.0),
        ElementType::Button => (250.0, 40.0),
        ElementType::Radio => (250.0, 80.0),
        ElementType::Fieldset => (EMPTY_FIELDSET_WIDTH, MIN_FIELDSET_HEIGHT),
    }
}

// ============================================================================
// SERVER FQNS
// ============================================================================

pub const FQN_FIELDSET: &str = "Easy\\Form\\Fieldset";
pub const FQN_MARKUP: &str = "Easy\\Form\\Markup";
pub const FQN_LABEL: &str = "Easy\\Form\\Support\\Label";
pub const FQN_BUTTON: &str = "Easy\\Form\\Item\\Button";
/// Processor marking a fieldset as a repeatable group
pub const FQN_MULTIPLE_PROCESSOR: &str = "Easy\\Form\\Support\\Processor\\Multiple";

// ============================================================================
// PUBLIC API TYPES
// ============================================================================

/// Input document shape: anything with a `children` node list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerDocument {
    #[serde(default)]
    pub children: Vec<ServerNode>,
}

/// Result of transforming a server document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    /// Root-level element forest, orders dense at every level
    pub elements: Vec<Element>,

    /// Cursor position after the last top-level element
    pub next_y: f64,

    /// Nodes that produced no element
    pub skipped: Vec<SkippedNode>,
}

impl ImportReport {
    pub fn empty() -> Self {
        Self {
            elements: Vec::new(),
            next_y: INITIAL_Y_OFFSET,
            skipped: Vec::new(),
        }
    }
}

/// A server node the importer could not map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedNode {
    /// The node's type tag as received
    pub fqn: String,

    /// `id` or `name` attribute, when present
    pub id: Option<String>,

    /// Human-readable explanation
    pub reason: String,
}
