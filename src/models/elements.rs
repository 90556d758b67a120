//! Element types for the visual form tree
//!
//! This module defines the closed set of form element variants, the
//! shared base record every element carries, and the constructors that
//! produce a fresh element with type-appropriate defaults.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised while building elements from loosely-typed input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("unknown element type: {0}")]
    UnknownElementType(String),
}

/// Discriminant of the element variant set
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Input,
    Textarea,
    Checkbox,
    Select,
    Number,
    Date,
    File,
    Button,
    Radio,
    Fieldset,
}

impl ElementType {
    pub const ALL: [ElementType; 10] = [
        ElementType::Input,
        ElementType::Textarea,
        ElementType::Checkbox,
        ElementType::Select,
        ElementType::Number,
        ElementType::Date,
        ElementType::File,
        ElementType::Button,
        ElementType::Radio,
        ElementType::Fieldset,
    ];

    /// Wire name used in the `type` field
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Input => "input",
            ElementType::Textarea => "textarea",
            ElementType::Checkbox => "checkbox",
            ElementType::Select => "select",
            ElementType::Number => "number",
            ElementType::Date => "date",
            ElementType::File => "file",
            ElementType::Button => "button",
            ElementType::Radio => "radio",
            ElementType::Fieldset => "fieldset",
        }
    }

    /// Human-facing name ("Input", "Fieldset", ...)
    pub fn display_name(&self) -> &'static str {
        match self {
            ElementType::Input => "Input",
            ElementType::Textarea => "Textarea",
            ElementType::Checkbox => "Checkbox",
            ElementType::Select => "Select",
            ElementType::Number => "Number",
            ElementType::Date => "Date",
            ElementType::File => "File",
            ElementType::Button => "Button",
            ElementType::Radio => "Radio",
            ElementType::Fieldset => "Fieldset",
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, ElementType::Fieldset)
    }

    /// Default (width, height) for elements created on the canvas
    pub fn canvas_size(&self) -> (f64, f64) {
        match self {
            ElementType::Input => (250.0, 48.0),
            ElementType::Textarea => (300.0, 120.0),
            ElementType::Checkbox => (200.0, 40.0),
            ElementType::Select => (250.0, 48.0),
            ElementType::Number => (150.0, 48.0),
            ElementType::Date => (200.0, 48.0),
            ElementType::File => (300.0, 48.0),
            ElementType::Button => (200.0, 40.0),
            ElementType::Radio => (250.0, 80.0),
            ElementType::Fieldset => (400.0, 200.0),
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| ModelError::UnknownElementType(s.to_string()))
    }
}

/// A value/label pair used by select and radio elements
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Kind of a stored validation rule
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ValidationKind {
    Required,
    MinLength,
    MaxLength,
    Pattern,
    Min,
    Max,
    Email,
    Url,
    Custom,
}

/// A validation rule attached to an element. Stored only, never evaluated.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ValidationRule {
    #[serde(rename = "type")]
    pub kind: ValidationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TextInputProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TextareaProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cols: Option<u32>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CheckboxProps {
    #[serde(default)]
    pub checked: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SelectProps {
    #[serde(default)]
    pub options: Vec<SelectOption>,
    #[serde(default)]
    pub multiple: bool,
    /// A single value, or a list of values for multi-selects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NumberProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<f64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DateProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FileProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
    #[serde(default)]
    pub multiple: bool,
    /// Upper bound in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u64>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ButtonType {
    #[default]
    Button,
    Submit,
    Reset,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ButtonProps {
    #[serde(default)]
    pub button_type: ButtonType,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RadioProps {
    #[serde(default)]
    pub options: Vec<SelectOption>,
    /// Value of the option selected by default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

/// Marks a fieldset the server renders as a repeatable group ("add another")
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RepeatableGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_button: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_button: Option<serde_json::Value>,
    /// The processor record exactly as the server sent it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processor: Option<serde_json::Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FieldsetProps {
    #[serde(default)]
    pub children: Vec<Element>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeatable: Option<RepeatableGroup>,
}

/// Type-specific payload of an element, discriminated by `type`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Input(TextInputProps),
    Textarea(TextareaProps),
    Checkbox(CheckboxProps),
    Select(SelectProps),
    Number(NumberProps),
    Date(DateProps),
    File(FileProps),
    Button(ButtonProps),
    Radio(RadioProps),
    Fieldset(FieldsetProps),
}

impl ElementKind {
    pub fn element_type(&self) -> ElementType {
        match self {
            ElementKind::Input(_) => ElementType::Input,
            ElementKind::Textarea(_) => ElementType::Textarea,
            ElementKind::Checkbox(_) => ElementType::Checkbox,
            ElementKind::Select(_) => ElementType::Select,
            ElementKind::Number(_) => ElementType::Number,
            ElementKind::Date(_) => ElementType::Date,
            ElementKind::File(_) => ElementType::File,
            ElementKind::Button(_) => ElementType::Button,
            ElementKind::Radio(_) => ElementType::Radio,
            ElementKind::Fieldset(_) => ElementType::Fieldset,
        }
    }

    /// Default payload for a freshly created element of the given type
    pub fn defaults_for(element_type: ElementType) -> Self {
        match element_type {
            ElementType::Input => ElementKind::Input(TextInputProps {
                placeholder: Some("Enter text".to_string()),
                default_value: Some(String::new()),
                ..Default::default()
            }),
            ElementType::Textarea => ElementKind::Textarea(TextareaProps {
                placeholder: Some("Enter text".to_string()),
                default_value: Some(String::new()),
                rows: Some(4),
                cols: None,
            }),
            ElementType::Checkbox => ElementKind::Checkbox(CheckboxProps { checked: false }),
            ElementType::Select => ElementKind::Select(SelectProps {
                options: default_options(),
                multiple: false,
                default_value: None,
            }),
            ElementType::Number => ElementKind::Number(NumberProps {
                min: Some(0.0),
                max: Some(100.0),
                ..Default::default()
            }),
            ElementType::Date => ElementKind::Date(DateProps::default()),
            ElementType::File => ElementKind::File(FileProps {
                accept: Some("*/*".to_string()),
                multiple: false,
                max_size: None,
            }),
            ElementType::Button => ElementKind::Button(ButtonProps {
                button_type: ButtonType::Submit,
            }),
            ElementType::Radio => ElementKind::Radio(RadioProps {
                options: default_options(),
                default_value: Some("option1".to_string()),
            }),
            ElementType::Fieldset => ElementKind::Fieldset(FieldsetProps::default()),
        }
    }
}

fn default_options() -> Vec<SelectOption> {
    vec![
        SelectOption::new("option1", "Option 1"),
        SelectOption::new("option2", "Option 2"),
    ]
}

/// One node of the visual form tree
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Sole addressing key for every tree operation
    pub id: String,

    pub label: String,

    #[serde(default)]
    pub required: bool,

    /// Position among siblings. Derived from array position; recomputed
    /// after every structural mutation.
    #[serde(default)]
    pub order: usize,

    /// Canvas geometry
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,

    /// Fully-qualified server type this element was imported from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_fqn: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation: Vec<ValidationRule>,

    #[serde(flatten)]
    pub kind: ElementKind,
}

impl Element {
    /// Create an element with a fresh id and the type's defaults, at the origin
    pub fn new(element_type: ElementType) -> Self {
        let (width, height) = element_type.canvas_size();
        Self {
            id: generate_element_id(),
            label: element_type.display_name().to_string(),
            required: false,
            order: 0,
            x: 0.0,
            y: 0.0,
            width,
            height,
            server_fqn: None,
            validation: Vec::new(),
            kind: ElementKind::defaults_for(element_type),
        }
    }

    /// Create an element dropped onto the canvas at (x, y)
    pub fn new_at(element_type: ElementType, x: f64, y: f64) -> Self {
        let mut element = Self::new(element_type);
        element.label = format!("New {}", element_type.display_name());
        element.x = x;
        element.y = y;
        element
    }

    pub fn element_type(&self) -> ElementType {
        self.kind.element_type()
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, ElementKind::Fieldset(_))
    }

    /// Children of a fieldset; `None` for leaf elements
    pub fn children(&self) -> Option<&Vec<Element>> {
        match &self.kind {
            ElementKind::Fieldset(props) => Some(&props.children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Element>> {
        match &mut self.kind {
            ElementKind::Fieldset(props) => Some(&mut props.children),
            _ => None,
        }
    }

    /// Repeatable-group marker, if this is a repeatable fieldset
    pub fn repeatable(&self) -> Option<&RepeatableGroup> {
        match &self.kind {
            ElementKind::Fieldset(props) => props.repeatable.as_ref(),
            _ => None,
        }
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }
}

/// Generate a fresh element id
pub fn generate_element_id() -> String {
    Uuid::new_v4().to_string()
}
