//! Managed form records and the server-side form document format
//!
//! A `ManagedForm` wraps one element forest snapshot together with the
//! server document it mirrors. The `Server*` types describe that external
//! document: a recursive tree of nodes tagged with fully-qualified type
//! names (`Easy\Form\Item\Input\Text`, ...).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::elements::Element;

/// Server type name of a form root
pub const FQN_FORM: &str = "Easy\\Form";
/// Processors attached to every blank form
pub const FQN_FORM_IDENTIFIER: &str = "Easy\\Form\\Support\\Processor\\FormIdentifier";
pub const FQN_CSRF_TOKEN: &str = "Easy\\Form\\Support\\Processor\\CsrfToken";

/// A processor annotation on a server node (repeatable groups, CSRF, ...)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ServerProcessor {
    pub fqn: String,
    /// Processor-specific settings (`name`, `minimum`, `addButton`, ...)
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

impl ServerProcessor {
    pub fn new(fqn: impl Into<String>) -> Self {
        Self {
            fqn: fqn.into(),
            settings: Map::new(),
        }
    }
}

/// One node of an external server document
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct ServerNode {
    /// Fully-qualified type tag
    pub fqn: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ServerNode>,
    /// Raw markup payload of `Markup` nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub processors: Vec<ServerProcessor>,
}

impl ServerNode {
    pub fn new(fqn: impl Into<String>) -> Self {
        Self {
            fqn: fqn.into(),
            ..Default::default()
        }
    }

    /// Builder: set an attribute
    pub fn with_attr(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    /// Builder: append a child node
    pub fn with_child(mut self, child: ServerNode) -> Self {
        self.children.push(child);
        self
    }

    /// Builder: set the markup payload
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Builder: attach a processor
    pub fn with_processor(mut self, processor: ServerProcessor) -> Self {
        self.processors.push(processor);
        self
    }

    /// Non-empty string attribute
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Numeric attribute; numeric strings are accepted too
    pub fn attr_f64(&self, key: &str) -> Option<f64> {
        match self.attributes.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn attr_u32(&self, key: &str) -> Option<u32> {
        self.attr_f64(key)
            .filter(|v| *v >= 0.0 && *v <= u32::MAX as f64)
            .map(|v| v as u32)
    }

    /// Boolean attribute; HTML-style presence strings count as true
    pub fn attr_bool(&self, key: &str) -> bool {
        match self.attributes.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => !matches!(s.as_str(), "false" | "0"),
            Some(Value::Number(n)) => n.as_f64().map_or(false, |v| v != 0.0),
            _ => false,
        }
    }
}

/// Root of an external server form document
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ServerRawData {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub fqn: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub processors: Vec<ServerProcessor>,
    #[serde(default)]
    pub children: Vec<ServerNode>,
}

impl ServerRawData {
    /// Raw data of a new, empty form
    pub fn blank(name: &str) -> Self {
        let mut attributes = Map::new();
        attributes.insert("name".to_string(), Value::from(name));
        attributes.insert("class".to_string(), Value::from("formi"));
        attributes.insert("method".to_string(), Value::from("post"));
        Self {
            version: "0.0.1".to_string(),
            fqn: FQN_FORM.to_string(),
            attributes,
            processors: vec![
                ServerProcessor::new(FQN_FORM_IDENTIFIER),
                ServerProcessor::new(FQN_CSRF_TOKEN),
            ],
            children: Vec::new(),
        }
    }

    /// The form's `name` attribute, if set
    pub fn name(&self) -> Option<&str> {
        self.attributes
            .get("name")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn set_name(&mut self, name: &str) {
        self.attributes
            .insert("name".to_string(), Value::from(name));
    }
}

/// A named form record wrapping one element forest snapshot
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManagedForm {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub raw_server_data: ServerRawData,
    /// Root-level element sequence; the persisted snapshot of the tree
    pub visual_elements: Vec<Element>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

impl ManagedForm {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        raw_server_data: ServerRawData,
        visual_elements: Vec<Element>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            raw_server_data,
            visual_elements,
            file_path: None,
            created_at: None,
            last_modified: None,
            version: None,
            published: false,
            published_at: None,
        }
    }

    /// A blank form with default server data
    pub fn blank(id: impl Into<String>, name: &str) -> Self {
        Self::new(id, name, ServerRawData::blank(name), Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_raw_data() {
        let raw = ServerRawData::blank("Contact");
        assert_eq!(raw.fqn, FQN_FORM);
        assert_eq!(raw.name(), Some("Contact"));
        assert_eq!(raw.attributes["method"], "post");
        assert_eq!(raw.processors.len(), 2);
        assert!(raw.children.is_empty());
    }

    #[test]
    fn test_server_node_parses_processor_settings() {
        let json = r#"{
            "fqn": "Easy\\Form\\Fieldset",
            "attributes": { "class": "multi-demo" },
            "processors": [
                { "fqn": "Easy\\Form\\Support\\Processor\\Multiple", "name": "demo", "maximum": 3 }
            ]
        }"#;
        let node: ServerNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.fqn, "Easy\\Form\\Fieldset");
        assert!(node.children.is_empty());
        assert_eq!(node.processors[0].settings["maximum"], 3);
    }

    #[test]
    fn test_attribute_helpers() {
        let node = ServerNode::new("x")
            .with_attr("width", "320")
            .with_attr("required", "required")
            .with_attr("label", "");
        assert_eq!(node.attr_f64("width"), Some(320.0));
        assert!(node.attr_bool("required"));
        assert_eq!(node.attr_str("label"), None);
        assert!(!node.attr_bool("missing"));
    }

    #[test]
    fn test_managed_form_uses_camel_case_keys() {
        let form = ManagedForm::blank("f1", "Survey");
        let json = serde_json::to_value(&form).unwrap();
        assert!(json.get("rawServerData").is_some());
        assert!(json["visualElements"].is_array());
        assert_eq!(json["published"], false);
    }
}
