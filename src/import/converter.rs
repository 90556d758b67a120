//! Server node conversion logic
//!
//! Walks a server document depth-first and emits the visual element forest,
//! laying out every element on a vertical cursor and sizing fieldsets
//! around their children.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::models::{
    ButtonProps, ButtonType, CheckboxProps, DateProps, Element, ElementKind, ElementType,
    FieldsetProps, FileProps, NumberProps, RadioProps, RepeatableGroup, SelectOption, SelectProps,
    ServerNode, ServerProcessor, ServerRawData, TextInputProps, TextareaProps,
    generate_element_id,
};
use crate::tree;

use super::labels::resolve_label;
use super::types::{
    import_size, ImportReport, ServerDocument, SkippedNode, EMPTY_FIELDSET_WIDTH,
    FIELDSET_LABEL_HEIGHT, FIELDSET_PADDING_BOTTOM, FIELDSET_PADDING_HORIZONTAL,
    FIELDSET_PADDING_TOP, FQN_BUTTON, FQN_FIELDSET, FQN_LABEL, FQN_MARKUP,
    FQN_MULTIPLE_PROCESSOR, HIDDEN_FIELDSET_LABEL, INITIAL_X_OFFSET, INITIAL_Y_OFFSET,
    MIN_FIELDSET_HEIGHT, Y_SPACING,
};

/// What a server type key maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeRole {
    Leaf(ElementType),
    Fieldset,
    /// Transparent: children are processed in place
    Wrapper,
}

/// Server type key → role. Fully-qualified names, short component names
/// and lowercase wire names are all accepted.
static TYPE_TABLE: Lazy<HashMap<&'static str, NodeRole>> = Lazy::new(|| {
    let leaves: [(&[&str], ElementType); 9] = [
        (&["Easy\\Form\\Item\\Input\\Text", "InputText", "input"], ElementType::Input),
        (&["Easy\\Form\\Item\\Textarea", "Textarea", "textarea"], ElementType::Textarea),
        (&["Easy\\Form\\Item\\Input\\Checkbox", "Checkbox", "checkbox"], ElementType::Checkbox),
        (&["Easy\\Form\\Item\\Select", "Select", "select"], ElementType::Select),
        (&["Easy\\Form\\Item\\Input\\Number", "NumberInput", "number"], ElementType::Number),
        (&["Easy\\Form\\Item\\Input\\Date", "DateInput", "date"], ElementType::Date),
        (&["Easy\\Form\\Item\\Input\\File", "FileInput", "file"], ElementType::File),
        (&["Easy\\Form\\Item\\Input\\Radio", "RadioGroup", "radio"], ElementType::Radio),
        (&[FQN_BUTTON, "Button", "button"], ElementType::Button),
    ];

    let mut table = HashMap::new();
    for (keys, element_type) in leaves {
        for key in keys {
            table.insert(*key, NodeRole::Leaf(element_type));
        }
    }
    for key in [FQN_FIELDSET, "Fieldset", "fieldset"] {
        table.insert(key, NodeRole::Fieldset);
    }
    table.insert(FQN_MARKUP, NodeRole::Wrapper);
    table.insert(FQN_LABEL, NodeRole::Wrapper);
    table
});

/// Type key of a node: `base_fqn`, then `base_component_type`, then `fqn`
fn type_key(node: &ServerNode) -> &str {
    node.attr_str("base_fqn")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| {
            node.attr_str("base_component_type")
                .map(str::trim)
                .filter(|s| !s.is_empty())
        })
        .unwrap_or_else(|| node.fqn.trim())
}

fn role_of(node: &ServerNode) -> Option<NodeRole> {
    TYPE_TABLE.get(type_key(node)).copied()
}

/// Conversion context that tracks state across the whole document
pub struct ImportContext {
    used_ids: HashSet<String>,
    pub skipped: Vec<SkippedNode>,
}

impl ImportContext {
    pub fn new() -> Self {
        Self {
            used_ids: HashSet::new(),
            skipped: Vec::new(),
        }
    }

    pub fn add_skipped(&mut self, node: &ServerNode, reason: &str) {
        self.skipped.push(SkippedNode {
            fqn: node.fqn.clone(),
            id: node
                .attr_str("id")
                .or_else(|| node.attr_str("name"))
                .map(str::to_string),
            reason: reason.to_string(),
        });
    }

    /// Element id for `node`, unique within this import
    fn claim_id(&mut self, node: &ServerNode) -> String {
        let candidate = node.attr_str("id").or_else(|| node.attr_str("name"));
        let id = match candidate {
            Some(id) if !self.used_ids.contains(id) => id.to_string(),
            Some(id) => {
                log::debug!("duplicate server id {}, assigning a fresh one", id);
                generate_element_id()
            }
            None => generate_element_id(),
        };
        self.used_ids.insert(id.clone());
        id
    }

    /// Convert one node (and its subtree) placed at (`x`, `y`), appending
    /// the produced elements to `out`. Returns the cursor for the next
    /// sibling.
    pub fn process_node(
        &mut self,
        node: &ServerNode,
        siblings: &[ServerNode],
        x: f64,
        y: f64,
        in_container: bool,
        out: &mut Vec<Element>,
    ) -> f64 {
        let role = match role_of(node) {
            Some(role) => role,
            None => {
                log::debug!("skipping unmapped server node {}", node.fqn);
                self.add_skipped(node, "no visual element for this server type");
                return y;
            }
        };

        match role {
            NodeRole::Wrapper => {
                let mut cursor = y;
                for child in &node.children {
                    cursor = self.process_node(child, &node.children, x, cursor, in_container, out);
                }
                cursor
            }
            NodeRole::Fieldset => {
                let fieldset = self.convert_fieldset(node, siblings, x, y, in_container);
                let next = y + fieldset.height + Y_SPACING;
                out.push(fieldset);
                next
            }
            NodeRole::Leaf(element_type) => {
                let element = self.convert_leaf(node, element_type, siblings, x, y, in_container);
                let height = if element.height > 0.0 {
                    element.height
                } else {
                    import_size(ElementType::Input).1
                };
                out.push(element);
                y + height + Y_SPACING
            }
        }
    }

    fn base_element(
        &mut self,
        node: &ServerNode,
        kind: ElementKind,
        siblings: &[ServerNode],
        x: f64,
        y: f64,
        in_container: bool,
    ) -> Element {
        let (default_width, default_height) = import_size(kind.element_type());
        Element {
            id: self.claim_id(node),
            label: resolve_label(node, siblings, in_container),
            required: node.attr_bool("required"),
            order: 0,
            x,
            y,
            width: positive(node.attr_f64("width")).unwrap_or(default_width),
            height: positive(node.attr_f64("height")).unwrap_or(default_height),
            server_fqn: Some(node.fqn.clone()),
            validation: Vec::new(),
            kind,
        }
    }

    fn convert_leaf(
        &mut self,
        node: &ServerNode,
        element_type: ElementType,
        siblings: &[ServerNode],
        x: f64,
        y: f64,
        in_container: bool,
    ) -> Element {
        let kind = leaf_kind(node, element_type);
        let mut element = self.base_element(node, kind, siblings, x, y, in_container);

        if element_type == ElementType::Button && element.label.starts_with("Untitled") {
            if let Some(text) = node
                .children
                .first()
                .filter(|c| c.fqn == FQN_MARKUP)
                .and_then(|c| c.html.as_deref())
            {
                element.label = text.trim().to_string();
            }
        }
        element
    }

    fn convert_fieldset(
        &mut self,
        node: &ServerNode,
        siblings: &[ServerNode],
        x: f64,
        y: f64,
        in_container: bool,
    ) -> Element {
        let repeatable = node
            .processors
            .iter()
            .find(|p| p.fqn == FQN_MULTIPLE_PROCESSOR)
            .map(repeatable_group);
        if repeatable.is_some() {
            log::info!("fieldset {} is a repeatable group", node.fqn);
        }

        let mut fieldset = self.base_element(
            node,
            ElementKind::Fieldset(FieldsetProps {
                children: Vec::new(),
                repeatable,
            }),
            siblings,
            x,
            y,
            in_container,
        );

        let label_height = if fieldset.label.is_empty() || fieldset.label == HIDDEN_FIELDSET_LABEL {
            0.0
        } else {
            FIELDSET_LABEL_HEIGHT
        };
        let content_x = x + FIELDSET_PADDING_HORIZONTAL;
        let content_y = y + label_height + FIELDSET_PADDING_TOP;

        let mut children = Vec::new();
        let mut cursor = content_y;
        for child in &node.children {
            cursor = self.process_node(child, &node.children, content_x, cursor, true, &mut children);
        }

        let (width, height) = if children.is_empty() {
            (
                EMPTY_FIELDSET_WIDTH,
                label_height + FIELDSET_PADDING_TOP + FIELDSET_PADDING_BOTTOM,
            )
        } else {
            let min_x = children.iter().map(|c| c.x).fold(f64::INFINITY, f64::min);
            let max_right = children
                .iter()
                .map(|c| c.x + c.width)
                .fold(f64::NEG_INFINITY, f64::max);
            let consumed = cursor - content_y;
            let span = if consumed > 0.0 { consumed - Y_SPACING } else { 0.0 };
            (
                (max_right - min_x).max(0.0) + 2.0 * FIELDSET_PADDING_HORIZONTAL,
                label_height + FIELDSET_PADDING_TOP + span + FIELDSET_PADDING_BOTTOM,
            )
        };

        fieldset.width = width;
        fieldset.height = height.max(MIN_FIELDSET_HEIGHT);
        if let Some(slot) = fieldset.children_mut() {
            *slot = children;
        }
        fieldset
    }
}

impl Default for ImportContext {
    fn default() -> Self {
        Self::new()
    }
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v > 0.0)
}

fn attr_string(node: &ServerNode, key: &str) -> Option<String> {
    match node.attributes.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse an `options` attribute: `[{value, label | text}]`
fn parse_options(node: &ServerNode) -> Option<Vec<SelectOption>> {
    let items = node.attributes.get("options")?.as_array()?;
    let options = items
        .iter()
        .filter_map(|item| {
            let value = match item.get("value")? {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let label = ["label", "text"]
                .iter()
                .filter_map(|key| item.get(*key).and_then(Value::as_str))
                .find(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| value.clone());
            Some(SelectOption::new(value, label))
        })
        .collect();
    Some(options)
}

fn parse_button_type(node: &ServerNode) -> ButtonType {
    match node.attr_str("buttonType").or_else(|| node.attr_str("type")) {
        Some("submit") => ButtonType::Submit,
        Some("reset") => ButtonType::Reset,
        _ => ButtonType::Button,
    }
}

/// Type-specific payload copied from the node's attributes
fn leaf_kind(node: &ServerNode, element_type: ElementType) -> ElementKind {
    match element_type {
        ElementType::Input => ElementKind::Input(TextInputProps {
            placeholder: Some(attr_string(node, "placeholder").unwrap_or_default()),
            default_value: attr_string(node, "defaultValue"),
            min_length: node.attr_u32("minlength"),
            max_length: node.attr_u32("maxlength"),
        }),
        ElementType::Textarea => ElementKind::Textarea(TextareaProps {
            placeholder: Some(attr_string(node, "placeholder").unwrap_or_default()),
            default_value: attr_string(node, "defaultValue"),
            rows: Some(node.attr_u32("rows").unwrap_or(4)),
            cols: node.attr_u32("cols"),
        }),
        ElementType::Checkbox => ElementKind::Checkbox(CheckboxProps {
            checked: node.attr_bool("checked"),
        }),
        ElementType::Select => ElementKind::Select(SelectProps {
            options: parse_options(node).unwrap_or_default(),
            multiple: node.attr_bool("multiple"),
            default_value: node.attributes.get("defaultValue").cloned(),
        }),
        ElementType::Number => ElementKind::Number(NumberProps {
            placeholder: Some(attr_string(node, "placeholder").unwrap_or_default()),
            min: node.attr_f64("min"),
            max: node.attr_f64("max"),
            step: node.attr_f64("step"),
            default_value: node.attr_f64("defaultValue"),
        }),
        ElementType::Date => ElementKind::Date(DateProps {
            min: attr_string(node, "min"),
            max: attr_string(node, "max"),
            default_value: attr_string(node, "defaultValue"),
        }),
        ElementType::File => ElementKind::File(FileProps {
            accept: Some(attr_string(node, "accept").unwrap_or_default()),
            multiple: node.attr_bool("multiple"),
            max_size: node.attr_f64("maxSize").filter(|v| *v >= 0.0).map(|v| v as u64),
        }),
        ElementType::Radio => ElementKind::Radio(RadioProps {
            options: parse_options(node).unwrap_or_else(|| {
                vec![
                    SelectOption::new("default1", "Default Option 1"),
                    SelectOption::new("default2", "Default Option 2"),
                ]
            }),
            default_value: attr_string(node, "defaultValue"),
        }),
        ElementType::Button => ElementKind::Button(ButtonProps {
            button_type: parse_button_type(node),
        }),
        ElementType::Fieldset => ElementKind::Fieldset(FieldsetProps::default()),
    }
}

/// Repeatable-group descriptor from a `Multiple` processor
fn repeatable_group(processor: &ServerProcessor) -> RepeatableGroup {
    let settings = &processor.settings;
    let as_u32 = |key: &str| {
        settings
            .get(key)
            .and_then(Value::as_f64)
            .filter(|v| *v >= 0.0)
            .map(|v| v as u32)
    };
    RepeatableGroup {
        name: settings.get("name").and_then(Value::as_str).map(str::to_string),
        minimum: as_u32("minimum"),
        maximum: as_u32("maximum"),
        initial: as_u32("initial"),
        add_button: settings
            .get("addButton")
            .and_then(Value::as_str)
            .map(str::to_string),
        remove_button: settings.get("removeButton").cloned(),
        processor: serde_json::to_value(processor).ok(),
    }
}

/// Transform a list of top-level server nodes into an element forest
pub fn transform_server_form(nodes: &[ServerNode]) -> ImportReport {
    if nodes.is_empty() {
        log::warn!("transform_server_form: no children in server document");
        return ImportReport::empty();
    }

    let mut context = ImportContext::new();
    let mut elements = Vec::new();
    let mut cursor = INITIAL_Y_OFFSET;
    for node in nodes {
        cursor = context.process_node(node, nodes, INITIAL_X_OFFSET, cursor, false, &mut elements);
    }
    tree::renumber(&mut elements);

    log::info!(
        "imported {} top-level elements ({} skipped nodes)",
        elements.len(),
        context.skipped.len()
    );
    ImportReport {
        elements,
        next_y: cursor,
        skipped: context.skipped,
    }
}

/// Transform a stored server form record
pub fn transform_raw_data(raw: &ServerRawData) -> ImportReport {
    transform_server_form(&raw.children)
}

/// Parse a JSON document shaped `{children: [...]}` and transform it.
///
/// Parse or shape errors yield an empty forest with a warning.
pub fn import_server_json(text: &str) -> ImportReport {
    match serde_json::from_str::<ServerDocument>(text) {
        Ok(document) => transform_server_form(&document.children),
        Err(e) => {
            log::warn!("import_server_json: invalid server document: {}", e);
            ImportReport::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::walk;

    const TEXT: &str = "Easy\\Form\\Item\\Input\\Text";

    #[test]
    fn test_type_key_prefers_base_attributes() {
        let node = ServerNode::new("App\\Custom\\Widget").with_attr("base_fqn", "  Easy\\Form\\Item\\Select ");
        assert_eq!(role_of(&node), Some(NodeRole::Leaf(ElementType::Select)));

        let node = ServerNode::new("App\\Custom\\Widget").with_attr("base_component_type", "DateInput");
        assert_eq!(role_of(&node), Some(NodeRole::Leaf(ElementType::Date)));

        let node = ServerNode::new(" radio ");
        assert_eq!(role_of(&node), Some(NodeRole::Leaf(ElementType::Radio)));
    }

    #[test]
    fn test_single_text_field_geometry() {
        let report = transform_server_form(&[ServerNode::new(TEXT).with_attr("name", "email")]);
        assert_eq!(report.elements.len(), 1);
        let field = &report.elements[0];
        assert_eq!(field.id, "email");
        assert_eq!(field.label, "email");
        assert_eq!((field.x, field.y), (50.0, 50.0));
        assert_eq!((field.width, field.height), (250.0, 85.0));
        assert_eq!(report.next_y, 155.0);
        assert_eq!(field.server_fqn.as_deref(), Some(TEXT));
    }

    #[test]
    fn test_fieldset_wraps_children() {
        let fieldset = ServerNode::new(FQN_FIELDSET)
            .with_attr("label", "Contact")
            .with_child(ServerNode::new(TEXT).with_attr("name", "first"))
            .with_child(ServerNode::new(TEXT).with_attr("name", "last"));
        let report = transform_server_form(&[fieldset]);

        let fs = &report.elements[0];
        assert_eq!(fs.width, 250.0 + 30.0);
        // 30 label + 10 top + (85 + 20 + 85) + 10 bottom
        assert_eq!(fs.height, 240.0);
        assert_eq!(report.next_y, 50.0 + 240.0 + 20.0);

        let children = fs.children().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!((children[0].x, children[0].y), (65.0, 90.0));
        assert_eq!(children[1].y, 90.0 + 85.0 + 20.0);
        assert_eq!(children[1].order, 1);
    }

    #[test]
    fn test_untitled_fieldset_hides_label_allowance() {
        let fieldset = ServerNode::new(FQN_FIELDSET)
            .with_child(ServerNode::new("Easy\\Form\\Item\\Input\\Checkbox").with_attr("name", "ok"));
        let report = transform_server_form(&[fieldset]);
        let fs = &report.elements[0];
        assert_eq!(fs.label, HIDDEN_FIELDSET_LABEL);
        assert_eq!(fs.children().unwrap()[0].y, 60.0);
        // 0 + 10 + 40 + 10 is below the minimum
        assert_eq!(fs.height, 85.0);
        assert_eq!(fs.width, 230.0);
    }

    #[test]
    fn test_empty_fieldset_dimensions() {
        let report = transform_server_form(&[ServerNode::new(FQN_FIELDSET).with_attr("label", "Empty")]);
        let fs = &report.elements[0];
        assert_eq!(fs.width, 250.0);
        assert_eq!(fs.height, 85.0);
    }

    #[test]
    fn test_wrappers_are_transparent() {
        let markup = ServerNode::new(FQN_MARKUP)
            .with_child(ServerNode::new(TEXT).with_attr("name", "a"))
            .with_child(ServerNode::new("Easy\\Form\\Item\\Input\\Number").with_attr("name", "b"));
        let report = transform_server_form(&[markup]);
        assert_eq!(walk::collect_ids(&report.elements), vec!["a", "b"]);
        assert_eq!(report.elements[1].y, 50.0 + 85.0 + 20.0);
        assert_eq!(report.elements[1].order, 1);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_unknown_nodes_are_skipped() {
        let report = transform_server_form(&[
            ServerNode::new("Easy\\Form\\Item\\Captcha").with_attr("name", "captcha"),
            ServerNode::new(TEXT).with_attr("name", "a"),
        ]);
        assert_eq!(report.elements.len(), 1);
        assert_eq!(report.elements[0].y, 50.0);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].id.as_deref(), Some("captcha"));
    }

    #[test]
    fn test_geometry_attributes_override_defaults() {
        let report = transform_server_form(&[ServerNode::new(TEXT)
            .with_attr("name", "a")
            .with_attr("width", 400)
            .with_attr("height", "60")]);
        assert_eq!((report.elements[0].width, report.elements[0].height), (400.0, 60.0));
        assert_eq!(report.next_y, 130.0);
    }

    #[test]
    fn test_repeatable_fieldset_is_tagged_once() {
        let processor: ServerProcessor = serde_json::from_value(serde_json::json!({
            "fqn": FQN_MULTIPLE_PROCESSOR,
            "name": "people",
            "minimum": 1,
            "maximum": 5,
            "addButton": "Add person"
        }))
        .unwrap();
        let fieldset = ServerNode::new(FQN_FIELDSET)
            .with_attr("label", "People")
            .with_processor(processor)
            .with_child(ServerNode::new(TEXT).with_attr("name", "person"));
        let report = transform_server_form(&[fieldset]);

        assert_eq!(report.elements.len(), 1);
        let group = report.elements[0].repeatable().unwrap();
        assert_eq!(group.name.as_deref(), Some("people"));
        assert_eq!(group.minimum, Some(1));
        assert_eq!(group.maximum, Some(5));
        assert_eq!(group.add_button.as_deref(), Some("Add person"));
        assert_eq!(group.processor.as_ref().unwrap()["fqn"], FQN_MULTIPLE_PROCESSOR);
    }

    #[test]
    fn test_button_label_from_markup_child() {
        let button = ServerNode::new(FQN_BUTTON)
            .with_attr("buttonType", "submit")
            .with_child(ServerNode::new(FQN_MARKUP).with_html("  Send  "));
        let report = transform_server_form(&[button]);
        let element = &report.elements[0];
        assert_eq!(element.label, "Send");
        assert_eq!(element.kind, ElementKind::Button(ButtonProps { button_type: ButtonType::Submit }));
        assert_eq!(element.height, 40.0);
    }

    #[test]
    fn test_duplicate_ids_get_fresh_uuid() {
        let report = transform_server_form(&[
            ServerNode::new(TEXT).with_attr("id", "dup"),
            ServerNode::new(TEXT).with_attr("id", "dup"),
        ]);
        assert_eq!(report.elements[0].id, "dup");
        assert_ne!(report.elements[1].id, "dup");
    }

    #[test]
    fn test_select_options_fall_back_to_text_and_value() {
        let select = ServerNode::new("Easy\\Form\\Item\\Select").with_attr(
            "options",
            serde_json::json!([
                { "value": "a", "label": "Alpha" },
                { "value": "b", "text": "Beta" },
                { "value": 3 }
            ]),
        );
        let report = transform_server_form(&[select]);
        match &report.elements[0].kind {
            ElementKind::Select(props) => {
                let labels: Vec<&str> = props.options.iter().map(|o| o.label.as_str()).collect();
                assert_eq!(labels, vec!["Alpha", "Beta", "3"]);
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_import_server_json_tolerates_garbage() {
        let report = import_server_json("not json");
        assert!(report.elements.is_empty());
        assert_eq!(report.next_y, INITIAL_Y_OFFSET);

        let report = import_server_json(r#"{"children": []}"#);
        assert!(report.elements.is_empty());

        let report = import_server_json(r#"{"children": [{"fqn": "input", "attributes": {"name": "x"}}]}"#);
        assert_eq!(report.elements.len(), 1);
    }
}
