//! Label inference for imported nodes

use crate::models::ServerNode;

use super::types::{FQN_LABEL, FQN_MARKUP};

/// Find the text of a `Label` node associated with `node` among `siblings`.
///
/// A label matches when its `for` attribute equals the node's `id` (or
/// `name`) and its first child is a `Markup` node carrying html. Labels
/// wrapped in one level of `Markup` are found too.
pub fn find_associated_label(node: &ServerNode, siblings: &[ServerNode]) -> Option<String> {
    let target = node.attr_str("id").or_else(|| node.attr_str("name"))?;

    siblings.iter().find_map(|sibling| {
        if sibling.fqn == FQN_LABEL {
            return label_text(sibling, target);
        }
        if sibling.fqn == FQN_MARKUP {
            return sibling
                .children
                .iter()
                .filter(|c| c.fqn == FQN_LABEL)
                .find_map(|c| label_text(c, target));
        }
        None
    })
}

fn label_text(label: &ServerNode, target: &str) -> Option<String> {
    if label.attr_str("for") != Some(target) {
        return None;
    }
    let first = label.children.first()?;
    if first.fqn != FQN_MARKUP {
        return None;
    }
    first.html.as_deref().map(|html| html.trim().to_string())
}

/// Last `\`-separated segment of an fqn with `Input` removed
fn short_segment(fqn: &str) -> String {
    fqn.rsplit('\\').next().unwrap_or("").replace("Input", "")
}

/// True for server types rendered as a bare text field inside a group
fn is_text_like(fqn: &str) -> bool {
    fqn.contains("\\Input\\") || fqn.contains("\\Textarea") || fqn.ends_with("\\Input")
}

/// Label used when the node names none and no associated label exists
pub fn fallback_label(fqn: &str, in_container: bool) -> String {
    let segment = short_segment(fqn);
    if in_container && is_text_like(fqn) {
        if segment.is_empty() {
            "Field".to_string()
        } else {
            segment
        }
    } else if segment.is_empty() {
        "Untitled Element".to_string()
    } else {
        format!("Untitled {}", segment)
    }
}

/// Resolve the display label of a node
pub fn resolve_label(node: &ServerNode, siblings: &[ServerNode], in_container: bool) -> String {
    node.attr_str("label")
        .or_else(|| node.attr_str("name"))
        .map(str::to_string)
        .or_else(|| find_associated_label(node, siblings))
        .unwrap_or_else(|| fallback_label(&node.fqn, in_container))
}
