//! Id → path addressing
//!
//! Every tree operation resolves its target through `locate`, which turns an
//! element id into the list of sibling indices leading to it from the root.
//! The remaining helpers turn such a path back into references.

use crate::models::Element;

use super::errors::TreeError;

/// Index path from the root sequence to an element.
///
/// `[2]` is the third root element, `[2, 0]` the first child of that
/// fieldset, and so on. Never empty for a located element.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ElementPath(Vec<usize>);

impl ElementPath {
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Nesting depth; root elements have depth 0
    pub fn depth(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// Index of the element within its containing sequence
    pub fn index(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Path of the parent fieldset (empty for root elements)
    pub fn parent(&self) -> &[usize] {
        match self.0.split_last() {
            Some((_, parent)) => parent,
            None => &[],
        }
    }

    /// True when `self` lies strictly inside `other`'s subtree
    pub fn is_inside(&self, other: &ElementPath) -> bool {
        self.0.len() > other.0.len() && self.0.starts_with(&other.0)
    }
}

/// Find the path of the element with `id`.
///
/// Depth-first, children in sibling order, descending into fieldsets only.
pub fn locate(forest: &[Element], id: &str) -> Option<ElementPath> {
    let mut indices = Vec::new();
    if locate_into(forest, id, &mut indices) {
        Some(ElementPath(indices))
    } else {
        None
    }
}

fn locate_into(elements: &[Element], id: &str, indices: &mut Vec<usize>) -> bool {
    for (i, element) in elements.iter().enumerate() {
        indices.push(i);
        if element.id == id {
            return true;
        }
        if let Some(children) = element.children() {
            if locate_into(children, id, indices) {
                return true;
            }
        }
        indices.pop();
    }
    false
}

/// Element at `path`
pub fn get<'a>(forest: &'a [Element], path: &[usize]) -> Option<&'a Element> {
    let (first, rest) = path.split_first()?;
    let mut current = forest.get(*first)?;
    for &i in rest {
        current = current.children()?.get(i)?;
    }
    Some(current)
}

/// Mutable element at `path`
pub fn get_mut<'a>(forest: &'a mut [Element], path: &[usize]) -> Option<&'a mut Element> {
    let (first, rest) = path.split_first()?;
    let mut current = forest.get_mut(*first)?;
    for &i in rest {
        current = current.children_mut()?.get_mut(i)?;
    }
    Some(current)
}

/// The sequence holding the children of the fieldset at `parent_path`.
/// An empty path names the root sequence.
pub fn container_at<'a>(forest: &'a [Element], parent_path: &[usize]) -> Option<&'a [Element]> {
    if parent_path.is_empty() {
        return Some(forest);
    }
    get(forest, parent_path)?.children().map(|c| c.as_slice())
}

pub fn container_at_mut<'a>(
    forest: &'a mut Vec<Element>,
    parent_path: &[usize],
) -> Option<&'a mut Vec<Element>> {
    if parent_path.is_empty() {
        return Some(forest);
    }
    get_mut(forest, parent_path)?.children_mut()
}

/// Resolve an optional parent id to the sequence new elements go into.
///
/// `None` is the root sequence. A named parent must exist and be a fieldset.
pub fn container_for_mut<'a>(
    forest: &'a mut Vec<Element>,
    parent_id: Option<&str>,
) -> Result<&'a mut Vec<Element>, TreeError> {
    let Some(parent_id) = parent_id else {
        return Ok(forest);
    };
    let path = locate(forest, parent_id).ok_or_else(|| TreeError::NotFound(parent_id.to_string()))?;
    let parent = get_mut(forest, path.indices())
        .ok_or_else(|| TreeError::NotFound(parent_id.to_string()))?;
    parent
        .children_mut()
        .ok_or_else(|| TreeError::NotAContainer(parent_id.to_string()))
}
