//! Depth-first traversal over an element forest

use std::collections::HashSet;
use std::slice;

use crate::models::Element;

/// Pre-order, depth-first iterator over every element of a forest
pub struct Walk<'a> {
    stack: Vec<slice::Iter<'a, Element>>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(element) => {
                    if let Some(children) = element.children() {
                        self.stack.push(children.iter());
                    }
                    return Some(element);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Iterate every element in document order
pub fn iter(forest: &[Element]) -> Walk<'_> {
    Walk {
        stack: vec![forest.iter()],
    }
}

/// Iterate an element followed by all of its descendants
pub fn subtree(element: &Element) -> impl Iterator<Item = &Element> {
    let children: &[Element] = element.children().map(|c| c.as_slice()).unwrap_or(&[]);
    std::iter::once(element).chain(iter(children))
}

pub fn find<'a>(forest: &'a [Element], id: &str) -> Option<&'a Element> {
    iter(forest).find(|e| e.id == id)
}

pub fn contains(forest: &[Element], id: &str) -> bool {
    find(forest, id).is_some()
}

/// All ids in document order
pub fn collect_ids(forest: &[Element]) -> Vec<String> {
    iter(forest).map(|e| e.id.clone()).collect()
}

/// Total number of elements at every depth
pub fn count(forest: &[Element]) -> usize {
    iter(forest).count()
}

/// True when `id` lies strictly inside the subtree of `ancestor_id`
pub fn is_descendant_of(forest: &[Element], ancestor_id: &str, id: &str) -> bool {
    find(forest, ancestor_id)
        .map(|ancestor| subtree(ancestor).skip(1).any(|e| e.id == id))
        .unwrap_or(false)
}

/// First id that occurs more than once, in document order
pub fn first_duplicate_id<'a>(elements: impl IntoIterator<Item = &'a Element>) -> Option<&'a str> {
    let mut seen = HashSet::new();
    elements
        .into_iter()
        .map(|e| e.id.as_str())
        .find(|id| !seen.insert(*id))
}

/// True when every element's `order` equals its index in its container
pub fn orders_are_dense(forest: &[Element]) -> bool {
    forest.iter().enumerate().all(|(i, element)| {
        element.order == i
            && element
                .children()
                .map_or(true, |children| orders_are_dense(children))
    })
}
