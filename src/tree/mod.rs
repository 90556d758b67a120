//! Tree mutation engine
//!
//! Operations over the ordered, nested element forest. Elements are
//! addressed by id at any depth; every lookup goes through `path::locate`.

pub mod errors;
pub mod operations;
pub mod path;
pub mod walk;

pub use errors::TreeError;
pub use operations::{
    check_unique_ids, extract, find_with_parent, insert_at, move_element, remove, renumber, renumber_level,
    update_content, update_position, update_property, FoundElement, PROTECTED_KEYS,
};
pub use path::{locate, ElementPath};
pub use walk::{
    collect_ids, contains, count, find, first_duplicate_id, is_descendant_of, iter,
    orders_are_dense,
};
