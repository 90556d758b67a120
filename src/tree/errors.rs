//! Error types for tree mutations

use thiserror::Error;

/// Why a tree operation did not apply. The forest is left unmodified
/// whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TreeError {
    /// No element with this id exists anywhere in the forest
    #[error("element not found: {0}")]
    NotFound(String),

    /// The target parent exists but is a leaf element
    #[error("element {0} is not a container")]
    NotAContainer(String),

    /// The target parent is the moved element itself or one of its descendants
    #[error("cannot move {id} into its own subtree ({parent})")]
    WouldCreateCycle { id: String, parent: String },

    /// An element with this id is already present in the forest
    #[error("duplicate element id: {0}")]
    DuplicateId(String),

    /// A content patch could not be applied to the element
    #[error("invalid element patch: {0}")]
    InvalidPatch(String),
}

impl TreeError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, TreeError::NotFound(_))
    }
}
