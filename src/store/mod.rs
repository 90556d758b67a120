//! Form/session store
//!
//! The set of managed forms, the active working tree, selection, dirty
//! tracking and the shared drag session.

pub mod dirty;
pub mod drag;
pub mod session;

pub use dirty::{ChangeTracker, FormChanges};
pub use drag::{DragSession, DragSource, DropAction, DropPosition, DropTarget};
pub use session::{FormStatus, FormStore, FormSummary, DEFAULT_FORM_NAME, FIRST_FORM_NAME};
