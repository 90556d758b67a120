//! Models module for the form builder
//!
//! This module contains the data shapes threaded through every other
//! component: the element variant set, form records, and the external
//! server document format.

pub mod elements;
pub mod form;

// Re-export commonly used types
pub use elements::*;
pub use form::*;
