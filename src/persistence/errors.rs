//! Error types for form persistence

use serde::Serialize;
use thiserror::Error;

/// A failed persistence call. Every variant maps to a fixed code that the
/// JavaScript side switches on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PersistenceError {
    #[error("Form with ID {id} not found")]
    NotFound { id: String },

    #[error("Invalid form data structure for ID {id}: {reason}")]
    InvalidStructure { id: String, reason: String },

    #[error("{context}: {message}")]
    Storage { context: String, message: String },

    #[error("No active form")]
    NoActiveForm,
}

impl PersistenceError {
    pub fn storage(context: &str, message: impl Into<String>) -> Self {
        PersistenceError::Storage {
            context: context.to_string(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            PersistenceError::NotFound { .. } => "NOT_FOUND",
            PersistenceError::InvalidStructure { .. } => "INVALID_STRUCTURE",
            PersistenceError::Storage { .. } => "STORAGE_ERROR",
            PersistenceError::NoActiveForm => "NO_ACTIVE_FORM",
        }
    }

    /// `{code, message}` record handed to JavaScript
    pub fn to_info(&self) -> ErrorInfo {
        ErrorInfo {
            code: self.code().to_string(),
            message: self.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}
