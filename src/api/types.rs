//! Shared types for the WASM API
//!
//! Result records handed to JavaScript. Persistence calls answer with
//! `{success, id?, data?, error?: {code, message}}` instead of throwing.

use serde::{Deserialize, Serialize};

use crate::models::{Element, ServerRawData};
use crate::persistence::{ErrorInfo, PersistenceError};

/// Result of a persistence call that yields a form id
#[derive(Serialize, Clone, Debug)]
pub struct PersistResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl From<Result<String, PersistenceError>> for PersistResult {
    fn from(result: Result<String, PersistenceError>) -> Self {
        match result {
            Ok(id) => Self {
                success: true,
                id: Some(id),
                error: None,
            },
            Err(e) => Self {
                success: false,
                id: None,
                error: Some(e.to_info()),
            },
        }
    }
}

impl From<Result<(), PersistenceError>> for PersistResult {
    fn from(result: Result<(), PersistenceError>) -> Self {
        match result {
            Ok(()) => Self {
                success: true,
                id: None,
                error: None,
            },
            Err(e) => Self {
                success: false,
                id: None,
                error: Some(e.to_info()),
            },
        }
    }
}

/// Result of a persistence call that yields data
#[derive(Serialize, Clone, Debug)]
pub struct LoadResult<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl<T> From<Result<T, PersistenceError>> for LoadResult<T> {
    fn from(result: Result<T, PersistenceError>) -> Self {
        match result {
            Ok(data) => Self {
                success: true,
                data: Some(data),
                error: None,
            },
            Err(e) => Self {
                success: false,
                data: None,
                error: Some(e.to_info()),
            },
        }
    }
}

/// An element located in the working tree
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FoundElementInfo {
    pub element: Element,
    pub parent_id: Option<String>,
    pub index_in_container: usize,
    pub path: Vec<usize>,
}

/// One server document handed to `loadServerForms`
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ServerFormFile {
    pub file_name: String,
    pub data: ServerRawData,
}
