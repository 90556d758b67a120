//! Glue shared by the form builder's exported functions
//!
//! Moves forms, elements and drop targets across the JS boundary and
//! reports builder failures to the browser console.

use wasm_bindgen::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;

// ============================================================================
// Browser console bindings
// ============================================================================

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);

    #[wasm_bindgen(js_namespace = console)]
    fn info(s: &str);

    #[wasm_bindgen(js_namespace = console)]
    fn warn(s: &str);

    #[wasm_bindgen(js_namespace = console)]
    fn error(s: &str);
}

// ============================================================================
// Builder log macros
// ============================================================================

/// Debug line tagged `[form-builder]`
#[macro_export]
macro_rules! wasm_log {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_debug(&format!($($arg)*))
    };
}

/// Info line tagged `[form-builder]`, used for form lifecycle events
#[macro_export]
macro_rules! wasm_info {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_info(&format!($($arg)*))
    };
}

/// Warning tagged `[form-builder] warning:`, for lookups that missed
#[macro_export]
macro_rules! wasm_warn {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_warn(&format!($($arg)*))
    };
}

/// Error tagged `[form-builder] error:`, for rejected edits and bad payloads
#[macro_export]
macro_rules! wasm_error {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_error(&format!($($arg)*))
    };
}

// ============================================================================
// Macro targets
// ============================================================================

const TAG: &str = "[form-builder]";

pub fn log_debug(msg: &str) {
    log(&format!("{} {}", TAG, msg));
}

pub fn log_info(msg: &str) {
    info(&format!("{} {}", TAG, msg));
}

pub fn log_warn(msg: &str) {
    warn(&format!("{} warning: {}", TAG, msg));
}

pub fn log_error(msg: &str) {
    error(&format!("{} error: {}", TAG, msg));
}

// ============================================================================
// Crossing the JS boundary
// ============================================================================

/// Read a form payload from JS; a shape mismatch is logged and returned as the error
pub fn deserialize<T: DeserializeOwned>(
    value: JsValue,
    error_context: &str,
) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| {
        let msg = format!("{}: {}", error_context, e);
        log_error(&msg);
        JsValue::from_str(&msg)
    })
}

/// Hand a builder value to JS as a plain object.
///
/// Maps become plain objects rather than `Map` instances, so server documents
/// and patches keep their JSON shape on the JS side.
pub fn serialize<T: Serialize>(value: &T, error_context: &str) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value.serialize(&serializer).map_err(|e| {
        let msg = format!("{}: {}", error_context, e);
        log_error(&msg);
        JsValue::from_str(&msg)
    })
}

// ============================================================================
// Builder errors
// ============================================================================

/// Turn a rejected builder operation into a JS error string, logging it
pub fn js_error(context: &str, err: impl Display) -> JsValue {
    let msg = format!("{}: {}", context, err);
    log_error(&msg);
    JsValue::from_str(&msg)
}
