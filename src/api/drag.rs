//! WASM API for drag and drop
//!
//! The drag session is shared by every view; a drop resolves against the
//! form store and always ends the session.

use wasm_bindgen::prelude::*;
use std::sync::Mutex;
use lazy_static::lazy_static;

use crate::api::core::with_store;
use crate::api::helpers::{deserialize, js_error, serialize};
use crate::store::{DragSession, DropTarget};
use crate::{wasm_info, wasm_warn};

lazy_static! {
    static ref DRAG: Mutex<DragSession> = Mutex::new(DragSession::new());
}

fn with_drag<T>(f: impl FnOnce(&mut DragSession) -> T) -> Result<T, JsValue> {
    let mut guard = DRAG
        .lock()
        .map_err(|_| js_error("Drag session", "lock poisoned"))?;
    Ok(f(&mut guard))
}

/// Begin dragging an element already on the canvas
#[wasm_bindgen(js_name = startInternalDrag)]
pub fn start_internal_drag(element_id: &str, element_type: &str) -> Result<(), JsValue> {
    wasm_info!("startInternalDrag: id={}, type={}", element_id, element_type);
    with_drag(|drag| drag.start_internal_drag(element_id, element_type))
}

/// Begin dragging a palette widget
#[wasm_bindgen(js_name = startExternalDrag)]
pub fn start_external_drag(element_type: &str) -> Result<(), JsValue> {
    wasm_info!("startExternalDrag: type={}", element_type);
    with_drag(|drag| drag.start_external_drag(element_type))
}

#[wasm_bindgen(js_name = endDrag)]
pub fn end_drag() -> Result<(), JsValue> {
    with_drag(|drag| drag.end_drag())
}

#[wasm_bindgen(js_name = getDragState)]
pub fn get_drag_state() -> Result<JsValue, JsValue> {
    let state = with_drag(|drag| drag.clone())?;
    serialize(&state, "getDragState")
}

/// Complete the drag at `target`
///
/// # Returns
/// Id of the moved or created element, or `undefined` when nothing happened
#[wasm_bindgen(js_name = handleDrop)]
pub fn handle_drop(target_js: JsValue) -> Result<Option<String>, JsValue> {
    let target: DropTarget = deserialize(target_js, "handleDrop: invalid target")?;
    let action = match with_drag(|drag| drag.handle_drop(target))? {
        Some(action) => action,
        None => {
            wasm_warn!("handleDrop: no drag in progress");
            return Ok(None);
        }
    };
    with_store(|store| store.apply_drop(action))?
        .map(Some)
        .map_err(|e| js_error("handleDrop", e))
}
