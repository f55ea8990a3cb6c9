//! WebAssembly bindings for template-core.
//!
//! This module provides JavaScript-callable functions when compiled to WASM.
//! Element ids cross the boundary as `BigInt`; structured values as JSON.

use wasm_bindgen::prelude::*;

use crate::schema::BackgroundDocument;
use crate::{
    CanvasFormat, EditorConfig, EditorSession, Element, ElementId, ElementKind, Geometry, Handle,
    KeyInput, KeyModifiers, Point, PointerEvent, Size,
};

/// Initialize the editor WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

/// Milliseconds since the epoch, from the host clock.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

/// Editor instance for WASM.
#[wasm_bindgen]
pub struct WasmEditor {
    session: EditorSession,
}

#[wasm_bindgen]
impl WasmEditor {
    /// Create a blank editor for a format (`square`, `portrait`, `story`,
    /// `landscape`).
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown format.
    #[wasm_bindgen(constructor)]
    pub fn new(format: &str) -> Result<WasmEditor, String> {
        let format: CanvasFormat = format.parse().map_err(|e: crate::EditorError| e.to_string())?;
        Ok(Self {
            session: EditorSession::new(format),
        })
    }

    /// Open an editor on stored scene JSON. Bad input gives a blank scene.
    #[wasm_bindgen(js_name = fromJson)]
    #[must_use]
    pub fn from_json(json: &str) -> WasmEditor {
        Self {
            session: EditorSession::load(json, EditorConfig::default()),
        }
    }

    /// Replace the scene from JSON and drop history.
    #[wasm_bindgen(js_name = loadJson)]
    pub fn load_json(&mut self, json: &str) {
        self.session.load_json(json);
    }

    /// Get the current scene as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error string if serialization fails.
    #[wasm_bindgen(js_name = getSceneJson)]
    pub fn get_scene_json(&self) -> Result<String, String> {
        self.session.to_json().map_err(|e| e.to_string())
    }

    /// Change the output format.
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown format.
    #[wasm_bindgen(js_name = setFormat)]
    pub fn set_format(&mut self, format: &str) -> Result<(), String> {
        let format: CanvasFormat = format.parse().map_err(|e: crate::EditorError| e.to_string())?;
        self.session.set_format(format);
        Ok(())
    }

    /// Fit the canvas into a new display box.
    #[wasm_bindgen(js_name = setDisplayBounds)]
    pub fn set_display_bounds(&mut self, width: f32, height: f32) {
        self.session.set_display_bounds(Size::new(width, height));
    }

    /// Display-per-logical scale factor.
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.session.viewport().scale()
    }

    /// Add an element from a kind JSON such as `{"type":"text","content":"Hi"}`.
    ///
    /// # Errors
    ///
    /// Returns an error string if the JSON is not a valid element kind.
    #[wasm_bindgen(js_name = addElement)]
    pub fn add_element(
        &mut self,
        kind_json: &str,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<u64, String> {
        let kind: ElementKind = serde_json::from_str(kind_json).map_err(|e| e.to_string())?;
        let id = self
            .session
            .add_element(kind, Geometry::new(x, y, width, height));
        Ok(id.get())
    }

    /// Replace an element's content, geometry and opacity from element JSON.
    ///
    /// The id and z-index are kept. Committed to history once edits go quiet.
    ///
    /// # Errors
    ///
    /// Returns an error string for bad JSON or an unknown element.
    #[wasm_bindgen(js_name = updateElement)]
    pub fn update_element(&mut self, id: u64, element_json: &str) -> Result<(), String> {
        let patch: Element = serde_json::from_str(element_json).map_err(|e| e.to_string())?;
        self.session
            .edit_element(ElementId::new(id), now_ms(), |element| {
                element.kind = patch.kind;
                element.geometry = patch.geometry;
                element.opacity = patch.opacity;
            })
            .map_err(|e| e.to_string())
    }

    /// Set the background from `{"color", "gradient", "gradientStart", "gradientEnd"}`.
    ///
    /// # Errors
    ///
    /// Returns an error string for bad JSON.
    #[wasm_bindgen(js_name = setBackground)]
    pub fn set_background(&mut self, json: &str) -> Result<(), String> {
        let doc: BackgroundDocument = serde_json::from_str(json).map_err(|e| e.to_string())?;
        self.session.set_background(doc.into(), now_ms());
        Ok(())
    }

    /// Drive the edit debounce from a host timer.
    pub fn tick(&mut self) -> bool {
        self.session.tick(now_ms())
    }

    /// Commit any pending edit now.
    pub fn flush(&mut self) -> bool {
        self.session.flush()
    }

    /// Select an element.
    ///
    /// # Errors
    ///
    /// Returns an error string if the element is not found.
    pub fn select(&mut self, id: u64) -> Result<(), String> {
        self.session
            .select(ElementId::new(id))
            .map_err(|e| e.to_string())
    }

    /// Selected element id, if any.
    #[wasm_bindgen(js_name = selectedId)]
    #[must_use]
    pub fn selected_id(&self) -> Option<u64> {
        self.session.selected_id().map(ElementId::get)
    }

    /// Background click: clear selection and text editing.
    #[wasm_bindgen(js_name = clickBackground)]
    pub fn click_background(&mut self) {
        self.session.click_background();
    }

    /// Enter in-place text editing.
    ///
    /// # Errors
    ///
    /// Returns an error string if the element is missing or not text.
    #[wasm_bindgen(js_name = beginTextEdit)]
    pub fn begin_text_edit(&mut self, id: u64) -> Result<(), String> {
        self.session
            .begin_text_edit(ElementId::new(id))
            .map_err(|e| e.to_string())
    }

    /// Whether in-place text editing is active.
    #[wasm_bindgen(js_name = isEditingText)]
    #[must_use]
    pub fn is_editing_text(&self) -> bool {
        self.session.is_editing_text()
    }

    /// Delete the selected element.
    ///
    /// # Errors
    ///
    /// Returns an error string when nothing is selected.
    #[wasm_bindgen(js_name = deleteSelected)]
    pub fn delete_selected(&mut self) -> Result<(), String> {
        self.session
            .delete_selected()
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    /// Duplicate the selected element; returns the copy's id.
    ///
    /// # Errors
    ///
    /// Returns an error string when nothing is selected.
    #[wasm_bindgen(js_name = duplicateSelected)]
    pub fn duplicate_selected(&mut self) -> Result<u64, String> {
        self.session
            .duplicate_selected()
            .map(ElementId::get)
            .map_err(|e| e.to_string())
    }

    /// Bring the selected element to the front.
    ///
    /// # Errors
    ///
    /// Returns an error string when nothing is selected.
    #[wasm_bindgen(js_name = bringToFront)]
    pub fn bring_to_front(&mut self) -> Result<i32, String> {
        self.session.bring_to_front().map_err(|e| e.to_string())
    }

    /// Send the selected element to the back.
    ///
    /// # Errors
    ///
    /// Returns an error string when nothing is selected.
    #[wasm_bindgen(js_name = sendToBack)]
    pub fn send_to_back(&mut self) -> Result<i32, String> {
        self.session.send_to_back().map_err(|e| e.to_string())
    }

    /// Raise the selected element one step.
    ///
    /// # Errors
    ///
    /// Returns an error string when nothing is selected.
    pub fn raise(&mut self) -> Result<i32, String> {
        self.session.raise().map_err(|e| e.to_string())
    }

    /// Lower the selected element one step.
    ///
    /// # Errors
    ///
    /// Returns an error string when nothing is selected.
    pub fn lower(&mut self) -> Result<i32, String> {
        self.session.lower().map_err(|e| e.to_string())
    }

    /// Pointer down on an element body.
    ///
    /// # Errors
    ///
    /// Returns an error string if a gesture is active or the element is missing.
    #[wasm_bindgen(js_name = beginDrag)]
    pub fn begin_drag(&mut self, id: u64, x: f32, y: f32) -> Result<(), String> {
        self.session
            .begin_drag(ElementId::new(id), Point::new(x, y))
            .map_err(|e| e.to_string())
    }

    /// Pointer down on a resize handle (`n`, `ne`, ..., `nw`).
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown handle, an active gesture or a
    /// missing element.
    #[wasm_bindgen(js_name = beginResize)]
    pub fn begin_resize(&mut self, id: u64, handle: &str, x: f32, y: f32) -> Result<(), String> {
        let handle: Handle = handle.parse().map_err(|e: crate::EditorError| e.to_string())?;
        self.session
            .begin_resize(ElementId::new(id), handle, Point::new(x, y))
            .map_err(|e| e.to_string())
    }

    /// Pointer moved.
    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        self.session.handle_pointer(PointerEvent::move_to(x, y))
    }

    /// Pointer released.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self) -> bool {
        self.session.handle_pointer(PointerEvent::Up)
    }

    /// Current gesture state name.
    #[wasm_bindgen(js_name = gestureState)]
    #[must_use]
    pub fn gesture_state(&self) -> String {
        self.session.gesture().name().to_string()
    }

    /// Handle a key press; returns the name of the command that ran.
    #[wasm_bindgen(js_name = handleKey)]
    #[allow(clippy::fn_params_excessive_bools)]
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> Option<String> {
        let input = KeyInput {
            key: key.to_string(),
            modifiers: KeyModifiers {
                shift,
                ctrl,
                alt,
                meta,
            },
        };
        self.session
            .handle_key(&input)
            .map(|command| command.as_str().to_string())
    }

    /// Step back in history.
    pub fn undo(&mut self) -> bool {
        self.session.undo()
    }

    /// Step forward in history.
    pub fn redo(&mut self) -> bool {
        self.session.redo()
    }

    /// Whether there is anything to undo.
    #[wasm_bindgen(js_name = canUndo)]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.session.history().can_undo()
    }

    /// Whether there is anything to redo.
    #[wasm_bindgen(js_name = canRedo)]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.session.history().can_redo()
    }

    /// Export `{markup, styleSheet, placeholders}` as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error string if serialization fails.
    pub fn serialize(&self) -> Result<String, String> {
        serde_json::to_string(&self.session.serialize()).map_err(|e| e.to_string())
    }

    /// Export the full template record as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error string if serialization fails.
    #[wasm_bindgen(js_name = templateRecord)]
    pub fn template_record(&self, name: &str, category: &str) -> Result<String, String> {
        serde_json::to_string(&self.session.template_record(name, category))
            .map_err(|e| e.to_string())
    }
}
