//! Editor session: the single owner of one template being edited.
//!
//! Wraps a [`Scene`] with the gesture state machine, the undo history and
//! the text-editing flag, and decides when history is recorded:
//!
//! ```text
//! add / delete / duplicate / layer op   → record pre-state, then mutate
//! drag-end / resize-end (if changed)    → record pre-gesture state
//! property edits (edit_element, ...)    → debounced; tick() / flush() commit
//! undo / redo                           → flush pending edit first
//! close() / drop                        → flush pending edit
//! ```

use crate::event::{EditorCommand, KeyInput, PointerEvent};
use crate::export::{self, TemplateExport, TemplateRecord};
use crate::geometry::{Point, Size, Viewport};
use crate::history::{History, Snapshot};
use crate::interaction::{GestureOutcome, GestureState, Handle, InteractionController};
use crate::layer::{self, LayerOp};
use crate::schema::load_scene;
use crate::{
    Background, CanvasFormat, EditorConfig, EditorError, EditorResult, Element, ElementId,
    ElementKind, Geometry, Scene,
};

/// One editor instance.
#[derive(Debug)]
pub struct EditorSession {
    scene: Scene,
    viewport: Viewport,
    display_bounds: Size,
    interaction: InteractionController,
    history: History,
    editing_text: Option<ElementId>,
    config: EditorConfig,
}

impl EditorSession {
    /// Start a blank session with default configuration.
    #[must_use]
    pub fn new(format: CanvasFormat) -> Self {
        Self::with_scene(Scene::new(format), EditorConfig::default())
    }

    /// Start a session on an existing scene.
    #[must_use]
    pub fn with_scene(scene: Scene, config: EditorConfig) -> Self {
        let display_bounds = config.display_bounds();
        tracing::info!(
            format = scene.format.as_str(),
            elements = scene.element_count(),
            "editor session opened"
        );
        Self {
            viewport: Viewport::fit(scene.format, display_bounds),
            display_bounds,
            scene,
            interaction: InteractionController::new(),
            history: History::with_limits(config.history_capacity, config.edit_debounce_ms),
            editing_text: None,
            config,
        }
    }

    /// Open a session from a stored scene JSON, tolerating bad input.
    #[must_use]
    pub fn load(json: &str, config: EditorConfig) -> Self {
        Self::with_scene(load_scene(json), config)
    }

    /// Replace the scene wholesale from JSON; history starts over.
    pub fn load_json(&mut self, json: &str) {
        self.scene = load_scene(json);
        self.history.clear();
        self.interaction.reset();
        self.editing_text = None;
        self.refit();
    }

    // --- Accessors ---

    /// The scene being edited.
    #[must_use]
    pub const fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Current logical/display mapping.
    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Undo/redo history.
    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    /// Session configuration.
    #[must_use]
    pub const fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Current gesture state.
    #[must_use]
    pub const fn gesture(&self) -> &GestureState {
        self.interaction.state()
    }

    /// Whether an in-place text edit is active.
    #[must_use]
    pub const fn is_editing_text(&self) -> bool {
        self.editing_text.is_some()
    }

    /// Selected element id.
    #[must_use]
    pub const fn selected_id(&self) -> Option<ElementId> {
        self.scene.selected_id()
    }

    // --- Format and viewport ---

    /// Change the output format and refit the viewport.
    pub fn set_format(&mut self, format: CanvasFormat) {
        self.scene.format = format;
        self.refit();
    }

    /// Change the display bounding box and refit the viewport.
    pub fn set_display_bounds(&mut self, bounds: Size) {
        self.display_bounds = bounds;
        self.refit();
    }

    fn refit(&mut self) {
        self.viewport = Viewport::fit(self.scene.format, self.display_bounds);
    }

    // --- Selection and text editing ---

    /// Select an element.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn select(&mut self, id: ElementId) -> EditorResult<()> {
        self.scene.select(id)?;
        self.leave_text_edit_unless(id);
        Ok(())
    }

    /// Selecting anything other than the element being edited ends the edit.
    fn leave_text_edit_unless(&mut self, id: ElementId) {
        if self.editing_text.is_some_and(|editing| editing != id) {
            self.editing_text = None;
        }
    }

    /// Background click: leave text editing and clear the selection.
    pub fn click_background(&mut self) {
        self.editing_text = None;
        self.scene.deselect();
    }

    /// Enter in-place text editing on a text element (double click).
    ///
    /// # Errors
    ///
    /// Returns an error if the element is missing or not a text element.
    pub fn begin_text_edit(&mut self, id: ElementId) -> EditorResult<()> {
        let element = self
            .scene
            .get_element(id)
            .ok_or(EditorError::ElementNotFound(id))?;
        if !element.is_text() {
            return Err(EditorError::InvalidOperation(format!(
                "element {id} is a {}, not text",
                element.kind.name()
            )));
        }
        self.scene.select(id)?;
        self.editing_text = Some(id);
        Ok(())
    }

    // --- Discrete structural operations ---

    /// Add a new element on top and select it.
    pub fn add_element(&mut self, kind: ElementKind, geometry: Geometry) -> ElementId {
        self.commit_discrete();
        let id = self.scene.add_element(kind, geometry);
        let selected = self.scene.select(id);
        debug_assert!(selected.is_ok(), "freshly added element must be selectable");
        self.editing_text = None;
        id
    }

    /// Delete an element.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn delete_element(&mut self, id: ElementId) -> EditorResult<Element> {
        if self.scene.get_element(id).is_none() {
            return Err(EditorError::ElementNotFound(id));
        }
        self.commit_discrete();
        if self.editing_text == Some(id) {
            self.editing_text = None;
        }
        self.scene.remove_element(id)
    }

    /// Delete the selected element.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NothingSelected`] when nothing is selected.
    pub fn delete_selected(&mut self) -> EditorResult<Element> {
        let id = self.require_selection()?;
        self.delete_element(id)
    }

    /// Duplicate an element and select the copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn duplicate_element(&mut self, id: ElementId) -> EditorResult<ElementId> {
        if self.scene.get_element(id).is_none() {
            return Err(EditorError::ElementNotFound(id));
        }
        self.commit_discrete();
        let copy = self.scene.duplicate_element(id)?;
        self.editing_text = None;
        self.scene.select(copy)?;
        Ok(copy)
    }

    /// Duplicate the selected element and select the copy.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NothingSelected`] when nothing is selected.
    pub fn duplicate_selected(&mut self) -> EditorResult<ElementId> {
        let id = self.require_selection()?;
        self.duplicate_element(id)
    }

    /// Apply a z-order change to the selected element.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NothingSelected`] when nothing is selected.
    pub fn apply_layer(&mut self, op: LayerOp) -> EditorResult<i32> {
        let id = self.require_selection()?;
        self.commit_discrete();
        layer::apply(&mut self.scene, id, op)
    }

    /// Move the selected element above everything else.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NothingSelected`] when nothing is selected.
    pub fn bring_to_front(&mut self) -> EditorResult<i32> {
        self.apply_layer(LayerOp::BringToFront)
    }

    /// Move the selected element to the back.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NothingSelected`] when nothing is selected.
    pub fn send_to_back(&mut self) -> EditorResult<i32> {
        self.apply_layer(LayerOp::SendToBack)
    }

    /// Move the selected element up one step.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NothingSelected`] when nothing is selected.
    pub fn raise(&mut self) -> EditorResult<i32> {
        self.apply_layer(LayerOp::Raise)
    }

    /// Move the selected element down one step.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NothingSelected`] when nothing is selected.
    pub fn lower(&mut self) -> EditorResult<i32> {
        self.apply_layer(LayerOp::Lower)
    }

    // --- Continuous property edits ---

    /// Edit an element's properties as part of a continuous edit.
    ///
    /// The id is preserved and the size/opacity invariants are re-applied
    /// after `edit` runs. History is committed once edits go quiet for the
    /// debounce interval (see [`tick`](Self::tick)).
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn edit_element(
        &mut self,
        id: ElementId,
        now_ms: u64,
        edit: impl FnOnce(&mut Element),
    ) -> EditorResult<()> {
        if self.scene.get_element(id).is_none() {
            return Err(EditorError::ElementNotFound(id));
        }
        let scene = &self.scene;
        self.history.note_edit(|| Snapshot::capture(scene), now_ms);

        let element = self
            .scene
            .get_element_mut(id)
            .ok_or(EditorError::ElementNotFound(id))?;
        edit(&mut *element);
        element.id = id;
        element.normalize();
        Ok(())
    }

    /// Set an element's geometry from a property panel (continuous edit).
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn set_geometry(&mut self, id: ElementId, geometry: Geometry, now_ms: u64) -> EditorResult<()> {
        self.edit_element(id, now_ms, |e| e.set_geometry(geometry))
    }

    /// Change the background (continuous edit).
    pub fn set_background(&mut self, background: Background, now_ms: u64) {
        let scene = &self.scene;
        self.history.note_edit(|| Snapshot::capture(scene), now_ms);
        self.scene.background = background;
    }

    /// Drive the debounce timer. Returns whether a pending edit was committed.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        self.history.poll(now_ms)
    }

    /// Commit any pending edit now. Returns whether one was committed.
    pub fn flush(&mut self) -> bool {
        self.history.flush()
    }

    // --- Gestures ---

    /// Start dragging an element from a display-space pointer position.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidState`] if a gesture is already active
    /// and [`EditorError::ElementNotFound`] if the element does not exist.
    pub fn begin_drag(&mut self, id: ElementId, pointer: Point) -> EditorResult<()> {
        self.interaction
            .begin_drag(&mut self.scene, &self.viewport, id, pointer)?;
        self.leave_text_edit_unless(id);
        self.history.flush();
        Ok(())
    }

    /// Pointer moved during a drag. No-op outside a drag.
    pub fn update_drag(&mut self, pointer: Point) -> bool {
        self.interaction
            .update_drag(&mut self.scene, &self.viewport, pointer)
    }

    /// Finish a drag, recording history if the element moved.
    ///
    /// Returns whether history was recorded; no-op outside a drag.
    pub fn end_drag(&mut self) -> bool {
        let outcome = self.interaction.end_drag(&self.scene);
        self.commit_gesture(outcome)
    }

    /// Start resizing an element from a handle.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidState`] if a gesture is already active
    /// and [`EditorError::ElementNotFound`] if the element does not exist.
    pub fn begin_resize(&mut self, id: ElementId, handle: Handle, pointer: Point) -> EditorResult<()> {
        self.interaction
            .begin_resize(&mut self.scene, &self.viewport, id, handle, pointer)?;
        self.leave_text_edit_unless(id);
        self.history.flush();
        Ok(())
    }

    /// Pointer moved during a resize. No-op outside a resize.
    pub fn update_resize(&mut self, pointer: Point) -> bool {
        self.interaction
            .update_resize(&mut self.scene, &self.viewport, pointer)
    }

    /// Finish a resize, recording history if the element changed.
    ///
    /// Returns whether history was recorded; no-op outside a resize.
    pub fn end_resize(&mut self) -> bool {
        let outcome = self.interaction.end_resize(&self.scene);
        self.commit_gesture(outcome)
    }

    /// Route a pointer event to whichever gesture is active.
    ///
    /// Returns whether the scene or history changed.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        match (event, *self.interaction.state()) {
            (PointerEvent::Move { x, y }, GestureState::Dragging(_)) => {
                self.update_drag(Point::new(x, y))
            }
            (PointerEvent::Move { x, y }, GestureState::Resizing(..)) => {
                self.update_resize(Point::new(x, y))
            }
            (PointerEvent::Up, GestureState::Dragging(_)) => self.end_drag(),
            (PointerEvent::Up, GestureState::Resizing(..)) => self.end_resize(),
            (_, GestureState::Idle) => false,
        }
    }

    fn commit_gesture(&mut self, outcome: Option<GestureOutcome>) -> bool {
        let Some(outcome) = outcome.filter(GestureOutcome::changed) else {
            return false;
        };
        let mut before = Snapshot::capture(&self.scene);
        if let Some(element) = before.elements.iter_mut().find(|e| e.id == outcome.element) {
            element.geometry = outcome.before;
        }
        self.history.record(before);
        true
    }

    // --- History ---

    /// Step back in history. Returns whether anything changed.
    pub fn undo(&mut self) -> bool {
        self.history.flush();
        let Some(previous) = self.history.undo(Snapshot::capture(&self.scene)) else {
            return false;
        };
        self.restore(previous);
        tracing::debug!(undo_left = self.history.undo_len(), "undo");
        true
    }

    /// Step forward in history. Returns whether anything changed.
    pub fn redo(&mut self) -> bool {
        self.history.flush();
        let Some(next) = self.history.redo(Snapshot::capture(&self.scene)) else {
            return false;
        };
        self.restore(next);
        tracing::debug!(redo_left = self.history.redo_len(), "redo");
        true
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.interaction.reset();
        self.editing_text = None;
        snapshot.restore(&mut self.scene);
    }

    // --- Keyboard ---

    /// Handle a key press. Returns the command that ran, if any.
    ///
    /// Delete/Backspace is ignored while a text edit is active, and
    /// selection commands with nothing selected do nothing.
    pub fn handle_key(&mut self, key: &KeyInput) -> Option<EditorCommand> {
        let command = key.command()?;
        let ran = match command {
            EditorCommand::Undo => self.undo(),
            EditorCommand::Redo => self.redo(),
            EditorCommand::DeleteSelected => {
                if self.is_editing_text() {
                    tracing::debug!("delete suppressed while editing text");
                    false
                } else {
                    self.delete_selected().is_ok()
                }
            }
            EditorCommand::Duplicate => self.duplicate_selected().is_ok(),
        };
        ran.then_some(command)
    }

    // --- Output ---

    /// Export markup, style sheet and placeholders.
    #[must_use]
    pub fn serialize(&self) -> TemplateExport {
        export::serialize(&self.scene)
    }

    /// Build the template record the host persists.
    #[must_use]
    pub fn template_record(&self, name: &str, category: &str) -> TemplateRecord {
        TemplateRecord::from_scene(name, category, &self.scene)
    }

    /// The scene's own JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> EditorResult<String> {
        self.scene.to_json()
    }

    /// Tear down the session, committing any pending edit, and hand back
    /// the scene.
    #[must_use]
    pub fn close(mut self) -> Scene {
        self.history.flush();
        std::mem::take(&mut self.scene)
    }

    // --- Helpers ---

    fn require_selection(&self) -> EditorResult<ElementId> {
        self.scene.selected_id().ok_or(EditorError::NothingSelected)
    }

    /// Commit any pending edit, then record the pre-state of a discrete op.
    fn commit_discrete(&mut self) {
        self.history.flush();
        self.history.record(Snapshot::capture(&self.scene));
    }
}

impl Drop for EditorSession {
    fn drop(&mut self) {
        if self.history.flush() {
            tracing::debug!("flushed pending edit on teardown");
        }
        tracing::info!("editor session closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ShapeKind;

    fn session() -> EditorSession {
        // Scale 1.0 keeps display and logical units equal.
        EditorSession::with_scene(
            Scene::new(CanvasFormat::Square),
            EditorConfig {
                display_width: 1080.0,
                display_height: 1080.0,
                ..EditorConfig::default()
            },
        )
    }

    fn rect(s: &mut EditorSession, x: f32, y: f32) -> ElementId {
        s.add_element(
            ElementKind::shape(ShapeKind::Rect),
            Geometry::new(x, y, 200.0, 100.0),
        )
    }

    fn position(s: &EditorSession, id: ElementId) -> (f32, f32) {
        let g = s.scene().get_element(id).expect("element").geometry;
        (g.x, g.y)
    }

    #[test]
    fn test_add_selects_and_records() {
        let mut s = session();
        let id = rect(&mut s, 0.0, 0.0);
        assert_eq!(s.selected_id(), Some(id));
        assert_eq!(s.history().undo_len(), 1);
        assert!(s.undo());
        assert!(s.scene().is_empty());
        assert_eq!(s.selected_id(), None);
    }

    #[test]
    fn test_drag_then_undo() {
        let mut s = session();
        let id = rect(&mut s, 100.0, 100.0);
        s.begin_drag(id, Point::new(150.0, 150.0)).expect("begin");
        assert!(s.handle_pointer(PointerEvent::move_to(200.0, 130.0)));
        assert!(s.handle_pointer(PointerEvent::Up));
        assert_eq!(position(&s, id), (150.0, 80.0));

        assert!(s.undo());
        assert_eq!(position(&s, id), (100.0, 100.0));
        assert!(s.redo());
        assert_eq!(position(&s, id), (150.0, 80.0));
    }

    #[test]
    fn test_click_without_move_records_nothing() {
        let mut s = session();
        let id = rect(&mut s, 0.0, 0.0);
        let before = s.history().undo_len();
        s.begin_drag(id, Point::new(10.0, 10.0)).expect("begin");
        assert!(!s.end_drag());
        assert_eq!(s.history().undo_len(), before);
    }

    #[test]
    fn test_stray_pointer_up_is_noop() {
        let mut s = session();
        rect(&mut s, 0.0, 0.0);
        assert!(!s.handle_pointer(PointerEvent::Up));
        assert!(!s.handle_pointer(PointerEvent::move_to(5.0, 5.0)));
    }

    #[test]
    fn test_layer_ops_need_selection() {
        let mut s = session();
        rect(&mut s, 0.0, 0.0);
        s.click_background();
        let before = s.history().undo_len();
        assert!(matches!(s.bring_to_front(), Err(EditorError::NothingSelected)));
        assert_eq!(s.history().undo_len(), before);
    }

    #[test]
    fn test_delete_suppressed_while_editing_text() {
        let mut s = session();
        let id = s.add_element(ElementKind::text("Hi"), Geometry::default());
        s.begin_text_edit(id).expect("edit");
        assert_eq!(s.handle_key(&KeyInput::plain("Backspace")), None);
        assert!(s.scene().get_element(id).is_some());

        s.click_background();
        s.select(id).expect("select");
        assert_eq!(
            s.handle_key(&KeyInput::plain("Delete")),
            Some(EditorCommand::DeleteSelected)
        );
        assert!(s.scene().get_element(id).is_none());
    }

    #[test]
    fn test_gesture_on_other_element_ends_text_edit() {
        let mut s = session();
        let text = s.add_element(ElementKind::text("Hi"), Geometry::default());
        let other = rect(&mut s, 400.0, 400.0);
        s.begin_text_edit(text).expect("edit");

        s.begin_drag(other, Point::new(410.0, 410.0)).expect("drag");
        s.end_drag();
        assert!(!s.is_editing_text());
        assert_eq!(
            s.handle_key(&KeyInput::plain("Delete")),
            Some(EditorCommand::DeleteSelected)
        );
        assert!(s.scene().get_element(other).is_none());

        s.begin_text_edit(text).expect("edit");
        s.begin_resize(text, Handle::E, Point::new(200.0, 50.0))
            .expect("resize");
        s.end_resize();
        assert!(s.is_editing_text());
    }

    #[test]
    fn test_text_edit_requires_text_element() {
        let mut s = session();
        let id = rect(&mut s, 0.0, 0.0);
        assert!(matches!(
            s.begin_text_edit(id),
            Err(EditorError::InvalidOperation(_))
        ));
        assert!(!s.is_editing_text());
    }

    #[test]
    fn test_continuous_edits_become_one_step() {
        let mut s = session();
        let id = rect(&mut s, 0.0, 0.0);
        let base = s.history().undo_len();
        for (t, opacity) in [(0, 0.9), (100, 0.8), (200, 0.7)] {
            s.edit_element(id, t, |e| e.set_opacity(opacity)).expect("edit");
        }
        assert!(!s.tick(600));
        assert!(s.tick(700));
        assert_eq!(s.history().undo_len(), base + 1);

        assert!(s.undo());
        let opacity = s.scene().get_element(id).expect("element").opacity;
        assert!((opacity - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_edit_cannot_change_id_or_break_min_size() {
        let mut s = session();
        let id = rect(&mut s, 0.0, 0.0);
        s.edit_element(id, 0, |e| {
            e.id = ElementId::new(999);
            e.geometry.width = 1.0;
        })
        .expect("edit");
        let el = s.scene().get_element(id).expect("same id");
        assert!(el.geometry.width >= crate::MIN_WIDTH);
    }

    #[test]
    fn test_undo_flushes_pending_edit() {
        let mut s = session();
        let id = rect(&mut s, 0.0, 0.0);
        s.set_geometry(id, Geometry::new(300.0, 300.0, 200.0, 100.0), 0)
            .expect("edit");
        // Undo before the debounce fires still reverts the edit.
        assert!(s.undo());
        assert_eq!(position(&s, id), (0.0, 0.0));
    }

    #[test]
    fn test_close_flushes_pending_edit() {
        let mut s = session();
        s.set_background(Background::solid("#000000"), 0);
        assert!(s.history().has_pending());
        let scene = s.close();
        assert_eq!(scene.background, Background::solid("#000000"));
    }

    #[test]
    fn test_format_change_refits_viewport() {
        let mut s = EditorSession::new(CanvasFormat::Square);
        assert!((s.viewport().scale() - 0.5).abs() < f32::EPSILON);
        s.set_format(CanvasFormat::Story);
        assert!((s.viewport().scale() - 540.0 / 1920.0).abs() < 1e-6);
    }

    #[test]
    fn test_load_json_resets_history() {
        let mut s = session();
        rect(&mut s, 0.0, 0.0);
        s.load_json(r#"{"format": "portrait", "elements": "oops"}"#);
        assert!(s.scene().is_empty());
        assert_eq!(s.scene().format, CanvasFormat::Portrait);
        assert!(!s.history().can_undo());
    }
}
