//! Pointer gesture state machine.
//!
//! Turns display-space pointer positions into element geometry changes.
//! Exactly one gesture (drag or resize) can be active; beginning a second
//! one is a caller error, while move/end events outside a gesture are
//! ignored because hosts routinely deliver them out of order.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Viewport, MIN_HEIGHT, MIN_WIDTH};
use crate::{EditorError, EditorResult, ElementId, Geometry, Scene};

/// One of the eight resize handles around a selected element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    /// Top edge.
    N,
    /// Top-right corner.
    Ne,
    /// Right edge.
    E,
    /// Bottom-right corner.
    Se,
    /// Bottom edge.
    S,
    /// Bottom-left corner.
    Sw,
    /// Left edge.
    W,
    /// Top-left corner.
    Nw,
}

impl Handle {
    /// All handles, clockwise from the top.
    pub const ALL: [Self; 8] = [
        Self::N,
        Self::Ne,
        Self::E,
        Self::Se,
        Self::S,
        Self::Sw,
        Self::W,
        Self::Nw,
    ];

    /// Whether the handle moves the top edge.
    #[must_use]
    pub const fn north(self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }

    /// Whether the handle moves the bottom edge.
    #[must_use]
    pub const fn south(self) -> bool {
        matches!(self, Self::S | Self::Se | Self::Sw)
    }

    /// Whether the handle moves the right edge.
    #[must_use]
    pub const fn east(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    /// Whether the handle moves the left edge.
    #[must_use]
    pub const fn west(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }

    /// Compass name of the handle.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::N => "n",
            Self::Ne => "ne",
            Self::E => "e",
            Self::Se => "se",
            Self::S => "s",
            Self::Sw => "sw",
            Self::W => "w",
            Self::Nw => "nw",
        }
    }
}

impl std::str::FromStr for Handle {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|h| h.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| EditorError::InvalidOperation(format!("unknown resize handle: {s}")))
    }
}

/// Where a gesture started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureOrigin {
    /// Element being manipulated.
    pub element: ElementId,
    /// Pointer position at gesture start, in logical units.
    pub pointer: Point,
    /// Element geometry at gesture start.
    pub geometry: Geometry,
}

/// Current gesture state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum GestureState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Moving an element.
    Dragging(GestureOrigin),
    /// Resizing an element from one handle.
    Resizing(GestureOrigin, Handle),
}

impl GestureState {
    /// Short name of the state, for logs and errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dragging(_) => "dragging",
            Self::Resizing(..) => "resizing",
        }
    }
}

/// A finished gesture: the element and its geometry before and after.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureOutcome {
    /// Element that was manipulated.
    pub element: ElementId,
    /// Geometry when the gesture began.
    pub before: Geometry,
    /// Geometry when the gesture ended.
    pub after: Geometry,
}

impl GestureOutcome {
    /// Whether the gesture actually changed the element.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.before != self.after
    }
}

/// Drives drag and resize gestures against a [`Scene`].
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    state: GestureState,
}

impl InteractionController {
    /// Create an idle controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current state.
    #[must_use]
    pub const fn state(&self) -> &GestureState {
        &self.state
    }

    /// Whether no gesture is active.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self.state, GestureState::Idle)
    }

    /// Start moving an element. Selects it.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidState`] if a gesture is already active
    /// and [`EditorError::ElementNotFound`] if the element does not exist.
    pub fn begin_drag(
        &mut self,
        scene: &mut Scene,
        viewport: &Viewport,
        id: ElementId,
        pointer: Point,
    ) -> EditorResult<()> {
        let origin = self.begin(scene, viewport, id, pointer, "drag")?;
        self.state = GestureState::Dragging(origin);
        tracing::debug!(element = %id, "drag started");
        Ok(())
    }

    /// Move the dragged element with the pointer.
    ///
    /// Returns `false` (and does nothing) when no drag is active.
    pub fn update_drag(&mut self, scene: &mut Scene, viewport: &Viewport, pointer: Point) -> bool {
        let GestureState::Dragging(origin) = self.state else {
            return false;
        };
        let delta = viewport.to_logical(pointer) - origin.pointer;
        let Some(element) = scene.get_element_mut(origin.element) else {
            return false;
        };
        element.geometry.x = (origin.geometry.x + delta.x).round();
        element.geometry.y = (origin.geometry.y + delta.y).round();
        true
    }

    /// Finish the drag. `None` when no drag was active.
    pub fn end_drag(&mut self, scene: &Scene) -> Option<GestureOutcome> {
        let GestureState::Dragging(origin) = self.state else {
            return None;
        };
        self.state = GestureState::Idle;
        let outcome = Self::outcome(scene, &origin);
        tracing::debug!(element = %origin.element, "drag ended");
        outcome
    }

    /// Start resizing an element from `handle`. Selects it.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidState`] if a gesture is already active
    /// and [`EditorError::ElementNotFound`] if the element does not exist.
    pub fn begin_resize(
        &mut self,
        scene: &mut Scene,
        viewport: &Viewport,
        id: ElementId,
        handle: Handle,
        pointer: Point,
    ) -> EditorResult<()> {
        let origin = self.begin(scene, viewport, id, pointer, "resize")?;
        self.state = GestureState::Resizing(origin, handle);
        tracing::debug!(element = %id, handle = handle.as_str(), "resize started");
        Ok(())
    }

    /// Resize the element with the pointer.
    ///
    /// Returns `false` (and does nothing) when no resize is active.
    pub fn update_resize(
        &mut self,
        scene: &mut Scene,
        viewport: &Viewport,
        pointer: Point,
    ) -> bool {
        let GestureState::Resizing(origin, handle) = self.state else {
            return false;
        };
        let delta = viewport.to_logical(pointer) - origin.pointer;
        let Some(element) = scene.get_element_mut(origin.element) else {
            return false;
        };
        element.geometry = resize_geometry(origin.geometry, handle, delta);
        true
    }

    /// Finish the resize. `None` when no resize was active.
    pub fn end_resize(&mut self, scene: &Scene) -> Option<GestureOutcome> {
        let GestureState::Resizing(origin, _) = self.state else {
            return None;
        };
        self.state = GestureState::Idle;
        let outcome = Self::outcome(scene, &origin);
        tracing::debug!(element = %origin.element, "resize ended");
        outcome
    }

    /// Forget any active gesture without reporting it.
    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
    }

    fn begin(
        &self,
        scene: &mut Scene,
        viewport: &Viewport,
        id: ElementId,
        pointer: Point,
        gesture: &str,
    ) -> EditorResult<GestureOrigin> {
        if !self.is_idle() {
            return Err(EditorError::InvalidState(format!(
                "cannot begin {gesture} while {}",
                self.state.name()
            )));
        }
        let geometry = scene
            .get_element(id)
            .ok_or(EditorError::ElementNotFound(id))?
            .geometry;
        scene.select(id)?;
        Ok(GestureOrigin {
            element: id,
            pointer: viewport.to_logical(pointer),
            geometry,
        })
    }

    fn outcome(scene: &Scene, origin: &GestureOrigin) -> Option<GestureOutcome> {
        scene.get_element(origin.element).map(|e| GestureOutcome {
            element: origin.element,
            before: origin.geometry,
            after: e.geometry,
        })
    }
}

/// Apply a resize handle drag of `delta` logical units to `origin`.
///
/// The delta is rounded to whole logical units. Edges not owned by the
/// handle stay put; when the minimum size clamps a west or north drag, the
/// opposite edge keeps its original position.
#[must_use]
pub fn resize_geometry(origin: Geometry, handle: Handle, delta: Point) -> Geometry {
    let dx = delta.x.round();
    let dy = delta.y.round();
    let mut out = origin;

    if handle.east() {
        out.width = (origin.width + dx).max(MIN_WIDTH);
    } else if handle.west() {
        let width = origin.width - dx;
        if width < MIN_WIDTH {
            out.width = MIN_WIDTH;
            out.x = origin.right() - MIN_WIDTH;
        } else {
            out.width = width;
            out.x = origin.x + dx;
        }
    }

    if handle.south() {
        out.height = (origin.height + dy).max(MIN_HEIGHT);
    } else if handle.north() {
        let height = origin.height - dy;
        if height < MIN_HEIGHT {
            out.height = MIN_HEIGHT;
            out.y = origin.bottom() - MIN_HEIGHT;
        } else {
            out.height = height;
            out.y = origin.y + dy;
        }
    }

    out
}
