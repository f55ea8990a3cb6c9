//! Scene graph for managing template elements.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Size};
use crate::{EditorError, EditorResult, Element, ElementId, ElementKind, Geometry};

/// Offset applied to a duplicated element, in logical units on both axes.
pub const DUPLICATE_OFFSET: f32 = 20.0;

/// Background color used when a scene does not specify one.
pub const DEFAULT_BACKGROUND: &str = "#1a1a2e";

/// Output format of a template; selects the fixed logical canvas size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanvasFormat {
    /// 1080×1080 feed post.
    #[default]
    Square,
    /// 1080×1350 portrait feed post.
    Portrait,
    /// 1080×1920 story / reel cover.
    Story,
    /// 1200×628 link preview.
    Landscape,
}

impl CanvasFormat {
    /// Logical canvas size of this format.
    #[must_use]
    pub const fn size(self) -> Size {
        match self {
            Self::Square => Size::new(1080.0, 1080.0),
            Self::Portrait => Size::new(1080.0, 1350.0),
            Self::Story => Size::new(1080.0, 1920.0),
            Self::Landscape => Size::new(1200.0, 628.0),
        }
    }

    /// Lowercase name, as used in documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Square => "square",
            Self::Portrait => "portrait",
            Self::Story => "story",
            Self::Landscape => "landscape",
        }
    }
}

impl std::str::FromStr for CanvasFormat {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "square" => Ok(Self::Square),
            "portrait" => Ok(Self::Portrait),
            "story" => Ok(Self::Story),
            "landscape" => Ok(Self::Landscape),
            other => Err(EditorError::InvalidOperation(format!(
                "unknown canvas format: {other}"
            ))),
        }
    }
}

/// Scene background fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Background {
    /// A single color.
    Solid {
        /// Fill color.
        color: String,
    },
    /// A two-stop linear gradient.
    Gradient {
        /// First stop.
        start: String,
        /// Second stop.
        end: String,
    },
}

impl Background {
    /// A solid background.
    #[must_use]
    pub fn solid(color: impl Into<String>) -> Self {
        Self::Solid {
            color: color.into(),
        }
    }

    /// A two-stop gradient background.
    #[must_use]
    pub fn gradient(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self::Gradient {
            start: start.into(),
            end: end.into(),
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::solid(DEFAULT_BACKGROUND)
    }
}

/// A scene: format, background and the ordered element list of one template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    /// Output format.
    pub format: CanvasFormat,
    /// Background fill.
    pub background: Background,
    /// Elements in insertion order.
    elements: Vec<Element>,
    /// Next id to hand out; only ever grows.
    next_id: u64,
    /// Currently selected element.
    selected: Option<ElementId>,
}

impl Scene {
    /// Create a new empty scene with the given format.
    #[must_use]
    pub fn new(format: CanvasFormat) -> Self {
        Self {
            format,
            background: Background::default(),
            elements: Vec::new(),
            next_id: 1,
            selected: None,
        }
    }

    /// Create a new element of `kind` and add it above everything else.
    pub fn add_element(&mut self, kind: ElementKind, geometry: Geometry) -> ElementId {
        let id = self.allocate_id();
        let z_index = self.top_z_index();
        tracing::debug!(%id, kind = kind.name(), z_index, "adding element");
        self.elements
            .push(Element::new(id, kind, geometry).with_z_index(z_index));
        id
    }

    /// Insert a pre-built element, keeping its id when it is still free.
    ///
    /// Colliding, zero and `u64::MAX` ids are reassigned so ids stay unique
    /// and the counter can always move past them. Returns the id the element
    /// ended up with.
    pub fn insert_element(&mut self, mut element: Element) -> ElementId {
        let following = element.id.get().checked_add(1);
        match following {
            Some(next) if element.id.get() != 0 && self.get_element(element.id).is_none() => {
                self.next_id = self.next_id.max(next);
            }
            _ => {
                let fresh = self.allocate_id();
                tracing::warn!(old = %element.id, new = %fresh, "reassigning element id");
                element.id = fresh;
            }
        }
        element.normalize();
        let id = element.id;
        self.elements.push(element);
        id
    }

    /// Remove an element from the scene.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn remove_element(&mut self, id: ElementId) -> EditorResult<Element> {
        let index = self
            .index_of(id)
            .ok_or(EditorError::ElementNotFound(id))?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        Ok(self.elements.remove(index))
    }

    /// Copy an element under a new id, offset and placed on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn duplicate_element(&mut self, id: ElementId) -> EditorResult<ElementId> {
        let source = self
            .get_element(id)
            .ok_or(EditorError::ElementNotFound(id))?
            .clone();
        let new_id = self.allocate_id();
        let z_index = self.top_z_index();
        let mut copy = source;
        copy.id = new_id;
        copy.z_index = z_index;
        copy.geometry.x += DUPLICATE_OFFSET;
        copy.geometry.y += DUPLICATE_OFFSET;
        tracing::debug!(from = %id, to = %new_id, "duplicated element");
        self.elements.push(copy);
        Ok(new_id)
    }

    /// Get an element by ID.
    #[must_use]
    pub fn get_element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Get a mutable reference to an element by ID.
    pub fn get_element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    /// Replace an element's geometry (clamped to the minimum size).
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn set_geometry(&mut self, id: ElementId, geometry: Geometry) -> EditorResult<()> {
        let element = self
            .get_element_mut(id)
            .ok_or(EditorError::ElementNotFound(id))?;
        element.set_geometry(geometry);
        Ok(())
    }

    /// All elements in insertion order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    /// Elements sorted ascending by `(z_index, insertion order)`.
    #[must_use]
    pub fn ordered_by_z(&self) -> Vec<&Element> {
        let mut ordered: Vec<_> = self.elements.iter().collect();
        // `sort_by_key` is stable, so equal z-indices keep insertion order.
        ordered.sort_by_key(|e| e.z_index);
        ordered
    }

    /// Highest z-index in the scene.
    #[must_use]
    pub fn max_z_index(&self) -> Option<i32> {
        self.elements.iter().map(|e| e.z_index).max()
    }

    /// Lowest z-index in the scene.
    #[must_use]
    pub fn min_z_index(&self) -> Option<i32> {
        self.elements.iter().map(|e| e.z_index).min()
    }

    /// Find the topmost element containing a logical point.
    #[must_use]
    pub fn element_at(&self, point: Point) -> Option<ElementId> {
        self.ordered_by_z()
            .into_iter()
            .rev()
            .find(|e| e.contains_point(point))
            .map(|e| e.id)
    }

    /// Select an element.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn select(&mut self, id: ElementId) -> EditorResult<()> {
        if self.get_element(id).is_none() {
            return Err(EditorError::ElementNotFound(id));
        }
        self.selected = Some(id);
        Ok(())
    }

    /// Clear the selection.
    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// Currently selected element id.
    #[must_use]
    pub const fn selected_id(&self) -> Option<ElementId> {
        self.selected
    }

    /// Currently selected element.
    #[must_use]
    pub fn selected_element(&self) -> Option<&Element> {
        self.selected.and_then(|id| self.get_element(id))
    }

    /// Get the number of elements in the scene.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Check if the scene is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The id the next added element will receive.
    #[must_use]
    pub const fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Whether the counter has no fresh ids left.
    #[must_use]
    pub const fn ids_exhausted(&self) -> bool {
        self.next_id == u64::MAX
    }

    /// Raise the id counter to at least `next_id`. Never lowers it.
    pub(crate) fn reserve_ids(&mut self, next_id: u64) {
        self.next_id = self.next_id.max(next_id).max(1);
    }

    /// Replace the element list wholesale (undo/redo restoration).
    ///
    /// The id counter is kept, so ids handed out before are never reused.
    pub(crate) fn replace_elements(&mut self, elements: Vec<Element>) {
        let highest = elements.iter().map(|e| e.id.get()).max().unwrap_or(0);
        self.elements = elements;
        self.reserve_ids(highest.saturating_add(1));
        self.selected = None;
    }

    /// Move an element to the start of insertion order, so it loses every
    /// z-index tie.
    pub(crate) fn move_to_first(&mut self, id: ElementId) {
        if let Some(index) = self.index_of(id) {
            let element = self.elements.remove(index);
            self.elements.insert(0, element);
        }
    }

    pub(crate) fn elements_vec(&self) -> &[Element] {
        &self.elements
    }

    fn index_of(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    fn allocate_id(&mut self) -> ElementId {
        let candidate = self.next_id.max(1);
        match candidate.checked_add(1) {
            Some(next) => {
                self.next_id = next;
                ElementId::new(candidate)
            }
            None => self.lowest_free_id(),
        }
    }

    /// Lowest id no live element holds. Only used once the counter is
    /// exhausted, so retired ids may come back but live ids never collide.
    fn lowest_free_id(&self) -> ElementId {
        let mut live: Vec<u64> = self.elements.iter().map(|e| e.id.get()).collect();
        live.sort_unstable();
        let mut free = 1;
        for id in live {
            if id == free {
                free += 1;
            } else if id > free {
                break;
            }
        }
        tracing::warn!(id = free, "element id counter exhausted; recycling a free id");
        ElementId::new(free)
    }

    fn top_z_index(&self) -> i32 {
        self.max_z_index().map_or(1, |z| z.saturating_add(1))
    }
}
