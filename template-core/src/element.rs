//! Template elements - the building blocks of scenes.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, MIN_HEIGHT, MIN_WIDTH};

/// Unique identifier for an element.
///
/// Ids are assigned by the owning [`Scene`](crate::Scene) from a monotonically
/// increasing counter and are never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ElementId(u64);

impl ElementId {
    /// Wrap a raw id value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Flush left.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush right.
    Right,
}

impl TextAlign {
    /// CSS keyword for this alignment.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Primitive shape kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Rectangle (optionally rounded).
    #[default]
    Rect,
    /// Circle or ellipse filling the box.
    Circle,
    /// Horizontal rule along the top of the box.
    Line,
}

/// The content an element carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    /// A text block; may contain `{{name}}` placeholder tokens.
    #[serde(rename_all = "camelCase")]
    Text {
        /// Text content.
        #[serde(default)]
        content: String,
        /// Font size in logical units.
        #[serde(default = "defaults::font_size")]
        font_size: f32,
        /// Font family name.
        #[serde(default = "defaults::font_family")]
        font_family: String,
        /// Font weight (CSS keyword or numeric string).
        #[serde(default = "defaults::font_weight")]
        font_weight: String,
        /// Text color.
        #[serde(default = "defaults::text_color")]
        color: String,
        /// Horizontal alignment.
        #[serde(default)]
        text_align: TextAlign,
    },

    /// A filled primitive shape.
    #[serde(rename_all = "camelCase")]
    Shape {
        /// Which primitive to draw.
        #[serde(default)]
        shape_kind: ShapeKind,
        /// Fill color.
        #[serde(default = "defaults::shape_color")]
        color: String,
        /// Corner radius in logical units.
        #[serde(default)]
        border_radius: f32,
    },

    /// An image; an empty `source` marks an unfilled placeholder.
    #[serde(rename_all = "camelCase")]
    Image {
        /// Image URI; empty when the template leaves it to be filled in.
        #[serde(default)]
        source: String,
        /// Corner radius in logical units.
        #[serde(default)]
        border_radius: f32,
    },
}

impl ElementKind {
    /// A text element with default styling.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
            font_size: defaults::font_size(),
            font_family: defaults::font_family(),
            font_weight: defaults::font_weight(),
            color: defaults::text_color(),
            text_align: TextAlign::default(),
        }
    }

    /// A shape element with default styling.
    #[must_use]
    pub fn shape(shape_kind: ShapeKind) -> Self {
        Self::Shape {
            shape_kind,
            color: defaults::shape_color(),
            border_radius: 0.0,
        }
    }

    /// An image element.
    #[must_use]
    pub fn image(source: impl Into<String>) -> Self {
        Self::Image {
            source: source.into(),
            border_radius: 0.0,
        }
    }

    /// Short lowercase name of the variant.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Shape { .. } => "shape",
            Self::Image { .. } => "image",
        }
    }
}

mod defaults {
    pub(super) const fn font_size() -> f32 {
        48.0
    }

    pub(super) fn font_family() -> String {
        "Inter".to_string()
    }

    pub(super) fn font_weight() -> String {
        "400".to_string()
    }

    pub(super) fn text_color() -> String {
        "#ffffff".to_string()
    }

    pub(super) fn shape_color() -> String {
        "#6c5ce7".to_string()
    }

    pub(super) const fn opacity() -> f32 {
        1.0
    }
}

/// Position and size of an element in logical units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geometry {
    /// X position (logical units from the left edge).
    pub x: f32,
    /// Y position (logical units from the top edge).
    pub y: f32,
    /// Width in logical units.
    pub width: f32,
    /// Height in logical units.
    pub height: f32,
}

impl Geometry {
    /// Create a new geometry.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// This geometry with width and height raised to the minimum size.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            width: self.width.max(MIN_WIDTH),
            height: self.height.max(MIN_HEIGHT),
            ..self
        }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Check whether a logical point lies inside the box (edges included).
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 200.0,
            height: 100.0,
        }
    }
}

/// A template element with content, geometry and layering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Unique identifier.
    pub id: ElementId,
    /// Position and size.
    #[serde(flatten)]
    pub geometry: Geometry,
    /// Opacity in `0.0..=1.0`.
    #[serde(default = "defaults::opacity")]
    pub opacity: f32,
    /// Paint order; higher is painted later. Ties keep insertion order.
    #[serde(default)]
    pub z_index: i32,
    /// Element content.
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl Element {
    /// Create a new element. The geometry is clamped to the minimum size.
    #[must_use]
    pub fn new(id: ElementId, kind: ElementKind, geometry: Geometry) -> Self {
        Self {
            id,
            geometry: geometry.clamped(),
            opacity: defaults::opacity(),
            z_index: 0,
            kind,
        }
    }

    /// Set the z-index.
    #[must_use]
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Set the opacity (clamped to `0.0..=1.0`).
    #[must_use]
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.set_opacity(opacity);
        self
    }

    /// Set the opacity, clamped to `0.0..=1.0`. NaN becomes fully opaque.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = if opacity.is_nan() {
            1.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
    }

    /// Replace the geometry, clamped to the minimum size.
    pub fn set_geometry(&mut self, geometry: Geometry) {
        self.geometry = geometry.clamped();
    }

    /// Restore the size/opacity invariants after deserialization.
    pub(crate) fn normalize(&mut self) {
        self.geometry = self.geometry.clamped();
        self.set_opacity(self.opacity);
    }

    /// Check if a logical point is within this element.
    #[must_use]
    pub fn contains_point(&self, p: Point) -> bool {
        self.geometry.contains(p)
    }

    /// Whether this is a text element.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self.kind, ElementKind::Text { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_element_clamps_size() {
        let el = Element::new(
            ElementId::new(1),
            ElementKind::shape(ShapeKind::Rect),
            Geometry::new(0.0, 0.0, 5.0, -3.0),
        );
        assert!((el.geometry.width - MIN_WIDTH).abs() < f32::EPSILON);
        assert!((el.geometry.height - MIN_HEIGHT).abs() < f32::EPSILON);
    }

    #[test]
    fn test_opacity_is_clamped() {
        let mut el = Element::new(ElementId::new(1), ElementKind::image(""), Geometry::default());
        el.set_opacity(1.7);
        assert!((el.opacity - 1.0).abs() < f32::EPSILON);
        el.set_opacity(-0.2);
        assert!(el.opacity.abs() < f32::EPSILON);
    }

    #[test]
    fn test_json_shape_is_flat_and_camel_case() {
        let el = Element::new(
            ElementId::new(7),
            ElementKind::text("Hi"),
            Geometry::new(80.0, 80.0, 920.0, 120.0),
        )
        .with_z_index(3);
        let value = serde_json::to_value(&el).expect("serialize");
        assert_eq!(value["id"], 7);
        assert_eq!(value["type"], "text");
        assert_eq!(value["zIndex"], 3);
        assert_eq!(value["fontSize"], 48.0);
        assert_eq!(value["textAlign"], "left");
        assert_eq!(value["x"], 80.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let el: Element =
            serde_json::from_str(r#"{"id": 2, "type": "shape", "x": 10, "y": 20}"#)
                .expect("deserialize");
        assert_eq!(el.id, ElementId::new(2));
        assert_eq!(el.z_index, 0);
        assert!((el.opacity - 1.0).abs() < f32::EPSILON);
        assert!((el.geometry.x - 10.0).abs() < f32::EPSILON);
        assert!((el.geometry.width - 200.0).abs() < f32::EPSILON);
        match el.kind {
            ElementKind::Shape { shape_kind, .. } => assert_eq!(shape_kind, ShapeKind::Rect),
            other => panic!("expected shape, got {other:?}"),
        }
    }

    #[test]
    fn test_contains_point() {
        let el = Element::new(
            ElementId::new(1),
            ElementKind::text("x"),
            Geometry::new(100.0, 100.0, 200.0, 50.0),
        );
        assert!(el.contains_point(Point::new(150.0, 125.0)));
        assert!(!el.contains_point(Point::new(50.0, 50.0)));
    }
}
