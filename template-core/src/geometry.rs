//! Logical/display coordinate mapping.
//!
//! Every canvas format has a fixed logical size (for example 1080×1080).
//! The editor shows it scaled into a display bounding box with a single
//! uniform factor, so converting between the two spaces is a multiply or a
//! divide.

use serde::{Deserialize, Serialize};

use crate::scene::CanvasFormat;

/// Smallest width an element may have, in logical units.
pub const MIN_WIDTH: f32 = 30.0;

/// Smallest height an element may have, in logical units.
pub const MIN_HEIGHT: f32 = 20.0;

/// A 2-D point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl std::ops::Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A 2-D size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Size {
    /// Create a new size.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Uniform scale between logical canvas units and display units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    scale: f32,
}

impl Viewport {
    /// A viewport with an explicit scale factor.
    ///
    /// Non-positive or non-finite factors fall back to `1.0`.
    #[must_use]
    pub fn with_scale(scale: f32) -> Self {
        if scale.is_finite() && scale > 0.0 {
            Self { scale }
        } else {
            Self { scale: 1.0 }
        }
    }

    /// Fit a format's logical canvas into a display bounding box.
    ///
    /// Takes the smaller of the width- and height-constrained scales.
    #[must_use]
    pub fn fit(format: CanvasFormat, bounds: Size) -> Self {
        let logical = format.size();
        let by_width = bounds.width / logical.width;
        let by_height = bounds.height / logical.height;
        Self::with_scale(by_width.min(by_height))
    }

    /// The display-per-logical scale factor.
    #[must_use]
    pub const fn scale(&self) -> f32 {
        self.scale
    }

    /// Convert a display-space point to logical units.
    #[must_use]
    pub fn to_logical(&self, display: Point) -> Point {
        Point::new(display.x / self.scale, display.y / self.scale)
    }

    /// Convert a logical point to display units.
    #[must_use]
    pub fn to_display(&self, logical: Point) -> Point {
        Point::new(logical.x * self.scale, logical.y * self.scale)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}
