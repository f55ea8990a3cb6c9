//! Editor configuration.

use serde::{Deserialize, Serialize};

use crate::geometry::Size;
use crate::history::{DEFAULT_CAPACITY, DEFAULT_DEBOUNCE_MS};

/// Tunables for an [`EditorSession`](crate::EditorSession).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Maximum entries per undo/redo stack.
    pub history_capacity: usize,
    /// Quiescence interval before a continuous edit becomes an undo step.
    pub edit_debounce_ms: u64,
    /// Width of the display box the canvas is fitted into.
    pub display_width: f32,
    /// Height of the display box the canvas is fitted into.
    pub display_height: f32,
}

impl EditorConfig {
    /// The display bounding box.
    #[must_use]
    pub const fn display_bounds(&self) -> Size {
        Size::new(self.display_width, self.display_height)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_CAPACITY,
            edit_debounce_ms: DEFAULT_DEBOUNCE_MS,
            display_width: 540.0,
            display_height: 540.0,
        }
    }
}
