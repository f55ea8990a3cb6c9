//! Error types for editor operations.

use thiserror::Error;

use crate::ElementId;

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

/// Errors that can occur in editor operations.
#[derive(Debug, Error)]
pub enum EditorError {
    /// Element not found in scene.
    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),

    /// A gesture was started while another one is still active.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A selection-based command ran with nothing selected.
    #[error("No element is selected")]
    NothingSelected,

    /// Invalid element operation.
    #[error("Invalid operation on element: {0}")]
    InvalidOperation(String),

    /// Scene serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
