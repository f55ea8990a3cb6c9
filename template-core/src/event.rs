//! Host input surface: pointer and keyboard events.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Pointer event in display coordinates, delivered during a gesture.
///
/// Gestures are started explicitly (`begin_drag` / `begin_resize`) because
/// the host knows whether the pointer went down on a body or on a handle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PointerEvent {
    /// Pointer moved.
    Move {
        /// X coordinate.
        x: f32,
        /// Y coordinate.
        y: f32,
    },
    /// Pointer released.
    Up,
}

impl PointerEvent {
    /// A move event at `(x, y)`.
    #[must_use]
    pub const fn move_to(x: f32, y: f32) -> Self {
        Self::Move { x, y }
    }

    /// The pointer position, for move events.
    #[must_use]
    pub const fn position(&self) -> Option<Point> {
        match self {
            Self::Move { x, y } => Some(Point::new(*x, *y)),
            Self::Up => None,
        }
    }
}

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct KeyModifiers {
    /// Shift key pressed.
    pub shift: bool,
    /// Control key pressed.
    pub ctrl: bool,
    /// Alt/Option key pressed.
    pub alt: bool,
    /// Meta/Command key pressed.
    pub meta: bool,
}

impl KeyModifiers {
    /// Ctrl on Windows/Linux or Cmd on macOS.
    #[must_use]
    pub const fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A key press as reported by the host (`KeyboardEvent.key` naming).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInput {
    /// Key name, e.g. `"z"`, `"Delete"`, `"Backspace"`.
    pub key: String,
    /// Active modifier keys.
    #[serde(default)]
    pub modifiers: KeyModifiers,
}

impl KeyInput {
    /// A key press with no modifiers.
    #[must_use]
    pub fn plain(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: KeyModifiers::default(),
        }
    }

    /// A key press with Ctrl held.
    #[must_use]
    pub fn ctrl(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: KeyModifiers {
                ctrl: true,
                ..KeyModifiers::default()
            },
        }
    }

    /// A key press with Ctrl and Shift held.
    #[must_use]
    pub fn ctrl_shift(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: KeyModifiers {
                ctrl: true,
                shift: true,
                ..KeyModifiers::default()
            },
        }
    }

    /// The editor command bound to this key, if any.
    #[must_use]
    pub fn command(&self) -> Option<EditorCommand> {
        let key = self.key.to_ascii_lowercase();
        if self.modifiers.command() {
            match key.as_str() {
                "z" if self.modifiers.shift => Some(EditorCommand::Redo),
                "z" => Some(EditorCommand::Undo),
                "y" => Some(EditorCommand::Redo),
                "d" => Some(EditorCommand::Duplicate),
                _ => None,
            }
        } else {
            match key.as_str() {
                "delete" | "backspace" => Some(EditorCommand::DeleteSelected),
                _ => None,
            }
        }
    }
}

/// Commands reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditorCommand {
    /// Step back in history.
    Undo,
    /// Step forward in history.
    Redo,
    /// Delete the selected element.
    DeleteSelected,
    /// Duplicate the selected element.
    Duplicate,
}

impl EditorCommand {
    /// Command name as sent to the host.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::DeleteSelected => "deleteSelected",
            Self::Duplicate => "duplicate",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_bindings() {
        assert_eq!(KeyInput::ctrl("z").command(), Some(EditorCommand::Undo));
        assert_eq!(KeyInput::ctrl("Z").command(), Some(EditorCommand::Undo));
        assert_eq!(KeyInput::ctrl("y").command(), Some(EditorCommand::Redo));
        assert_eq!(KeyInput::ctrl_shift("z").command(), Some(EditorCommand::Redo));

        let cmd_z = KeyInput {
            key: "z".into(),
            modifiers: KeyModifiers {
                meta: true,
                ..KeyModifiers::default()
            },
        };
        assert_eq!(cmd_z.command(), Some(EditorCommand::Undo));
    }

    #[test]
    fn test_delete_bindings() {
        assert_eq!(
            KeyInput::plain("Delete").command(),
            Some(EditorCommand::DeleteSelected)
        );
        assert_eq!(
            KeyInput::plain("Backspace").command(),
            Some(EditorCommand::DeleteSelected)
        );
        assert_eq!(KeyInput::plain("z").command(), None);
        assert_eq!(KeyInput::ctrl("Delete").command(), None);
    }

    #[test]
    fn test_pointer_event_json() {
        let ev: PointerEvent = serde_json::from_str(r#"{"type": "move", "x": 1, "y": 2}"#)
            .expect("deserialize");
        assert_eq!(ev.position(), Some(Point::new(1.0, 2.0)));
        let up: PointerEvent = serde_json::from_str(r#"{"type": "up"}"#).expect("deserialize");
        assert_eq!(up, PointerEvent::Up);
    }
}
