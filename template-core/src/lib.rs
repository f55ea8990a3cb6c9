//! # Template Core
//!
//! Composition engine for fixed-size social-media templates.
//! Compiles to WASM for the browser editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │             template-core.wasm              │
//! ├─────────────────────────────────────────────┤
//! │  Scene Graph     │  Interaction             │
//! │  - Elements      │  - Drag / resize FSM     │
//! │  - Z-order       │  - Viewport mapping      │
//! │  - Background    │  - Keyboard commands     │
//! ├─────────────────────────────────────────────┤
//! │  History         │  Export                  │
//! │  - Undo / redo   │  - Markup + style sheet  │
//! │  - Debounce      │  - Placeholders          │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! [`EditorSession`] ties the pieces together; the modules can also be
//! used on their own.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod element;
pub mod error;
pub mod event;
pub mod export;
pub mod geometry;
pub mod history;
pub mod interaction;
pub mod layer;
pub mod scene;
pub mod schema;
pub mod session;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::EditorConfig;
pub use element::{Element, ElementId, ElementKind, Geometry, ShapeKind, TextAlign};
pub use error::{EditorError, EditorResult};
pub use event::{EditorCommand, KeyInput, KeyModifiers, PointerEvent};
pub use export::{TemplateExport, TemplateRecord};
pub use geometry::{Point, Size, Viewport, MIN_HEIGHT, MIN_WIDTH};
pub use history::{History, Snapshot};
pub use interaction::{GestureOutcome, GestureState, Handle, InteractionController};
pub use layer::LayerOp;
pub use scene::{Background, CanvasFormat, Scene};
pub use schema::{load_scene, BackgroundDocument, SceneDocument};
pub use session::EditorSession;

/// Template core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
