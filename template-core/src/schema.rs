//! Canonical JSON document for scenes, shared by the host application,
//! the WASM bindings and the command-line exporter.
//!
//! Loading is deliberately forgiving: absent fields get documented defaults
//! and a malformed element list degrades to an empty one, so a corrupt
//! template record still opens in the editor.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::scene::DEFAULT_BACKGROUND;
use crate::{Background, CanvasFormat, EditorResult, Element, Scene};

/// Document form of a [`Background`].
///
/// Keeps both the solid color and the gradient stops so toggling the
/// `gradient` flag in a property panel does not lose either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackgroundDocument {
    /// Solid fill color.
    pub color: String,
    /// Whether the gradient is used instead of the solid color.
    pub gradient: bool,
    /// First gradient stop.
    pub gradient_start: String,
    /// Second gradient stop.
    pub gradient_end: String,
}

impl Default for BackgroundDocument {
    fn default() -> Self {
        Self {
            color: DEFAULT_BACKGROUND.to_string(),
            gradient: false,
            gradient_start: DEFAULT_BACKGROUND.to_string(),
            gradient_end: DEFAULT_BACKGROUND.to_string(),
        }
    }
}

impl From<&Background> for BackgroundDocument {
    fn from(background: &Background) -> Self {
        match background {
            Background::Solid { color } => Self {
                color: color.clone(),
                gradient: false,
                gradient_start: color.clone(),
                gradient_end: color.clone(),
            },
            Background::Gradient { start, end } => Self {
                color: start.clone(),
                gradient: true,
                gradient_start: start.clone(),
                gradient_end: end.clone(),
            },
        }
    }
}

impl From<BackgroundDocument> for Background {
    fn from(doc: BackgroundDocument) -> Self {
        if doc.gradient {
            Self::Gradient {
                start: doc.gradient_start,
                end: doc.gradient_end,
            }
        } else {
            Self::Solid { color: doc.color }
        }
    }
}

/// Canonical scene document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDocument {
    /// Output format.
    #[serde(default)]
    pub format: CanvasFormat,
    /// Background fill.
    #[serde(default)]
    pub background: BackgroundDocument,
    /// Elements in insertion order.
    #[serde(default)]
    pub elements: Vec<Element>,
    /// Next id the scene will assign.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_id: Option<u64>,
}

impl SceneDocument {
    /// Build a document from a runtime scene.
    #[must_use]
    pub fn from_scene(scene: &Scene) -> Self {
        Self {
            format: scene.format,
            background: BackgroundDocument::from(&scene.background),
            elements: scene.elements().cloned().collect(),
            next_id: Some(scene.next_id()),
        }
    }

    /// Materialize the document as a scene.
    ///
    /// Element ids are kept; duplicates are reassigned.
    #[must_use]
    pub fn into_scene(self) -> Scene {
        let mut scene = Scene::new(self.format);
        scene.background = self.background.into();
        for element in self.elements {
            scene.insert_element(element);
        }
        if let Some(next_id) = self.next_id {
            scene.reserve_ids(next_id);
            if scene.ids_exhausted() {
                tracing::warn!(next_id, "stored id counter is exhausted; new ids will reuse free slots");
            }
        }
        scene
    }
}

impl Scene {
    /// Serialize the scene to its JSON document form.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> EditorResult<String> {
        Ok(serde_json::to_string(&SceneDocument::from_scene(self))?)
    }

    /// Deserialize a scene from its JSON document form, strictly.
    ///
    /// Use [`load_scene`] for the forgiving editor load path.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is not a valid scene document.
    pub fn from_json(json: &str) -> EditorResult<Self> {
        let doc: SceneDocument = serde_json::from_str(json)?;
        Ok(doc.into_scene())
    }
}

/// Load a scene for editing, never failing.
///
/// Accepts either a full scene document or a bare element array. Missing
/// format means square, missing background means [`DEFAULT_BACKGROUND`], and
/// an element list that is malformed or not an array becomes empty.
#[must_use]
pub fn load_scene(json: &str) -> Scene {
    if json.trim().is_empty() {
        return Scene::new(CanvasFormat::default());
    }

    let value: Value = match serde_json::from_str(json) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "scene JSON is malformed; starting blank");
            return Scene::new(CanvasFormat::default());
        }
    };

    match value {
        Value::Array(_) => SceneDocument {
            format: CanvasFormat::default(),
            background: BackgroundDocument::default(),
            elements: parse_elements(Some(value)),
            next_id: None,
        }
        .into_scene(),
        Value::Object(mut map) => {
            let format = map
                .remove("format")
                .and_then(|v| lenient::<CanvasFormat>(v, "format"))
                .unwrap_or_default();
            let background = map
                .remove("background")
                .and_then(|v| lenient::<BackgroundDocument>(v, "background"))
                .unwrap_or_default();
            let next_id = map
                .remove("nextId")
                .and_then(|v| lenient::<u64>(v, "nextId"));
            SceneDocument {
                format,
                background,
                elements: parse_elements(map.remove("elements")),
                next_id,
            }
            .into_scene()
        }
        other => {
            tracing::warn!(kind = json_kind(&other), "scene JSON is not an object or array");
            Scene::new(CanvasFormat::default())
        }
    }
}

fn parse_elements(value: Option<Value>) -> Vec<Element> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(value @ Value::Array(_)) => serde_json::from_value(value).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "element list is malformed; loading no elements");
            Vec::new()
        }),
        Some(other) => {
            tracing::warn!(kind = json_kind(&other), "element list is not an array");
            Vec::new()
        }
    }
}

fn lenient<T: serde::de::DeserializeOwned>(value: Value, field: &str) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(field, error = %e, "ignoring invalid scene field");
            None
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
