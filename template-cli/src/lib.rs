//! # Template CLI
//!
//! Command-line front end for `template-core`.
//!
//! ## Usage
//!
//! ```bash
//! template-export export scene.json --pretty
//! template-export export scene.json --record --name "Sale" --category promo
//! template-export placeholders scene.json
//! template-export --format story summary scene.json
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `load_config` - Reads an `EditorConfig` JSON file
//! - `open_session` - Loads a scene file into an `EditorSession`
//! - `run` - Executes a subcommand and returns its output

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use template_core::{
    Background, CanvasFormat, EditorConfig, EditorSession, ElementKind, Scene,
};

/// Command-line arguments for template-export.
#[derive(Debug, Clone, Parser)]
#[command(name = "template-export")]
#[command(about = "Export template scenes to markup and style sheets")]
#[command(version)]
pub struct CliArgs {
    /// Editor configuration file (JSON)
    #[arg(long, env = "TEMPLATE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Override the scene's output format (square, portrait, story, landscape)
    #[arg(long, global = true, value_parser = parse_format)]
    pub format: Option<CanvasFormat>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// What to do with the scene
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the markup, style sheet and placeholders as JSON
    Export {
        /// Scene JSON file
        input: PathBuf,

        /// Print the full template record instead of the bare export
        #[arg(long)]
        record: bool,

        /// Template name for the record
        #[arg(long, default_value = "Untitled")]
        name: String,

        /// Template category for the record
        #[arg(long, default_value = "custom")]
        category: String,
    },

    /// Print the placeholder names, one per line
    Placeholders {
        /// Scene JSON file
        input: PathBuf,
    },

    /// Print element counts, format and placeholders as JSON
    Summary {
        /// Scene JSON file
        input: PathBuf,
    },
}

fn parse_format(s: &str) -> Result<CanvasFormat, String> {
    s.parse().map_err(|e: template_core::EditorError| e.to_string())
}

/// Overview of a scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Output format name.
    pub format: String,
    /// Logical canvas width.
    pub width: f32,
    /// Logical canvas height.
    pub height: f32,
    /// Total number of elements.
    pub elements: usize,
    /// Number of text elements.
    pub text: usize,
    /// Number of shape elements.
    pub shapes: usize,
    /// Number of image elements.
    pub images: usize,
    /// Whether the background is a gradient.
    pub gradient: bool,
    /// Placeholder names in export order.
    pub placeholders: Vec<String>,
}

/// Read an editor configuration file, or defaults when no path is given.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid JSON.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<EditorConfig> {
    let Some(path) = path else {
        return Ok(EditorConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = serde_json::from_str(&raw)
        .with_context(|| format!("invalid config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded editor config");
    Ok(config)
}

/// Load a scene file into a session.
///
/// Scene content is parsed tolerantly; only I/O failures are errors.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn open_session(
    input: &Path,
    config: EditorConfig,
    format: Option<CanvasFormat>,
) -> anyhow::Result<EditorSession> {
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read scene {}", input.display()))?;
    let mut session = EditorSession::load(&raw, config);
    if let Some(format) = format {
        tracing::debug!(format = format.as_str(), "overriding scene format");
        session.set_format(format);
    }
    Ok(session)
}

/// Summarize a scene.
#[must_use]
pub fn summarize(scene: &Scene) -> Summary {
    let size = scene.format.size();
    let count = |pred: fn(&ElementKind) -> bool| scene.elements().filter(|e| pred(&e.kind)).count();
    Summary {
        format: scene.format.as_str().to_string(),
        width: size.width,
        height: size.height,
        elements: scene.element_count(),
        text: count(|k| matches!(k, ElementKind::Text { .. })),
        shapes: count(|k| matches!(k, ElementKind::Shape { .. })),
        images: count(|k| matches!(k, ElementKind::Image { .. })),
        gradient: matches!(scene.background, Background::Gradient { .. }),
        placeholders: template_core::export::serialize(scene).placeholders,
    }
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.context("failed to serialize output")
}

/// Execute the parsed command and return what should be printed.
///
/// # Errors
///
/// Returns an error if the config or scene file cannot be read, or output
/// serialization fails.
pub fn run(args: &CliArgs) -> anyhow::Result<String> {
    let config = load_config(args.config.as_deref())?;

    match &args.command {
        Command::Export {
            input,
            record,
            name,
            category,
        } => {
            let session = open_session(input, config, args.format)?;
            if *record {
                to_json(&session.template_record(name, category), args.pretty)
            } else {
                to_json(&session.serialize(), args.pretty)
            }
        }
        Command::Placeholders { input } => {
            let session = open_session(input, config, args.format)?;
            Ok(session.serialize().placeholders.join("\n"))
        }
        Command::Summary { input } => {
            let session = open_session(input, config, args.format)?;
            to_json(&summarize(session.scene()), args.pretty)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_export_args() {
        let args = CliArgs::try_parse_from([
            "template-export",
            "--format",
            "story",
            "export",
            "scene.json",
            "--record",
            "--name",
            "Sale",
        ])
        .expect("parse");
        assert_eq!(args.format, Some(CanvasFormat::Story));
        match args.command {
            Command::Export {
                record,
                name,
                category,
                ..
            } => {
                assert!(record);
                assert_eq!(name, "Sale");
                assert_eq!(category, "custom");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_format_rejected() {
        let result =
            CliArgs::try_parse_from(["template-export", "--format", "banner", "summary", "x.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_default_config_without_path() {
        let config = load_config(None).expect("config");
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn test_summary_counts_kinds() {
        let mut scene = Scene::new(CanvasFormat::Portrait);
        scene.add_element(ElementKind::text("Hi {{name}}"), template_core::Geometry::default());
        scene.add_element(ElementKind::image(""), template_core::Geometry::default());
        let summary = summarize(&scene);
        assert_eq!(summary.format, "portrait");
        assert_eq!(summary.elements, 2);
        assert_eq!(summary.text, 1);
        assert_eq!(summary.images, 1);
        assert_eq!(summary.shapes, 0);
        assert_eq!(summary.placeholders, vec!["name", "image"]);
    }
}
