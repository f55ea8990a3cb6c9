//! Scene export to template markup.
//!
//! Produces an HTML fragment, a style sheet and the list of placeholder
//! tokens the template expects to be filled in. The output depends only on
//! the scene, so exporting an unchanged scene twice gives identical bytes.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Background, CanvasFormat, Element, ElementKind, Scene, ShapeKind};

/// Placeholder token contributed by image elements without a source.
pub const IMAGE_PLACEHOLDER: &str = "image";

static PLACEHOLDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("valid regex"));

/// Exported template output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateExport {
    /// HTML fragment with one absolutely positioned box per element.
    pub markup: String,
    /// Style sheet for the root container and shared element classes.
    pub style_sheet: String,
    /// Distinct placeholder names, in order of first appearance.
    pub placeholders: Vec<String>,
}

/// Everything the host persists for a template record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecord {
    /// Display name.
    pub name: String,
    /// Category label.
    pub category: String,
    /// Output format.
    pub format: CanvasFormat,
    /// HTML fragment.
    pub markup: String,
    /// Style sheet.
    pub style_sheet: String,
    /// Placeholder names.
    pub placeholders: Vec<String>,
    /// Distinct colors used, in paint order.
    pub default_colors: Vec<String>,
    /// Distinct font families used, in paint order.
    pub default_fonts: Vec<String>,
}

impl TemplateRecord {
    /// Build a record for `scene` under the given name and category.
    #[must_use]
    pub fn from_scene(name: impl Into<String>, category: impl Into<String>, scene: &Scene) -> Self {
        let TemplateExport {
            markup,
            style_sheet,
            placeholders,
        } = serialize(scene);
        Self {
            name: name.into(),
            category: category.into(),
            format: scene.format,
            markup,
            style_sheet,
            placeholders,
            default_colors: default_colors(scene),
            default_fonts: default_fonts(scene),
        }
    }
}

/// Export a scene.
#[must_use]
pub fn serialize(scene: &Scene) -> TemplateExport {
    let ordered = scene.ordered_by_z();

    let mut markup = String::with_capacity(256 + ordered.len() * 256);
    let _ = write!(
        markup,
        "<div class=\"tpl-root\" data-format=\"{}\">",
        scene.format.as_str()
    );
    for element in &ordered {
        markup.push('\n');
        render_element(&mut markup, element);
    }
    markup.push_str("\n</div>");

    TemplateExport {
        markup,
        style_sheet: style_sheet(scene),
        placeholders: placeholders(ordered.iter().copied()),
    }
}

/// Distinct placeholder names used by `elements`, in order of first appearance.
///
/// Text contributes every `{{name}}` token; an image without a source
/// contributes [`IMAGE_PLACEHOLDER`].
pub fn placeholders<'a>(elements: impl IntoIterator<Item = &'a Element>) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    let mut push = |name: &str| {
        if !found.iter().any(|f| f == name) {
            found.push(name.to_string());
        }
    };

    for element in elements {
        match &element.kind {
            ElementKind::Text { content, .. } => {
                for caps in PLACEHOLDER_PATTERN.captures_iter(content) {
                    if let Some(name) = caps.get(1) {
                        push(name.as_str());
                    }
                }
            }
            ElementKind::Image { source, .. } if source.is_empty() => push(IMAGE_PLACEHOLDER),
            ElementKind::Image { .. } | ElementKind::Shape { .. } => {}
        }
    }
    found
}

fn style_sheet(scene: &Scene) -> String {
    let size = scene.format.size();
    let background = match &scene.background {
        Background::Solid { color } => escape_css(color),
        Background::Gradient { start, end } => format!(
            "linear-gradient(135deg, {}, {})",
            escape_css(start),
            escape_css(end)
        ),
    };

    let mut css = String::with_capacity(512);
    let _ = writeln!(
        css,
        ".tpl-root{{position:relative;width:{}px;height:{}px;overflow:hidden;background:{background};}}",
        size.width, size.height,
    );
    css.push_str(".tpl-el{box-sizing:border-box;overflow:hidden;}\n");
    css.push_str(".tpl-text{white-space:pre-wrap;overflow-wrap:break-word;line-height:1.2;}\n");
    css.push_str(".tpl-image{display:block;object-fit:cover;}\n");
    css.push_str(
        ".tpl-placeholder{display:flex;align-items:center;justify-content:center;\
         background:rgba(255,255,255,0.08);border:2px dashed rgba(255,255,255,0.35);}\n",
    );
    css
}

/// Render a single element as an absolutely positioned box.
fn render_element(out: &mut String, element: &Element) {
    let g = &element.geometry;
    let mut style = format!(
        "position:absolute;left:{}px;top:{}px;width:{}px;height:{}px;opacity:{};z-index:{};",
        g.x, g.y, g.width, g.height, element.opacity, element.z_index,
    );

    match &element.kind {
        ElementKind::Text {
            content,
            font_size,
            font_family,
            font_weight,
            color,
            text_align,
        } => {
            let _ = write!(
                style,
                "font-family:{}, sans-serif;font-size:{font_size}px;font-weight:{};color:{};text-align:{};",
                escape_css(font_family),
                escape_css(font_weight),
                escape_css(color),
                text_align.as_str(),
            );
            let _ = write!(
                out,
                "<div class=\"tpl-el tpl-text\" data-id=\"{}\" style=\"{}\">{}</div>",
                element.id,
                escape_xml(&style),
                escape_xml(content),
            );
        }

        ElementKind::Shape {
            shape_kind,
            color,
            border_radius,
        } => {
            let color = escape_css(color);
            match shape_kind {
                ShapeKind::Rect => {
                    let _ = write!(style, "background:{color};border-radius:{border_radius}px;");
                }
                ShapeKind::Circle => {
                    let _ = write!(style, "background:{color};border-radius:50%;");
                }
                ShapeKind::Line => {
                    let _ = write!(style, "border-top:4px solid {color};");
                }
            }
            let _ = write!(
                out,
                "<div class=\"tpl-el tpl-shape tpl-shape-{}\" data-id=\"{}\" style=\"{}\"></div>",
                shape_name(*shape_kind),
                element.id,
                escape_xml(&style),
            );
        }

        ElementKind::Image {
            source,
            border_radius,
        } => {
            let _ = write!(style, "border-radius:{border_radius}px;");
            if source.is_empty() {
                let _ = write!(
                    out,
                    "<div class=\"tpl-el tpl-image tpl-placeholder\" data-id=\"{}\" data-placeholder=\"{IMAGE_PLACEHOLDER}\" style=\"{}\">{{{{{IMAGE_PLACEHOLDER}}}}}</div>",
                    element.id,
                    escape_xml(&style),
                );
            } else {
                let _ = write!(
                    out,
                    "<img class=\"tpl-el tpl-image\" data-id=\"{}\" src=\"{}\" alt=\"\" style=\"{}\"/>",
                    element.id,
                    escape_xml(source),
                    escape_xml(&style),
                );
            }
        }
    }
}

const fn shape_name(kind: ShapeKind) -> &'static str {
    match kind {
        ShapeKind::Rect => "rect",
        ShapeKind::Circle => "circle",
        ShapeKind::Line => "line",
    }
}

fn default_colors(scene: &Scene) -> Vec<String> {
    let mut colors: Vec<String> = Vec::new();
    let mut push = |c: &str| {
        if !c.is_empty() && !colors.iter().any(|x| x == c) {
            colors.push(c.to_string());
        }
    };
    match &scene.background {
        Background::Solid { color } => push(color),
        Background::Gradient { start, end } => {
            push(start);
            push(end);
        }
    }
    for element in scene.ordered_by_z() {
        match &element.kind {
            ElementKind::Text { color, .. } | ElementKind::Shape { color, .. } => push(color),
            ElementKind::Image { .. } => {}
        }
    }
    colors
}

fn default_fonts(scene: &Scene) -> Vec<String> {
    let mut fonts: Vec<String> = Vec::new();
    for element in scene.ordered_by_z() {
        if let ElementKind::Text { font_family, .. } = &element.kind {
            if !fonts.iter().any(|f| f == font_family) {
                fonts.push(font_family.clone());
            }
        }
    }
    fonts
}

/// Escape special XML characters.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Strip characters that would end a CSS declaration or rule early.
fn escape_css(input: &str) -> String {
    input
        .chars()
        .filter(|c| !matches!(c, ';' | '{' | '}' | '<' | '>'))
        .collect()
}
