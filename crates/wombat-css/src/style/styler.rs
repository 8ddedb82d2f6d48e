//! Attribute styling: applies an element's `style` attribute to its
//! container.

use wombat_dom::AttributesMap;

use super::attribute::AttributeValue;
use super::color::ColorValue;
use super::declarations::{CssDeclarations, DeclarationCache};
use super::font::resolve_font;
use super::length::{BoxEdges, Length, Px};
use super::line_break::LineBreakMode;
use super::text_line::TextLine;
use super::container::StyleContainer;
use crate::layout::inline::metrics::FontMetrics;

/// Shared inputs for styling one document.
#[derive(Clone, Copy)]
pub struct StyleContext<'a> {
    /// Cache for `style="..."` strings.
    pub declarations: &'a DeclarationCache,
    /// Metrics used to resolve `line-height`.
    pub metrics: &'a dyn FontMetrics,
    /// Ruby annotation size as a fraction of the base size.
    pub ruby_scale: f32,
}

/// Applies attribute-driven styles before the tag's own styles.
pub trait AttributeStyler: Send + Sync {
    /// Mutate `style` from `attributes`.
    fn apply(&self, attributes: &AttributesMap, style: &mut StyleContainer, context: &StyleContext<'_>);
}

/// Styles from the `style` attribute.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAttributeStyler;

impl AttributeStyler for DefaultAttributeStyler {
    fn apply(&self, attributes: &AttributesMap, style: &mut StyleContainer, context: &StyleContext<'_>) {
        let Some(declarations) = attributes
            .get("style")
            .and_then(|text| AttributeValue(text).as_declarations(context.declarations))
        else {
            return;
        };
        apply_declarations(&declarations, style, context.metrics);
    }
}

/// Apply `declarations` to `style`.
pub fn apply_declarations(
    declarations: &CssDeclarations,
    style: &mut StyleContainer,
    metrics: &dyn FontMetrics,
) {
    // STEP 1: Colors.
    if let Some(color) = declarations.get("color").and_then(ColorValue::parse) {
        style.foreground_color = Some(color);
    }
    if let Some(color) = declarations
        .get("background-color")
        .or_else(|| declarations.get("background"))
        .and_then(ColorValue::parse)
    {
        style.background_color = Some(color);
    }

    // STEP 2: Font. A declared line height keeps its value but is re-based
    // on the new font's natural line height.
    if let Some(font) = resolve_font(declarations, style.font.as_ref()) {
        let natural = metrics.line_height(font.point_size());
        style.text_line = style
            .text_line
            .map(|line| line.with_font_line_height(natural));
        style.font = Some(font);
    }

    // STEP 3: Line height.
    // [§ 4.1](https://www.w3.org/TR/css-inline-3/#line-height-property)
    //
    // "<number>: The used value of the property is this number multiplied by
    // the element's computed font size."
    let font_size = style.font_size();
    let natural = metrics.line_height(font_size);
    let line_height = declarations.get("line-height").and_then(|value| {
        match value.trim().to_ascii_lowercase().as_str() {
            "normal" | "inherit" | "initial" | "unset" => Some(natural),
            other => Length::parse(other).map(|length| match length {
                Length::Number(multiplier) => multiplier * font_size,
                sized => sized.resolve(font_size),
            }),
        }
    });
    if let Some(line_height) = line_height {
        style.text_line = Some(TextLine::LineHeight {
            font_line_height: Px(natural),
            line_height: Px(line_height),
        });
    } else if let Some(spacing) = declarations.get("line-spacing").and_then(Length::parse) {
        style.text_line = Some(TextLine::LineSpacing(Px(spacing.resolve(font_size))));
    }

    // STEP 4: Wrapping.
    if let Some(value) = declarations.get("word-break") {
        style.line_break_mode = LineBreakMode::from_word_break(value, style.line_break_mode);
    }

    // STEP 5: Text decoration and spacing.
    if let Some(value) = declarations.get("letter-spacing") {
        style.letter_spacing = Length::parse(value).map(|length| Px(length.resolve(font_size)));
    }
    if let Some(value) = declarations
        .get("text-decoration-line")
        .or_else(|| declarations.get("text-decoration"))
    {
        let value = value.to_ascii_lowercase();
        style.underline = value.split_ascii_whitespace().any(|part| part == "underline");
        if let Some(color) = value.split_ascii_whitespace().find_map(ColorValue::from_named) {
            style.underline_color = Some(color);
        }
    }
    if let Some(color) = declarations
        .get("text-decoration-color")
        .and_then(ColorValue::parse)
    {
        style.underline_color = Some(color);
    }

    // STEP 6: Box edges.
    apply_edges(declarations, "margin", "", &mut style.margin, font_size);
    apply_edges(declarations, "padding", "", &mut style.padding, font_size);
    apply_edges(declarations, "border", "", &mut style.border, font_size);
    apply_edges(declarations, "border", "-width", &mut style.border, font_size);
}

/// Apply `{prefix}{suffix}` as a shorthand, then the per-side longhands
/// `{prefix}-top{suffix}` etc.
fn apply_edges(
    declarations: &CssDeclarations,
    prefix: &str,
    suffix: &str,
    edges: &mut BoxEdges<Px>,
    base: f32,
) {
    if let Some(value) = declarations.get(&format!("{prefix}{suffix}")) {
        if prefix == "border" && suffix.is_empty() {
            // `border: solid 1px red` sets one width on every side.
            if let Some(width) = value.split_ascii_whitespace().find_map(Length::parse) {
                *edges = BoxEdges::uniform(Px(width.resolve(base)));
            }
        } else if let Some(parsed) = BoxEdges::parse_shorthand(value, base) {
            *edges = parsed;
        }
    }
    let sides: [(&str, &mut Px); 4] = [
        ("top", &mut edges.top),
        ("right", &mut edges.right),
        ("bottom", &mut edges.bottom),
        ("left", &mut edges.left),
    ];
    for (side, slot) in sides {
        let Some(value) = declarations.get(&format!("{prefix}-{side}{suffix}")) else {
            continue;
        };
        if let Some(length) = value.split_ascii_whitespace().find_map(Length::parse) {
            *slot = Px(length.resolve(base));
        }
    }
}
