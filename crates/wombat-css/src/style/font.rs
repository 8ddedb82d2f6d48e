//! Font descriptor and font property parsing.
//!
//! [CSS Fonts Level 4](https://www.w3.org/TR/css-fonts-4/)

use serde::Serialize;

use super::declarations::CssDeclarations;
use super::length::{Length, Px, parse_size, size_keyword_factor};

/// Default font size in pixels when a caller supplies none.
pub const DEFAULT_FONT_SIZE: f32 = 16.0;

/// [§ 2.1 Generic font families](https://www.w3.org/TR/css-fonts-4/#generic-font-families)
pub const GENERIC_FAMILIES: [&str; 10] = [
    "serif",
    "sans-serif",
    "monospace",
    "cursive",
    "fantasy",
    "system-ui",
    "ui-serif",
    "ui-sans-serif",
    "ui-monospace",
    "ui-rounded",
];

/// [§ 3.2 Font weight](https://www.w3.org/TR/css-fonts-4/#font-weight-prop)
/// "normal: Same as 400."
pub const NORMAL_WEIGHT: u16 = 400;
/// "bold: Same as 700."
pub const BOLD_WEIGHT: u16 = 700;

/// The font properties the renderer consumes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FontDescriptor {
    /// Family name, or a generic family.
    pub family: String,
    /// Point size in pixels.
    pub size: Px,
    /// Numeric weight, 1-1000.
    pub weight: u16,
    /// Italic or oblique.
    pub italic: bool,
}

impl FontDescriptor {
    /// Regular-weight upright font.
    #[must_use]
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size: Px(size),
            weight: NORMAL_WEIGHT,
            italic: false,
        }
    }

    /// The system font at `size`.
    #[must_use]
    pub fn system(size: f32) -> Self {
        Self::new("system-ui", size)
    }

    /// Point size in pixels.
    #[must_use]
    pub const fn point_size(&self) -> f32 {
        self.size.0
    }

    /// Whether the weight counts as bold.
    #[must_use]
    pub const fn is_bold(&self) -> bool {
        self.weight >= 600
    }

    /// Same family and flags at a new size.
    #[must_use]
    pub fn with_size(&self, size: f32) -> Self {
        Self {
            size: Px(size),
            ..self.clone()
        }
    }
}

/// [§ 3.1 Font family](https://www.w3.org/TR/css-fonts-4/#font-family-prop)
///
/// The first family of a comma-separated list, unquoted.
#[must_use]
pub fn parse_font_family(value: &str) -> Option<String> {
    value
        .split(',')
        .map(|family| family.trim().trim_matches(|c| c == '"' || c == '\''))
        .find(|family| !family.is_empty())
        .map(str::to_string)
}

/// [§ 3.2 Font weight](https://www.w3.org/TR/css-fonts-4/#font-weight-prop)
#[must_use]
pub fn parse_font_weight(value: &str, current: u16) -> Option<u16> {
    match value.trim().to_ascii_lowercase().as_str() {
        "normal" => Some(NORMAL_WEIGHT),
        "bold" => Some(BOLD_WEIGHT),
        // Simplified from the relative-weight table of § 3.2.1.
        "bolder" => Some(current.saturating_add(300).min(900)),
        "lighter" => Some(current.saturating_sub(300).max(100)),
        other => other.parse::<u16>().ok().filter(|w| (1..=1000).contains(w)),
    }
}

/// Components of the `font` shorthand the renderer uses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontShorthand {
    /// Resolved font size.
    pub size: Option<f32>,
    /// First family name.
    pub family: Option<String>,
    /// Weight from the leading keywords.
    pub weight: Option<u16>,
    /// `italic` or `oblique` among the leading keywords.
    pub italic: bool,
}

fn is_size_component(component: &str) -> bool {
    let size = component.split('/').next().unwrap_or(component);
    if size_keyword_factor(size).is_some() {
        return true;
    }
    Length::parse(size).is_some_and(|length| !length.is_unitless())
}

/// [§ 3.7 Shorthand font property](https://www.w3.org/TR/css-fonts-4/#font-prop)
///
/// "[ <font-style> || <font-variant-css2> || <font-weight> ||
/// <font-width-css3> ]? <font-size> [ / <line-height> ]? <font-family>"
///
/// The size is the first component with a unit or a size keyword; a
/// `/line-height` suffix on it is ignored. Everything after it is the family
/// list.
#[must_use]
pub fn parse_font_shorthand(value: &str, base: f32) -> Option<FontShorthand> {
    let lower = value.trim().to_ascii_lowercase();
    let components: Vec<&str> = lower.split_ascii_whitespace().collect();
    let size_index = components.iter().position(|c| is_size_component(c))?;

    let mut shorthand = FontShorthand::default();
    for component in &components[..size_index] {
        match *component {
            "italic" | "oblique" => shorthand.italic = true,
            other => {
                if let Some(weight) = parse_font_weight(other, NORMAL_WEIGHT)
                    && other != "normal"
                {
                    shorthand.weight = Some(weight);
                }
            }
        }
    }

    let size = components[size_index]
        .split('/')
        .next()
        .unwrap_or_default();
    shorthand.size = Some(parse_size(size, base));

    // Recover original casing for the family from the source text.
    let family_start = value
        .to_ascii_lowercase()
        .find(components[size_index])
        .map(|i| i + components[size_index].len());
    shorthand.family = family_start
        .and_then(|start| value.get(start..))
        .and_then(parse_font_family);
    Some(shorthand)
}

/// Resolve the font declared in `declarations` on top of `current`.
///
/// The `font` shorthand applies first; `font-size`, `font-family`,
/// `font-weight` and `font-style` then override it. Returns `None` when no
/// font property is present.
#[must_use]
pub fn resolve_font(
    declarations: &CssDeclarations,
    current: Option<&FontDescriptor>,
) -> Option<FontDescriptor> {
    const PROPERTIES: [&str; 5] = ["font", "font-size", "font-family", "font-weight", "font-style"];
    if !PROPERTIES.iter().any(|p| declarations.get(p).is_some()) {
        return None;
    }
    let mut font = current
        .cloned()
        .unwrap_or_else(|| FontDescriptor::system(DEFAULT_FONT_SIZE));
    let base = font.point_size();

    if let Some(shorthand) = declarations
        .get("font")
        .and_then(|value| parse_font_shorthand(value, base))
    {
        if let Some(size) = shorthand.size {
            font.size = Px(size);
        }
        if let Some(family) = shorthand.family {
            font.family = family;
        }
        if let Some(weight) = shorthand.weight {
            font.weight = weight;
        }
        font.italic |= shorthand.italic;
    }
    if let Some(size) = declarations.get("font-size") {
        font.size = Px(parse_size(size, base));
    }
    if let Some(family) = declarations.get("font-family").and_then(parse_font_family) {
        font.family = family;
    }
    if let Some(weight) = declarations
        .get("font-weight")
        .and_then(|value| parse_font_weight(value, font.weight))
    {
        font.weight = weight;
    }
    if let Some(style) = declarations.get("font-style") {
        font.italic = matches!(style.trim(), "italic" | "oblique");
    }
    Some(font)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorthand_with_line_height_and_families() {
        let font = parse_font_shorthand("italic bold 12px/1.5 'Helvetica Neue', Arial, sans-serif", 16.0)
            .expect("shorthand");
        assert_eq!(font.size, Some(12.0));
        assert_eq!(font.family.as_deref(), Some("Helvetica Neue"));
        assert_eq!(font.weight, Some(BOLD_WEIGHT));
        assert!(font.italic);
    }

    #[test]
    fn test_shorthand_without_size_is_rejected() {
        assert_eq!(parse_font_shorthand("bold serif", 16.0), None);
    }
}
