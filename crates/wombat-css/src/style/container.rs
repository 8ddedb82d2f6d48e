//! The cascaded presentation state of an element.

use serde::Serialize;

use super::color::ColorValue;
use super::font::{DEFAULT_FONT_SIZE, FontDescriptor};
use super::length::{BoxEdges, Px};
use super::line_break::LineBreakMode;
use super::text_line::TextLine;

/// Resolved presentation state.
///
/// [§ 7 Inheritance](https://www.w3.org/TR/css-cascade-4/#inheriting)
///
/// "Inheritance propagates property values from parent elements to their
/// children."
///
/// A child starts from its parent's container (see [`Self::inherit`]) and
/// applies its own tag and attribute styling on top. Containers attached to
/// render elements are shared behind `Arc` and never mutated afterwards;
/// cascading clones on write. Equality and hashing are structural.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct StyleContainer {
    /// Font, if one has been supplied or declared.
    pub font: Option<FontDescriptor>,
    /// Text color.
    pub foreground_color: Option<ColorValue>,
    /// Background color.
    pub background_color: Option<ColorValue>,
    /// Underline the text.
    pub underline: bool,
    /// Underline color; the text color when unset.
    pub underline_color: Option<ColorValue>,
    /// Extra advance after every character.
    pub letter_spacing: Option<Px>,
    /// How text wraps.
    pub line_break_mode: LineBreakMode,
    /// Line spacing policy.
    pub text_line: Option<TextLine>,
    /// Link target.
    pub link: Option<String>,
    /// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
    /// Not inherited.
    pub margin: BoxEdges<Px>,
    /// [§ 8.4 Padding properties](https://www.w3.org/TR/CSS2/box.html#padding-properties)
    /// Not inherited.
    pub padding: BoxEdges<Px>,
    /// [§ 8.5.1 Border width](https://www.w3.org/TR/CSS2/box.html#border-width-properties)
    /// Not inherited.
    pub border: BoxEdges<Px>,
}

impl StyleContainer {
    /// A container carrying only `font`.
    #[must_use]
    pub fn with_font(font: FontDescriptor) -> Self {
        Self {
            font: Some(font),
            ..Self::default()
        }
    }

    /// The starting point for a child: a copy with the non-inherited box
    /// properties reset.
    #[must_use]
    pub fn inherit(&self) -> Self {
        let mut child = self.clone();
        child.reset_box_edges();
        child
    }

    /// Reset margin, padding and border to zero.
    pub fn reset_box_edges(&mut self) {
        self.margin = BoxEdges::default();
        self.padding = BoxEdges::default();
        self.border = BoxEdges::default();
    }

    /// Font point size, or the default size when no font is set.
    #[must_use]
    pub fn font_size(&self) -> f32 {
        self.font
            .as_ref()
            .map_or(DEFAULT_FONT_SIZE, FontDescriptor::point_size)
    }

    /// Extra spacing between lines.
    #[must_use]
    pub fn line_spacing(&self) -> f32 {
        self.text_line.map_or(0.0, |line| line.line_spacing())
    }

    /// Whether the padding or border on the top edge is non-zero.
    #[must_use]
    pub fn seals_top(&self) -> bool {
        self.padding.top.0 != 0.0 || self.border.top.0 != 0.0
    }

    /// Whether the padding or border on the bottom edge is non-zero.
    #[must_use]
    pub fn seals_bottom(&self) -> bool {
        self.padding.bottom.0 != 0.0 || self.border.bottom.0 != 0.0
    }
}
