//! Line metrics policy.
//!
//! [CSS Inline Layout Level 3 § 4.1 Line Spacing: the line-height property](https://www.w3.org/TR/css-inline-3/#line-height-property)

use serde::Serialize;

use super::length::Px;

/// How a run spaces its lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextLine {
    /// Extra space between lines.
    LineSpacing(Px),
    /// A declared line height, with the font's natural line height it was
    /// resolved against.
    LineHeight {
        /// Natural line height of the font.
        font_line_height: Px,
        /// Declared line height.
        line_height: Px,
    },
}

fn round1(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

impl TextLine {
    /// Space added between consecutive lines.
    #[must_use]
    pub fn line_spacing(&self) -> f32 {
        match self {
            Self::LineSpacing(spacing) => spacing.0,
            Self::LineHeight {
                font_line_height,
                line_height,
            } => round1(line_height.0 - font_line_height.0),
        }
    }

    /// Half the extra space, placed above and below the text.
    #[must_use]
    pub fn vertical_padding(&self) -> f32 {
        match self {
            Self::LineSpacing(_) => 0.0,
            Self::LineHeight {
                font_line_height,
                line_height,
            } => round1((line_height.0 - font_line_height.0) / 2.0),
        }
    }

    /// The declared line height, for the `LineHeight` form only.
    #[must_use]
    pub const fn line_height(&self) -> Option<f32> {
        match self {
            Self::LineSpacing(_) => None,
            Self::LineHeight { line_height, .. } => Some(line_height.0),
        }
    }

    /// The same declared height against a different font line height.
    #[must_use]
    pub const fn with_font_line_height(self, font_line_height: f32) -> Self {
        match self {
            Self::LineSpacing(_) => self,
            Self::LineHeight { line_height, .. } => Self::LineHeight {
                font_line_height: Px(font_line_height),
                line_height,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_height_spacing_rounds_to_tenths() {
        let line = TextLine::LineHeight {
            font_line_height: Px(19.2),
            line_height: Px(24.0),
        };
        assert!((line.line_spacing() - 4.8).abs() < 1e-4);
        assert!((line.vertical_padding() - 2.4).abs() < 1e-4);
        assert_eq!(line.line_height(), Some(24.0));
        assert_eq!(TextLine::LineSpacing(Px(3.0)).line_height(), None);
    }
}
