//! Font metrics backed by fontdue for accurate text measurement during layout.
//!
//! [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
//!
//! "CSS assumes that every font has font metrics that specify a
//! characteristic height above the baseline and a depth below it."

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fontdue::{Font, FontSettings};
use wombat_css::layout::inline::metrics::is_zero_width;
use wombat_css::{ApproximateFontMetrics, FontMetrics};

use crate::error::RenderError;

/// Common system font paths, tried in order.
pub const FONT_SEARCH_PATHS: &[&str] = &[
    // macOS
    "/System/Library/Fonts/Helvetica.ttc",
    "/System/Library/Fonts/SFNS.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    // Linux
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    // Windows
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Load a font file.
///
/// # Errors
///
/// Returns [`RenderError::FontIo`] when the file cannot be read and
/// [`RenderError::InvalidFont`] when fontdue rejects its contents.
pub fn load_font(path: impl AsRef<Path>) -> Result<Font, RenderError> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|source| RenderError::FontIo {
        path: path.to_path_buf(),
        source,
    })?;
    Font::from_bytes(data, FontSettings::default()).map_err(|reason| RenderError::InvalidFont {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    })
}

/// The first loadable font among [`FONT_SEARCH_PATHS`].
#[must_use]
pub fn find_system_font() -> Option<(PathBuf, Font)> {
    for path in FONT_SEARCH_PATHS {
        if let Ok(data) = std::fs::read(path)
            && let Ok(font) = Font::from_bytes(data, FontSettings::default())
        {
            log::debug!(target: "wombat::font", "loaded system font {path}");
            return Some((PathBuf::from(path), font));
        }
    }
    log::debug!(
        target: "wombat::font",
        "no system font among {} search paths",
        FONT_SEARCH_PATHS.len()
    );
    None
}

/// Font metrics implementation backed by fontdue's per-glyph metrics.
///
/// This implementation queries fontdue for exact per-character advance
/// widths. It uses `Font::metrics()` (not `Font::rasterize()`) to avoid the
/// cost of bitmap generation when only measurements are needed.
#[derive(Clone)]
pub struct FontdueFontMetrics {
    font: Arc<Font>,
}

impl fmt::Debug for FontdueFontMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontdueFontMetrics")
            .field("glyphs", &self.font.glyph_count())
            .finish_non_exhaustive()
    }
}

impl FontdueFontMetrics {
    /// Create a new font metrics provider from a fontdue Font.
    #[must_use]
    pub const fn new(font: Arc<Font>) -> Self {
        Self { font }
    }

    /// The underlying font.
    #[must_use]
    pub const fn font(&self) -> &Arc<Font> {
        &self.font
    }
}

impl FontMetrics for FontdueFontMetrics {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        // Sum per-character advance widths, the same advance the ruby
        // rasterizer moves its pen by.
        text.chars()
            .filter(|&ch| !ch.is_control() && !is_zero_width(ch))
            .map(|ch| self.font.metrics(ch, font_size).advance_width)
            .sum()
    }

    fn line_height(&self, font_size: f32) -> f32 {
        // [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading)
        //
        // "The initial value of 'line-height' is 'normal'. We recommend a used
        // value for 'normal' between 1.0 and 1.2."
        font_size * 1.2
    }

    fn ascent(&self, font_size: f32) -> f32 {
        self.font
            .horizontal_line_metrics(font_size)
            .map_or(font_size * 0.8, |line| line.ascent)
    }

    fn descent(&self, font_size: f32) -> f32 {
        // fontdue reports descent below the baseline as a negative number.
        self.font
            .horizontal_line_metrics(font_size)
            .map_or(font_size * 0.2, |line| -line.descent)
    }
}

/// The metrics a session lays out with: a loaded font when there is one,
/// fixed ratios otherwise.
#[derive(Debug, Clone)]
pub enum DocumentFontMetrics {
    /// Fixed-ratio approximation.
    Approximate(ApproximateFontMetrics),
    /// A loaded font.
    Fontdue(FontdueFontMetrics),
}

impl Default for DocumentFontMetrics {
    fn default() -> Self {
        Self::Approximate(ApproximateFontMetrics)
    }
}

impl DocumentFontMetrics {
    /// Metrics for `font`, or the approximation when there is none.
    #[must_use]
    pub fn for_font(font: Option<&Arc<Font>>) -> Self {
        font.map_or_else(Self::default, |font| {
            Self::Fontdue(FontdueFontMetrics::new(Arc::clone(font)))
        })
    }

    fn inner(&self) -> &dyn FontMetrics {
        match self {
            Self::Approximate(metrics) => metrics,
            Self::Fontdue(metrics) => metrics,
        }
    }
}

impl FontMetrics for DocumentFontMetrics {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        self.inner().text_width(text, font_size)
    }

    fn line_height(&self, font_size: f32) -> f32 {
        self.inner().line_height(font_size)
    }

    fn ascent(&self, font_size: f32) -> f32 {
        self.inner().ascent(font_size)
    }

    fn descent(&self, font_size: f32) -> f32 {
        self.inner().descent(font_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_font_is_io_error() {
        let result = load_font("/nonexistent/wombat/font.ttf");
        assert!(matches!(result, Err(RenderError::FontIo { .. })));
    }

    #[test]
    fn test_default_metrics_are_approximate() {
        let metrics = DocumentFontMetrics::for_font(None);
        assert!(matches!(metrics, DocumentFontMetrics::Approximate(_)));
        assert!((metrics.text_width("abc", 10.0) - 18.0).abs() < 1e-4);
        assert!((metrics.ascent(10.0) - 8.0).abs() < 1e-4);
        assert!((metrics.descent(10.0) - 2.0).abs() < 1e-4);
    }
}
