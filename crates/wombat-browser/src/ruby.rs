//! Intrinsic size and rasterization of merged ruby attachments.
//!
//! [CSS Ruby Level 1 § 4 Ruby Layout](https://www.w3.org/TR/css-ruby-1/#ruby-layout)
//!
//! "The ruby annotation is centered over (or under) its base." The
//! attachment box holds two bands, one line of base text and one line of
//! annotation text, each as tall as its font's line height and as wide as
//! the wider of the two texts.
//!
//! The base baseline sits where the shaper puts it: the base keeps its
//! font's ascent and descent, and the extra height goes above, below or to
//! both sides per [`RubyPosition::distribute`]. The annotation band touches
//! the base glyph box on the annotation side.

use fontdue::Font;
use wombat_css::{
    AttributeValue, ColorValue, FontMetrics, RubyPosition, Size, StyleContainer,
};
use wombat_dom::AttributesMap;

use crate::image_cache::{AttachmentImage, AttachmentImageKey};

/// Resolved geometry of one ruby attachment.
#[derive(Debug, Clone, PartialEq)]
pub struct RubyLayout {
    /// Base text.
    pub base: String,
    /// Annotation text, if any.
    pub annotation: Option<String>,
    /// Where the annotation sits.
    pub position: RubyPosition,
    /// Font family of the base text, empty for the default.
    pub font_name: String,
    /// Font size of the base text.
    pub base_size: f32,
    /// Font size of the annotation text.
    pub annotation_size: f32,
    /// Color of the base text.
    pub base_color: ColorValue,
    /// Color of the annotation text.
    pub annotation_color: ColorValue,
    base_width: f32,
    annotation_width: f32,
    base_band: f32,
    annotation_band: f32,
    base_ascent: f32,
    base_descent: f32,
    annotation_ascent: f32,
    annotation_descent: f32,
}

fn attribute_f32(attributes: &AttributesMap, name: &str) -> Option<f32> {
    attributes
        .get(name)
        .and_then(|value| AttributeValue(value).as_f32())
        .filter(|value| value.is_finite() && *value > 0.0)
}

impl RubyLayout {
    /// Resolve the layout of a merged ruby attachment. Returns `None` when
    /// the attachment carries no `ruby-base`.
    #[must_use]
    pub fn from_attachment(
        attributes: &AttributesMap,
        style: &StyleContainer,
        metrics: &dyn FontMetrics,
        ruby_scale: f32,
    ) -> Option<Self> {
        let base = attributes.get("ruby-base")?.to_string();
        let annotation = attributes
            .get("ruby-text")
            .filter(|text| !text.is_empty())
            .map(str::to_string);

        let base_size =
            attribute_f32(attributes, "ruby-font-size").unwrap_or_else(|| style.font_size());
        let scale = attribute_f32(attributes, "ruby-scale").unwrap_or(ruby_scale);
        let annotation_size = attribute_f32(attributes, "ruby-annotation-font-size")
            .unwrap_or(base_size * scale);

        let base_color = style.foreground_color.unwrap_or(ColorValue::BLACK);
        let annotation_color = attributes
            .get("ruby-annotation-color")
            .and_then(|value| AttributeValue(value).as_color())
            .unwrap_or(base_color);

        let annotation_width = annotation
            .as_deref()
            .map_or(0.0, |text| metrics.text_width(text, annotation_size));
        let annotation_band = if annotation.is_some() {
            metrics.line_height(annotation_size)
        } else {
            0.0
        };

        Some(Self {
            base_width: metrics.text_width(&base, base_size),
            base_band: metrics.line_height(base_size),
            base_ascent: metrics.ascent(base_size),
            base_descent: metrics.descent(base_size),
            annotation_ascent: metrics.ascent(annotation_size),
            annotation_descent: metrics.descent(annotation_size),
            base,
            annotation,
            position: attributes
                .get("ruby-position")
                .and_then(RubyPosition::parse)
                .unwrap_or_default(),
            font_name: attributes.get("ruby-font-name").unwrap_or_default().to_string(),
            base_size,
            annotation_size,
            base_color,
            annotation_color,
            annotation_width,
            annotation_band,
        })
    }

    /// The attachment's intrinsic size.
    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(
            self.base_width.max(self.annotation_width),
            self.base_band + self.annotation_band,
        )
    }

    /// Image cache key for this ruby drawn at its intrinsic size.
    #[must_use]
    pub fn image_key(&self, content_hash: u64) -> AttachmentImageKey {
        AttachmentImageKey::new(content_hash, self.size(), &self.font_name, self.base_size)
    }

    /// Distance from the top of the box to the base baseline.
    ///
    /// Equals the ascent the shaper gives the ruby's placeholder, so the
    /// image and the surrounding text share one baseline.
    #[must_use]
    pub fn baseline(&self) -> f32 {
        let extra = (self.size().height - (self.base_ascent + self.base_descent)).max(0.0);
        let (above, _) = self.position.distribute(extra);
        above + self.base_ascent
    }

    /// Distance from the top of the box to the annotation baseline.
    #[must_use]
    pub fn annotation_baseline(&self) -> f32 {
        let glyphs = self.annotation_ascent + self.annotation_descent;
        let top = match self.position {
            RubyPosition::After => self.baseline() + self.base_descent,
            RubyPosition::Before | RubyPosition::InterCharacter | RubyPosition::Inline => {
                (self.baseline() - self.base_ascent - self.annotation_band).max(0.0)
            }
        };
        top + (self.annotation_band - glyphs) / 2.0 + self.annotation_ascent
    }
}

/// Draw `layout` with `font` into a transparent image.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn rasterize_ruby(layout: &RubyLayout, font: &Font, metrics: &dyn FontMetrics) -> AttachmentImage {
    let size = layout.size();
    let mut image =
        AttachmentImage::transparent(size.width.ceil() as u32, size.height.ceil() as u32);

    // STEP 1: Base text on the layout baseline.
    let band = TextBand {
        baseline: layout.baseline(),
        font_size: layout.base_size,
        color: layout.base_color,
    };
    band.draw(&mut image, font, metrics, &layout.base, size.width);

    // STEP 2: Annotation, centered over (or under) the base.
    if let Some(text) = &layout.annotation {
        let band = TextBand {
            baseline: layout.annotation_baseline(),
            font_size: layout.annotation_size,
            color: layout.annotation_color,
        };
        band.draw(&mut image, font, metrics, text, size.width);
    }
    image
}

struct TextBand {
    baseline: f32,
    font_size: f32,
    color: ColorValue,
}

impl TextBand {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    fn draw(
        &self,
        image: &mut AttachmentImage,
        font: &Font,
        metrics: &dyn FontMetrics,
        text: &str,
        box_width: f32,
    ) {
        let baseline = self.baseline;
        let mut cursor_x = (box_width - metrics.text_width(text, self.font_size)) / 2.0;

        for ch in text.chars().filter(|ch| !ch.is_control()) {
            let (glyph, bitmap) = font.rasterize(ch, self.font_size);
            // fontdue gives the bitmap's bottom edge relative to the baseline.
            let glyph_x = cursor_x.round() as i32 + glyph.xmin;
            let glyph_y = baseline.round() as i32 - glyph.ymin - glyph.height as i32;

            for gy in 0..glyph.height {
                for gx in 0..glyph.width {
                    let coverage = bitmap[gy * glyph.width + gx];
                    let px = glyph_x + gx as i32;
                    let py = glyph_y + gy as i32;
                    if coverage > 0 && px >= 0 && py >= 0 {
                        blend(image, px as u32, py as u32, self.color, coverage);
                    }
                }
            }
            cursor_x += glyph.advance_width;
        }
    }
}

/// Source-over composite of `color` at `coverage` onto one pixel.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn blend(image: &mut AttachmentImage, x: u32, y: u32, color: ColorValue, coverage: u8) {
    if x >= image.width || y >= image.height {
        return;
    }
    let start = (y as usize * image.width as usize + x as usize) * 4;
    let Some(dst) = image.pixels.get_mut(start..start + 4) else {
        return;
    };

    let src_a = f32::from(color.a) / 255.0 * f32::from(coverage) / 255.0;
    let dst_a = f32::from(dst[3]) / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        return;
    }
    let channel = |src: u8, dst: u8| {
        let mixed = (f32::from(src) * src_a + f32::from(dst) * dst_a * (1.0 - src_a)) / out_a;
        mixed.round().clamp(0.0, 255.0) as u8
    };
    dst[0] = channel(color.r, dst[0]);
    dst[1] = channel(color.g, dst[1]);
    dst[2] = channel(color.b, dst[2]);
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use wombat_css::layout::inline::shaped::placeholder_metrics;
    use wombat_css::{
        ApproximateFontMetrics, AttachmentId, FontDescriptor, PlaceholderInfo, RubyPlacement,
    };

    use super::*;

    fn ruby(pairs: &[(&str, &str)]) -> Option<RubyLayout> {
        let mut attributes = AttributesMap::new();
        for (name, value) in pairs {
            attributes.insert(*name, *value);
        }
        let style = StyleContainer::with_font(FontDescriptor::system(16.0));
        RubyLayout::from_attachment(&attributes, &style, &ApproximateFontMetrics, 0.5)
    }

    #[test]
    fn test_requires_base() {
        assert!(ruby(&[("ruby-text", "x")]).is_none());
    }

    #[test]
    fn test_size_with_annotation() {
        let layout = ruby(&[("ruby-base", "ab"), ("ruby-text", "abcd")]).unwrap();
        // Base 2 × 9.6 = 19.2; annotation at 8px: 4 × 4.8 = 19.2.
        let size = layout.size();
        assert!((size.width - 19.2).abs() < 1e-4);
        assert!((size.height - (19.2 + 9.6)).abs() < 1e-4);
    }

    #[test]
    fn test_size_without_annotation() {
        let layout = ruby(&[("ruby-base", "abc"), ("ruby-font-size", "10")]).unwrap();
        let size = layout.size();
        assert!((size.width - 18.0).abs() < 1e-4);
        assert!((size.height - 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_annotation_size_overrides_scale() {
        let layout = ruby(&[
            ("ruby-base", "a"),
            ("ruby-text", "b"),
            ("ruby-annotation-font-size", "12"),
        ])
        .unwrap();
        assert!((layout.annotation_size - 12.0).abs() < f32::EPSILON);
    }

    fn placeholder_ascent(layout: &RubyLayout) -> f32 {
        let placeholder = PlaceholderInfo {
            id: AttachmentId {
                ordinal: 0,
                content_hash: 0,
            },
            index: 0,
            tag: "ruby".to_string(),
            ruby: Some(RubyPlacement {
                position: layout.position,
                base_font_size: layout.base_size,
            }),
            style: Arc::new(StyleContainer::with_font(FontDescriptor::system(16.0))),
        };
        placeholder_metrics(&placeholder, layout.size(), &ApproximateFontMetrics).ascent
    }

    #[test]
    fn test_baseline_matches_shaper() {
        for position in ["over", "under", "inter-character", "inline"] {
            let layout = ruby(&[
                ("ruby-base", "漢字"),
                ("ruby-text", "かんじ"),
                ("ruby-position", position),
            ])
            .unwrap();
            assert!(
                (layout.baseline() - placeholder_ascent(&layout)).abs() < 1e-4,
                "{position}: {} vs {}",
                layout.baseline(),
                placeholder_ascent(&layout)
            );
        }
    }

    #[test]
    fn test_baseline_by_position() {
        let over = ruby(&[("ruby-base", "a"), ("ruby-text", "b")]).unwrap();
        // Annotation line 9.6 plus base leading 3.2 above a 12.8 ascent.
        assert!((over.baseline() - 25.6).abs() < 1e-4);
        assert!(over.annotation_baseline() < over.baseline() - over.base_ascent);

        let under = ruby(&[("ruby-base", "a"), ("ruby-text", "b"), ("ruby-position", "under")])
            .unwrap();
        assert!((under.baseline() - 12.8).abs() < 1e-4);
        assert!(under.annotation_baseline() > under.baseline() + under.base_descent);

        let inline = ruby(&[("ruby-base", "a"), ("ruby-text", "b"), ("ruby-position", "inline")])
            .unwrap();
        assert!((inline.baseline() - (6.4 + 12.8)).abs() < 1e-4);
    }

    #[test]
    fn test_blend_onto_transparent() {
        let mut image = AttachmentImage::transparent(2, 2);
        blend(&mut image, 1, 0, ColorValue::rgb(255, 0, 0), 255);
        assert_eq!(image.pixel(1, 0), Some([255, 0, 0, 255]));
        assert_eq!(image.pixel(0, 0), Some([0, 0, 0, 0]));
        blend(&mut image, 5, 5, ColorValue::rgb(255, 0, 0), 255);
        assert!(image.has_ink());
    }
}
