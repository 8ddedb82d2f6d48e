//! Shaped runs and the shaping engine seam.
//!
//! A [`ShapedRun`] is the engine-ready form of a run item sequence: one
//! character buffer with styled spans, where every attachment occupies a
//! single U+FFFC OBJECT REPLACEMENT CHARACTER. A shaping engine asks an
//! [`AttachmentMetrics`] callback for the ascent, descent and width of each
//! placeholder instead of using font glyph metrics, so images and ruby take
//! part in line height and baseline computation.

use std::ops::Range;
use std::sync::Arc;

use serde::Serialize;
use unicode_linebreak::{BreakOpportunity, linebreaks};

use super::metrics::{ApproximateFontMetrics, FontMetrics, is_zero_width};
use super::run::{AttachmentId, RunItem, RunLineMetrics};
use crate::layout::geometry::{Point, Size};
use crate::style::{AttributeValue, RubyPosition, StyleContainer};
use wombat_common::whitespace::NBSP;
use wombat_dom::AttributesMap;

/// U+FFFC OBJECT REPLACEMENT CHARACTER, the placeholder for an attachment.
pub const OBJECT_REPLACEMENT: char = '\u{FFFC}';

/// A character range sharing one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledSpan {
    /// Character indices.
    pub range: Range<usize>,
    /// Style of the range.
    pub style: Arc<StyleContainer>,
}

/// Placement data for a ruby attachment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RubyPlacement {
    /// Where the annotation sits.
    pub position: RubyPosition,
    /// Font size of the base text.
    pub base_font_size: f32,
}

impl RubyPlacement {
    /// Placement for an attachment, if it is a ruby.
    #[must_use]
    pub fn from_attachment(
        attributes: &AttributesMap,
        style: &StyleContainer,
    ) -> Option<Self> {
        if !attributes.contains("ruby-base") {
            return None;
        }
        let position = attributes
            .get("ruby-position")
            .and_then(RubyPosition::parse)
            .unwrap_or_default();
        let base_font_size = attributes
            .get("ruby-font-size")
            .and_then(|value| AttributeValue(value).as_f32())
            .filter(|size| size.is_finite() && *size > 0.0)
            .unwrap_or_else(|| style.font_size());
        Some(Self {
            position,
            base_font_size,
        })
    }
}

/// An attachment placeholder inside a [`ShapedRun`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderInfo {
    /// Attachment identity.
    pub id: AttachmentId,
    /// Character index of the placeholder.
    pub index: usize,
    /// Attachment tag.
    pub tag: String,
    /// Set for ruby attachments.
    pub ruby: Option<RubyPlacement>,
    /// Attachment style.
    pub style: Arc<StyleContainer>,
}

impl PlaceholderInfo {
    /// The one-character range of the placeholder.
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.index..self.index + 1
    }
}

/// An immutable, engine-ready run.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedRun {
    chars: Vec<char>,
    spans: Vec<StyledSpan>,
    attachments: Vec<PlaceholderInfo>,
    line_metrics: RunLineMetrics,
}

impl ShapedRun {
    /// Build from prepared run items.
    ///
    /// Line breaks become `'\n'` and attachments U+FFFC.
    #[must_use]
    pub fn build(items: &[RunItem]) -> Self {
        let mut chars = Vec::new();
        let mut spans: Vec<StyledSpan> = Vec::with_capacity(items.len());
        let mut attachments = Vec::new();
        for item in items {
            let start = chars.len();
            match item {
                RunItem::Text { text, .. } => chars.extend(text.chars()),
                RunItem::LineBreak { .. } => chars.push('\n'),
                RunItem::Attachment {
                    id,
                    tag,
                    attributes,
                    style,
                } => {
                    chars.push(OBJECT_REPLACEMENT);
                    attachments.push(PlaceholderInfo {
                        id: *id,
                        index: start,
                        tag: tag.clone(),
                        ruby: RubyPlacement::from_attachment(attributes, style),
                        style: Arc::clone(style),
                    });
                }
            }
            let end = chars.len();
            if end == start {
                continue;
            }
            let style = item.style();
            match spans.last_mut() {
                Some(last) if !item.is_attachment() && last.style == *style && last.range.end == start => {
                    last.range.end = end;
                }
                _ => spans.push(StyledSpan {
                    range: start..end,
                    style: Arc::clone(style),
                }),
            }
        }
        Self {
            chars,
            spans,
            attachments,
            line_metrics: RunLineMetrics::of(items),
        }
    }

    /// The characters.
    #[must_use]
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// The characters as a string.
    #[must_use]
    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    /// Number of characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Whether the run has no characters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Styled spans in order, covering every character.
    #[must_use]
    pub fn spans(&self) -> &[StyledSpan] {
        &self.spans
    }

    /// Attachment placeholders in character order.
    #[must_use]
    pub fn attachments(&self) -> &[PlaceholderInfo] {
        &self.attachments
    }

    /// Line spacing and vertical padding of the run.
    #[must_use]
    pub const fn line_metrics(&self) -> RunLineMetrics {
        self.line_metrics
    }

    /// Extra spacing between lines.
    #[must_use]
    pub const fn line_spacing(&self) -> f32 {
        self.line_metrics.line_spacing
    }

    /// Space above the first line and below the last.
    #[must_use]
    pub const fn vertical_padding(&self) -> f32 {
        self.line_metrics.vertical_padding
    }

    /// `(id, range)` for every attachment, in character order.
    #[must_use]
    pub fn attachment_ranges(&self) -> Vec<(AttachmentId, Range<usize>)> {
        self.attachments
            .iter()
            .map(|placeholder| (placeholder.id, placeholder.range()))
            .collect()
    }

    /// The placeholder at character `index`.
    #[must_use]
    pub fn placeholder_at(&self, index: usize) -> Option<&PlaceholderInfo> {
        self.attachments
            .binary_search_by_key(&index, |placeholder| placeholder.index)
            .ok()
            .map(|position| &self.attachments[position])
    }

    /// The placeholder of `id`.
    #[must_use]
    pub fn placeholder(&self, id: AttachmentId) -> Option<&PlaceholderInfo> {
        self.attachments.iter().find(|placeholder| placeholder.id == id)
    }

    /// The style of character `index`.
    #[must_use]
    pub fn style_at(&self, index: usize) -> Option<&Arc<StyleContainer>> {
        let position = self.spans.partition_point(|span| span.range.end <= index);
        self.spans
            .get(position)
            .filter(|span| span.range.contains(&index))
            .map(|span| &span.style)
    }
}

/// Vertical and horizontal extent of one glyph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GlyphMetrics {
    /// Height above the baseline.
    pub ascent: f32,
    /// Depth below the baseline.
    pub descent: f32,
    /// Advance.
    pub width: f32,
}

/// Supplies glyph metrics for attachment placeholders.
pub trait AttachmentMetrics {
    /// Metrics of `placeholder`'s glyph.
    fn glyph_metrics(&self, placeholder: &PlaceholderInfo) -> GlyphMetrics;
}

/// Glyph metrics of an attachment of intrinsic `size`.
///
/// A plain attachment stands on the baseline: its whole height is ascent.
/// A ruby attachment keeps the base text's ascent and descent and puts the
/// extra height of the annotation above, below or on both sides according
/// to its position. A size that is not visible yet measures as zero.
#[must_use]
pub fn placeholder_metrics(
    placeholder: &PlaceholderInfo,
    size: Size,
    fonts: &dyn FontMetrics,
) -> GlyphMetrics {
    if !size.is_visible() {
        return GlyphMetrics::default();
    }
    match placeholder.ruby {
        None => GlyphMetrics {
            ascent: size.height,
            descent: 0.0,
            width: size.width,
        },
        Some(ruby) => {
            let base_ascent = fonts.ascent(ruby.base_font_size);
            let base_descent = fonts.descent(ruby.base_font_size);
            let extra = (size.height - (base_ascent + base_descent)).max(0.0);
            let (above, below) = ruby.position.distribute(extra);
            GlyphMetrics {
                ascent: base_ascent + above,
                descent: base_descent + below,
                width: size.width,
            }
        }
    }
}

/// Geometry of one laid-out line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineGeometry {
    /// Character indices on the line, trailing whitespace included.
    pub range: Range<usize>,
    /// Left end of the baseline.
    pub origin: Point,
    /// Largest ascent on the line.
    pub ascent: f32,
    /// Largest descent on the line.
    pub descent: f32,
    /// Extra space below the descent.
    pub leading: f32,
    /// Advance of the line without trailing whitespace.
    pub width: f32,
    /// Pen position before each character of `range`, plus the end.
    pub offsets: Vec<f32>,
}

impl LineGeometry {
    /// Ascent plus descent.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.ascent + self.descent
    }
}

/// Line breaking and per-index offsets for a shaped run.
pub trait ShapingEngine: Send + Sync {
    /// Break `run` into lines no wider than `width` where possible.
    fn layout_lines(
        &self,
        run: &ShapedRun,
        width: f32,
        attachments: &dyn AttachmentMetrics,
    ) -> Vec<LineGeometry>;

    /// Horizontal offset of character `index` from the start of `line`.
    fn offset_for_index(&self, line: &LineGeometry, index: usize) -> f32 {
        let Some(last) = line.offsets.len().checked_sub(1) else {
            return 0.0;
        };
        line.offsets[index.saturating_sub(line.range.start).min(last)]
    }

    /// Metrics of the engine's fonts.
    fn font_metrics(&self) -> &dyn FontMetrics;
}

#[derive(Debug, Clone, Copy, Default)]
struct CharMetrics {
    width: f32,
    ascent: f32,
    descent: f32,
    line_height: f32,
}

/// Whitespace that may hang past the end of a line.
fn hangs(ch: char) -> bool {
    ch.is_whitespace() && ch != NBSP
}

/// Greedy first-fit line breaker over
/// [UAX #14](https://www.unicode.org/reports/tr14/) break opportunities.
///
/// Characters advance by [`FontMetrics::text_width`] plus letter spacing.
/// A word wider than the line is broken where it overflows.
#[derive(Debug, Clone, Default)]
pub struct GreedyShaper<M = ApproximateFontMetrics> {
    metrics: M,
}

impl<M: FontMetrics> GreedyShaper<M> {
    /// Create a shaper over `metrics`.
    #[must_use]
    pub const fn new(metrics: M) -> Self {
        Self { metrics }
    }

    fn measure_chars(&self, run: &ShapedRun, attachments: &dyn AttachmentMetrics) -> Vec<CharMetrics> {
        let chars = run.chars();
        let mut measured = vec![CharMetrics::default(); chars.len()];
        let mut buffer = [0u8; 4];
        for span in run.spans() {
            let size = span.style.font_size();
            let letter_spacing = span.style.letter_spacing.map_or(0.0, |px| px.0);
            let text_metrics = CharMetrics {
                width: 0.0,
                ascent: self.metrics.ascent(size),
                descent: self.metrics.descent(size),
                line_height: self.metrics.line_height(size),
            };
            for index in span.range.clone() {
                let ch = chars[index];
                measured[index] = if ch == OBJECT_REPLACEMENT
                    && let Some(placeholder) = run.placeholder_at(index)
                {
                    let glyph = attachments.glyph_metrics(placeholder);
                    CharMetrics {
                        width: glyph.width,
                        ascent: glyph.ascent,
                        descent: glyph.descent,
                        line_height: glyph.ascent + glyph.descent,
                    }
                } else if ch == '\n' || is_zero_width(ch) {
                    text_metrics
                } else {
                    CharMetrics {
                        width: self.metrics.text_width(ch.encode_utf8(&mut buffer), size)
                            + letter_spacing,
                        ..text_metrics
                    }
                };
            }
        }
        measured
    }
}

/// Break opportunities before each character index (`0..=len`).
fn break_opportunities(chars: &[char]) -> (Vec<bool>, Vec<bool>) {
    let text: String = chars.iter().collect();
    let mut byte_to_char = vec![0usize; text.len() + 1];
    for (char_index, (byte, _)) in text.char_indices().enumerate() {
        byte_to_char[byte] = char_index;
    }
    byte_to_char[text.len()] = chars.len();

    let mut allowed = vec![false; chars.len() + 1];
    let mut mandatory = vec![false; chars.len() + 1];
    for (byte, opportunity) in linebreaks(&text) {
        let index = byte_to_char[byte];
        match opportunity {
            BreakOpportunity::Mandatory => mandatory[index] = true,
            BreakOpportunity::Allowed => allowed[index] = true,
        }
    }
    (allowed, mandatory)
}

impl<M: FontMetrics> ShapingEngine for GreedyShaper<M> {
    fn layout_lines(
        &self,
        run: &ShapedRun,
        width: f32,
        attachments: &dyn AttachmentMetrics,
    ) -> Vec<LineGeometry> {
        let chars = run.chars();
        let count = chars.len();

        // STEP 1: Measure every character.
        let measured = self.measure_chars(run, attachments);

        // STEP 2: Find break opportunities.
        let (allowed, mandatory) = break_opportunities(chars);

        // STEP 3: Fill lines greedily.
        let mut ranges: Vec<Range<usize>> = Vec::new();
        let mut start = 0;
        let mut pen = 0.0_f32;
        let mut last_break: Option<usize> = None;
        for index in 0..count {
            if index > start && mandatory[index] {
                ranges.push(start..index);
                start = index;
                pen = 0.0;
                last_break = None;
            }
            if index > start && allowed[index] {
                last_break = Some(index);
            }
            let advance = measured[index].width;
            if index > start && !hangs(chars[index]) && pen + advance > width {
                // Break at the last opportunity, or right here when the word
                // alone is wider than the line.
                let at = last_break.unwrap_or(index);
                ranges.push(start..at);
                start = at;
                pen = measured[at..index].iter().map(|m| m.width).sum();
                last_break = ((at + 1)..=index).rev().find(|&i| allowed[i]);
            }
            pen += advance;
        }
        ranges.push(start..count);

        // STEP 4: Line metrics. Origins stack lines without extra spacing.
        let fallback = {
            let size = run
                .spans()
                .first()
                .map_or(crate::style::DEFAULT_FONT_SIZE, |span| span.style.font_size());
            CharMetrics {
                width: 0.0,
                ascent: self.metrics.ascent(size),
                descent: self.metrics.descent(size),
                line_height: self.metrics.line_height(size),
            }
        };
        let mut lines = Vec::with_capacity(ranges.len());
        let mut top = 0.0_f32;
        for range in ranges {
            let on_line = &measured[range.clone()];
            let (ascent, descent, line_height) = if on_line.is_empty() {
                let metrics = measured
                    .get(range.start.min(count.saturating_sub(1)))
                    .copied()
                    .unwrap_or(fallback);
                (metrics.ascent, metrics.descent, metrics.line_height)
            } else {
                on_line.iter().fold((0.0_f32, 0.0_f32, 0.0_f32), |(a, d, h), m| {
                    (a.max(m.ascent), d.max(m.descent), h.max(m.line_height))
                })
            };
            let leading = (line_height - (ascent + descent)).max(0.0);

            let mut offsets = Vec::with_capacity(on_line.len() + 1);
            let mut x = 0.0_f32;
            offsets.push(x);
            for metrics in on_line {
                x += metrics.width;
                offsets.push(x);
            }
            let visible_end = range.start
                + chars[range.clone()]
                    .iter()
                    .rposition(|&ch| !hangs(ch))
                    .map_or(0, |i| i + 1);
            let line_width = offsets[visible_end - range.start];

            let baseline = top + ascent;
            top = baseline + descent + leading;
            lines.push(LineGeometry {
                range,
                origin: Point::new(0.0, baseline),
                ascent,
                descent,
                leading,
                width: line_width,
                offsets,
            });
        }
        lines
    }

    fn font_metrics(&self) -> &dyn FontMetrics {
        &self.metrics
    }
}
