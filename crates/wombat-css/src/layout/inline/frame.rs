//! Line reflow and attachment frame calculation.

use std::ops::Range;

use serde::Serialize;

use super::run::{AttachmentId, RunLineMetrics};
use super::shaped::{AttachmentMetrics, LineGeometry, ShapedRun, ShapingEngine};
use crate::layout::geometry::Rect;

/// Narrowest width a run is laid out at. Zero, negative and NaN widths
/// are clamped up to it.
pub const MIN_CONTAINER_WIDTH: f32 = 1.0;

/// `width` clamped to [`MIN_CONTAINER_WIDTH`].
#[must_use]
pub fn effective_width(width: f32) -> f32 {
    if width.is_nan() || width < MIN_CONTAINER_WIDTH {
        MIN_CONTAINER_WIDTH
    } else {
        width
    }
}

/// Restack line origins.
///
/// The first baseline sits at the run's vertical padding plus the first
/// line's ascent. Every later baseline is the previous baseline plus the
/// previous descent and leading, the run's line spacing and its own ascent.
pub fn reflow(lines: &mut [LineGeometry], metrics: RunLineMetrics) {
    let mut previous: Option<(f32, f32)> = None;
    for line in lines {
        line.origin.y = match previous {
            None => metrics.vertical_padding + line.ascent,
            Some((baseline, below)) => baseline + below + metrics.line_spacing + line.ascent,
        };
        previous = Some((line.origin.y, line.descent + line.leading));
    }
}

/// The rectangle of one attachment range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeFrame {
    /// The attachment.
    pub id: AttachmentId,
    /// Its character range.
    pub range: Range<usize>,
    /// `y` is the line's baseline; `height` is the line's ascent plus
    /// descent.
    pub rect: Rect,
    /// Ascent of the line.
    pub ascent: f32,
    /// Index of the line holding the range.
    pub line_index: usize,
}

/// Lines and frames of one measurement.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameLayout {
    /// Reflowed lines.
    pub lines: Vec<LineGeometry>,
    /// One frame per range that intersects a line, ordered by range start.
    pub frames: Vec<RangeFrame>,
    /// Bottom of the last line plus the run's vertical padding.
    pub height: f32,
}

/// Computes reflowed lines and attachment frames with a shaping engine.
pub struct FrameCalculator<'a, E: ?Sized> {
    engine: &'a E,
}

impl<'a, E: ShapingEngine + ?Sized> FrameCalculator<'a, E> {
    /// Create a calculator over `engine`.
    #[must_use]
    pub const fn new(engine: &'a E) -> Self {
        Self { engine }
    }

    /// Break `run` at `width` and reflow the result.
    #[must_use]
    pub fn lines(
        &self,
        run: &ShapedRun,
        width: f32,
        attachments: &dyn AttachmentMetrics,
    ) -> Vec<LineGeometry> {
        let mut lines = self
            .engine
            .layout_lines(run, effective_width(width), attachments);
        reflow(&mut lines, run.line_metrics());
        lines
    }

    /// Frames of `ranges` over `lines`.
    ///
    /// Ranges are visited in order of their start with one forward cursor
    /// over the lines, so the result does not depend on the input order. A
    /// range spanning several lines is framed on the first line it
    /// intersects; empty intersections are skipped.
    #[must_use]
    pub fn frames(
        &self,
        lines: &[LineGeometry],
        ranges: &[(AttachmentId, Range<usize>)],
    ) -> Vec<RangeFrame> {
        let mut sorted: Vec<&(AttachmentId, Range<usize>)> = ranges.iter().collect();
        sorted.sort_by_key(|(id, range)| (range.start, range.end, *id));

        let mut frames = Vec::with_capacity(sorted.len());
        let mut cursor = 0;
        for (id, range) in sorted {
            while cursor < lines.len() && lines[cursor].range.end <= range.start {
                cursor += 1;
            }
            let found = lines[cursor..]
                .iter()
                .enumerate()
                .take_while(|(_, line)| line.range.start < range.end)
                .find_map(|(offset, line)| {
                    let start = line.range.start.max(range.start);
                    let end = line.range.end.min(range.end);
                    (start < end).then_some((cursor + offset, line, start, end))
                });
            let Some((line_index, line, start, end)) = found else {
                continue;
            };
            let left = self.engine.offset_for_index(line, start);
            let right = self.engine.offset_for_index(line, end);
            frames.push(RangeFrame {
                id: *id,
                range: range.clone(),
                rect: Rect::new(
                    line.origin.x + left,
                    line.origin.y,
                    right - left,
                    line.ascent + line.descent,
                ),
                ascent: line.ascent,
                line_index,
            });
        }
        frames
    }

    /// Lines, frames of every attachment in `run`, and total height.
    #[must_use]
    pub fn measure(
        &self,
        run: &ShapedRun,
        width: f32,
        attachments: &dyn AttachmentMetrics,
    ) -> FrameLayout {
        let lines = self.lines(run, width, attachments);
        let frames = self.frames(&lines, &run.attachment_ranges());
        let height = lines.last().map_or(0.0, |line| {
            line.origin.y + line.descent + line.leading + run.vertical_padding()
        });
        FrameLayout {
            lines,
            frames,
            height,
        }
    }
}
