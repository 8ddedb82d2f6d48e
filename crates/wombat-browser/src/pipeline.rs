//! Synchronous document pipeline.
//!
//! Markup → [`ParsedNode`](wombat_dom::ParsedNode) → render tree → block
//! entries → inline runs → settled attachment frames, all on the calling
//! thread. Hosts that receive attachment sizes over time use
//! [`LayoutDriver`](crate::driver::LayoutDriver) instead.

use std::sync::Arc;

use serde::Serialize;
use wombat_css::layout::inline::run::run_items;
use wombat_css::{
    AttachmentFrame, AttachmentId, AttachmentLayoutEngine, AttachmentMetrics, AttributeValue,
    BlockElement, BlockEntry, BlockLayout, FontMetrics, FrameCalculator, FrameSnapshot,
    GlyphMetrics, InlineGroup, InlinePlan, PlaceholderInfo, Point, RenderTreeBuilder, RunItem,
    ShapedRun, Size, StyleContainer, compute_block_layout, group_contents,
};
use wombat_dom::AttributesMap;

use crate::ruby::{RubyLayout, rasterize_ruby};
use crate::session::RenderSession;

/// Layout of one block of the render tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedBlock {
    /// Entry indices from the root down to this block.
    pub path: Vec<usize>,
    /// Tag name.
    pub tag: String,
    /// Width available to the block's content.
    pub content_width: f32,
    /// Vertical spacing of the block's entries.
    pub layout: BlockLayout,
}

/// Layout of one inline group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedRun {
    /// Path of the block holding the group.
    pub block: Vec<usize>,
    /// Index of the group among the block's entries.
    pub entry: usize,
    /// How the group is rendered.
    pub plan: InlinePlan,
    /// Settled attachment frames.
    pub snapshot: FrameSnapshot,
    /// Number of lines.
    pub lines: usize,
    /// Height of the laid-out group.
    pub height: f32,
    /// Attachments with a rasterized image in the session cache.
    pub rasterized: Vec<AttachmentId>,
}

/// Everything [`render_document`] produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedDocument {
    /// Container width the document was laid out in.
    pub width: f32,
    /// The render tree.
    pub root: BlockElement,
    /// Every block in document order.
    pub blocks: Vec<RenderedBlock>,
    /// Every inline group in document order.
    pub runs: Vec<RenderedRun>,
}

impl RenderedDocument {
    /// Frame of `id` in whichever run holds it.
    #[must_use]
    pub fn frame(&self, id: AttachmentId) -> Option<AttachmentFrame> {
        self.runs
            .iter()
            .find_map(|run| run.snapshot.frames.get(&id).copied())
    }

    /// Every attachment frame in document order.
    #[must_use]
    pub fn frames(&self) -> Vec<(AttachmentId, AttachmentFrame)> {
        let mut frames: Vec<_> = self
            .runs
            .iter()
            .flat_map(|run| run.snapshot.frames.iter().map(|(id, frame)| (*id, *frame)))
            .collect();
        frames.sort_by_key(|(id, _)| *id);
        frames
    }
}

/// Intrinsic size of an attachment.
///
/// A merged ruby measures its base and annotation text. Anything else
/// takes its `width` and `height` attributes; a missing dimension is zero,
/// which leaves the attachment unmeasured.
#[must_use]
pub fn intrinsic_size(
    attributes: &AttributesMap,
    style: &StyleContainer,
    metrics: &dyn FontMetrics,
    ruby_scale: f32,
) -> Size {
    if let Some(ruby) = RubyLayout::from_attachment(attributes, style, metrics, ruby_scale) {
        return ruby.size();
    }
    let dimension = |name: &str| {
        attributes
            .get(name)
            .and_then(|value| AttributeValue(value).as_f32())
            .filter(|value| value.is_finite() && *value > 0.0)
            .unwrap_or(0.0)
    };
    Size::new(dimension("width"), dimension("height"))
}

/// Parse, build and lay out `html` in a container `width` wide.
#[must_use]
pub fn render_document(html: &str, width: f32, session: &RenderSession) -> RenderedDocument {
    // STEP 1: Parse through the session's cache.
    let parsed = session.parse(html);

    // STEP 2: Build the render tree.
    let builder = RenderTreeBuilder::new(
        session.registry(),
        session.styler(),
        session.style_context(),
    );
    let root = builder.build_root(&parsed, &session.initial_style());

    // STEP 3: Lay out every block and inline group.
    let mut renderer = DocumentRenderer {
        session,
        blocks: Vec::new(),
        runs: Vec::new(),
    };
    renderer.block(&root, &[], width);

    log::debug!(
        target: "wombat::pipeline",
        "rendered {} blocks and {} runs at width {width}",
        renderer.blocks.len(),
        renderer.runs.len()
    );
    RenderedDocument {
        width,
        root,
        blocks: renderer.blocks,
        runs: renderer.runs,
    }
}

/// Text-only runs have no placeholders to measure.
struct NoAttachments;

impl AttachmentMetrics for NoAttachments {
    fn glyph_metrics(&self, _placeholder: &PlaceholderInfo) -> GlyphMetrics {
        GlyphMetrics::default()
    }
}

struct DocumentRenderer<'a> {
    session: &'a RenderSession,
    blocks: Vec<RenderedBlock>,
    runs: Vec<RenderedRun>,
}

/// Width left for a block's content after its horizontal box edges.
fn content_width(style: &StyleContainer, width: f32) -> f32 {
    let edges = style.margin.left.0
        + style.margin.right.0
        + style.padding.left.0
        + style.padding.right.0
        + style.border.left.0
        + style.border.right.0;
    (width - edges).max(0.0)
}

impl DocumentRenderer<'_> {
    fn block(&mut self, block: &BlockElement, path: &[usize], width: f32) {
        let inner = content_width(&block.style, width);
        self.blocks.push(RenderedBlock {
            path: path.to_vec(),
            tag: block.tag.clone(),
            content_width: inner,
            layout: compute_block_layout(block, self.session.config().collapse_block_margins),
        });

        for (index, entry) in group_contents(&block.children).into_iter().enumerate() {
            match entry {
                BlockEntry::Block(child) => {
                    let mut child_path = path.to_vec();
                    child_path.push(index);
                    self.block(child, &child_path, inner);
                }
                BlockEntry::Inline(group) => {
                    let run = self.run(&group, path.to_vec(), index, inner);
                    self.runs.push(run);
                }
            }
        }
    }

    fn run(
        &self,
        group: &InlineGroup<'_>,
        block: Vec<usize>,
        entry: usize,
        width: f32,
    ) -> RenderedRun {
        let items = run_items(&group.elements, self.session.ids());
        let plan = InlinePlan::from_items(&items);
        let mut rendered = RenderedRun {
            block,
            entry,
            plan: InlinePlan::Empty,
            snapshot: FrameSnapshot::default(),
            lines: 0,
            height: 0.0,
            rasterized: Vec::new(),
        };

        match &plan {
            InlinePlan::Empty => {}
            InlinePlan::PlainText(items) => {
                let run = ShapedRun::build(items);
                let layout = FrameCalculator::new(self.session.shaper().as_ref()).measure(
                    &run,
                    width,
                    &NoAttachments,
                );
                rendered.lines = layout.lines.len();
                rendered.height = layout.height;
            }
            InlinePlan::Standalone(item) => {
                // STEP 1: A lone attachment is rendered directly at its
                // intrinsic size.
                if let Some((id, size)) = self.attachment(item, &mut rendered.rasterized) {
                    let _ = rendered.snapshot.frames.insert(
                        id,
                        AttachmentFrame {
                            size,
                            offset: Point::ZERO,
                        },
                    );
                    rendered.lines = 1;
                    rendered.height = size.height;
                }
            }
            InlinePlan::Attachments(items) => {
                // STEP 2: Mixed content goes through the attachment engine.
                let mut engine = AttachmentLayoutEngine::new(
                    Arc::clone(self.session.shaper()),
                    Arc::clone(self.session.debug_log()),
                );
                let _ = engine.set_run_items(items.clone());
                let _ = engine.set_container_size(Size::new(width, 0.0));
                for item in items {
                    if let Some((id, size)) = self.attachment(item, &mut rendered.rasterized) {
                        let _ = engine.report_attachment_size(id, size);
                    }
                }
                if let Some(request) = engine.measurement_request() {
                    let result = request.measure(self.session.shaper().as_ref());
                    rendered.lines = result.lines.len();
                    let _ = engine.apply_measurement(result);
                }
                rendered.snapshot = engine.snapshot();
                rendered.height = engine.content_height();
            }
        }
        rendered.plan = plan;
        rendered
    }

    /// Identity and intrinsic size of an attachment item, rasterizing
    /// rubies when the session has a font.
    fn attachment(
        &self,
        item: &RunItem,
        rasterized: &mut Vec<AttachmentId>,
    ) -> Option<(AttachmentId, Size)> {
        let RunItem::Attachment {
            id,
            attributes,
            style,
            ..
        } = item
        else {
            return None;
        };
        let config = self.session.config();
        let metrics = self.session.metrics();

        if let Some(ruby) = RubyLayout::from_attachment(attributes, style, metrics, config.ruby_scale)
        {
            if let Some(font) = self.session.font()
                && ruby.size().is_visible()
            {
                let key = ruby.image_key(id.content_hash);
                let _ = self
                    .session
                    .images()
                    .get_or_render(key, || rasterize_ruby(&ruby, font, metrics));
                rasterized.push(*id);
            }
            return Some((*id, ruby.size()));
        }
        Some((*id, intrinsic_size(attributes, style, metrics, config.ruby_scale)))
    }
}
