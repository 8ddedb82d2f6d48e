//! Reactive attachment layout engine.
//!
//! The engine owns the current run, the container size and the intrinsic
//! size reported for every attachment. Any change to these inputs bumps a
//! generation counter. A measurement is a pure function of a
//! [`MeasurementRequest`]; its result is applied only if its generation is
//! still current, so a host may measure off-thread and discard late
//! results. Listeners hear about a new [`FrameSnapshot`] only when some
//! frame actually changed.
//!
//! ```text
//!            set_run_items (no attachments)
//!   ┌──────┐ ◄──────────────────────────────────────────┐
//!   │ Idle │                                            │
//!   └──┬───┘ set_run_items                              │
//!      ▼                                                │
//!   ┌─────────────────────┐ container size and sizes   ┌┴──────────┐
//!   │ AwaitingMeasurement │ ─────────────────────────► │ Measuring │
//!   └─────────────────────┘                            └──┬────────┘
//!                                    apply_measurement    ▼
//!                                                      ┌─────────┐
//!                                  any input change ◄─ │ Settled │
//!                                                      └─────────┘
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::Serialize;
use strum_macros::Display;
use wombat_common::debug_log::DebugLog;

use super::frame::FrameCalculator;
use super::metrics::FontMetrics;
use super::run::{AttachmentId, RunItem};
use super::shaped::{
    AttachmentMetrics, GlyphMetrics, GreedyShaper, LineGeometry, PlaceholderInfo, ShapedRun,
    ShapingEngine, placeholder_metrics,
};
use crate::error::LayoutError;
use crate::layout::geometry::{Point, Size};

/// Lifecycle of an [`AttachmentLayoutEngine`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, Serialize)]
pub enum EngineState {
    /// No attachments to lay out.
    #[default]
    Idle,
    /// Waiting for a container size or the first attachment size.
    AwaitingMeasurement,
    /// Inputs are complete and a measurement is due.
    Measuring,
    /// Frames match the current inputs.
    Settled,
}

/// Size and position of one attachment, relative to the run's top-left.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AttachmentFrame {
    /// Reported intrinsic size.
    pub size: Size,
    /// Top-left corner.
    pub offset: Point,
}

impl AttachmentFrame {
    /// The frame of an attachment that has not been measured yet.
    pub const ZERO: Self = Self {
        size: Size::ZERO,
        offset: Point::ZERO,
    };
}

/// Frames published to listeners.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameSnapshot {
    /// Increments every time a frame changes.
    pub revision: u64,
    /// Frame of every attachment in the run.
    pub frames: BTreeMap<AttachmentId, AttachmentFrame>,
}

/// Everything a measurement needs, detached from the engine.
#[derive(Debug, Clone)]
pub struct MeasurementRequest {
    /// Input generation the request was taken at.
    pub generation: u64,
    /// The run.
    pub run: Arc<ShapedRun>,
    /// Container width.
    pub width: f32,
    /// Reported attachment sizes.
    pub sizes: FxHashMap<AttachmentId, Size>,
}

/// Output of [`MeasurementRequest::measure`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementResult {
    /// Generation of the request.
    pub generation: u64,
    /// Frame of every attachment in the run.
    pub frames: BTreeMap<AttachmentId, AttachmentFrame>,
    /// Reflowed lines.
    pub lines: Vec<LineGeometry>,
    /// Height of the laid-out run.
    pub height: f32,
}

struct ReportedSizes<'a> {
    sizes: &'a FxHashMap<AttachmentId, Size>,
    fonts: &'a dyn FontMetrics,
}

impl ReportedSizes<'_> {
    fn size(&self, id: AttachmentId) -> Size {
        self.sizes.get(&id).copied().unwrap_or(Size::ZERO)
    }
}

impl AttachmentMetrics for ReportedSizes<'_> {
    fn glyph_metrics(&self, placeholder: &PlaceholderInfo) -> GlyphMetrics {
        placeholder_metrics(placeholder, self.size(placeholder.id), self.fonts)
    }
}

impl MeasurementRequest {
    /// Lay out the run and place every attachment.
    ///
    /// A plain attachment is centered vertically in its line slot, the line
    /// box grown by the run's vertical padding on both sides. A ruby
    /// attachment stands on the baseline with its annotation above or
    /// below, as its glyph metrics describe.
    #[must_use]
    pub fn measure<E: ShapingEngine + ?Sized>(&self, engine: &E) -> MeasurementResult {
        let fonts = engine.font_metrics();
        let sizes = ReportedSizes {
            sizes: &self.sizes,
            fonts,
        };
        let layout = FrameCalculator::new(engine).measure(&self.run, self.width, &sizes);

        let mut frames: BTreeMap<AttachmentId, AttachmentFrame> = self
            .run
            .attachments()
            .iter()
            .map(|placeholder| (placeholder.id, AttachmentFrame::ZERO))
            .collect();
        for range_frame in &layout.frames {
            let Some(placeholder) = self.run.placeholder(range_frame.id) else {
                continue;
            };
            let size = sizes.size(placeholder.id);
            if !size.is_visible() {
                continue;
            }
            let rect = range_frame.rect;
            let y = if placeholder.ruby.is_some() {
                rect.y - sizes.glyph_metrics(placeholder).ascent
            } else {
                let padding = self.run.vertical_padding();
                let slot_top = rect.y - range_frame.ascent - padding;
                let slot = rect.height + 2.0 * padding;
                slot_top + (slot - size.height) / 2.0
            };
            let _ = frames.insert(
                placeholder.id,
                AttachmentFrame {
                    size,
                    offset: Point::new(rect.x, y),
                },
            );
        }

        MeasurementResult {
            generation: self.generation,
            frames,
            lines: layout.lines,
            height: layout.height,
        }
    }
}

/// Callback receiving every published snapshot.
pub type FrameListener = Box<dyn Fn(&FrameSnapshot) + Send + Sync>;

/// Positions attachments inside one run of inline content.
pub struct AttachmentLayoutEngine<E: ?Sized = GreedyShaper> {
    shaper: Arc<E>,
    items: Vec<RunItem>,
    run: Option<Arc<ShapedRun>>,
    container: Option<Size>,
    sizes: FxHashMap<AttachmentId, Size>,
    frames: BTreeMap<AttachmentId, AttachmentFrame>,
    height: f32,
    generation: u64,
    revision: u64,
    state: EngineState,
    listeners: Vec<FrameListener>,
    debug: Arc<DebugLog>,
}

impl<E: ShapingEngine + ?Sized> AttachmentLayoutEngine<E> {
    /// Create an idle engine.
    #[must_use]
    pub fn new(shaper: Arc<E>, debug: Arc<DebugLog>) -> Self {
        Self {
            shaper,
            items: Vec::new(),
            run: None,
            container: None,
            sizes: FxHashMap::default(),
            frames: BTreeMap::new(),
            height: 0.0,
            generation: 0,
            revision: 0,
            state: EngineState::Idle,
            listeners: Vec::new(),
            debug,
        }
    }

    /// The shaping engine.
    #[must_use]
    pub const fn shaper(&self) -> &Arc<E> {
        &self.shaper
    }

    /// Replace the run.
    ///
    /// Identical items are ignored. Sizes and frames of attachments that
    /// survive the change are kept; new attachments start with a zero
    /// frame. Returns whether anything changed.
    pub fn set_run_items(&mut self, items: Vec<RunItem>) -> bool {
        if items == self.items {
            return false;
        }
        self.generation += 1;

        if !items.iter().any(RunItem::is_attachment) {
            self.debug.record("engine", || {
                format!("gen {}: run has no attachments", self.generation)
            });
            self.items = items;
            self.run = None;
            self.sizes.clear();
            self.height = 0.0;
            self.state = EngineState::Idle;
            if !self.frames.is_empty() {
                self.frames.clear();
                self.publish();
            }
            return true;
        }

        let run = ShapedRun::build(&items);
        let frames: BTreeMap<AttachmentId, AttachmentFrame> = run
            .attachments()
            .iter()
            .map(|placeholder| {
                let frame = self
                    .frames
                    .get(&placeholder.id)
                    .copied()
                    .unwrap_or(AttachmentFrame::ZERO);
                (placeholder.id, frame)
            })
            .collect();
        self.sizes.retain(|id, _| frames.contains_key(id));
        self.debug.record("engine", || {
            format!(
                "gen {}: run of {} chars with {} attachments, {} sizes kept",
                self.generation,
                run.len(),
                frames.len(),
                self.sizes.len()
            )
        });
        let changed = frames != self.frames;
        self.frames = frames;
        self.items = items;
        self.run = Some(Arc::new(run));
        self.update_state();
        if changed {
            self.publish();
        }
        true
    }

    /// Record the container size. Returns whether it changed.
    pub fn set_container_size(&mut self, size: Size) -> bool {
        if self.container == Some(size) {
            return false;
        }
        self.container = Some(size);
        self.generation += 1;
        self.debug.record("engine", || {
            format!(
                "gen {}: container {}x{}",
                self.generation, size.width, size.height
            )
        });
        self.update_state();
        true
    }

    /// Record the intrinsic size of an attachment.
    ///
    /// Unknown ids, sizes of one pixel or less and unchanged sizes are
    /// ignored. Returns whether the size was recorded.
    pub fn report_attachment_size(&mut self, id: AttachmentId, size: Size) -> bool {
        if !self.frames.contains_key(&id) {
            self.debug
                .record("engine", || format!("ignored size for unknown attachment {id}"));
            return false;
        }
        if !size.is_visible() || self.sizes.get(&id) == Some(&size) {
            return false;
        }
        let _ = self.sizes.insert(id, size);
        self.generation += 1;
        self.debug.record("engine", || {
            format!(
                "gen {}: attachment {id} is {}x{}",
                self.generation, size.width, size.height
            )
        });
        self.update_state();
        true
    }

    fn update_state(&mut self) {
        self.state = if self.run.is_none() {
            EngineState::Idle
        } else if self.container.is_some() && !self.sizes.is_empty() {
            EngineState::Measuring
        } else {
            EngineState::AwaitingMeasurement
        };
    }

    /// A snapshot of the inputs, when a measurement is due.
    #[must_use]
    pub fn measurement_request(&self) -> Option<MeasurementRequest> {
        if self.state != EngineState::Measuring {
            return None;
        }
        Some(MeasurementRequest {
            generation: self.generation,
            run: Arc::clone(self.run.as_ref()?),
            width: self.container?.width,
            sizes: self.sizes.clone(),
        })
    }

    /// Apply a measurement result.
    ///
    /// Results from an older generation are dropped. Listeners are notified
    /// only when a frame differs from the current one. Returns whether the
    /// frames changed.
    pub fn apply_measurement(&mut self, result: MeasurementResult) -> bool {
        if result.generation != self.generation {
            self.debug.record("measure", || {
                format!(
                    "dropped stale result of gen {} (current {})",
                    result.generation, self.generation
                )
            });
            return false;
        }
        self.state = EngineState::Settled;
        self.height = result.height;
        if result.frames == self.frames {
            self.debug.record("measure", || {
                format!("gen {}: frames unchanged", result.generation)
            });
            return false;
        }
        self.frames = result.frames;
        self.publish();
        true
    }

    /// Measure synchronously on the calling thread if a measurement is due.
    /// Returns whether the frames changed.
    pub fn measure_now(&mut self) -> bool {
        match self.measurement_request() {
            Some(request) => {
                let result = request.measure(self.shaper.as_ref());
                self.apply_measurement(result)
            }
            None => false,
        }
    }

    fn publish(&mut self) {
        self.revision += 1;
        let snapshot = self.snapshot();
        log::debug!(
            target: "wombat::engine",
            "revision {} with {} frames",
            snapshot.revision,
            snapshot.frames.len()
        );
        for listener in &self.listeners {
            listener(&snapshot);
        }
    }

    /// Register a listener for published snapshots.
    pub fn subscribe(&mut self, listener: impl Fn(&FrameSnapshot) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Reported size of `id`, zero when unknown or unmeasured.
    #[must_use]
    pub fn size_for(&self, id: AttachmentId) -> Size {
        self.frames.get(&id).map_or(Size::ZERO, |frame| frame.size)
    }

    /// Offset of `id`, zero when unknown or unmeasured.
    #[must_use]
    pub fn offset_for(&self, id: AttachmentId) -> Point {
        self.frames.get(&id).map_or(Point::ZERO, |frame| frame.offset)
    }

    /// Frame of `id`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownAttachment`] if `id` is not in the current run.
    pub fn frame(&self, id: AttachmentId) -> Result<AttachmentFrame, LayoutError> {
        self.frames
            .get(&id)
            .copied()
            .ok_or(LayoutError::UnknownAttachment(id))
    }

    /// The current frames.
    #[must_use]
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            revision: self.revision,
            frames: self.frames.clone(),
        }
    }

    /// Ids of the attachments in the run, in document order.
    #[must_use]
    pub fn attachment_ids(&self) -> Vec<AttachmentId> {
        self.frames.keys().copied().collect()
    }

    /// The current run.
    #[must_use]
    pub const fn run(&self) -> Option<&Arc<ShapedRun>> {
        self.run.as_ref()
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn state(&self) -> EngineState {
        self.state
    }

    /// Input generation.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Published snapshot count.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Height of the last applied measurement.
    #[must_use]
    pub const fn content_height(&self) -> f32 {
        self.height
    }
}
