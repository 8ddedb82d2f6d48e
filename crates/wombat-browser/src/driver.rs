//! Asynchronous, debounced layout driver.
//!
//! A host view reports attachment sizes one at a time as its children
//! measure themselves, often several per frame. The driver owns an
//! [`AttachmentLayoutEngine`] on a tokio task, folds a burst of events into
//! one measurement after a quiet period, and runs the measurement on the
//! blocking pool so line breaking never stalls the runtime.
//!
//! Only the newest measurement matters. When inputs change while a
//! measurement is in flight, its handle is replaced; a result that still
//! arrives carries an old generation and the engine drops it.
//!
//! Settled frames are published on a [`watch`] channel, so readers always
//! see the latest snapshot and never a backlog.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, sleep_until};
use wombat_css::{
    AttachmentId, AttachmentLayoutEngine, FrameSnapshot, MeasurementResult, RunItem,
    ShapingEngine, Size,
};

use crate::error::RenderError;

/// An input change for the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutEvent {
    /// Replace the run.
    SetRunItems(Vec<RunItem>),
    /// The container was resized.
    ContainerSize(Size),
    /// An attachment measured itself.
    AttachmentSize(AttachmentId, Size),
}

/// Handle to a running layout task.
pub struct LayoutDriver {
    events: mpsc::UnboundedSender<LayoutEvent>,
    snapshots: watch::Receiver<FrameSnapshot>,
    measurements: Arc<AtomicU64>,
    task: JoinHandle<()>,
}

impl LayoutDriver {
    /// Move `engine` onto a new task on the current tokio runtime.
    ///
    /// Must be called from within a runtime.
    #[must_use]
    pub fn spawn<E>(mut engine: AttachmentLayoutEngine<E>, debounce: Duration) -> Self
    where
        E: ShapingEngine + 'static,
    {
        let (events, receiver) = mpsc::unbounded_channel();
        let (publisher, snapshots) = watch::channel(engine.snapshot());
        engine.subscribe(move |snapshot| {
            let _ = publisher.send_replace(snapshot.clone());
        });
        let measurements = Arc::new(AtomicU64::new(0));
        let task = tokio::spawn(run_driver(
            engine,
            receiver,
            debounce,
            Arc::clone(&measurements),
        ));
        Self {
            events,
            snapshots,
            measurements,
            task,
        }
    }

    /// Queue an event.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::DriverClosed`] when the task has stopped.
    pub fn send(&self, event: LayoutEvent) -> Result<(), RenderError> {
        self.events
            .send(event)
            .map_err(|_| RenderError::DriverClosed)
    }

    /// Queue a run replacement.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::DriverClosed`] when the task has stopped.
    pub fn set_run_items(&self, items: Vec<RunItem>) -> Result<(), RenderError> {
        self.send(LayoutEvent::SetRunItems(items))
    }

    /// Queue a container resize.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::DriverClosed`] when the task has stopped.
    pub fn set_container_size(&self, size: Size) -> Result<(), RenderError> {
        self.send(LayoutEvent::ContainerSize(size))
    }

    /// Queue an attachment size report.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::DriverClosed`] when the task has stopped.
    pub fn report_attachment_size(&self, id: AttachmentId, size: Size) -> Result<(), RenderError> {
        self.send(LayoutEvent::AttachmentSize(id, size))
    }

    /// A receiver of published snapshots.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FrameSnapshot> {
        self.snapshots.clone()
    }

    /// The latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> FrameSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Number of measurements started so far.
    #[must_use]
    pub fn measurement_count(&self) -> u64 {
        self.measurements.load(Ordering::Relaxed)
    }

    /// Stop accepting events and wait for the task to finish.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::DriverTask`] when the task panicked.
    pub async fn shutdown(self) -> Result<(), RenderError> {
        let Self { events, task, .. } = self;
        drop(events);
        task.await
            .map_err(|error| RenderError::DriverTask(error.to_string()))
    }
}

/// Apply one event. Returns whether the engine's inputs changed.
fn apply_event<E: ShapingEngine + ?Sized>(
    engine: &mut AttachmentLayoutEngine<E>,
    event: LayoutEvent,
) -> bool {
    match event {
        LayoutEvent::SetRunItems(items) => engine.set_run_items(items),
        LayoutEvent::ContainerSize(size) => engine.set_container_size(size),
        LayoutEvent::AttachmentSize(id, size) => engine.report_attachment_size(id, size),
    }
}

async fn join_measurement(
    pending: &mut Option<JoinHandle<MeasurementResult>>,
) -> Result<MeasurementResult, JoinError> {
    match pending {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

async fn run_driver<E>(
    mut engine: AttachmentLayoutEngine<E>,
    mut events: mpsc::UnboundedReceiver<LayoutEvent>,
    debounce: Duration,
    measurements: Arc<AtomicU64>,
) where
    E: ShapingEngine + 'static,
{
    let mut deadline: Option<Instant> = None;
    let mut pending: Option<JoinHandle<MeasurementResult>> = None;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    break;
                };
                // STEP 1: Every input change restarts the quiet period.
                if apply_event(&mut engine, event) {
                    deadline = Some(Instant::now() + debounce);
                }
            }
            () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                deadline = None;
                // STEP 2: Measure off the runtime. A newer request replaces
                // the one in flight, whose result would be stale.
                if let Some(request) = engine.measurement_request() {
                    let shaper = Arc::clone(engine.shaper());
                    let _ = measurements.fetch_add(1, Ordering::Relaxed);
                    log::trace!(
                        target: "wombat::driver",
                        "measuring generation {}",
                        request.generation
                    );
                    pending = Some(tokio::task::spawn_blocking(move || {
                        request.measure(shaper.as_ref())
                    }));
                }
            }
            joined = join_measurement(&mut pending), if pending.is_some() => {
                pending = None;
                // STEP 3: The engine drops results of an old generation.
                match joined {
                    Ok(result) => {
                        let _ = engine.apply_measurement(result);
                    }
                    Err(error) => {
                        log::warn!(target: "wombat::driver", "measurement task failed: {error}");
                    }
                }
            }
        }
    }
    log::debug!(target: "wombat::driver", "event channel closed, driver stopping");
}
