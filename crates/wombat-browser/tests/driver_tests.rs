//! Integration tests for the debounced layout driver.

use std::sync::Arc;
use std::time::Duration;

use wombat_browser::{LayoutDriver, RenderSession, render_document};
use wombat_common::debug_log::DebugLog;
use wombat_css::{
    ApproximateFontMetrics, AttachmentId, AttachmentLayoutEngine, GreedyShaper, RunItem, Size,
};

const DEBOUNCE: Duration = Duration::from_millis(16);

/// Items of a run holding one image, and the image's id.
fn sample() -> (Vec<RunItem>, AttachmentId) {
    let document = render_document(
        "<p>Hello <img width=\"16\" height=\"16\"/> world</p>",
        400.0,
        &RenderSession::default(),
    );
    let items = document.runs[0].plan.items().to_vec();
    let id = document.frames()[0].0;
    (items, id)
}

fn driver() -> LayoutDriver {
    let engine = AttachmentLayoutEngine::new(
        Arc::new(GreedyShaper::new(ApproximateFontMetrics)),
        Arc::new(DebugLog::disabled()),
    );
    LayoutDriver::spawn(engine, DEBOUNCE)
}

fn square(side: f32) -> Size {
    Size::new(side, side)
}

// ---------------------------------------------------------------------------
// Debouncing
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_burst_is_measured_once() {
    let (items, id) = sample();
    let driver = driver();
    let mut snapshots = driver.subscribe();

    driver.set_run_items(items).unwrap();
    driver.set_container_size(Size::new(400.0, 0.0)).unwrap();
    for side in [11.0, 12.0, 13.0, 14.0, 15.0] {
        driver.report_attachment_size(id, square(side)).unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let settled = snapshots
        .wait_for(|snapshot| snapshot.frames.get(&id).is_some_and(|f| f.size == square(15.0)))
        .await
        .unwrap()
        .clone();
    assert_eq!(driver.measurement_count(), 1);
    assert!((settled.frames[&id].offset.x - 57.6).abs() < 1e-3);
}

#[tokio::test(start_paused = true)]
async fn test_separate_bursts_measure_separately() {
    let (items, id) = sample();
    let driver = driver();
    let mut snapshots = driver.subscribe();

    driver.set_run_items(items).unwrap();
    driver.set_container_size(Size::new(400.0, 0.0)).unwrap();
    driver.report_attachment_size(id, square(16.0)).unwrap();
    let _ = snapshots
        .wait_for(|snapshot| snapshot.frames.get(&id).is_some_and(|f| f.size == square(16.0)))
        .await
        .unwrap();

    driver.report_attachment_size(id, square(20.0)).unwrap();
    let _ = snapshots
        .wait_for(|snapshot| snapshot.frames.get(&id).is_some_and(|f| f.size == square(20.0)))
        .await
        .unwrap();
    assert_eq!(driver.measurement_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_text_only_run_is_never_measured() {
    let (items, _) = sample();
    let text: Vec<RunItem> = items.into_iter().filter(|item| !item.is_attachment()).collect();
    let driver = driver();
    driver.set_run_items(text).unwrap();
    driver.set_container_size(Size::new(400.0, 0.0)).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(driver.measurement_count(), 0);
    assert!(driver.snapshot().frames.is_empty());
}

// ---------------------------------------------------------------------------
// Switch to latest
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_latest_size_wins() {
    let (items, id) = sample();
    let driver = driver();
    let mut snapshots = driver.subscribe();

    driver.set_run_items(items).unwrap();
    driver.set_container_size(Size::new(400.0, 0.0)).unwrap();
    driver.report_attachment_size(id, square(12.0)).unwrap();
    // The first measurement starts once the quiet period ends.
    tokio::time::sleep(Duration::from_millis(20)).await;
    driver.report_attachment_size(id, square(24.0)).unwrap();

    let _ = snapshots
        .wait_for(|snapshot| snapshot.frames.get(&id).is_some_and(|f| f.size == square(24.0)))
        .await
        .unwrap();
    // A late result for the older size must not overwrite the newer one.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(driver.snapshot().frames[&id].size, square(24.0));
    assert_eq!(driver.measurement_count(), 2);
}

// ---------------------------------------------------------------------------
// Shutdown
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_shutdown_closes_snapshots() {
    let driver = driver();
    let mut snapshots = driver.subscribe();
    driver.shutdown().await.unwrap();
    assert!(snapshots.changed().await.is_err());
}
