//! Integration tests for the synchronous render pipeline.

use wombat_browser::{RenderSession, RenderedDocument, render_document};
use wombat_css::{InlinePlan, MarginPair, Point, RenderConfig, Size};

const WIDTH: f32 = 400.0;

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

fn render(html: &str) -> RenderedDocument {
    render_document(html, WIDTH, &RenderSession::default())
}

// ---------------------------------------------------------------------------
// Attachments
// ---------------------------------------------------------------------------

#[test]
fn test_image_between_text() {
    let document = render("<p>Hello <img width=\"16\" height=\"16\"/> world</p>");
    let frames = document.frames();
    assert_eq!(frames.len(), 1);
    let (id, frame) = frames[0];
    assert_eq!(id.ordinal, 0);
    assert_eq!(frame.size, Size::new(16.0, 16.0));
    // "Hello " is six 9.6px advances; the image is centered in a 19.2px slot.
    assert!(close(frame.offset.x, 57.6));
    assert!(close(frame.offset.y, 1.6));
    assert_eq!(document.frame(id), Some(frame));
}

#[test]
fn test_line_height_pads_the_run() {
    let document = render("<p style=\"line-height: 40px\">Hello <img width=\"16\" height=\"16\"/> world</p>");
    let run = &document.runs[0];
    let (_, frame) = document.frames()[0];
    assert_eq!(run.lines, 1);
    // 10.4px of padding above and below a 19.2px line box.
    assert!(close(run.height, 40.0));
    assert!(close(frame.offset.y, 12.0));
    assert!(frame.offset.y + frame.size.height <= run.height);
}

#[test]
fn test_standalone_attachment_renders_directly() {
    let document = render("<p><img width=\"30\" height=\"20\"></p>");
    let run = &document.runs[0];
    assert!(matches!(run.plan, InlinePlan::Standalone(_)));
    let frame = run.snapshot.frames.values().next().copied().unwrap();
    assert_eq!(frame.size, Size::new(30.0, 20.0));
    assert_eq!(frame.offset, Point::ZERO);
    assert!(close(run.height, 20.0));
}

#[test]
fn test_unsized_attachment_keeps_zero_frame() {
    let document = render("<p>a<img src=\"x.png\">b</p>");
    let (_, frame) = document.frames()[0];
    assert_eq!(frame.size, Size::ZERO);
    assert_eq!(frame.offset, Point::ZERO);
}

#[test]
fn test_ruby_size_from_font_metrics() {
    let document = render("<p>x<ruby>漢<rt>かん</rt></ruby></p>");
    let (_, frame) = document.frames()[0];
    // Annotation at 16 × 0.58 = 9.28px: two 5.568px advances.
    assert!(close(frame.size.width, 11.136));
    assert!(close(frame.size.height, 19.2 + 9.28 * 1.2));
    // No font is loaded, so nothing is rasterized.
    assert!(document.runs[0].rasterized.is_empty());
}

#[test]
fn test_wrapping_run_reports_lines() {
    let document = render_document(
        "<p>aaaa bbbb <img width=\"10\" height=\"10\"> cccc</p>",
        100.0,
        &RenderSession::default(),
    );
    let run = &document.runs[0];
    assert!(matches!(run.plan, InlinePlan::Attachments(_)));
    assert!(run.lines >= 2);
    assert!(run.height > 19.2);
}

// ---------------------------------------------------------------------------
// Text and blocks
// ---------------------------------------------------------------------------

#[test]
fn test_plain_text_line_height() {
    let document = render("<p style=\"line-height: 40px\">hello</p>");
    assert!(close(document.runs[0].height, 40.0));
}

#[test]
fn test_plain_text_height() {
    let document = render("<p>hello</p>");
    let run = &document.runs[0];
    assert!(matches!(run.plan, InlinePlan::PlainText(_)));
    assert_eq!(run.lines, 1);
    assert!(close(run.height, 19.2));
    assert!(run.snapshot.frames.is_empty());
}

#[test]
fn test_sibling_margins_through_pipeline() {
    let document = render(
        "<div style=\"margin:10px\"><p style=\"margin-bottom:20px\">A</p><p style=\"margin-top:5px\">B</p></div>",
    );
    let div = document
        .blocks
        .iter()
        .find(|block| block.tag == "div" && block.path == vec![0])
        .unwrap();
    assert_eq!(div.layout.gaps, vec![0.0, 20.0]);
    assert_eq!(div.layout.outer, MarginPair { top: 10.0, bottom: 10.0 });
    assert!(close(div.content_width, 380.0));
}

#[test]
fn test_margins_add_when_collapsing_is_off() {
    let config = RenderConfig {
        collapse_block_margins: false,
        ..RenderConfig::default()
    };
    let session = RenderSession::new(config);
    let document = render_document(
        "<div><p style=\"margin-bottom:20px\">A</p><p style=\"margin-top:5px\">B</p></div>",
        WIDTH,
        &session,
    );
    let div = document.blocks.iter().find(|block| block.tag == "div" && block.path == vec![0]);
    assert_eq!(div.unwrap().layout.gaps, vec![0.0, 25.0]);
}

#[test]
fn test_padding_narrows_content() {
    let document = render("<div style=\"padding: 0 50px\"><p>x</p></div>");
    let p = document.blocks.iter().find(|block| block.tag == "p").unwrap();
    assert!(close(p.content_width, 300.0));
}

// ---------------------------------------------------------------------------
// Session reuse
// ---------------------------------------------------------------------------

#[test]
fn test_rerender_reuses_parse_and_ids() {
    let session = RenderSession::default();
    let html = "<p>a <img width=\"8\" height=\"8\"> b <img width=\"9\" height=\"9\"></p>";
    let first = render_document(html, WIDTH, &session);
    let second = render_document(html, WIDTH, &session);
    assert_eq!(session.parses().stats().hits, 1);
    assert_eq!(first.frames(), second.frames());
    let ordinals: Vec<u32> = second.frames().iter().map(|(id, _)| id.ordinal).collect();
    assert_eq!(ordinals, vec![0, 1]);
}

#[test]
fn test_document_serializes() {
    let document = render("<p>Hello <img width=\"16\" height=\"16\"/></p>");
    let json = serde_json::to_value(&document).unwrap();
    assert_eq!(json["runs"][0]["plan"]["plan"], "attachments");
    assert!(json["root"]["children"].is_array());
}
