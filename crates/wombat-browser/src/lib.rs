//! Rendering front end for the Wombat renderer.
//!
//! This crate ties the parser, the render-tree builder and the attachment
//! layout engine together:
//! - **Session** ([`RenderSession`]): caches, configuration, fonts and the
//!   attachment id generator shared by successive renders
//! - **Font metrics** ([`FontdueFontMetrics`]): measurement backed by a
//!   loaded font file
//! - **Image cache** ([`AttachmentImageCache`]): rasterized attachments
//!   bounded by count and bytes
//! - **Pipeline** ([`render_document`]): markup to settled frames on the
//!   calling thread
//! - **Driver** ([`LayoutDriver`]): a debounced tokio task that re-measures
//!   as attachment sizes arrive

/// Asynchronous layout driver.
pub mod driver;
/// Rendering errors.
pub mod error;
/// Fontdue-backed font metrics and font loading.
pub mod font_metrics;
/// Rasterized attachment image cache.
pub mod image_cache;
/// Synchronous render pipeline.
pub mod pipeline;
/// Ruby attachment sizing and rasterization.
pub mod ruby;
/// Render session context.
pub mod session;

pub use driver::{LayoutDriver, LayoutEvent};
pub use error::RenderError;
pub use font_metrics::{DocumentFontMetrics, FontdueFontMetrics, find_system_font, load_font};
pub use image_cache::{AttachmentImage, AttachmentImageCache, AttachmentImageKey};
pub use pipeline::{
    RenderedBlock, RenderedDocument, RenderedRun, intrinsic_size, render_document,
};
pub use ruby::{RubyLayout, rasterize_ruby};
pub use session::{DocumentShaper, RenderSession};
