//! Inline layout.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! Data flows leaves first:
//!
//! 1. [`run`]: inline render elements become a flat [`run::RunItem`]
//!    sequence of text, hard breaks and attachments.
//! 2. [`shaped`]: the sequence becomes a [`shaped::ShapedRun`] where each
//!    attachment is one U+FFFC placeholder whose glyph metrics come from a
//!    callback instead of a font.
//! 3. [`frame`]: a [`shaped::ShapingEngine`] breaks the run into lines, the
//!    calculator reflows them and finds the rectangle of every attachment.
//! 4. [`engine`]: the reactive state machine that re-measures when the
//!    container or an attachment changes size.

/// Reactive attachment layout engine.
pub mod engine;
/// Line reflow and attachment frames.
pub mod frame;
/// Font metrics.
pub mod metrics;
/// Inline run model.
pub mod run;
/// Shaped runs and the shaping engine.
pub mod shaped;
