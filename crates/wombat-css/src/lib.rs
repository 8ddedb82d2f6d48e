//! Style model, render-tree construction and inline attachment layout for
//! the Wombat renderer.
//!
//! # Scope
//!
//! This crate implements:
//! - **Style/value model**
//!   - Typed attribute views ([`AttributeValue`])
//!   - Cached `style="..."` declaration parsing ([`DeclarationCache`])
//!   - Colors ([CSS Color Level 4](https://www.w3.org/TR/css-color-4/)):
//!     hex, `rgb()`, `hsl()`, named colors
//!   - Lengths ([CSS Values Level 4](https://www.w3.org/TR/css-values-4/)):
//!     px, pt, em, rem, %, size keywords
//!   - The cascaded [`StyleContainer`]
//!
//! - **Render tree** ([`RenderTreeBuilder`])
//!   - Block/inline/attachment tag classification via a [`TagRegistry`]
//!   - Inline flattening
//!   - Ruby annotation merge
//!     ([CSS Ruby Level 1](https://www.w3.org/TR/css-ruby-1/))
//!
//! - **Block layout**: grouping and margin collapsing
//!   ([CSS 2.1 § 8.3.1](https://www.w3.org/TR/CSS2/box.html#collapsing-margins))
//!
//! - **Inline layout**
//!   - Run items, shaped runs with attachment placeholders
//!   - Greedy line breaking over
//!     [UAX #14](https://www.unicode.org/reports/tr14/) opportunities
//!   - Frame calculation for attachment ranges
//!   - The reactive [`AttachmentLayoutEngine`]
//!
//! # Not Implemented
//!
//! - Selectors and the cascade beyond inheritance plus inline `style`
//! - Bidirectional text, justification, vertical writing modes

/// Render configuration.
pub mod config;
/// Layout errors.
pub mod error;
/// Render tree, block layout and inline layout.
pub mod layout;
/// Style and value model.
pub mod style;
/// Tag name to behavior registry.
pub mod tags;

pub use config::RenderConfig;
pub use error::LayoutError;
pub use layout::block::{
    BlockEntry, BlockLayout, InlineGroup, MarginPair, collapse_margins, compute_block_layout,
    group_contents,
};
pub use layout::geometry::{Point, Rect, Size};
pub use layout::inline::engine::{
    AttachmentFrame, AttachmentLayoutEngine, EngineState, FrameSnapshot, MeasurementRequest,
    MeasurementResult,
};
pub use layout::inline::frame::{FrameCalculator, FrameLayout, RangeFrame};
pub use layout::inline::metrics::{ApproximateFontMetrics, FontMetrics};
pub use layout::inline::run::{
    AttachmentId, AttachmentIdGenerator, InlinePlan, RunItem, RunLineMetrics,
};
pub use layout::inline::shaped::{
    AttachmentMetrics, GlyphMetrics, GreedyShaper, LineGeometry, PlaceholderInfo, RubyPlacement,
    ShapedRun, ShapingEngine,
};
pub use layout::render_tree::{
    BlockElement, InlineContent, InlineElement, RenderElement, RenderTreeBuilder, TEXT_TAG,
};
pub use style::{
    AttributeStyler, AttributeValue, BoxEdges, ColorValue, CssDeclarations, DeclarationCache,
    DefaultAttributeStyler, FontDescriptor, Length, LineBreakMode, Px, RubyPosition,
    StyleContainer, StyleContext, TextLine, parse_size,
};
pub use tags::{TagBehavior, TagKind, TagRegistry};
