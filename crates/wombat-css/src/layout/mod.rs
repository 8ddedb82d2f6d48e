//! Render tree, block layout and inline layout.

/// Block grouping and margin collapsing.
pub mod block;
/// Points, sizes and rectangles.
pub mod geometry;
/// Inline run model, shaping and the attachment layout engine.
pub mod inline;
/// Render element tree and its builder.
pub mod render_tree;
/// Ruby annotation merge.
pub mod ruby;
