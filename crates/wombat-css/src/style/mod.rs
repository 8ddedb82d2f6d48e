//! Style and value model.
//!
//! Values are parsed from attribute and `style="..."` text into typed
//! forms and accumulated in a [`StyleContainer`] that cascades from parent
//! to child.

/// Typed attribute views.
pub mod attribute;
/// CSS colors.
pub mod color;
/// The cascaded style container.
pub mod container;
/// Declaration lists and their cache.
pub mod declarations;
/// Font descriptor and font property parsing.
pub mod font;
/// Lengths, size keywords and box edges.
pub mod length;
/// Line-break modes.
pub mod line_break;
/// The `ruby-position` property.
pub mod ruby_position;
/// Attribute styling.
pub mod styler;
/// Line metrics policy.
pub mod text_line;

pub use attribute::AttributeValue;
pub use color::ColorValue;
pub use container::StyleContainer;
pub use declarations::{CssDeclarations, DeclarationCache};
pub use font::{DEFAULT_FONT_SIZE, FontDescriptor};
pub use length::{BoxEdges, Length, Px, parse_size};
pub use line_break::LineBreakMode;
pub use ruby_position::RubyPosition;
pub use styler::{AttributeStyler, DefaultAttributeStyler, StyleContext, apply_declarations};
pub use text_line::TextLine;
