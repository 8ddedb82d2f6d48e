//! HTML parsing collaborators for the Wombat renderer.
//!
//! # Scope
//!
//! This crate implements:
//! - **Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - Data, tag, attribute, comment and raw-text states
//!   - Named (common subset) and numeric character references
//!
//! - **Tree builder** producing a [`wombat_dom::ParsedNode`]
//!   - Void elements, implied `</p>`, mismatched end tags
//!   - Whitespace normalization outside `pre`/`code`/`textarea`
//!   - `<br>` as a `"\n"` text child
//!
//! - **Minifier** for authored markup with indentation
//! - **Parse cache** keyed by document text
//!
//! # Not Implemented
//!
//! - Insertion modes, foster parenting, adoption agency
//! - Full named character reference table

/// Bounded cache of parsed documents.
pub mod cache;
/// Whitespace minifier for authored HTML.
pub mod minify;
/// Tree construction and the public `parse` entry point.
pub mod parser;
/// HTML tokenizer.
pub mod tokenizer;

pub use cache::ParseCache;
pub use minify::minify;
pub use parser::{BLOCK_TAGS, ParseError, parse, try_parse};
pub use tokenizer::{HtmlTokenizer, Token, TokenizerState};
