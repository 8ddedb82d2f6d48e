//! Tag name to behavior registry.
//!
//! [§ 15 Rendering](https://html.spec.whatwg.org/multipage/rendering.html)
//!
//! "User agents are not required to present HTML documents in any
//! particular way."
//!
//! Each registered tag is a block, an inline style mutator or an
//! attachment, with a style function applied after attribute styling.
//! Unregistered tags behave as blocks.

use rustc_hash::FxHashMap;
use serde::Serialize;
use strum_macros::{Display, EnumString};
use wombat_dom::ParsedNode;

use crate::style::font::BOLD_WEIGHT;
use crate::style::{AttributeValue, StyleContainer, StyleContext};

/// Mutates a container for an element.
pub type StyleFn = fn(&ParsedNode, &mut StyleContainer, &StyleContext<'_>);

/// How an element participates in the render tree.
#[derive(Debug, Clone, Copy)]
pub enum TagBehavior {
    /// Becomes a block node with its own children.
    Block(StyleFn),
    /// Flattened into its parent; only its style survives.
    Inline(StyleFn),
    /// A single opaque inline unit whose subtree is not visited.
    Attachment(StyleFn),
}

/// The classification of a [`TagBehavior`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    /// Block node.
    Block,
    /// Inline style mutator.
    Inline,
    /// Inline attachment.
    Attachment,
}

impl TagBehavior {
    /// The classification.
    #[must_use]
    pub const fn kind(&self) -> TagKind {
        match self {
            Self::Block(_) => TagKind::Block,
            Self::Inline(_) => TagKind::Inline,
            Self::Attachment(_) => TagKind::Attachment,
        }
    }

    /// The style function.
    #[must_use]
    pub const fn style_fn(&self) -> StyleFn {
        match self {
            Self::Block(f) | Self::Inline(f) | Self::Attachment(f) => *f,
        }
    }
}

/// Tag name to behavior mapping.
///
/// Registration consumes the registry and returns the updated one; a
/// registry shared by reference can never change under its readers.
#[derive(Debug, Clone)]
pub struct TagRegistry {
    entries: FxHashMap<String, TagBehavior>,
}

impl Default for TagRegistry {
    fn default() -> Self {
        let block = TagBehavior::Block(no_style);
        let inline = TagBehavior::Inline(no_style);
        let mut registry = Self::empty();
        for tag in [
            "html", "head", "body", "div", "p", "header", "main", "section", "footer", "h1", "h2",
        ] {
            registry = registry.register(tag, block);
        }
        for tag in ["span", "rb", "rt", "rtc", "rbc"] {
            registry = registry.register(tag, inline);
        }
        registry
            .register("a", TagBehavior::Inline(link_style))
            .register("b", TagBehavior::Inline(bold_style))
            .register("strong", TagBehavior::Inline(bold_style))
            .register("i", TagBehavior::Inline(italic_style))
            .register("em", TagBehavior::Inline(italic_style))
            .register("u", TagBehavior::Inline(underline_style))
            .register("ruby", TagBehavior::Attachment(no_style))
            .register("img", TagBehavior::Attachment(no_style))
    }
}

impl TagRegistry {
    /// A registry with no tags; everything behaves as a block.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }

    /// Register `tag`, replacing any previous behavior.
    #[must_use]
    pub fn register(mut self, tag: impl Into<String>, behavior: TagBehavior) -> Self {
        let _ = self.entries.insert(tag.into().to_ascii_lowercase(), behavior);
        self
    }

    /// Remove `tag`; it falls back to block behavior.
    #[must_use]
    pub fn remove(mut self, tag: &str) -> Self {
        let _ = self.entries.remove(tag);
        self
    }

    /// The registered behavior of `tag`.
    #[must_use]
    pub fn behavior(&self, tag: &str) -> Option<TagBehavior> {
        self.entries.get(tag).copied()
    }

    /// Classification of `tag`; unregistered tags are blocks.
    #[must_use]
    pub fn kind(&self, tag: &str) -> TagKind {
        self.behavior(tag).as_ref().map_or(TagKind::Block, TagBehavior::kind)
    }

    /// Number of registered tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Style function that changes nothing.
pub const fn no_style(_: &ParsedNode, _: &mut StyleContainer, _: &StyleContext<'_>) {}

/// [§ 15.3.4 Phrasing content](https://html.spec.whatwg.org/multipage/rendering.html#phrasing-content-3)
///
/// "b, strong { font-weight: bolder; }"
pub fn bold_style(_: &ParsedNode, style: &mut StyleContainer, _: &StyleContext<'_>) {
    if let Some(font) = style.font.as_mut() {
        font.weight = font.weight.max(BOLD_WEIGHT);
    }
}

/// "cite, dfn, em, i, var { font-style: italic; }"
pub fn italic_style(_: &ParsedNode, style: &mut StyleContainer, _: &StyleContext<'_>) {
    if let Some(font) = style.font.as_mut() {
        font.italic = true;
    }
}

/// "ins, u { text-decoration: underline; }"
///
/// An `underline-color` attribute sets the line color.
pub fn underline_style(node: &ParsedNode, style: &mut StyleContainer, _: &StyleContext<'_>) {
    style.underline = true;
    if let Some(color) = node
        .attribute("underline-color")
        .and_then(|value| AttributeValue(value).as_color())
    {
        style.underline_color = Some(color);
    }
}

/// Links carry their `href` as the link target.
pub fn link_style(node: &ParsedNode, style: &mut StyleContainer, _: &StyleContext<'_>) {
    if let Some(href) = node
        .attribute("href")
        .and_then(|value| AttributeValue(value).as_url())
    {
        style.link = Some(href.to_string());
    }
}
