//! Render element tree and its builder.
//!
//! The builder walks a [`ParsedNode`] tree with an inherited style and
//! produces style-resolved [`RenderElement`]s:
//!
//! - block tags (and unknown tags) become [`BlockElement`]s;
//! - inline tags are flattened into their parent, contributing only style;
//! - attachment tags become a single [`InlineContent::Attachment`] whose
//!   subtree is not visited;
//! - `rp` is always dropped;
//! - `ruby` is merged into one attachment carrying its base and annotation
//!   text, see [`super::ruby`].

use std::sync::Arc;

use serde::Serialize;
use wombat_dom::{AttributesMap, ParsedChild, ParsedNode};

use super::ruby::{RUBY_TAG, is_annotation_tag, merge_ruby};
use crate::style::{AttributeStyler, StyleContainer, StyleContext};
use crate::tags::{TagBehavior, TagKind, TagRegistry};

/// Tag of inline elements holding literal text.
pub const TEXT_TAG: &str = "_text";

/// A block node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BlockElement {
    /// Tag name.
    pub tag: String,
    /// Source attributes.
    pub attributes: AttributesMap,
    /// Children in document order.
    pub children: Vec<RenderElement>,
    /// Resolved style.
    pub style: Arc<StyleContainer>,
}

/// What an inline element holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InlineContent {
    /// Literal text.
    Text(String),
    /// An attachment rendered by the host; its tag and attributes describe it.
    Attachment,
}

/// An inline leaf.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct InlineElement {
    /// [`TEXT_TAG`] for text, otherwise the attachment's tag.
    pub tag: String,
    /// Source attributes, plus synthesized ones for ruby.
    pub attributes: AttributesMap,
    /// Text or attachment marker.
    pub content: InlineContent,
    /// Resolved style.
    pub style: Arc<StyleContainer>,
}

impl InlineElement {
    /// Whether this is an attachment.
    #[must_use]
    pub const fn is_attachment(&self) -> bool {
        matches!(self.content, InlineContent::Attachment)
    }

    /// The text, for text elements.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            InlineContent::Text(text) => Some(text),
            InlineContent::Attachment => None,
        }
    }
}

/// A node of the render tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderElement {
    /// Block node.
    Block(BlockElement),
    /// Inline leaf.
    Inline(InlineElement),
}

impl RenderElement {
    /// Tag name.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::Block(block) => &block.tag,
            Self::Inline(inline) => &inline.tag,
        }
    }

    /// Resolved style.
    #[must_use]
    pub const fn style(&self) -> &Arc<StyleContainer> {
        match self {
            Self::Block(block) => &block.style,
            Self::Inline(inline) => &inline.style,
        }
    }

    /// Source attributes.
    #[must_use]
    pub const fn attributes(&self) -> &AttributesMap {
        match self {
            Self::Block(block) => &block.attributes,
            Self::Inline(inline) => &inline.attributes,
        }
    }

    /// The block, if this is one.
    #[must_use]
    pub const fn as_block(&self) -> Option<&BlockElement> {
        match self {
            Self::Block(block) => Some(block),
            Self::Inline(_) => None,
        }
    }

    /// The inline leaf, if this is one.
    #[must_use]
    pub const fn as_inline(&self) -> Option<&InlineElement> {
        match self {
            Self::Block(_) => None,
            Self::Inline(inline) => Some(inline),
        }
    }

    /// Number of elements in this subtree, including `self`.
    #[must_use]
    pub fn element_count(&self) -> usize {
        match self {
            Self::Block(block) => 1 + block.children.iter().map(Self::element_count).sum::<usize>(),
            Self::Inline(_) => 1,
        }
    }
}

/// Builds render trees for one document.
pub struct RenderTreeBuilder<'a> {
    registry: &'a TagRegistry,
    styler: &'a dyn AttributeStyler,
    context: StyleContext<'a>,
}

impl<'a> RenderTreeBuilder<'a> {
    /// Create a builder.
    #[must_use]
    pub const fn new(
        registry: &'a TagRegistry,
        styler: &'a dyn AttributeStyler,
        context: StyleContext<'a>,
    ) -> Self {
        Self {
            registry,
            styler,
            context,
        }
    }

    /// Shared styling inputs.
    #[must_use]
    pub const fn context(&self) -> &StyleContext<'a> {
        &self.context
    }

    /// Build `node` as the root block, whatever its registered behavior.
    #[must_use]
    pub fn build_root(&self, node: &ParsedNode, initial: &Arc<StyleContainer>) -> BlockElement {
        let style = self.resolve_style(node, initial, self.registry.behavior(&node.tag));
        let mut children = Vec::new();
        self.build_children(node.children.iter(), &style, &mut children);
        log::trace!(
            target: "wombat::render",
            "built <{}> with {} top-level children",
            node.tag,
            children.len()
        );
        BlockElement {
            tag: node.tag.clone(),
            attributes: node.attributes.clone(),
            children,
            style,
        }
    }

    /// Build the fragments `node` contributes to a parent styled `parent`.
    ///
    /// A block contributes one fragment, an inline tag its flattened
    /// children, an attachment one inline leaf and `rp` nothing.
    #[must_use]
    pub fn build_fragments(
        &self,
        node: &ParsedNode,
        parent: &Arc<StyleContainer>,
    ) -> Vec<RenderElement> {
        let mut out = Vec::new();
        self.build_node(node, parent, &mut out);
        out
    }

    /// Cascade `parent` into a style for `node`: inherit, apply attribute
    /// styles, then the tag's own style function.
    ///
    /// Returns `parent` itself when nothing changed.
    #[must_use]
    pub fn resolve_style(
        &self,
        node: &ParsedNode,
        parent: &Arc<StyleContainer>,
        behavior: Option<TagBehavior>,
    ) -> Arc<StyleContainer> {
        let mut style = Arc::clone(parent);
        let container = Arc::make_mut(&mut style);
        container.reset_box_edges();
        self.styler.apply(&node.attributes, container, &self.context);
        if let Some(behavior) = behavior {
            (behavior.style_fn())(node, container, &self.context);
        }
        if style == *parent {
            Arc::clone(parent)
        } else {
            style
        }
    }

    fn build_children<'n>(
        &self,
        children: impl Iterator<Item = &'n ParsedChild>,
        style: &Arc<StyleContainer>,
        out: &mut Vec<RenderElement>,
    ) {
        for child in children {
            match child {
                ParsedChild::Text(text) => {
                    if text.is_empty() {
                        continue;
                    }
                    let text = style.line_break_mode.transform(text).into_owned();
                    out.push(RenderElement::Inline(InlineElement {
                        tag: TEXT_TAG.to_string(),
                        attributes: AttributesMap::new(),
                        content: InlineContent::Text(text),
                        style: Arc::clone(style),
                    }));
                }
                ParsedChild::Node(node) => self.build_node(node, style, out),
            }
        }
    }

    fn build_node(
        &self,
        node: &ParsedNode,
        parent: &Arc<StyleContainer>,
        out: &mut Vec<RenderElement>,
    ) {
        // `rp` only carries fallback punctuation for renderers without ruby.
        if node.tag == "rp" {
            return;
        }
        let behavior = self.registry.behavior(&node.tag);
        let kind = behavior.as_ref().map_or(TagKind::Block, TagBehavior::kind);
        let style = self.resolve_style(node, parent, behavior);

        match kind {
            TagKind::Inline => self.build_children(node.children.iter(), &style, out),
            TagKind::Attachment if node.tag == RUBY_TAG => {
                if let Some(attributes) = merge_ruby(node, &style, self) {
                    out.push(RenderElement::Inline(InlineElement {
                        tag: node.tag.clone(),
                        attributes,
                        content: InlineContent::Attachment,
                        style,
                    }));
                } else {
                    // No base text: keep the base content, drop annotations.
                    let base = node.children.iter().filter(|child| match child {
                        ParsedChild::Node(inner) => !is_annotation_tag(&inner.tag),
                        ParsedChild::Text(_) => true,
                    });
                    self.build_children(base, &style, out);
                }
            }
            TagKind::Attachment => out.push(RenderElement::Inline(InlineElement {
                tag: node.tag.clone(),
                attributes: node.attributes.clone(),
                content: InlineContent::Attachment,
                style,
            })),
            TagKind::Block => {
                let mut children = Vec::new();
                self.build_children(node.children.iter(), &style, &mut children);
                out.push(RenderElement::Block(BlockElement {
                    tag: node.tag.clone(),
                    attributes: node.attributes.clone(),
                    children,
                    style,
                }));
            }
        }
    }
}
