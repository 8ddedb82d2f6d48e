//! Inline run model.
//!
//! An inline group of the render tree flattens into a linear sequence of
//! [`RunItem`]s: text, hard line breaks and attachments, each carrying its
//! style. Attachments get an [`AttachmentId`] that stays the same when the
//! same document is rendered again, so sizes and frames measured for one
//! render can be reused by the next.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use rustc_hash::FxHasher;
use serde::{Serialize, Serializer};
use wombat_dom::AttributesMap;

use crate::layout::render_tree::{InlineContent, InlineElement};
use crate::style::StyleContainer;

/// Stable identity of an attachment.
///
/// The ordinal is the attachment's position among the attachments of one
/// parse; the content hash covers its tag, attributes and style. Ordering
/// is by ordinal, i.e. document order. Serializes as its display form so
/// it can key a JSON object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttachmentId {
    /// Position in document order within one parse.
    pub ordinal: u32,
    /// Hash of tag, attributes and style.
    pub content_hash: u64,
}

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}:{:016x}", self.ordinal, self.content_hash)
    }
}

impl Serialize for AttachmentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Issues [`AttachmentId`]s in document order.
///
/// Reset before each parse so an unchanged document gets the same ids.
#[derive(Debug, Default)]
pub struct AttachmentIdGenerator {
    next: AtomicU32,
}

impl AttachmentIdGenerator {
    /// Create a generator starting at ordinal zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: AtomicU32::new(0),
        }
    }

    /// The id for the next attachment.
    pub fn next_id(
        &self,
        tag: &str,
        attributes: &AttributesMap,
        style: &StyleContainer,
    ) -> AttachmentId {
        let mut hasher = FxHasher::default();
        tag.hash(&mut hasher);
        attributes.hash(&mut hasher);
        style.hash(&mut hasher);
        AttachmentId {
            ordinal: self.next.fetch_add(1, Ordering::Relaxed),
            content_hash: hasher.finish(),
        }
    }

    /// Restart at ordinal zero.
    pub fn reset(&self) {
        self.next.store(0, Ordering::Relaxed);
    }

    /// Number of ids issued since the last reset.
    #[must_use]
    pub fn issued(&self) -> u32 {
        self.next.load(Ordering::Relaxed)
    }
}

/// One unit of inline content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunItem {
    /// Text without line feeds.
    Text {
        /// The text.
        text: String,
        /// Its style.
        style: Arc<StyleContainer>,
    },
    /// A hard line break.
    LineBreak {
        /// Style of the text the break came from.
        style: Arc<StyleContainer>,
    },
    /// An attachment.
    Attachment {
        /// Stable identity.
        id: AttachmentId,
        /// Source tag.
        tag: String,
        /// Source and synthesized attributes.
        attributes: AttributesMap,
        /// Its style.
        style: Arc<StyleContainer>,
    },
}

impl RunItem {
    /// The item's style.
    #[must_use]
    pub const fn style(&self) -> &Arc<StyleContainer> {
        match self {
            Self::Text { style, .. } | Self::LineBreak { style } | Self::Attachment { style, .. } => {
                style
            }
        }
    }

    /// The id, for attachments.
    #[must_use]
    pub const fn attachment_id(&self) -> Option<AttachmentId> {
        match self {
            Self::Attachment { id, .. } => Some(*id),
            Self::Text { .. } | Self::LineBreak { .. } => None,
        }
    }

    /// Whether this is an attachment.
    #[must_use]
    pub const fn is_attachment(&self) -> bool {
        matches!(self, Self::Attachment { .. })
    }

    /// A line break, or text made only of whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::LineBreak { .. } => true,
            Self::Text { text, .. } => text.chars().all(char::is_whitespace),
            Self::Attachment { .. } => false,
        }
    }
}

/// Flatten inline elements into run items.
///
/// Text splits on `'\n'` into text and [`RunItem::LineBreak`] items; empty
/// pieces are dropped.
#[must_use]
pub fn run_items(elements: &[&InlineElement], ids: &AttachmentIdGenerator) -> Vec<RunItem> {
    let mut items = Vec::with_capacity(elements.len());
    for element in elements {
        match &element.content {
            InlineContent::Text(text) => {
                for (index, piece) in text.split('\n').enumerate() {
                    if index > 0 {
                        items.push(RunItem::LineBreak {
                            style: Arc::clone(&element.style),
                        });
                    }
                    if !piece.is_empty() {
                        items.push(RunItem::Text {
                            text: piece.to_string(),
                            style: Arc::clone(&element.style),
                        });
                    }
                }
            }
            InlineContent::Attachment => items.push(RunItem::Attachment {
                id: ids.next_id(&element.tag, &element.attributes, &element.style),
                tag: element.tag.clone(),
                attributes: element.attributes.clone(),
                style: Arc::clone(&element.style),
            }),
        }
    }
    items
}

/// Merge adjacent text items with equal style.
#[must_use]
pub fn coalesce(items: Vec<RunItem>) -> Vec<RunItem> {
    let mut out: Vec<RunItem> = Vec::with_capacity(items.len());
    for item in items {
        if let RunItem::Text { text, style } = &item
            && let Some(RunItem::Text {
                text: previous,
                style: previous_style,
            }) = out.last_mut()
            && (Arc::ptr_eq(previous_style, style) || previous_style == style)
        {
            previous.push_str(text);
            continue;
        }
        out.push(item);
    }
    out
}

/// Skip the leading blank items (line breaks and whitespace-only text).
///
/// Idempotent: trimming a trimmed slice returns it unchanged.
#[must_use]
pub fn trim_leading_whitespace(items: &[RunItem]) -> &[RunItem] {
    let start = items
        .iter()
        .position(|item| !item.is_blank())
        .unwrap_or(items.len());
    &items[start..]
}

/// Drop one trailing line break; block stacking already ends the line.
#[must_use]
pub fn trim_trailing_line_break(items: &[RunItem]) -> &[RunItem] {
    match items.split_last() {
        Some((RunItem::LineBreak { .. }, rest)) => rest,
        _ => items,
    }
}

/// Trim and coalesce an inline group's items for shaping.
#[must_use]
pub fn prepare(items: &[RunItem]) -> Vec<RunItem> {
    coalesce(trim_trailing_line_break(trim_leading_whitespace(items)).to_vec())
}

/// How an inline group is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "plan", content = "items", rename_all = "snake_case")]
pub enum InlinePlan {
    /// Nothing visible.
    Empty,
    /// Text only; no attachment layout is needed.
    PlainText(Vec<RunItem>),
    /// A single attachment and nothing else, rendered directly.
    Standalone(RunItem),
    /// Text mixed with attachments, laid out by the attachment engine.
    Attachments(Vec<RunItem>),
}

impl InlinePlan {
    /// Prepare `items` and choose a plan.
    #[must_use]
    pub fn from_items(items: &[RunItem]) -> Self {
        let mut prepared = prepare(items);
        if prepared.is_empty() {
            return Self::Empty;
        }
        if prepared.len() == 1 && prepared[0].is_attachment() {
            return prepared.pop().map_or(Self::Empty, Self::Standalone);
        }
        if prepared.iter().any(RunItem::is_attachment) {
            Self::Attachments(prepared)
        } else {
            Self::PlainText(prepared)
        }
    }

    /// The items of the plan.
    #[must_use]
    pub fn items(&self) -> &[RunItem] {
        match self {
            Self::Empty => &[],
            Self::PlainText(items) | Self::Attachments(items) => items,
            Self::Standalone(item) => std::slice::from_ref(item),
        }
    }
}

/// Line spacing shared by a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RunLineMetrics {
    /// Largest extra spacing between lines among the items.
    pub line_spacing: f32,
    /// Largest padding above and below the text among the items.
    pub vertical_padding: f32,
}

impl RunLineMetrics {
    /// Maxima over the items' text line policies.
    #[must_use]
    pub fn of(items: &[RunItem]) -> Self {
        items
            .iter()
            .filter_map(|item| item.style().text_line)
            .fold(Self::default(), |acc, line| Self {
                line_spacing: acc.line_spacing.max(line.line_spacing()),
                vertical_padding: acc.vertical_padding.max(line.vertical_padding()),
            })
    }
}
