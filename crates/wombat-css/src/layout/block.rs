//! Block grouping and vertical margin collapsing.
//!
//! [CSS 2.1 § 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
//!
//! "In CSS, the adjoining margins of two or more boxes (which might or might
//! not be siblings) can combine to form a single margin."

use serde::Serialize;

use super::render_tree::{BlockElement, InlineElement, RenderElement};
use crate::style::StyleContainer;

/// A contiguous run of inline children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineGroup<'a> {
    /// The inline leaves in document order.
    pub elements: Vec<&'a InlineElement>,
}

impl InlineGroup<'_> {
    /// Whether the group holds only whitespace text: no attachments and no
    /// visible characters.
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.elements.iter().all(|element| {
            element
                .text()
                .is_some_and(|text| text.chars().all(char::is_whitespace))
        })
    }
}

/// One entry of a block's vertical stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockEntry<'a> {
    /// A block child.
    Block(&'a BlockElement),
    /// Consecutive inline children.
    Inline(InlineGroup<'a>),
}

/// Group `children` into blocks and maximal inline runs.
#[must_use]
pub fn group_contents(children: &[RenderElement]) -> Vec<BlockEntry<'_>> {
    let mut entries = Vec::new();
    let mut pending: Vec<&InlineElement> = Vec::new();
    for child in children {
        match child {
            RenderElement::Inline(inline) => pending.push(inline),
            RenderElement::Block(block) => {
                if !pending.is_empty() {
                    entries.push(BlockEntry::Inline(InlineGroup {
                        elements: std::mem::take(&mut pending),
                    }));
                }
                entries.push(BlockEntry::Block(block));
            }
        }
    }
    if !pending.is_empty() {
        entries.push(BlockEntry::Inline(InlineGroup { elements: pending }));
    }
    entries
}

/// Vertical margins of a block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MarginPair {
    /// Top margin.
    pub top: f32,
    /// Bottom margin.
    pub bottom: f32,
}

impl MarginPair {
    /// The vertical margins declared in `style`.
    #[must_use]
    pub const fn of(style: &StyleContainer) -> Self {
        Self {
            top: style.margin.top.0,
            bottom: style.margin.bottom.0,
        }
    }
}

/// [§ 8.3.1](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
///
/// "When two or more margins collapse, the resulting margin width is the
/// maximum of the collapsing margins' widths. In the case of negative
/// margins, the maximum of the absolute values of the negative adjoining
/// margins is deducted from the maximum of the positive adjoining margins."
///
/// Margins of mixed sign do not collapse here; the result is zero.
#[must_use]
pub fn collapse_margins(a: f32, b: f32) -> f32 {
    if a >= 0.0 && b >= 0.0 {
        a.max(b)
    } else if a <= 0.0 && b <= 0.0 {
        a.min(b)
    } else {
        0.0
    }
}

/// Vertical spacing of a block's entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockLayout {
    /// The block's own margins after collapsing with its first and last
    /// children.
    pub outer: MarginPair,
    /// Space before each entry, parallel to [`group_contents`].
    pub gaps: Vec<f32>,
    /// Space after the last entry, inside the block.
    pub trailing: f32,
}

/// Compute the vertical spacing of `block`'s children.
///
/// With `collapse` set, adjacent block margins collapse, and the first and
/// last block children collapse with the parent's own margin unless the
/// parent has padding or border on that edge. Whitespace-only inline runs
/// are transparent: they add no space and do not separate margins.
#[must_use]
pub fn compute_block_layout(block: &BlockElement, collapse: bool) -> BlockLayout {
    let own = MarginPair::of(&block.style);
    let sealed_top = !collapse || block.style.seals_top();
    let sealed_bottom = !collapse || block.style.seals_bottom();

    let mut outer = own;
    let mut gaps = Vec::new();
    // Bottom margin of the previous block not yet separated by content.
    let mut pending: Option<f32> = None;
    let mut seen_content = false;
    let mut last_was_block = false;

    for entry in group_contents(&block.children) {
        match entry {
            BlockEntry::Block(child) => {
                let margins = MarginPair::of(&child.style);
                let gap = if let Some(previous) = pending {
                    if collapse {
                        collapse_margins(previous, margins.top)
                    } else {
                        previous + margins.top
                    }
                } else if !seen_content && !sealed_top {
                    // STEP 1: The first child's top margin joins the parent's.
                    outer.top = collapse_margins(own.top, margins.top);
                    0.0
                } else {
                    margins.top
                };
                gaps.push(gap);
                pending = Some(margins.bottom);
                seen_content = true;
                last_was_block = true;
            }
            BlockEntry::Inline(group) if group.is_transparent() => gaps.push(0.0),
            BlockEntry::Inline(_) => {
                gaps.push(pending.take().unwrap_or(0.0));
                seen_content = true;
                last_was_block = false;
            }
        }
    }

    // STEP 2: The last child's bottom margin joins the parent's.
    let trailing = match pending {
        Some(bottom) if last_was_block && !sealed_bottom => {
            outer.bottom = collapse_margins(own.bottom, bottom);
            0.0
        }
        Some(bottom) if last_was_block => bottom,
        _ => 0.0,
    };

    BlockLayout {
        outer,
        gaps,
        trailing,
    }
}
