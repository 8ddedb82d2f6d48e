//! Ruby annotation merge.
//!
//! [CSS Ruby Level 1 § 2 Ruby Box Model](https://www.w3.org/TR/css-ruby-1/#ruby-model)
//!
//! A `<ruby>` subtree becomes one attachment whose attributes carry the base
//! text, the annotation text and the placement hints a ruby renderer needs:
//!
//! | attribute | source |
//! |---|---|
//! | `ruby-base` | `rb` text if any `rb` has text, else all other content |
//! | `ruby-text` | trimmed `rt` pieces joined by U+00A0, omitted when empty |
//! | `ruby-position` | the ruby's own attribute or style, else the first `rt`/`rtc` |
//! | `ruby-scale` | annotation size ratio from the style context |
//! | `ruby-font-name`, `ruby-font-size` | the ruby's cascaded font |
//! | `ruby-annotation-font-size`, `-name`, `-color` | the first `rt`, when declared there |
//!
//! Whitespace in both texts is made non-breaking so the renderer keeps the
//! annotation aligned with its base.

use std::sync::Arc;

use wombat_common::whitespace;
use wombat_dom::{AttributesMap, ParsedChild, ParsedNode};

use super::render_tree::RenderTreeBuilder;
use crate::style::{AttributeValue, CssDeclarations, RubyPosition, StyleContainer};

/// The ruby container tag.
pub const RUBY_TAG: &str = "ruby";

/// Whether `tag` is annotation or fallback markup inside a ruby.
#[must_use]
pub fn is_annotation_tag(tag: &str) -> bool {
    matches!(tag, "rt" | "rtc" | "rp")
}

/// Texts and hints collected from a ruby subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RubyParts<'a> {
    /// Base text with whitespace made non-breaking, untrimmed; may be empty.
    pub base: String,
    /// Annotation text, pieces joined by U+00A0; may be empty.
    pub text: String,
    /// `ruby-position` found on an `rt` or `rtc`.
    pub annotation_position: Option<String>,
    /// The first `rt`, whose style supplies annotation font overrides.
    pub first_annotation: Option<&'a ParsedNode>,
}

#[derive(Default)]
struct Scan<'a> {
    base: String,
    rb_text: String,
    has_rb: bool,
    pieces: Vec<String>,
    position: Option<String>,
    first_rt: Option<&'a ParsedNode>,
}

impl<'a> Scan<'a> {
    fn annotation(&mut self, rt: &'a ParsedNode) {
        self.note_position(rt);
        if self.first_rt.is_none() {
            self.first_rt = Some(rt);
        }
        self.piece(&rt.text_content());
    }

    fn piece(&mut self, text: &str) {
        let trimmed = whitespace::trim(text);
        if !trimmed.is_empty() {
            self.pieces.push(whitespace::to_non_breaking(trimmed));
        }
    }

    /// Annotation text comes from `rt` descendants only; anything else
    /// inside an `rtc` is ignored.
    fn container(&mut self, rtc: &'a ParsedNode) {
        self.note_position(rtc);
        for child in &rtc.children {
            if let ParsedChild::Node(node) = child {
                match node.tag.as_str() {
                    "rt" => self.annotation(node),
                    "rp" => {}
                    _ => self.container(node),
                }
            }
        }
    }

    /// An `rb` replaces the implicit base only once it contributes text.
    fn base_element(&mut self, rb: &ParsedNode) {
        let before = self.rb_text.len();
        rb.append_text_content(&mut self.rb_text);
        if self.rb_text.len() > before {
            self.has_rb = true;
        }
    }

    fn note_position(&mut self, node: &ParsedNode) {
        if self.position.is_none() {
            self.position = declared_position(node, None);
        }
    }
}

/// `ruby-position` from the attribute, then from the inline style.
fn declared_position(node: &ParsedNode, declarations: Option<&CssDeclarations>) -> Option<String> {
    if let Some(value) = node.attribute("ruby-position") {
        return Some(whitespace::trim(value).to_string());
    }
    let parsed;
    let declarations = match declarations {
        Some(declarations) => Some(declarations),
        None => {
            parsed = node.attribute("style").and_then(CssDeclarations::parse);
            parsed.as_ref()
        }
    };
    declarations
        .and_then(|declarations| declarations.get("ruby-position"))
        .map(str::to_string)
}

/// Collect base and annotation text from a `<ruby>` subtree.
#[must_use]
pub fn scan_ruby(node: &ParsedNode) -> RubyParts<'_> {
    let mut scan = Scan::default();
    for child in &node.children {
        match child {
            ParsedChild::Text(text) => scan.base.push_str(text),
            ParsedChild::Node(inner) => match inner.tag.as_str() {
                "rt" => scan.annotation(inner),
                "rtc" => scan.container(inner),
                "rp" => {}
                "rb" => scan.base_element(inner),
                "rbc" => {
                    for rbc_child in &inner.children {
                        match rbc_child {
                            ParsedChild::Node(rb) if rb.tag == "rb" => scan.base_element(rb),
                            ParsedChild::Node(other) => other.append_text_content(&mut scan.base),
                            ParsedChild::Text(text) => scan.base.push_str(text),
                        }
                    }
                }
                _ => inner.append_text_content(&mut scan.base),
            },
        }
    }

    let base = if scan.has_rb { &scan.rb_text } else { &scan.base };
    RubyParts {
        base: whitespace::to_non_breaking(base),
        text: scan.pieces.join("\u{00A0}"),
        annotation_position: scan.position,
        first_annotation: scan.first_rt,
    }
}

/// Build the synthesized attributes of a ruby attachment.
///
/// Returns `None` when the base text is empty; the caller then flattens the
/// ruby's base content instead.
#[must_use]
pub fn merge_ruby(
    node: &ParsedNode,
    style: &Arc<StyleContainer>,
    builder: &RenderTreeBuilder<'_>,
) -> Option<AttributesMap> {
    let parts = scan_ruby(node);
    if parts.base.is_empty() {
        log::trace!(target: "wombat::render", "ruby without base text degrades to inline");
        return None;
    }

    let context = builder.context();
    let own_declarations = node
        .attribute("style")
        .and_then(|text| AttributeValue(text).as_declarations(context.declarations));

    let mut attributes = node.attributes.clone();
    attributes.insert("ruby-base", parts.base);
    if !parts.text.is_empty() {
        attributes.insert("ruby-text", parts.text);
    }

    // Position: the ruby's own declaration wins over the annotation's.
    let position = declared_position(node, own_declarations.as_deref())
        .or(parts.annotation_position)
        .filter(|value| RubyPosition::parse(value).is_some());
    if let Some(position) = position {
        attributes.insert("ruby-position", position);
    }
    attributes.insert("ruby-scale", context.ruby_scale.to_string());

    if let Some(font) = &style.font {
        attributes.insert("ruby-font-name", font.family.clone());
        attributes.insert("ruby-font-size", font.point_size().to_string());
    }

    if let Some(rt) = parts.first_annotation {
        let rt_declarations = rt
            .attribute("style")
            .and_then(|text| AttributeValue(text).as_declarations(context.declarations));
        let declares = |names: &[&str]| {
            rt_declarations
                .as_ref()
                .is_some_and(|d| names.iter().any(|name| d.contains(name)))
        };
        let rt_style = builder.resolve_style(rt, style, None);
        if let Some(font) = &rt_style.font {
            if declares(&["font-size", "font"]) {
                attributes.insert("ruby-annotation-font-size", font.point_size().to_string());
            }
            if declares(&["font-family", "font"]) {
                attributes.insert("ruby-annotation-font-name", font.family.clone());
            }
        }
        if declares(&["color"])
            && let Some(color) = rt_style.foreground_color
        {
            attributes.insert("ruby-annotation-color", color.to_hex_string());
        }
    }
    Some(attributes)
}
