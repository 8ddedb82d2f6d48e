//! Integration tests for render-tree construction and ruby merge.

use std::sync::Arc;

use wombat_css::tags::{TagBehavior, no_style};
use wombat_css::{
    ApproximateFontMetrics, BlockElement, DeclarationCache, DefaultAttributeStyler,
    FontDescriptor, InlineContent, InlineElement, LineBreakMode, RenderElement,
    RenderTreeBuilder, StyleContainer, StyleContext, TEXT_TAG, TagKind, TagRegistry,
};

fn build_with(registry: &TagRegistry, html: &str) -> BlockElement {
    let cache = DeclarationCache::default();
    let metrics = ApproximateFontMetrics;
    let styler = DefaultAttributeStyler;
    let context = StyleContext {
        declarations: &cache,
        metrics: &metrics,
        ruby_scale: 0.58,
    };
    let builder = RenderTreeBuilder::new(registry, &styler, context);
    let initial = Arc::new(StyleContainer::with_font(FontDescriptor::system(16.0)));
    builder.build_root(&wombat_html::parse(html), &initial)
}

fn build(html: &str) -> BlockElement {
    build_with(&TagRegistry::default(), html)
}

/// Every inline leaf in document order.
fn inlines(block: &BlockElement) -> Vec<&InlineElement> {
    let mut out = Vec::new();
    for child in &block.children {
        match child {
            RenderElement::Block(inner) => out.extend(inlines(inner)),
            RenderElement::Inline(inline) => out.push(inline),
        }
    }
    out
}

fn ruby_attachments(block: &BlockElement) -> Vec<&InlineElement> {
    inlines(block)
        .into_iter()
        .filter(|inline| inline.is_attachment() && inline.tag == "ruby")
        .collect()
}

// ---------------------------------------------------------------------------
// Classification and flattening
// ---------------------------------------------------------------------------

#[test]
fn test_root_is_block() {
    let root = build("<p>hi</p>");
    assert_eq!(root.tag, "div");
    assert_eq!(root.children.len(), 1);
    assert_eq!(root.children[0].tag(), "p");
}

#[test]
fn test_inline_tags_are_flattened() {
    let root = build("<p>a <b>bold <i>both</i></b> c</p>");
    let p = root.children[0].as_block().unwrap();
    assert!(p.children.iter().all(|child| child.as_inline().is_some()));
    let texts: Vec<&str> = p
        .children
        .iter()
        .filter_map(|child| child.as_inline().and_then(InlineElement::text))
        .collect();
    assert_eq!(texts, vec!["a ", "bold ", "both", " c"]);
    assert!(p.children.iter().all(|child| child.tag() == TEXT_TAG));

    let bold = &p.children[1].style().font;
    assert!(bold.as_ref().unwrap().is_bold());
    let both = p.children[2].style().font.as_ref().unwrap();
    assert!(both.is_bold() && both.italic);
    assert!(!p.children[3].style().font.as_ref().unwrap().is_bold());
}

#[test]
fn test_unknown_tag_is_block() {
    let root = build("<custom-box>x</custom-box>");
    assert!(root.children[0].as_block().is_some());
    assert_eq!(TagRegistry::default().kind("custom-box"), TagKind::Block);
}

#[test]
fn test_attachment_subtree_is_not_visited() {
    let registry = TagRegistry::default().register("widget", TagBehavior::Attachment(no_style));
    let root = build_with(&registry, "<p>x<widget><b>inside</b></widget></p>");
    let all = inlines(&root);
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].tag, "widget");
    assert_eq!(all[1].content, InlineContent::Attachment);
}

#[test]
fn test_img_is_attachment() {
    let root = build("<p>Hello <img width=\"16\" height=\"16\"/> world</p>");
    let all = inlines(&root);
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].text(), Some("Hello "));
    assert!(all[1].is_attachment());
    assert_eq!(all[1].attributes.get("width"), Some("16"));
    assert_eq!(all[2].text(), Some(" world"));
}

#[test]
fn test_styles_cascade_and_share() {
    let root = build("<div style=\"color: red; margin: 4px\"><p>text</p></div>");
    let div = root.children[0].as_block().unwrap();
    let p = div.children[0].as_block().unwrap();
    assert_eq!(p.style.foreground_color, div.style.foreground_color);
    // Margins are not inherited.
    assert!(p.style.margin.is_zero());
    assert!(!div.style.margin.is_zero());
    // An unchanged cascade hands down the parent's container.
    let text = p.children[0].as_inline().unwrap();
    assert!(Arc::ptr_eq(&text.style, &p.style));
}

#[test]
fn test_link_style_records_target() {
    let root = build("<p><a href=\"https://example.org\">go</a></p>");
    let link = inlines(&root)[0];
    assert_eq!(link.style.link.as_deref(), Some("https://example.org"));
}

#[test]
fn test_char_wrapping_inserts_break_opportunities() {
    let root = build("<p style=\"word-break: break-all\">abc</p>");
    let p = root.children[0].as_block().unwrap();
    assert_eq!(p.style.line_break_mode, LineBreakMode::ByCharWrapping);
    assert_eq!(inlines(&root)[0].text(), Some("a\u{200B}b\u{200B}c"));
}

#[test]
fn test_registry_register_returns_new_mapping() {
    let base = TagRegistry::default();
    let extended = base.clone().register("video", TagBehavior::Attachment(no_style));
    assert_eq!(base.kind("video"), TagKind::Block);
    assert_eq!(extended.kind("video"), TagKind::Attachment);
    assert_eq!(extended.kind("span"), TagKind::Inline);
}

// ---------------------------------------------------------------------------
// Ruby
// ---------------------------------------------------------------------------

#[test]
fn test_ruby_merge_with_rb_and_rp() {
    let root = build("<p><ruby><rb>漢字</rb><rp>(</rp><rt>かんじ</rt><rp>)</rp></ruby></p>");
    let rubies = ruby_attachments(&root);
    assert_eq!(rubies.len(), 1);
    let ruby = rubies[0];
    assert_eq!(ruby.attributes.get("ruby-base"), Some("漢字"));
    assert_eq!(ruby.attributes.get("ruby-text"), Some("かんじ"));
    assert_eq!(ruby.attributes.get("ruby-scale"), Some("0.58"));
    assert_eq!(ruby.attributes.get("ruby-font-size"), Some("16"));
    // No fallback parentheses leak into the tree.
    assert!(inlines(&root).iter().all(|inline| inline.text().is_none()));
}

#[test]
fn test_ruby_merge_without_rb() {
    let root = build("<ruby>漢<rt>かん</rt>字<rt>じ</rt></ruby>");
    let ruby = ruby_attachments(&root)[0];
    assert_eq!(ruby.attributes.get("ruby-base"), Some("漢字"));
    assert_eq!(ruby.attributes.get("ruby-text"), Some("かん\u{00A0}じ"));
}

#[test]
fn test_ruby_merge_through_rtc() {
    let root = build("<ruby><rb>東京</rb><rtc ruby-position=\"under\"><rt>とう</rt><rt>きょう</rt></rtc></ruby>");
    let ruby = ruby_attachments(&root)[0];
    assert_eq!(ruby.attributes.get("ruby-text"), Some("とう\u{00A0}きょう"));
    assert_eq!(ruby.attributes.get("ruby-position"), Some("under"));
}

#[test]
fn test_ruby_base_whitespace_is_non_breaking() {
    let root = build("<ruby>New York<rt>ny</rt></ruby>");
    let ruby = ruby_attachments(&root)[0];
    assert_eq!(ruby.attributes.get("ruby-base"), Some("New\u{00A0}York"));
}

#[test]
fn test_ruby_base_keeps_trailing_whitespace() {
    let root = build("<p><ruby>漢 字 <rt>かんじ</rt></ruby></p>");
    let ruby = ruby_attachments(&root)[0];
    assert_eq!(ruby.attributes.get("ruby-base"), Some("漢\u{00A0}字\u{00A0}"));
}

#[test]
fn test_ruby_empty_rb_keeps_implicit_base() {
    let root = build("<p><ruby>漢字<rb></rb><rt>かんじ</rt></ruby></p>");
    let rubies = ruby_attachments(&root);
    assert_eq!(rubies.len(), 1);
    assert_eq!(rubies[0].attributes.get("ruby-base"), Some("漢字"));
    assert_eq!(rubies[0].attributes.get("ruby-text"), Some("かんじ"));
}

#[test]
fn test_ruby_rtc_collects_rt_text_only() {
    let root = build("<p><ruby>漢<rtc>junk<span>more</span><rt>かん</rt></rtc></ruby></p>");
    let ruby = ruby_attachments(&root)[0];
    assert_eq!(ruby.attributes.get("ruby-text"), Some("かん"));
}

#[test]
fn test_ruby_own_position_wins() {
    let root = build(
        "<ruby style=\"ruby-position: over\">字<rt style=\"ruby-position: under\">じ</rt></ruby>",
    );
    let ruby = ruby_attachments(&root)[0];
    assert_eq!(ruby.attributes.get("ruby-position"), Some("over"));
}

#[test]
fn test_ruby_invalid_position_is_dropped() {
    let root = build("<ruby ruby-position=\"sideways\">字<rt>じ</rt></ruby>");
    let ruby = ruby_attachments(&root)[0];
    assert_eq!(ruby.attributes.get("ruby-position"), None);
}

#[test]
fn test_ruby_annotation_overrides() {
    let root = build(
        "<ruby>字<rt style=\"font-size: 8px; color: #ff0000\">じ</rt></ruby>",
    );
    let ruby = ruby_attachments(&root)[0];
    assert_eq!(ruby.attributes.get("ruby-annotation-font-size"), Some("8"));
    assert_eq!(ruby.attributes.get("ruby-annotation-color"), Some("#ff0000"));
    // The family was not declared on the rt.
    assert_eq!(ruby.attributes.get("ruby-annotation-font-name"), None);
}

#[test]
fn test_ruby_without_annotation_has_no_text() {
    let root = build("<ruby>字</ruby>");
    let ruby = ruby_attachments(&root)[0];
    assert_eq!(ruby.attributes.get("ruby-base"), Some("字"));
    assert!(!ruby.attributes.contains("ruby-text"));
}

#[test]
fn test_ruby_without_base_degrades() {
    let root = build("<p><ruby><rt>かんじ</rt></ruby></p>");
    assert!(ruby_attachments(&root).is_empty());
    for inline in inlines(&root) {
        assert!(!inline.attributes.contains("ruby-base"));
        assert!(!inline.attributes.contains("ruby-text"));
    }
    // The annotation is dropped along with the ruby.
    assert!(inlines(&root).is_empty());
}

#[test]
fn test_ruby_empty_base_keeps_other_content() {
    let root = build("<p><ruby><rt>x</rt><span></span></ruby>after</p>");
    assert!(ruby_attachments(&root).is_empty());
    let texts: Vec<&str> = inlines(&root).iter().filter_map(|i| i.text()).collect();
    assert!(texts.contains(&"after"));
    assert!(!texts.contains(&"x"));
}
