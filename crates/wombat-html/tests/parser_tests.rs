//! Integration tests for the tolerant tree builder.

use wombat_dom::{ParsedChild, ParsedNode};
use wombat_html::{ParseCache, parse, try_parse};

fn texts(node: &ParsedNode) -> Vec<String> {
    node.children
        .iter()
        .filter_map(|child| match child {
            ParsedChild::Text(text) => Some(text.clone()),
            ParsedChild::Node(_) => None,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Document structure
// ---------------------------------------------------------------------------

#[test]
fn test_root_is_div_with_body_content() {
    let root = parse("<!DOCTYPE html><html><head><title>T</title></head><body><p>Hi</p></body></html>");
    assert_eq!(root.tag, "div");
    let children: Vec<&ParsedNode> = root.element_children().collect();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].tag, "p");
    assert_eq!(children[0].text_content(), "Hi");
}

#[test]
fn test_fragment_without_body() {
    let root = parse("<p>Hello <img width=\"16\" height=\"16\"/> world</p>");
    let p = root.element_children().next().expect("p");
    assert_eq!(p.children.len(), 3);
    assert_eq!(p.children[0], ParsedChild::Text("Hello ".to_string()));
    match &p.children[1] {
        ParsedChild::Node(img) => {
            assert_eq!(img.tag, "img");
            assert_eq!(img.attribute("width"), Some("16"));
            assert_eq!(img.attribute("height"), Some("16"));
        }
        ParsedChild::Text(text) => panic!("expected img, got {text:?}"),
    }
    assert_eq!(p.children[2], ParsedChild::Text(" world".to_string()));
}

#[test]
fn test_void_elements_do_not_nest() {
    let root = parse("<div><img src=a.png><span>x</span></div>");
    let div = root.element_children().next().expect("div");
    let tags: Vec<&str> = div.element_children().map(|n| n.tag.as_str()).collect();
    assert_eq!(tags, ["img", "span"]);
}

#[test]
fn test_unmatched_end_tag_is_ignored() {
    let root = parse("<p>a</span>b</p>");
    let p = root.element_children().next().expect("p");
    assert_eq!(p.text_content(), "ab");
}

#[test]
fn test_script_and_comments_are_skipped() {
    let root = parse("<p>a<!-- note --><script>var x = '<p>';</script>b</p>");
    assert_eq!(root.text_content(), "ab");
    assert_eq!(root.element_count(), 2);
}

// ---------------------------------------------------------------------------
// Text handling
// ---------------------------------------------------------------------------

#[test]
fn test_line_break_becomes_newline_text() {
    let root = parse("<p>One<br>Two</p>");
    let p = root.element_children().next().expect("p");
    assert_eq!(texts(p), ["One", "\n", "Two"]);
}

#[test]
fn test_whitespace_collapses_outside_pre() {
    let root = parse("<p>  a \n\t b  </p><pre>  x\n  y</pre>");
    let mut children = root.element_children();
    assert_eq!(children.next().expect("p").text_content(), "a b");
    assert_eq!(children.next().expect("pre").text_content(), "  x\n  y");
}

#[test]
fn test_whitespace_only_text_dropped_in_block_parent() {
    let root = parse("<div>\n  <p>A</p>\n  <p>B</p>\n</div>");
    let div = root.element_children().next().expect("div");
    assert!(texts(div).is_empty());
    assert_eq!(div.element_children().count(), 2);
}

#[test]
fn test_whitespace_between_inlines_needs_minify() {
    // A bare space directly in a block parent is dropped; the minifier turns
    // it into a non-breaking space first.
    let root = parse("<p><b>a</b> <i>b</i></p>");
    let p = root.element_children().next().expect("p");
    assert!(texts(p).is_empty());

    let root = parse(&wombat_html::minify("<p><b>a</b> <i>b</i></p>"));
    let p = root.element_children().next().expect("p");
    assert_eq!(texts(p), ["\u{00A0}"]);
}

#[test]
fn test_character_references() {
    let root = parse("<p>&lt;a&gt; &amp; &quot;&#39;&#x41;&nbsp;&bogus;</p>");
    assert_eq!(root.text_content(), "<a> & \"'A\u{00A0}&bogus;");
}

// ---------------------------------------------------------------------------
// Failure handling
// ---------------------------------------------------------------------------

#[test]
fn test_empty_input_yields_empty_div() {
    assert!(try_parse("   ").is_err());
    let root = parse("");
    assert_eq!(root.tag, "div");
    assert!(root.children.is_empty());
}

#[test]
fn test_deep_nesting_degrades_to_error_text() {
    let root = parse(&"<div>".repeat(2000));
    assert_eq!(root.tag, "div");
    assert!(root.text_content().starts_with("failed parsing HTML: "));
}

// ---------------------------------------------------------------------------
// Parse cache
// ---------------------------------------------------------------------------

#[test]
fn test_parse_cache_serves_repeats() {
    let cache = ParseCache::new(4);
    let first = cache.parse("<p>cached</p>", true);
    let second = cache.parse("<p>cached</p>", true);
    assert_eq!(first, second);
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    let stats = cache.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
}

#[test]
fn test_parse_cache_separates_equal_length_documents() {
    let cache = ParseCache::new(4);
    let first = cache.parse("<p>abc</p>", false);
    let second = cache.parse("<p>xyz</p>", false);
    assert_eq!(first.text_content(), "abc");
    assert_eq!(second.text_content(), "xyz");
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.stats().misses, 2);
}

#[test]
fn test_parse_cache_keys_on_minify_flag() {
    let cache = ParseCache::new(4);
    let _ = cache.parse("<p>a</p>", false);
    let _ = cache.parse("<p>a</p>", true);
    assert_eq!(cache.len(), 2);
}
