//! Integration tests for the parsed document tree.

use wombat_dom::{AttributesMap, ParsedChild, ParsedNode, print_tree};

#[test]
fn test_attributes_preserve_insertion_order() {
    let mut attrs = AttributesMap::new();
    attrs.insert("width", "16");
    attrs.insert("height", "16");
    attrs.insert("alt", "icon");
    let names: Vec<&str> = attrs.iter().map(|(k, _)| k).collect();
    assert_eq!(names, ["width", "height", "alt"]);
}

#[test]
fn test_attribute_replace_keeps_position() {
    let mut attrs: AttributesMap = [("a", "1"), ("b", "2")].into_iter().collect();
    attrs.insert("a", "3");
    assert_eq!(attrs.iter().collect::<Vec<_>>(), [("a", "3"), ("b", "2")]);
    assert_eq!(attrs.remove("a").as_deref(), Some("3"));
    assert!(!attrs.contains("a"));
    assert_eq!(attrs.len(), 1);
}

#[test]
fn test_text_content_concatenates_in_tree_order() {
    let node = ParsedNode::new("p")
        .with_text("Hello ")
        .with_child(ParsedNode::new("b").with_text("bold"))
        .with_text(" world");
    assert_eq!(node.text_content(), "Hello bold world");
    assert_eq!(node.element_count(), 2);
}

#[test]
fn test_element_children_skip_text() {
    let node = ParsedNode::new("ruby")
        .with_text("漢")
        .with_child(ParsedNode::new("rt").with_text("かん"));
    let tags: Vec<&str> = node.element_children().map(|n| n.tag.as_str()).collect();
    assert_eq!(tags, ["rt"]);
    assert!(matches!(node.children[0], ParsedChild::Text(_)));
}

#[test]
fn test_print_tree_indents_children() {
    let node = ParsedNode::new("div")
        .with_attribute("id", "x")
        .with_child(ParsedNode::new("p").with_text("A"));
    let printed = print_tree(&node);
    assert_eq!(printed, "<div id=\"x\">\n  <p>\n    \"A\"\n");
}
