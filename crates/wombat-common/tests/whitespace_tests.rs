//! Integration tests for the ASCII whitespace helpers.

use wombat_common::whitespace::{collapse, is_blank, to_non_breaking, trim, trim_end, trim_start};

#[test]
fn test_trim_includes_vertical_tab_and_form_feed() {
    assert_eq!(trim("\u{0B}\u{0C} a b \t\r\n"), "a b");
    assert_eq!(trim_start("  a "), "a ");
    assert_eq!(trim_end("  a "), "  a");
}

#[test]
fn test_trim_keeps_no_break_space() {
    assert_eq!(trim("\u{00A0}a\u{00A0}"), "\u{00A0}a\u{00A0}");
}

#[test]
fn test_is_blank() {
    assert!(is_blank(""));
    assert!(is_blank(" \n\t"));
    assert!(!is_blank(" x "));
    assert!(!is_blank("\u{00A0}"));
}

#[test]
fn test_to_non_breaking_replaces_breakable_whitespace() {
    assert_eq!(to_non_breaking("a b\tc\nd"), "a\u{00A0}b\u{00A0}c\u{00A0}d");
}

#[test]
fn test_collapse_merges_runs() {
    assert_eq!(collapse("a  \n\t b"), "a b");
    assert_eq!(collapse("a\u{00A0}\u{00A0}b"), "a\u{00A0}\u{00A0}b");
}
