//! ASCII whitespace helpers.
//!
//! [§ 2.3.3 ASCII whitespace](https://infra.spec.whatwg.org/#ascii-whitespace)
//!
//! "ASCII whitespace is U+0009 TAB, U+000A LF, U+000C FF, U+000D CR, or
//! U+0020 SPACE."
//!
//! The renderer also treats U+000B VT as whitespace, so markup produced by
//! older editors trims the same way as modern input. Non-ASCII whitespace
//! (including U+00A0 NO-BREAK SPACE) is never trimmed: it is how callers
//! keep a visible space.

/// U+00A0 NO-BREAK SPACE.
pub const NBSP: char = '\u{00A0}';

/// Whether `byte` is one of the ASCII whitespace bytes.
#[must_use]
pub const fn is_ascii_whitespace_byte(byte: u8) -> bool {
    matches!(byte, 0x09 | 0x0A | 0x0B | 0x0C | 0x0D | 0x20)
}

/// Whether `ch` is ASCII whitespace.
#[must_use]
pub const fn is_ascii_whitespace(ch: char) -> bool {
    ch.is_ascii() && is_ascii_whitespace_byte(ch as u8)
}

/// Strip leading and trailing ASCII whitespace.
#[must_use]
pub fn trim(value: &str) -> &str {
    trim_end(trim_start(value))
}

/// Strip leading ASCII whitespace.
#[must_use]
pub fn trim_start(value: &str) -> &str {
    value.trim_start_matches(is_ascii_whitespace)
}

/// Strip trailing ASCII whitespace.
#[must_use]
pub fn trim_end(value: &str) -> &str {
    value.trim_end_matches(is_ascii_whitespace)
}

/// Whether `value` is empty or consists only of ASCII whitespace.
#[must_use]
pub fn is_blank(value: &str) -> bool {
    value.bytes().all(is_ascii_whitespace_byte)
}

/// Replace TAB, LF, CR and SPACE with U+00A0 so a run of text cannot be
/// broken or collapsed by the shaping engine.
#[must_use]
pub fn to_non_breaking(value: &str) -> String {
    value
        .chars()
        .map(|ch| match ch {
            '\t' | '\n' | '\r' | ' ' => NBSP,
            other => other,
        })
        .collect()
}

/// Collapse every run of whitespace to a single U+0020.
///
/// Non-ASCII whitespace other than U+00A0 collapses too; U+00A0 is kept.
#[must_use]
pub fn collapse(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut last_was_space = false;
    for ch in value.chars() {
        let is_space = if ch.is_ascii() {
            is_ascii_whitespace(ch)
        } else {
            ch != NBSP && ch.is_whitespace()
        };
        if is_space {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    out
}
