//! Whitespace minifier for authored markup.
//!
//! Authored HTML is usually indented. The minifier removes the indentation
//! between tags without changing what the text renders as:
//!
//! 1. Whitespace following a `<br>` is dropped; the break already ends the line.
//! 2. Whitespace between two tags that contains a newline is indentation and
//!    is removed.
//! 3. Whitespace between two tags without a newline is deliberate spacing and
//!    becomes one `&nbsp;` per character, so the parser cannot drop it.
//! 4. Inside text, every run of newlines and tabs becomes a single space.

/// Minify `html`. Inputs of three bytes or fewer are returned unchanged.
#[must_use]
pub fn minify(html: &str) -> String {
    if html.len() <= 3 {
        return html.to_string();
    }

    // STEP 1: Drop whitespace after line breaks.
    let html = drop_whitespace_after_breaks(html);

    // STEP 2 and 3: Rewrite whitespace-only text between tags.
    let pieces = split_pieces(&html);
    let mut out = String::with_capacity(html.len());
    for (index, piece) in pieces.iter().enumerate() {
        match piece {
            Piece::Tag(tag) => out.push_str(tag),
            Piece::Text(text) => {
                let between_tags = index > 0
                    && matches!(pieces.get(index + 1), Some(Piece::Tag(_)))
                    && matches!(pieces.get(index - 1), Some(Piece::Tag(_)));
                if between_tags && text.chars().all(char::is_whitespace) {
                    if !text.contains(['\n', '\r']) {
                        for _ in text.chars() {
                            out.push_str("&nbsp;");
                        }
                    }
                } else {
                    // STEP 4: Newline and tab runs inside text become a space.
                    push_collapsing_breaks(&mut out, text);
                }
            }
        }
    }
    out.replace('\t', " ")
}

#[derive(Debug, PartialEq, Eq)]
enum Piece<'a> {
    Tag(&'a str),
    Text(&'a str),
}

/// Split into `<...>` tags and the text between them.
fn split_pieces(html: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut rest = html;
    while !rest.is_empty() {
        if rest.starts_with('<')
            && let Some(end) = rest.find('>')
            && !rest[1..end].contains('<')
        {
            pieces.push(Piece::Tag(&rest[..=end]));
            rest = &rest[end + 1..];
            continue;
        }
        // A lone '<' with no closing '>' is text.
        let search_from = usize::from(rest.starts_with('<'));
        let end = rest[search_from..]
            .find('<')
            .map_or(rest.len(), |i| i + search_from);
        pieces.push(Piece::Text(&rest[..end]));
        rest = &rest[end..];
    }
    pieces
}

/// Rewrite `<br>`, `<br/>` and `<br />` followed by whitespace to `<br>`.
fn drop_whitespace_after_breaks(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = find_ignore_ascii_case(rest, "<br") {
        out.push_str(&rest[..start]);
        let after_name = &rest[start + 3..];
        let inner = after_name.trim_start_matches(|c: char| c.is_ascii_whitespace());
        let inner = inner.strip_prefix('/').unwrap_or(inner);
        let Some(after_tag) = inner.strip_prefix('>') else {
            out.push_str(&rest[start..start + 3]);
            rest = after_name;
            continue;
        };
        let trimmed = after_tag.trim_start_matches(char::is_whitespace);
        if trimmed.len() == after_tag.len() {
            // No trailing whitespace: keep the tag exactly as written.
            let tag_len = rest.len() - start - after_tag.len();
            out.push_str(&rest[start..start + tag_len]);
        } else {
            out.push_str("<br>");
        }
        rest = trimmed;
    }
    out.push_str(rest);
    out
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}

fn push_collapsing_breaks(out: &mut String, text: &str) {
    let mut in_run = false;
    for ch in text.chars() {
        if matches!(ch, '\n' | '\r' | '\t') {
            if !in_run {
                out.push(' ');
                in_run = true;
            }
        } else {
            out.push(ch);
            in_run = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_pieces_keeps_stray_less_than_as_text() {
        assert_eq!(
            split_pieces("a < b<i>"),
            vec![Piece::Text("a "), Piece::Text("< b"), Piece::Tag("<i>")]
        );
    }

    #[test]
    fn test_break_without_trailing_whitespace_is_untouched() {
        assert_eq!(drop_whitespace_after_breaks("a<br/>b"), "a<br/>b");
        assert_eq!(drop_whitespace_after_breaks("a<BR />\n b"), "a<br>b");
    }
}
