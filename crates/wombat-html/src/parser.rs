//! Tolerant tree construction.
//!
//! [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
//!
//! This is not the full insertion-mode machine. It keeps a stack of open
//! elements, closes void elements immediately, closes an open `p` the way
//! "close a p element" does, and ignores end tags that match nothing. That
//! covers the fragments the renderer is fed in practice.
//!
//! The result is always rooted at a `div` holding the document's body
//! content; `html`, `head` and `body` wrappers are unwrapped.

use thiserror::Error;
use wombat_common::whitespace;
use wombat_dom::{AttributesMap, ParsedChild, ParsedNode};

use crate::tokenizer::{HtmlTokenizer, Token};

/// Maximum nesting depth of open elements.
pub const MAX_DEPTH: usize = 512;

/// Tags whose whitespace-only text children are dropped.
pub const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "canvas", "dd", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "html", "li", "main", "nav", "noscript", "ol", "p", "pre", "section",
    "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Tags whose text keeps its whitespace verbatim.
const WHITESPACE_PRESERVING_TAGS: [&str; 3] = ["pre", "code", "textarea"];

/// [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
///
/// "Void elements: area, base, br, col, embed, hr, img, input, link, meta,
/// source, track, wbr"
const VOID_ELEMENTS: [&str; 13] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose content never reaches the render tree.
const SKIPPED_ELEMENTS: [&str; 4] = ["script", "style", "template", "title"];

/// Start tags that close an open `p` element.
///
/// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
///
/// "If the stack of open elements has a p element in button scope, then
/// close a p element."
const CLOSES_P: [&str; 27] = [
    "address", "article", "aside", "blockquote", "details", "dialog", "div", "dl", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "main", "nav", "ol", "p", "section", "ul",
];

/// Tree construction failures. They never escape [`parse`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Open elements nested deeper than [`MAX_DEPTH`].
    #[error("elements nested deeper than {max} levels")]
    NestingTooDeep {
        /// The depth limit that was exceeded.
        max: usize,
    },
    /// The document had no content the tree builder could use.
    #[error("document contains no markup")]
    EmptyDocument,
}

/// Parse `html` into a tree rooted at a `div`.
///
/// Never fails: on error the result is a `div` whose only child is the text
/// `failed parsing HTML: <reason>`.
#[must_use]
pub fn parse(html: &str) -> ParsedNode {
    match try_parse(html) {
        Ok(root) => root,
        Err(ParseError::EmptyDocument) => ParsedNode::new("div"),
        Err(error) => {
            log::debug!(target: "wombat::html", "parse failed: {error}");
            ParsedNode::new("div").with_text(format!("failed parsing HTML: {error}"))
        }
    }
}

/// Parse `html`, reporting tree construction failures.
///
/// # Errors
///
/// Returns [`ParseError::NestingTooDeep`] when open elements nest past
/// [`MAX_DEPTH`], and [`ParseError::EmptyDocument`] for input that is
/// empty after trimming.
pub fn try_parse(html: &str) -> Result<ParsedNode, ParseError> {
    if whitespace::is_blank(html) {
        return Err(ParseError::EmptyDocument);
    }
    let tokenizer = HtmlTokenizer::new(html);
    let tokens = tokenizer.run();
    let mut builder = TreeBuilder::new();
    for token in tokens {
        builder.process(token)?;
    }
    let mut root = builder.finish();
    normalize_whitespace(&mut root, false);
    Ok(root)
}

struct TreeBuilder {
    /// Open elements. Index 0 is the root `div` and is never popped.
    open: Vec<ParsedNode>,
    in_head: bool,
    /// Depth inside a skipped element, e.g. `script`.
    skipping: Option<String>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            open: vec![ParsedNode::new("div")],
            in_head: false,
            skipping: None,
        }
    }

    fn current(&mut self) -> &mut ParsedNode {
        let last = self.open.len() - 1;
        &mut self.open[last]
    }

    fn process(&mut self, token: Token) -> Result<(), ParseError> {
        if let Some(skipped) = &self.skipping {
            if matches!(&token, Token::EndTag { name } if name == skipped) {
                self.skipping = None;
            }
            return Ok(());
        }

        match token {
            Token::Doctype | Token::Comment(_) | Token::EndOfFile => {}
            Token::Character(text) => {
                if !self.in_head {
                    self.insert_text(&text);
                }
            }
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => self.start_tag(name, attributes, self_closing)?,
            Token::EndTag { name } => self.end_tag(&name),
        }
        Ok(())
    }

    fn start_tag(
        &mut self,
        name: String,
        attributes: Vec<(String, String)>,
        self_closing: bool,
    ) -> Result<(), ParseError> {
        match name.as_str() {
            "html" => return Ok(()),
            "head" => {
                self.in_head = true;
                return Ok(());
            }
            "body" => {
                self.in_head = false;
                return Ok(());
            }
            _ => {}
        }
        if SKIPPED_ELEMENTS.contains(&name.as_str()) {
            if !self_closing {
                self.skipping = Some(name);
            }
            return Ok(());
        }
        if self.in_head {
            // Anything but metadata ends the head implicitly.
            if matches!(name.as_str(), "meta" | "link" | "base") {
                return Ok(());
            }
            self.in_head = false;
        }

        // A line break is carried as text.
        if name == "br" {
            self.insert_text("\n");
            return Ok(());
        }

        if CLOSES_P.contains(&name.as_str()) {
            self.close_element_if_open("p");
        }
        if name == "li" {
            self.close_element_if_open("li");
        }
        if name == "dt" || name == "dd" {
            self.close_element_if_open("dt");
            self.close_element_if_open("dd");
        }

        let node = ParsedNode {
            attributes: attributes.into_iter().collect::<AttributesMap>(),
            children: Vec::new(),
            tag: name,
        };
        if self_closing || VOID_ELEMENTS.contains(&node.tag.as_str()) {
            self.current().children.push(ParsedChild::Node(node));
            return Ok(());
        }
        if self.open.len() >= MAX_DEPTH {
            return Err(ParseError::NestingTooDeep { max: MAX_DEPTH });
        }
        self.open.push(node);
        Ok(())
    }

    fn end_tag(&mut self, name: &str) {
        match name {
            "html" | "body" => {}
            "head" => self.in_head = false,
            // "An end tag whose tag name is "br"" is treated as a start tag.
            "br" => self.insert_text("\n"),
            // "If the stack of open elements does not have a p element in
            // button scope, then this is a parse error; insert an HTML
            // element for a "p" start tag token with no attributes."
            "p" if !self.has_open("p") => {
                self.current()
                    .children
                    .push(ParsedChild::Node(ParsedNode::new("p")));
            }
            _ => self.close_element_if_open(name),
        }
    }

    fn has_open(&self, name: &str) -> bool {
        self.open.iter().skip(1).any(|node| node.tag == name)
    }

    /// Pop elements up to and including the nearest open `name`.
    fn close_element_if_open(&mut self, name: &str) {
        let Some(index) = self.open.iter().skip(1).rposition(|node| node.tag == name) else {
            return;
        };
        let target = index + 1;
        while self.open.len() > target {
            self.pop_into_parent();
        }
    }

    fn pop_into_parent(&mut self) {
        if self.open.len() <= 1 {
            return;
        }
        if let Some(node) = self.open.pop() {
            self.current().children.push(ParsedChild::Node(node));
        }
    }

    fn insert_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let current = self.current();
        // Line breaks stay separate text children.
        if text != "\n"
            && let Some(ParsedChild::Text(previous)) = current.children.last_mut()
            && previous != "\n"
        {
            previous.push_str(text);
            return;
        }
        current.children.push(ParsedChild::Text(text.to_string()));
    }

    fn finish(mut self) -> ParsedNode {
        while self.open.len() > 1 {
            self.pop_into_parent();
        }
        self.open.pop().unwrap_or_else(|| ParsedNode::new("div"))
    }
}

/// Collapse whitespace outside `pre`/`code`/`textarea`, drop whitespace-only
/// text in block parents, and trim text at the inner edges of block parents.
fn normalize_whitespace(node: &mut ParsedNode, preserve: bool) {
    let preserve = preserve || WHITESPACE_PRESERVING_TAGS.contains(&node.tag.as_str());
    let is_block_parent = node.tag == "div" || BLOCK_TAGS.contains(&node.tag.as_str());

    for child in &mut node.children {
        match child {
            ParsedChild::Node(element) => normalize_whitespace(element, preserve),
            ParsedChild::Text(text) if !preserve && text != "\n" => {
                *text = whitespace::collapse(text);
            }
            ParsedChild::Text(_) => {}
        }
    }
    if preserve {
        return;
    }

    node.children.retain(|child| match child {
        ParsedChild::Text(text) => {
            !(text.is_empty() || (is_block_parent && text != "\n" && whitespace::is_blank(text)))
        }
        ParsedChild::Node(_) => true,
    });

    if is_block_parent {
        if let Some(ParsedChild::Text(first)) = node.children.first_mut() {
            *first = whitespace::trim_start(first).to_string();
        }
        if let Some(ParsedChild::Text(last)) = node.children.last_mut()
            && last != "\n"
        {
            *last = whitespace::trim_end(last).to_string();
        }
        node.children
            .retain(|child| !matches!(child, ParsedChild::Text(text) if text.is_empty()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_implied_paragraph_close() {
        let root = parse("<p>One<p>Two");
        let tags: Vec<&str> = root.element_children().map(|n| n.tag.as_str()).collect();
        assert_eq!(tags, ["p", "p"]);
    }

    #[test]
    fn test_nesting_limit() {
        let html = "<span>".repeat(MAX_DEPTH + 1);
        assert_eq!(
            try_parse(&html),
            Err(ParseError::NestingTooDeep { max: MAX_DEPTH })
        );
        let root = parse(&html);
        assert_eq!(
            root.text_content(),
            format!("failed parsing HTML: elements nested deeper than {MAX_DEPTH} levels")
        );
    }
}
