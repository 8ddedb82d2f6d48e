//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! "Implementations must act as if they used the following state machine to
//! tokenize HTML."
//!
//! This is a reduced state machine: it keeps the states that decide where
//! tags, attributes, comments and text begin and end, and folds the rarely
//! needed ones (DOCTYPE internals, script escapes, CDATA) into bogus-comment
//! or raw-text handling. Parse errors are recovered silently, the way the
//! standard recovers them, and counted for diagnostics.

use strum_macros::Display;

/// Elements whose content is raw text up to the matching end tag.
///
/// [§ 13.2.6.2 Parsing elements that contain only text](https://html.spec.whatwg.org/multipage/parsing.html#parsing-elements-that-contain-only-text)
const RAW_TEXT_ELEMENTS: [&str; 5] = ["script", "style", "textarea", "title", "xmp"];

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "The output of the tokenization step is a series of zero or more of the
/// following tokens: DOCTYPE, start tag, end tag, comment, character,
/// end-of-file."
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A DOCTYPE. Its contents are irrelevant to rendering and discarded.
    Doctype,
    /// "Start and end tag tokens have a tag name, a self-closing flag, and a
    /// list of attributes"
    StartTag {
        /// Lowercased tag name.
        name: String,
        /// Attributes in source order; duplicates keep the first value.
        attributes: Vec<(String, String)>,
        /// "a self-closing flag"
        self_closing: bool,
    },
    /// End tag.
    EndTag {
        /// Lowercased tag name.
        name: String,
    },
    /// "Comment and character tokens have data."
    Comment(String),
    /// A run of character data with references already decoded.
    Character(String),
    /// End of input.
    EndOfFile,
}

/// The subset of tokenizer states this tokenizer implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokenizerState {
    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    Data,
    /// [§ 13.2.5.3 RAWTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state)
    RawText,
    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    TagOpen,
    /// [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
    EndTagOpen,
    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    TagName,
    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    BeforeAttributeName,
    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    AttributeName,
    /// [§ 13.2.5.34 After attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state)
    AfterAttributeName,
    /// [§ 13.2.5.35 Before attribute value state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state)
    BeforeAttributeValue,
    /// [§ 13.2.5.36 Attribute value (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state)
    AttributeValueDoubleQuoted,
    /// [§ 13.2.5.37 Attribute value (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(single-quoted)-state)
    AttributeValueSingleQuoted,
    /// [§ 13.2.5.38 Attribute value (unquoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state)
    AttributeValueUnquoted,
    /// [§ 13.2.5.39 After attribute value (quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-value-(quoted)-state)
    AfterAttributeValueQuoted,
    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    SelfClosingStartTag,
    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    BogusComment,
    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    MarkupDeclarationOpen,
    /// [§ 13.2.5.45 Comment state](https://html.spec.whatwg.org/multipage/parsing.html#comment-state)
    Comment,
}

/// Tag under construction.
#[derive(Debug, Default)]
struct TagBuilder {
    name: String,
    is_end: bool,
    self_closing: bool,
    attributes: Vec<(String, String)>,
    attribute_name: String,
    attribute_value: String,
}

impl TagBuilder {
    fn start(is_end: bool) -> Self {
        Self {
            is_end,
            ..Self::default()
        }
    }

    /// [§ 13.2.5.33](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    ///
    /// "When the user agent leaves the attribute name state (and before
    /// emitting the tag token, if appropriate), the complete attribute's name
    /// must be compared to the other attributes on the same token; if there
    /// is already an attribute on the token with the exact same name, then
    /// this is a duplicate-attribute parse error and the new attribute must
    /// be removed from the token."
    fn finish_attribute(&mut self) {
        if self.attribute_name.is_empty() {
            return;
        }
        let name = std::mem::take(&mut self.attribute_name);
        let value = std::mem::take(&mut self.attribute_value);
        if !self.attributes.iter().any(|(existing, _)| *existing == name) {
            self.attributes.push((name, value));
        }
    }

    fn into_token(mut self) -> Token {
        self.finish_attribute();
        if self.is_end {
            Token::EndTag { name: self.name }
        } else {
            Token::StartTag {
                name: self.name,
                attributes: self.attributes,
                self_closing: self.self_closing,
            }
        }
    }
}

/// HTML tokenizer over a borrowed input string.
pub struct HtmlTokenizer<'a> {
    input: &'a str,
    position: usize,
    state: TokenizerState,
    tag: TagBuilder,
    text: String,
    comment: String,
    /// Tag name whose end tag closes the current raw-text run.
    raw_text_end: Option<String>,
    tokens: Vec<Token>,
    parse_errors: usize,
}

impl<'a> HtmlTokenizer<'a> {
    /// Create a tokenizer in the data state.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            position: 0,
            state: TokenizerState::Data,
            tag: TagBuilder::default(),
            text: String::new(),
            comment: String::new(),
            raw_text_end: None,
            tokens: Vec::new(),
            parse_errors: 0,
        }
    }

    /// Number of recovered parse errors seen so far.
    #[must_use]
    pub const fn parse_errors(&self) -> usize {
        self.parse_errors
    }

    /// Consume the tokenizer, returning every token ending with
    /// [`Token::EndOfFile`].
    #[must_use]
    pub fn run(mut self) -> Vec<Token> {
        while let Some(c) = self.consume() {
            self.step(c);
        }
        self.finish();
        self.tokens
    }

    fn consume(&mut self) -> Option<char> {
        let c = self.input[self.position..].chars().next()?;
        self.position += c.len_utf8();
        Some(c)
    }

    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    /// "Reconsume in the X state": step back over `c` and switch.
    const fn reconsume_in(&mut self, c: char, state: TokenizerState) {
        self.position -= c.len_utf8();
        self.state = state;
    }

    fn next_few_characters_are_case_insensitive(&self, target: &str) -> bool {
        self.input[self.position..]
            .get(..target.len())
            .is_some_and(|s| s.eq_ignore_ascii_case(target))
    }

    const fn parse_error(&mut self) {
        self.parse_errors += 1;
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            self.tokens.push(Token::Character(std::mem::take(&mut self.text)));
        }
    }

    fn emit_tag(&mut self) {
        let tag = std::mem::take(&mut self.tag);
        let token = tag.into_token();
        if let Token::StartTag {
            name, self_closing, ..
        } = &token
            && !self_closing
            && RAW_TEXT_ELEMENTS.contains(&name.as_str())
        {
            self.raw_text_end = Some(name.clone());
        }
        self.tokens.push(token);
        self.state = if self.raw_text_end.is_some() {
            TokenizerState::RawText
        } else {
            TokenizerState::Data
        };
    }

    fn step(&mut self, c: char) {
        match self.state {
            // [§ 13.2.5.1 Data state]
            TokenizerState::Data => match c {
                // "U+0026 AMPERSAND (&) - Set the return state to the data
                // state. Switch to the character reference state."
                '&' => {
                    let decoded = self.consume_character_reference();
                    self.text.push_str(&decoded);
                }
                // "U+003C LESS-THAN SIGN (<) - Switch to the tag open state."
                '<' => self.state = TokenizerState::TagOpen,
                // "U+0000 NULL - This is an unexpected-null-character parse error."
                '\0' => self.parse_error(),
                _ => self.text.push(c),
            },

            TokenizerState::RawText => self.step_raw_text(c),

            // [§ 13.2.5.6 Tag open state]
            TokenizerState::TagOpen => match c {
                // "U+0021 EXCLAMATION MARK (!) - Switch to the markup
                // declaration open state."
                '!' => self.state = TokenizerState::MarkupDeclarationOpen,
                // "U+002F SOLIDUS (/) - Switch to the end tag open state."
                '/' => self.state = TokenizerState::EndTagOpen,
                // "ASCII alpha - Create a new start tag token, set its tag
                // name to the empty string. Reconsume in the tag name state."
                c if c.is_ascii_alphabetic() => {
                    self.flush_text();
                    self.tag = TagBuilder::start(false);
                    self.reconsume_in(c, TokenizerState::TagName);
                }
                // "U+003F QUESTION MARK (?) - This is an
                // unexpected-question-mark-instead-of-tag-name parse error.
                // Create a comment token whose data is the empty string.
                // Reconsume in the bogus comment state."
                '?' => {
                    self.parse_error();
                    self.flush_text();
                    self.reconsume_in(c, TokenizerState::BogusComment);
                }
                // "Anything else - This is an invalid-first-character-of-tag-name
                // parse error. Emit a U+003C LESS-THAN SIGN character token.
                // Reconsume in the data state."
                _ => {
                    self.parse_error();
                    self.text.push('<');
                    self.reconsume_in(c, TokenizerState::Data);
                }
            },

            // [§ 13.2.5.7 End tag open state]
            TokenizerState::EndTagOpen => match c {
                c if c.is_ascii_alphabetic() => {
                    self.flush_text();
                    self.tag = TagBuilder::start(true);
                    self.reconsume_in(c, TokenizerState::TagName);
                }
                // "U+003E GREATER-THAN SIGN (>) - This is a missing-end-tag-name
                // parse error. Switch to the data state."
                '>' => {
                    self.parse_error();
                    self.state = TokenizerState::Data;
                }
                _ => {
                    self.parse_error();
                    self.flush_text();
                    self.reconsume_in(c, TokenizerState::BogusComment);
                }
            },

            // [§ 13.2.5.8 Tag name state]
            TokenizerState::TagName => match c {
                '\t' | '\n' | '\x0C' | ' ' => self.state = TokenizerState::BeforeAttributeName,
                '/' => self.state = TokenizerState::SelfClosingStartTag,
                '>' => self.emit_tag(),
                // "ASCII upper alpha - Append the lowercase version of the
                // current input character to the current tag token's tag name."
                _ => self.tag.name.push(c.to_ascii_lowercase()),
            },

            // [§ 13.2.5.32 Before attribute name state]
            TokenizerState::BeforeAttributeName => match c {
                '\t' | '\n' | '\x0C' | ' ' => {}
                '/' | '>' => self.reconsume_in(c, TokenizerState::AfterAttributeName),
                // "U+003D EQUALS SIGN (=) - This is an
                // unexpected-equals-sign-before-attribute-name parse error.
                // Start a new attribute in the current tag token. Set that
                // attribute's name to the current input character."
                '=' => {
                    self.parse_error();
                    self.tag.finish_attribute();
                    self.tag.attribute_name.push(c);
                    self.state = TokenizerState::AttributeName;
                }
                _ => {
                    self.tag.finish_attribute();
                    self.reconsume_in(c, TokenizerState::AttributeName);
                }
            },

            // [§ 13.2.5.33 Attribute name state]
            TokenizerState::AttributeName => match c {
                '\t' | '\n' | '\x0C' | ' ' | '/' | '>' => {
                    self.reconsume_in(c, TokenizerState::AfterAttributeName);
                }
                '=' => self.state = TokenizerState::BeforeAttributeValue,
                _ => self.tag.attribute_name.push(c.to_ascii_lowercase()),
            },

            // [§ 13.2.5.34 After attribute name state]
            TokenizerState::AfterAttributeName => match c {
                '\t' | '\n' | '\x0C' | ' ' => {}
                '/' => self.state = TokenizerState::SelfClosingStartTag,
                '=' => self.state = TokenizerState::BeforeAttributeValue,
                '>' => self.emit_tag(),
                _ => {
                    self.tag.finish_attribute();
                    self.reconsume_in(c, TokenizerState::AttributeName);
                }
            },

            // [§ 13.2.5.35 Before attribute value state]
            TokenizerState::BeforeAttributeValue => match c {
                '\t' | '\n' | '\x0C' | ' ' => {}
                '"' => self.state = TokenizerState::AttributeValueDoubleQuoted,
                '\'' => self.state = TokenizerState::AttributeValueSingleQuoted,
                // "U+003E GREATER-THAN SIGN (>) - This is a
                // missing-attribute-value parse error. Switch to the data
                // state. Emit the current tag token."
                '>' => {
                    self.parse_error();
                    self.emit_tag();
                }
                _ => self.reconsume_in(c, TokenizerState::AttributeValueUnquoted),
            },

            // [§ 13.2.5.36 / § 13.2.5.37 Attribute value (quoted) states]
            TokenizerState::AttributeValueDoubleQuoted
            | TokenizerState::AttributeValueSingleQuoted => {
                let quote = if self.state == TokenizerState::AttributeValueDoubleQuoted {
                    '"'
                } else {
                    '\''
                };
                match c {
                    c if c == quote => self.state = TokenizerState::AfterAttributeValueQuoted,
                    '&' => {
                        let decoded = self.consume_character_reference();
                        self.tag.attribute_value.push_str(&decoded);
                    }
                    _ => self.tag.attribute_value.push(c),
                }
            }

            // [§ 13.2.5.38 Attribute value (unquoted) state]
            TokenizerState::AttributeValueUnquoted => match c {
                '\t' | '\n' | '\x0C' | ' ' => self.state = TokenizerState::BeforeAttributeName,
                '&' => {
                    let decoded = self.consume_character_reference();
                    self.tag.attribute_value.push_str(&decoded);
                }
                '>' => self.emit_tag(),
                _ => self.tag.attribute_value.push(c),
            },

            // [§ 13.2.5.39 After attribute value (quoted) state]
            TokenizerState::AfterAttributeValueQuoted => match c {
                '\t' | '\n' | '\x0C' | ' ' => self.state = TokenizerState::BeforeAttributeName,
                '/' => self.state = TokenizerState::SelfClosingStartTag,
                '>' => self.emit_tag(),
                // "Anything else - This is a missing-whitespace-between-attributes
                // parse error. Reconsume in the before attribute name state."
                _ => {
                    self.parse_error();
                    self.reconsume_in(c, TokenizerState::BeforeAttributeName);
                }
            },

            // [§ 13.2.5.40 Self-closing start tag state]
            TokenizerState::SelfClosingStartTag => match c {
                // "Set the self-closing flag of the current tag token. Switch
                // to the data state. Emit the current tag token."
                '>' => {
                    self.tag.self_closing = true;
                    self.emit_tag();
                }
                _ => {
                    self.parse_error();
                    self.reconsume_in(c, TokenizerState::BeforeAttributeName);
                }
            },

            // [§ 13.2.5.42 Markup declaration open state]
            TokenizerState::MarkupDeclarationOpen => {
                // "If the next few characters are: Two U+002D HYPHEN-MINUS
                // characters (-) - Consume those two characters, create a
                // comment token whose data is the empty string, and switch to
                // the comment start state."
                self.flush_text();
                if c == '-' && self.peek() == Some('-') {
                    let _ = self.consume();
                    self.comment.clear();
                    self.state = TokenizerState::Comment;
                } else if (c == 'D' || c == 'd') && self.next_few_characters_are_case_insensitive("octype") {
                    self.position += "octype".len();
                    self.skip_until_greater_than();
                    self.tokens.push(Token::Doctype);
                    self.state = TokenizerState::Data;
                } else {
                    self.parse_error();
                    self.reconsume_in(c, TokenizerState::BogusComment);
                }
            }

            // [§ 13.2.5.45 Comment state]
            TokenizerState::Comment => {
                if c == '-' && self.input[self.position..].starts_with("->") {
                    self.position += 2;
                    let data = std::mem::take(&mut self.comment);
                    self.tokens.push(Token::Comment(data));
                    self.state = TokenizerState::Data;
                } else {
                    self.comment.push(c);
                }
            }

            // [§ 13.2.5.41 Bogus comment state]
            TokenizerState::BogusComment => {
                if c == '>' {
                    let data = std::mem::take(&mut self.comment);
                    self.tokens.push(Token::Comment(data));
                    self.state = TokenizerState::Data;
                } else {
                    self.comment.push(c);
                }
            }
        }
    }

    /// Raw text runs until `</name` followed by whitespace, `/` or `>`.
    fn step_raw_text(&mut self, c: char) {
        let Some(end) = self.raw_text_end.clone() else {
            self.reconsume_in(c, TokenizerState::Data);
            return;
        };
        if c == '<' && self.input[self.position..].starts_with('/') {
            let after_slash = self.position + 1;
            let candidate = self.input.get(after_slash..after_slash + end.len());
            let terminator = self.input[after_slash..].chars().nth(end.len());
            if candidate.is_some_and(|s| s.eq_ignore_ascii_case(&end))
                && matches!(terminator, None | Some('\t' | '\n' | '\x0C' | ' ' | '/' | '>'))
            {
                self.flush_text();
                self.position = after_slash + end.len();
                self.skip_until_greater_than();
                self.tokens.push(Token::EndTag { name: end });
                self.raw_text_end = None;
                self.state = TokenizerState::Data;
                return;
            }
        }
        self.text.push(c);
    }

    fn skip_until_greater_than(&mut self) {
        while let Some(c) = self.consume() {
            if c == '>' {
                break;
            }
        }
    }

    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    ///
    /// Called after the `&` has been consumed. Returns the decoded text, or
    /// `"&"` when nothing matches ("flush code points consumed as a character
    /// reference").
    fn consume_character_reference(&mut self) -> String {
        let rest = &self.input[self.position..];
        if let Some(numeric) = rest.strip_prefix('#') {
            let (digits, radix, prefix_len) = match numeric.strip_prefix(['x', 'X']) {
                Some(hex) => (hex, 16, 2),
                None => (numeric, 10, 1),
            };
            let len = digits
                .char_indices()
                .find(|(_, ch)| !ch.is_digit(radix))
                .map_or(digits.len(), |(i, _)| i);
            if len == 0 {
                self.parse_error();
                return "&".to_string();
            }
            let value = u32::from_str_radix(&digits[..len], radix).unwrap_or(0x10FFFF + 1);
            self.position += prefix_len + len;
            if self.peek() == Some(';') {
                self.position += 1;
            } else {
                self.parse_error();
            }
            // [§ 13.2.5.80 Numeric character reference end state]
            // "If the number is 0x00 ... greater than 0x10FFFF ... or a
            // surrogate, then this is a parse error. Set the character
            // reference code to 0xFFFD."
            return char::from_u32(value)
                .filter(|&ch| ch != '\0')
                .unwrap_or('\u{FFFD}')
                .to_string();
        }

        let name_len = rest
            .char_indices()
            .find(|(_, ch)| !ch.is_ascii_alphanumeric())
            .map_or(rest.len(), |(i, _)| i);
        if name_len > 0
            && rest[name_len..].starts_with(';')
            && let Some(decoded) = named_character_reference(&rest[..name_len])
        {
            self.position += name_len + 1;
            return decoded.to_string();
        }
        "&".to_string()
    }

    fn finish(&mut self) {
        match self.state {
            TokenizerState::Comment | TokenizerState::BogusComment => {
                self.parse_error();
                let data = std::mem::take(&mut self.comment);
                self.tokens.push(Token::Comment(data));
            }
            // "EOF in tag" - the unfinished tag is dropped.
            TokenizerState::TagName
            | TokenizerState::BeforeAttributeName
            | TokenizerState::AttributeName
            | TokenizerState::AfterAttributeName
            | TokenizerState::BeforeAttributeValue
            | TokenizerState::AttributeValueDoubleQuoted
            | TokenizerState::AttributeValueSingleQuoted
            | TokenizerState::AttributeValueUnquoted
            | TokenizerState::AfterAttributeValueQuoted
            | TokenizerState::SelfClosingStartTag => self.parse_error(),
            TokenizerState::TagOpen | TokenizerState::EndTagOpen => {
                self.parse_error();
                self.text.push('<');
                if self.state == TokenizerState::EndTagOpen {
                    self.text.push('/');
                }
            }
            TokenizerState::Data
            | TokenizerState::RawText
            | TokenizerState::MarkupDeclarationOpen => {}
        }
        self.flush_text();
        self.tokens.push(Token::EndOfFile);
    }
}

/// Common named character references.
///
/// [§ 13.5 Named character references](https://html.spec.whatwg.org/multipage/named-characters.html)
fn named_character_reference(name: &str) -> Option<&'static str> {
    Some(match name {
        "nbsp" => "\u{00A0}",
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "copy" => "\u{00A9}",
        "reg" => "\u{00AE}",
        "trade" => "\u{2122}",
        "hellip" => "\u{2026}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201C}",
        "rdquo" => "\u{201D}",
        "middot" => "\u{00B7}",
        "zwj" => "\u{200D}",
        "zwnj" => "\u{200C}",
        "ensp" => "\u{2002}",
        "emsp" => "\u{2003}",
        "thinsp" => "\u{2009}",
        _ => return None,
    })
}
