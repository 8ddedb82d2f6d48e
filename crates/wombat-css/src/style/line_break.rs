//! Line-break modes.
//!
//! [CSS Text Level 3 § 5.2 Breaking Rules for Letters: the word-break property](https://www.w3.org/TR/css-text-3/#word-break-property)

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Serialize, Serializer};

/// U+200B ZERO WIDTH SPACE, a break opportunity with no width.
pub const ZERO_WIDTH_SPACE: char = '\u{200B}';

/// How text in a run may wrap.
///
/// Modes compare and hash by [`LineBreakMode::id`]; two custom modes with
/// the same id are the same mode.
#[derive(Debug, Clone, Copy, Default)]
pub enum LineBreakMode {
    /// Break at word boundaries.
    #[default]
    ByWordWrapping,
    /// "break-all: Breaking is allowed within words."
    ByCharWrapping,
    /// A named text transform applied before shaping.
    Custom {
        /// Stable identity of the mode.
        id: &'static str,
        /// Rewrites text before it reaches the shaper.
        transform: fn(&str) -> String,
    },
}

impl LineBreakMode {
    /// Identity string.
    #[must_use]
    pub const fn id(&self) -> &'static str {
        match self {
            Self::ByWordWrapping => "byWordWrapping",
            Self::ByCharWrapping => "byCharWrapping",
            Self::Custom { id, .. } => *id,
        }
    }

    /// Rewrite `text` for this mode.
    ///
    /// Character wrapping inserts a zero width space between characters so
    /// every position becomes a break opportunity. No space is inserted next
    /// to a line feed.
    #[must_use]
    pub fn transform<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match self {
            Self::ByWordWrapping => Cow::Borrowed(text),
            Self::ByCharWrapping => {
                let mut out = String::with_capacity(text.len() * 2);
                let mut previous: Option<char> = None;
                for ch in text.chars() {
                    if let Some(prev) = previous
                        && prev != '\n'
                        && ch != '\n'
                    {
                        out.push(ZERO_WIDTH_SPACE);
                    }
                    out.push(ch);
                    previous = Some(ch);
                }
                Cow::Owned(out)
            }
            Self::Custom { transform, .. } => Cow::Owned(transform(text)),
        }
    }

    /// `word-break` value to mode.
    ///
    /// `break-all` selects character wrapping and `inherit` keeps `current`.
    /// Every other value selects word wrapping.
    #[must_use]
    pub fn from_word_break(value: &str, current: Self) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "break-all" => Self::ByCharWrapping,
            "inherit" => current,
            _ => Self::ByWordWrapping,
        }
    }
}

impl PartialEq for LineBreakMode {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for LineBreakMode {}

impl Hash for LineBreakMode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Display for LineBreakMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl Serialize for LineBreakMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shout(text: &str) -> String {
        text.to_uppercase()
    }

    #[test]
    fn test_char_wrapping_inserts_zero_width_space() {
        assert_eq!(LineBreakMode::ByCharWrapping.transform("ab"), "a\u{200B}b");
        assert_eq!(LineBreakMode::ByCharWrapping.transform("a\nb"), "a\nb");
        assert_eq!(LineBreakMode::ByWordWrapping.transform("ab"), "ab");
    }

    #[test]
    fn test_custom_modes_compare_by_id() {
        let a = LineBreakMode::Custom {
            id: "shout",
            transform: shout,
        };
        let b = LineBreakMode::Custom {
            id: "shout",
            transform: str::to_string,
        };
        assert_eq!(a, b);
        assert_ne!(a, LineBreakMode::ByWordWrapping);
        assert_eq!(a.transform("hi"), "HI");
        assert_eq!(a.to_string(), "shout");
    }
}
