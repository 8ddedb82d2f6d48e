//! [CSS Ruby Level 1 § 3.1 Ruby Positioning: the ruby-position property](https://www.w3.org/TR/css-ruby-1/#rubypos)

use serde::Serialize;
use strum_macros::{Display, EnumString};

/// Where a ruby annotation sits relative to its base text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum RubyPosition {
    /// "over": above horizontal base text.
    #[default]
    #[strum(to_string = "before", serialize = "over")]
    Before,
    /// "under": below horizontal base text.
    #[strum(to_string = "after", serialize = "under")]
    After,
    /// "inter-character": beside each base character.
    #[strum(to_string = "inter-character")]
    InterCharacter,
    /// Inline, after the base text.
    #[strum(to_string = "inline")]
    Inline,
}

impl RubyPosition {
    /// Parse a `ruby-position` value, taking the first keyword that names a
    /// position (`alternate over` is `over`).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        value
            .split_ascii_whitespace()
            .find_map(|keyword| keyword.parse::<Self>().ok())
    }

    /// Split `extra` vertical space into (above, below).
    #[must_use]
    pub fn distribute(self, extra: f32) -> (f32, f32) {
        match self {
            Self::Before => (extra, 0.0),
            Self::After => (0.0, extra),
            Self::InterCharacter | Self::Inline => (extra / 2.0, extra / 2.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!(RubyPosition::parse("over"), Some(RubyPosition::Before));
        assert_eq!(RubyPosition::parse("alternate UNDER"), Some(RubyPosition::After));
        assert_eq!(RubyPosition::parse("inter-character"), Some(RubyPosition::InterCharacter));
        assert_eq!(RubyPosition::parse("sideways"), None);
        assert_eq!(RubyPosition::Before.to_string(), "before");
    }
}
