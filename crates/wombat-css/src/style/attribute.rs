//! Typed views over raw attribute strings.

use std::sync::Arc;

use super::color::ColorValue;
use super::declarations::{CssDeclarations, DeclarationCache};
use super::length::Length;

/// A borrowed attribute value with lazily parsed typed views.
///
/// Every view is a pure function of the text. Only
/// [`Self::as_declarations`] is cached, because `style` strings repeat
/// across a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeValue<'a>(pub &'a str);

impl<'a> AttributeValue<'a> {
    /// The raw text.
    #[must_use]
    pub const fn as_str(&self) -> &'a str {
        self.0
    }

    /// Number, ignoring a `px` suffix. `infinity` is accepted.
    #[must_use]
    pub fn as_f32(&self) -> Option<f32> {
        let trimmed = self.0.trim();
        let number = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
        if number.eq_ignore_ascii_case("infinity") {
            return Some(f32::INFINITY);
        }
        number.parse::<f32>().ok().filter(|value| !value.is_nan())
    }

    /// Integer, truncating a fractional number.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_f32()
            .filter(|value| value.is_finite())
            .map(|value| value.trunc() as i64)
    }

    /// `true`/`1` or `false`/`0`.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self.0.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }

    /// Non-empty trimmed text, for `href`/`src`-like attributes.
    #[must_use]
    pub fn as_url(&self) -> Option<&'a str> {
        let trimmed = self.0.trim();
        (!trimmed.is_empty() && !trimmed.contains(char::is_whitespace)).then_some(trimmed)
    }

    /// Parsed color.
    #[must_use]
    pub fn as_color(&self) -> Option<ColorValue> {
        ColorValue::parse(self.0)
    }

    /// Parsed length.
    #[must_use]
    pub fn as_length(&self) -> Option<Length> {
        Length::parse(self.0)
    }

    /// Parsed declaration list, served from `cache`.
    pub fn as_declarations(&self, cache: &DeclarationCache) -> Option<Arc<CssDeclarations>> {
        cache.get(self.0)
    }
}

impl<'a> From<&'a str> for AttributeValue<'a> {
    fn from(value: &'a str) -> Self {
        Self(value)
    }
}
