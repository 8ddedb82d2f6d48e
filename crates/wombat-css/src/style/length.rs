//! Length values, size keywords and box edges.
//!
//! [CSS Values Level 4 § 6 Distance Units](https://www.w3.org/TR/css-values-4/#lengths)

use std::hash::{Hash, Hasher};

use serde::Serialize;
use wombat_common::warning::warn_once;

/// A resolved length in CSS pixels.
///
/// Equality and hashing compare the canonical bit pattern, so `-0.0 == 0.0`
/// and every NaN is equal to every other NaN. That makes containers holding
/// `Px` usable as hash keys.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Px(pub f32);

impl Px {
    /// Zero pixels.
    pub const ZERO: Self = Self(0.0);

    /// The raw value.
    #[must_use]
    pub const fn get(self) -> f32 {
        self.0
    }

    fn canonical_bits(self) -> u32 {
        if self.0.is_nan() {
            f32::NAN.to_bits()
        } else if self.0 == 0.0 {
            0
        } else {
            self.0.to_bits()
        }
    }
}

impl PartialEq for Px {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_bits() == other.canonical_bits()
    }
}

impl Eq for Px {}

impl Hash for Px {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_bits().hash(state);
    }
}

impl From<f32> for Px {
    fn from(value: f32) -> Self {
        Self(value)
    }
}

/// A parsed, unresolved length.
///
/// [§ 6.1 Relative lengths](https://www.w3.org/TR/css-values-4/#relative-lengths)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Length {
    /// `px`: absolute.
    Px(f32),
    /// `pt`: treated as a device point, the same size as `px`.
    Pt(f32),
    /// `em`: relative to the base font size.
    Em(f32),
    /// `rem`: relative to the base font size (there is no root element here).
    Rem(f32),
    /// `%` of the base size.
    Percent(f32),
    /// A bare number, absolute.
    Number(f32),
}

impl Length {
    /// Parse `12px`, `12pt`, `1.5em`, `2rem`, `150%` or `12`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        let number = |text: &str| text.trim().parse::<f32>().ok().filter(|v| v.is_finite());
        if let Some(v) = value.strip_suffix("px") {
            return number(v).map(Self::Px);
        }
        if let Some(v) = value.strip_suffix("pt") {
            return number(v).map(Self::Pt);
        }
        // `rem` first: it also ends with `em`.
        if let Some(v) = value.strip_suffix("rem") {
            return number(v).map(Self::Rem);
        }
        if let Some(v) = value.strip_suffix("em") {
            return number(v).map(Self::Em);
        }
        if let Some(v) = value.strip_suffix('%') {
            return number(v).map(Self::Percent);
        }
        number(&value).map(Self::Number)
    }

    /// Resolve against `base`, the font size of the context.
    #[must_use]
    pub fn resolve(self, base: f32) -> f32 {
        match self {
            Self::Px(v) | Self::Pt(v) | Self::Number(v) => v,
            Self::Em(v) | Self::Rem(v) => v * base,
            Self::Percent(v) => base * v / 100.0,
        }
    }

    /// Whether this is a bare number.
    #[must_use]
    pub const fn is_unitless(self) -> bool {
        matches!(self, Self::Number(_))
    }
}

/// [§ 3.5 Absolute size keywords](https://www.w3.org/TR/css-fonts-4/#absolute-size-value)
/// and [§ 3.5 relative size keywords](https://www.w3.org/TR/css-fonts-4/#relative-size-value),
/// as multipliers of the base size.
#[must_use]
pub fn size_keyword_factor(keyword: &str) -> Option<f32> {
    Some(match keyword {
        "xx-small" => 0.6,
        "x-small" => 0.75,
        "small" => 0.889,
        "medium" => 1.0,
        "large" => 1.2,
        "x-large" => 1.5,
        "xx-large" => 2.0,
        "xxx-large" => 3.0,
        "smaller" => 0.8,
        "larger" => 1.2,
        _ => return None,
    })
}

/// Resolve a font-size-like value against `base`.
///
/// Empty input and anything unrecognized resolve to `base` itself.
#[must_use]
pub fn parse_size(value: &str, base: f32) -> f32 {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return base;
    }
    let lower = trimmed.to_ascii_lowercase();
    if let Some(factor) = size_keyword_factor(&lower) {
        return base * factor;
    }
    match Length::parse(&lower) {
        Some(length) => length.resolve(base),
        None => {
            warn_once("CSS", &format!("unsupported size '{trimmed}'"));
            base
        }
    }
}

/// Per-side values of a box.
///
/// [CSS Box Model Level 3 § 3](https://www.w3.org/TR/css-box-3/#box-model)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct BoxEdges<T> {
    /// Top edge.
    pub top: T,
    /// Right edge.
    pub right: T,
    /// Bottom edge.
    pub bottom: T,
    /// Left edge.
    pub left: T,
}

impl<T: Copy> BoxEdges<T> {
    /// The same value on every side.
    pub const fn uniform(value: T) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

impl BoxEdges<Px> {
    /// Whether every side is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        [self.top, self.right, self.bottom, self.left]
            .iter()
            .all(|side| side.0 == 0.0)
    }

    /// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
    ///
    /// "If there is only one component value, it applies to all sides. If
    /// there are two values, the top and bottom margins are set to the first
    /// value and the right and left margins are set to the second. If there
    /// are three values, the top is set to the first value, the left and
    /// right are set to the second, and the bottom is set to the third. If
    /// there are four values, they apply to the top, right, bottom, and left,
    /// respectively."
    ///
    /// A component that is not a length (`auto`) still holds its position
    /// and resolves to zero.
    #[must_use]
    pub fn parse_shorthand(value: &str, base: f32) -> Option<Self> {
        let sides: Vec<Px> = value
            .split_ascii_whitespace()
            .map(|component| {
                Px(Length::parse(component).map_or(0.0, |length| length.resolve(base)))
            })
            .collect();
        match sides.as_slice() {
            [all] => Some(Self::uniform(*all)),
            [vertical, horizontal] => Some(Self {
                top: *vertical,
                right: *horizontal,
                bottom: *vertical,
                left: *horizontal,
            }),
            [top, horizontal, bottom] => Some(Self {
                top: *top,
                right: *horizontal,
                bottom: *bottom,
                left: *horizontal,
            }),
            [top, right, bottom, left] => Some(Self {
                top: *top,
                right: *right,
                bottom: *bottom,
                left: *left,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_px_equality_is_canonical() {
        assert_eq!(Px(0.0), Px(-0.0));
        assert_eq!(Px(f32::NAN), Px(f32::NAN));
        assert_ne!(Px(1.0), Px(1.5));
    }

    #[test]
    fn test_shorthand_auto_keeps_position() {
        let edges = BoxEdges::parse_shorthand("0 auto 20px", 16.0);
        assert_eq!(
            edges,
            Some(BoxEdges {
                top: Px(0.0),
                right: Px(0.0),
                bottom: Px(20.0),
                left: Px(0.0),
            })
        );
    }

    #[test]
    fn test_shorthand_three_values() {
        let edges = BoxEdges::parse_shorthand("1px 2px 3px", 16.0);
        assert_eq!(
            edges,
            Some(BoxEdges {
                top: Px(1.0),
                right: Px(2.0),
                bottom: Px(3.0),
                left: Px(2.0),
            })
        );
    }
}
