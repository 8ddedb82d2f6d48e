//! Integration tests for the style and value model.

use std::sync::Arc;

use wombat_css::style::font::parse_font_shorthand;
use wombat_css::{
    ApproximateFontMetrics, AttributeStyler, AttributeValue, ColorValue, CssDeclarations,
    DeclarationCache, DefaultAttributeStyler, FontDescriptor, Length, LineBreakMode, Px,
    StyleContainer, StyleContext, TextLine, parse_size,
};
use wombat_dom::AttributesMap;

fn styled(style: &str) -> StyleContainer {
    let cache = DeclarationCache::default();
    let metrics = ApproximateFontMetrics;
    let context = StyleContext {
        declarations: &cache,
        metrics: &metrics,
        ruby_scale: 0.58,
    };
    let mut attributes = AttributesMap::new();
    attributes.insert("style", style);
    let mut container = StyleContainer::with_font(FontDescriptor::system(16.0));
    DefaultAttributeStyler.apply(&attributes, &mut container, &context);
    container
}

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

#[test]
fn test_hex_colors() {
    assert_eq!(ColorValue::parse("#fff"), Some(ColorValue::WHITE));
    assert_eq!(ColorValue::parse("#FF0000"), Some(ColorValue::rgb(255, 0, 0)));
    assert_eq!(ColorValue::parse("#ff000080").map(|c| c.a), Some(128));
    assert_eq!(ColorValue::parse("#f008").map(|c| c.a), Some(136));
    assert_eq!(ColorValue::parse("#ff00"), Some(ColorValue { r: 255, g: 255, b: 0, a: 0 }));
    assert_eq!(ColorValue::parse("#12345"), None);
}

#[test]
fn test_functional_colors() {
    assert_eq!(ColorValue::parse("rgb(0, 128, 255)"), Some(ColorValue::rgb(0, 128, 255)));
    assert_eq!(
        ColorValue::parse("rgba(10, 20, 30, 0.5)").map(|c| (c.r, c.a)),
        Some((10, 128))
    );
    assert_eq!(ColorValue::parse("hsl(0, 100%, 50%)"), Some(ColorValue::rgb(255, 0, 0)));
}

#[test]
fn test_named_colors() {
    assert_eq!(ColorValue::parse("RebeccaPurple"), Some(ColorValue::rgb(102, 51, 153)));
    assert_eq!(ColorValue::parse("black"), Some(ColorValue::BLACK));
    assert_eq!(ColorValue::parse("transparent"), Some(ColorValue::TRANSPARENT));
    assert_eq!(ColorValue::parse("no-such-color"), None);
}

#[test]
fn test_color_hex_string() {
    assert_eq!(ColorValue::rgb(255, 136, 0).to_hex_string(), "#ff8800");
}

// ---------------------------------------------------------------------------
// Lengths and sizes
// ---------------------------------------------------------------------------

#[test]
fn test_parse_size_units() {
    assert!((parse_size("12px", 16.0) - 12.0).abs() < f32::EPSILON);
    assert!((parse_size("12pt", 16.0) - 12.0).abs() < f32::EPSILON);
    assert!((parse_size("2em", 16.0) - 32.0).abs() < f32::EPSILON);
    assert!((parse_size("1.5rem", 10.0) - 15.0).abs() < f32::EPSILON);
    assert!((parse_size("150%", 16.0) - 24.0).abs() < f32::EPSILON);
}

#[test]
fn test_parse_size_keywords_and_fallback() {
    assert!((parse_size("large", 10.0) - 12.0).abs() < 1e-5);
    assert!((parse_size("xx-small", 10.0) - 6.0).abs() < 1e-5);
    assert!((parse_size("XXX-LARGE", 10.0) - 30.0).abs() < 1e-5);
    assert!((parse_size("", 16.0) - 16.0).abs() < f32::EPSILON);
    assert!((parse_size("bogus", 16.0) - 16.0).abs() < f32::EPSILON);
}

#[test]
fn test_length_rem_is_not_em() {
    assert_eq!(Length::parse("2rem"), Some(Length::Rem(2.0)));
    assert_eq!(Length::parse("2em"), Some(Length::Em(2.0)));
    assert_eq!(Length::parse("3"), Some(Length::Number(3.0)));
    assert_eq!(Length::parse("px"), None);
}

// ---------------------------------------------------------------------------
// Attribute values
// ---------------------------------------------------------------------------

#[test]
fn test_attribute_value_views() {
    assert_eq!(AttributeValue("12px").as_f32(), Some(12.0));
    assert_eq!(AttributeValue("infinity").as_f32(), Some(f32::INFINITY));
    assert_eq!(AttributeValue("abc").as_f32(), None);
    assert_eq!(AttributeValue("3.7").as_i64(), Some(3));
    assert_eq!(AttributeValue("1").as_bool(), Some(true));
    assert_eq!(AttributeValue("FALSE").as_bool(), Some(false));
    assert_eq!(AttributeValue("maybe").as_bool(), None);
    assert_eq!(AttributeValue(" https://a.example/x ").as_url(), Some("https://a.example/x"));
    assert_eq!(AttributeValue("   ").as_url(), None);
    assert_eq!(AttributeValue("red").as_color(), Some(ColorValue::rgb(255, 0, 0)));
}

// ---------------------------------------------------------------------------
// Declarations and the declaration cache
// ---------------------------------------------------------------------------

#[test]
fn test_declaration_parse_rules() {
    assert_eq!(CssDeclarations::parse(""), None);
    assert_eq!(CssDeclarations::parse("color red"), None);
    assert_eq!(CssDeclarations::parse(": ;"), None);

    let blank = CssDeclarations::parse("   ").unwrap();
    assert_eq!(blank.len(), 1);
    assert_eq!(blank.get(""), Some(""));

    let parsed = CssDeclarations::parse(" color : red ; ; font-size:12px; :x; y: ").unwrap();
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed.get("color"), Some("red"));
    assert_eq!(parsed.get("font-size"), Some("12px"));
}

#[test]
fn test_declaration_value_keeps_later_colons() {
    let parsed = CssDeclarations::parse("background: url(http://a/b.png)").unwrap();
    assert_eq!(parsed.get("background"), Some("url(http://a/b.png)"));
}

#[test]
fn test_declaration_last_wins() {
    let parsed = CssDeclarations::parse("color: red; color: blue").unwrap();
    assert_eq!(parsed.get("color"), Some("blue"));
}

#[test]
fn test_declaration_cache_serves_second_lookup() {
    let cache = DeclarationCache::new(8);
    let first = cache.get("color: red; margin: 4px").unwrap();
    let second = cache.get("color: red; margin: 4px").unwrap();
    assert_eq!(first, second);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.parse_count(), 1);
    assert_eq!(cache.stats().hits, 1);
    assert_eq!(cache.stats().misses, 1);
}

#[test]
fn test_declaration_cache_remembers_failures() {
    let cache = DeclarationCache::new(8);
    assert!(cache.get("not css").is_none());
    assert!(cache.get("not css").is_none());
    assert_eq!(cache.parse_count(), 1);
}

#[test]
fn test_declaration_cache_is_bounded() {
    let cache = DeclarationCache::new(2);
    let _ = cache.get("a: 1");
    let _ = cache.get("b: 2");
    let _ = cache.get("c: 3");
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.stats().evictions, 1);
    let _ = cache.get("a: 1");
    assert_eq!(cache.parse_count(), 4);
}

// ---------------------------------------------------------------------------
// Fonts
// ---------------------------------------------------------------------------

#[test]
fn test_font_shorthand() {
    let shorthand = parse_font_shorthand("italic bold 12px/1.5 \"Helvetica Neue\", serif", 16.0)
        .unwrap();
    assert!(shorthand.italic);
    assert_eq!(shorthand.weight, Some(700));
    assert_eq!(shorthand.size, Some(12.0));
    assert_eq!(shorthand.family.as_deref(), Some("Helvetica Neue"));
    assert!(parse_font_shorthand("bold", 16.0).is_none());
}

#[test]
fn test_styler_font_size_and_family() {
    let style = styled("font-size: 2em; font-family: 'Noto Serif'");
    let font = style.font.unwrap();
    assert!((font.point_size() - 32.0).abs() < f32::EPSILON);
    assert_eq!(font.family, "Noto Serif");
}

// ---------------------------------------------------------------------------
// Styler
// ---------------------------------------------------------------------------

#[test]
fn test_styler_colors_and_decoration() {
    let style = styled("color: #00ff00; background: navy; text-decoration: underline red");
    assert_eq!(style.foreground_color, Some(ColorValue::rgb(0, 255, 0)));
    assert_eq!(style.background_color, Some(ColorValue::rgb(0, 0, 128)));
    assert!(style.underline);
    assert_eq!(style.underline_color, Some(ColorValue::rgb(255, 0, 0)));
}

#[test]
fn test_styler_line_height_policies() {
    let multiplier = styled("line-height: 2");
    assert_eq!(multiplier.text_line.and_then(|l| l.line_height()), Some(32.0));

    let normal = styled("line-height: normal");
    assert_eq!(
        normal.text_line,
        Some(TextLine::LineHeight {
            font_line_height: Px(19.2),
            line_height: Px(19.2),
        })
    );
    assert!(normal.line_spacing().abs() < f32::EPSILON);

    let spacing = styled("line-spacing: 4px");
    assert_eq!(spacing.text_line, Some(TextLine::LineSpacing(Px(4.0))));
    assert!((spacing.line_spacing() - 4.0).abs() < f32::EPSILON);
}

#[test]
fn test_text_line_rounding() {
    let line = TextLine::LineHeight {
        font_line_height: Px(19.2),
        line_height: Px(24.0),
    };
    assert!((line.line_spacing() - 4.8).abs() < 1e-5);
    assert!((line.vertical_padding() - 2.4).abs() < 1e-5);
}

#[test]
fn test_styler_word_break() {
    assert_eq!(styled("word-break: break-all").line_break_mode, LineBreakMode::ByCharWrapping);
    assert_eq!(styled("word-break: normal").line_break_mode, LineBreakMode::ByWordWrapping);
}

#[test]
fn test_styler_box_edges() {
    let style = styled("margin: 1px 2px 3px; padding-left: 5px; border: 2px solid black");
    assert_eq!(style.margin.top, Px(1.0));
    assert_eq!(style.margin.right, Px(2.0));
    assert_eq!(style.margin.bottom, Px(3.0));
    assert_eq!(style.margin.left, Px(2.0));
    assert_eq!(style.padding.left, Px(5.0));
    assert_eq!(style.border.bottom, Px(2.0));
    assert!(style.seals_top());
}

#[test]
fn test_styler_auto_margin_keeps_positions() {
    let style = styled("margin: 0 auto 20px; border: solid 3px red");
    assert_eq!(style.margin.top, Px(0.0));
    assert_eq!(style.margin.right, Px(0.0));
    assert_eq!(style.margin.bottom, Px(20.0));
    assert_eq!(style.margin.left, Px(0.0));
    assert_eq!(style.border.top, Px(3.0));
    assert_eq!(style.border.left, Px(3.0));
}

#[test]
fn test_malformed_declaration_is_skipped() {
    let style = styled("color: nonsense; margin-top: 7px");
    assert_eq!(style.foreground_color, None);
    assert_eq!(style.margin.top, Px(7.0));
}

#[test]
fn test_style_equality_is_structural() {
    assert_eq!(styled("color: red"), styled("color: #f00"));
    assert_ne!(styled("color: red"), styled("color: blue"));
}
