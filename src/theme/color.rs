//! Color validation for LESS variable values
//!
//! Decides whether a raw declaration value is something the theme can expose as a
//! color. The check is textual: values are not converted or normalized.

use regex::Regex;

use super::constants::{FUNCTIONAL_COLOR_RE, LENGTH_UNIT_RE, PALETTE_CALL_RE};

/// Returns true if `color` is a recognized color expression.
///
/// Supported forms are hex (`#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`), the functional
/// `rgb`/`hsl`/`hsv` notations with optional alpha, and unevaluated `colorPalette`
/// or `fade` calls. Anything else is accepted only if one of `extra_patterns` matches.
pub fn is_valid_color(color: &str, extra_patterns: &[Regex]) -> bool {
    if color.is_empty() || LENGTH_UNIT_RE.is_match(color) {
        return false;
    }
    if PALETTE_CALL_RE.is_match(color) {
        return true;
    }
    if let Some(hex) = color.strip_prefix('#') {
        return is_hex_color(hex);
    }
    if FUNCTIONAL_COLOR_RE.is_match(color) {
        return true;
    }
    extra_patterns.iter().any(|pattern| pattern.is_match(color))
}

fn is_hex_color(hex: &str) -> bool {
    matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_colors() {
        assert!(is_valid_color("#fff", &[]));
        assert!(is_valid_color("#ffff", &[]));
        assert!(is_valid_color("#ffffff", &[]));
        assert!(is_valid_color("#ffffffff", &[]));
        assert!(is_valid_color("#1890FF", &[]));

        assert!(!is_valid_color("#ff", &[]));
        assert!(!is_valid_color("#fffff", &[]));
        assert!(!is_valid_color("#ggg", &[]));
        assert!(!is_valid_color("#", &[]));
    }

    #[test]
    fn test_functional_colors() {
        assert!(is_valid_color("rgba(0,0,0,0.5)", &[]));
        assert!(is_valid_color("rgba(0, 0, 0, 0.85)", &[]));
        assert!(is_valid_color("rgb(24, 144, 255)", &[]));
        assert!(is_valid_color("hsl(120, 50%, 50%)", &[]));
        assert!(is_valid_color("hsla(120deg, 50%, 50%, 0.3)", &[]));
        assert!(is_valid_color("HSV(120, 50%, 50%)", &[]));
        assert!(is_valid_color("rgb(0 0 0 / 50%)", &[]));

        assert!(!is_valid_color("rgb(0)", &[]));
        assert!(!is_valid_color("cmyk(0, 0, 0, 0)", &[]));
    }

    #[test]
    fn test_palette_expressions_are_accepted() {
        assert!(is_valid_color("color(~`colorPalette('@{blue-6}', 1) `)", &[]));
        assert!(is_valid_color("fade(@black, 85%)", &[]));
    }

    #[test]
    fn test_rejections() {
        assert!(!is_valid_color("", &[]));
        assert!(!is_valid_color("10px", &[]));
        assert!(!is_valid_color("0 2px 8px rgba(0, 0, 0, 0.15)", &[]));
        assert!(!is_valid_color("transparent", &[]));
        assert!(!is_valid_color("@primary-color", &[]));
    }

    #[test]
    fn test_extra_patterns() {
        let patterns = vec![Regex::new(r"^transparent$").unwrap(), Regex::new(r"^var\(--").unwrap()];
        assert!(is_valid_color("transparent", &patterns));
        assert!(is_valid_color("var(--brand)", &patterns));
        assert!(!is_valid_color("inherit", &patterns));
        // Length units are rejected before the extra patterns are consulted
        assert!(!is_valid_color("1px", &[Regex::new(".*").unwrap()]));
    }
}
