//! Value and range formatting
//!
//! Adaptive-precision rendering of converted values and reference ranges.

/// Format a value with adaptive precision
///
/// Larger magnitudes get fewer decimal places: none at 100 and above, one
/// from 10, two below that. Zero renders as "0" and infinite values render
/// as the infinity sign, never as a numeric literal.
pub fn format_value(value: f64) -> String {
    if value.is_infinite() {
        return if value.is_sign_positive() {
            "∞".to_string()
        } else {
            "-∞".to_string()
        };
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if magnitude >= 100.0 {
        format!("{:.0}", value)
    } else if magnitude >= 10.0 {
        format!("{:.1}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// Format a range's bounds as human-readable text
///
/// An infinite upper bound renders as an open-ended range ("≥ 300" rather
/// than "300–∞").
pub fn format_range_text(min: f64, max: f64) -> String {
    if max.is_infinite() {
        format!("≥ {}", format_value(min))
    } else {
        format!("{}–{}", format_value(min), format_value(max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_zero() {
        assert_eq!(format_value(0.0), "0");
        assert_eq!(format_value(-0.0), "0");
    }

    #[test]
    fn test_format_small_values() {
        assert_eq!(format_value(1.23456), "1.23");
        assert_eq!(format_value(9.876), "9.88");
        assert_eq!(format_value(0.31446), "0.31");
    }

    #[test]
    fn test_format_medium_values() {
        assert_eq!(format_value(12.3456), "12.3");
        assert_eq!(format_value(47.17), "47.2");
        assert_eq!(format_value(99.99), "100.0");
    }

    #[test]
    fn test_format_large_values() {
        assert_eq!(format_value(123.456), "123");
        assert_eq!(format_value(1234.56), "1235");
        assert_eq!(format_value(367.1), "367");
    }

    #[test]
    fn test_format_negative_values() {
        assert_eq!(format_value(-1.234), "-1.23");
        assert_eq!(format_value(-123.4), "-123");
    }

    #[test]
    fn test_format_infinity() {
        assert_eq!(format_value(f64::INFINITY), "∞");
        assert_eq!(format_value(f64::NEG_INFINITY), "-∞");
    }

    #[test]
    fn test_range_text_finite() {
        assert_eq!(format_range_text(100.0, 200.0), "100–200");
        assert_eq!(format_range_text(8.0, 35.0), "8.00–35.0");
        assert_eq!(format_range_text(0.0, 50.0), "0–50.0");
    }

    #[test]
    fn test_range_text_open_ended() {
        let text = format_range_text(300.0, f64::INFINITY);
        assert_eq!(text, "≥ 300");
        assert!(!text.contains("inf"));

        assert_eq!(format_range_text(0.0, f64::INFINITY), "≥ 0");
    }
}
