//! Number formatting conventions used inside prompts.
//!
//! The generator lays slides out from the text shape, so these must not drift.

/// `$` plus whole units with thousands separators; the fraction is dropped.
///
/// `1234567.8` → `$1,234,567`, `-1234.0` → `$-1,234`.
pub fn format_currency(value: f64) -> String {
    format!("${}", group_thousands(value.trunc() as i64))
}

/// Two decimals followed by `%`: `4.5` → `4.50%`.
pub fn format_percent(value: f64) -> String {
    format!("{value:.2}%")
}

/// Two decimals: `8.333` → `8.33`.
pub fn format_decimal(value: f64) -> String {
    format!("{value:.2}")
}

/// Whole numbers without a decimal point, anything else as-is.
pub fn format_count(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// `1234567` → `1,234,567`.
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_drops_fraction_and_groups() {
        assert_eq!(format_currency(1_234_567.8), "$1,234,567");
        assert_eq!(format_currency(999.99), "$999");
        assert_eq!(format_currency(1000.0), "$1,000");
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(-1234.0), "$-1,234");
    }

    #[test]
    fn percent_has_two_decimals() {
        assert_eq!(format_percent(4.5), "4.50%");
        assert_eq!(format_percent(0.0), "0.00%");
        assert_eq!(format_percent(12.3456), "12.35%");
    }

    #[test]
    fn decimal_and_count() {
        assert_eq!(format_decimal(8.0), "8.00");
        assert_eq!(format_count(10.0), "10");
        assert_eq!(format_count(2.5), "2.5");
    }

    #[test]
    fn thousands_boundaries() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(100), "100");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(100_000), "100,000");
        assert_eq!(group_thousands(1_000_000), "1,000,000");
        assert_eq!(group_thousands(-12_345), "-12,345");
    }
}
