// currency.rs — Parsing and formatting of currency-tagged integer fields.
//
// Fees, costs and prize values are typed by the user in display form
// ("$1,000") and stored as whole base units (1000). Parsing is total:
// anything that does not yield digits resolves to 0.

/// The currency symbol used in display form.
pub const DOLLAR: &str = "$";

/// Parse user input into a non-negative whole number.
///
/// The optional `symbol` is stripped first, then everything after a
/// decimal point is dropped and every remaining non-digit character is
/// discarded. Empty or unparseable input yields 0.
pub fn parse_integer(raw: &str, symbol: Option<&str>) -> i64 {
    let stripped = match symbol {
        Some(symbol) if !symbol.is_empty() => raw.replace(symbol, ""),
        _ => raw.to_string(),
    };
    let whole = stripped.split('.').next().unwrap_or_default();
    let digits: String = whole.chars().filter(char::is_ascii_digit).collect();
    digits.parse::<i64>().unwrap_or(0)
}

/// Convert a display amount such as `"$1,000"` into base integer units.
pub fn dollars_to_integer(display: &str) -> i64 {
    parse_integer(display, Some(DOLLAR))
}

/// Render base integer units in display form, e.g. `1000` → `"$1,000"`.
pub fn format_dollars(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-{}{}", DOLLAR, grouped)
    } else {
        format!("{}{}", DOLLAR, grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_amount_converts_to_base_units() {
        assert_eq!(dollars_to_integer("$1,000"), 1000);
        assert_eq!(dollars_to_integer("250"), 250);
        assert_eq!(dollars_to_integer(" $ 75 "), 75);
    }

    #[test]
    fn base_units_format_back_to_display() {
        assert_eq!(format_dollars(1000), "$1,000");
        assert_eq!(format_dollars(0), "$0");
        assert_eq!(format_dollars(999), "$999");
        assert_eq!(format_dollars(1_234_567), "$1,234,567");
    }

    #[test]
    fn round_trip_is_lossless() {
        let base = dollars_to_integer("$1,000");
        assert_eq!(dollars_to_integer(&format_dollars(base)), base);
    }

    #[test]
    fn fractional_part_is_dropped() {
        assert_eq!(parse_integer("12.75", None), 12);
        assert_eq!(parse_integer("$3.99", Some(DOLLAR)), 3);
    }

    #[test]
    fn invalid_input_resolves_to_zero() {
        assert_eq!(parse_integer("", Some(DOLLAR)), 0);
        assert_eq!(parse_integer("abc", Some(DOLLAR)), 0);
        assert_eq!(parse_integer("$", Some(DOLLAR)), 0);
    }

    #[test]
    fn minus_sign_is_stripped() {
        assert_eq!(parse_integer("-40", None), 40);
    }
}
