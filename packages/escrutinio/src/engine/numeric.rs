//! Locale-tolerant numeric parsing.
//!
//! The source renders counts with comma or period as thousands separator,
//! inconsistently between views, and percentages with either character as
//! the decimal point. Vote counts therefore strip both separators before
//! parsing; percentages normalize the decimal comma.

/// Remove spaces (including non-breaking) and both thousands separators.
pub fn strip_separators(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, ',' | '.' | ' ' | '\u{a0}'))
        .collect()
}

/// Parse the first contiguous digit run after separator stripping.
///
/// This is the table-cell reading: a cell like `"1.234.567 votos"` yields
/// `1234567`, a cell with no digits yields `None`.
pub fn parse_vote_count(text: &str) -> Option<u64> {
    let stripped = strip_separators(text);
    let start = stripped.find(|c: char| c.is_ascii_digit())?;
    let digits: String = stripped[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Parse a line that is, after separator stripping, nothing but digits.
///
/// The card reading: stricter than [`parse_vote_count`], so a line like
/// `"48.2%"` is rejected rather than misread as a count.
pub fn digits_only(text: &str) -> Option<u64> {
    let stripped = strip_separators(text.trim());
    if stripped.is_empty() || !stripped.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    stripped.parse().ok()
}

/// Parse a percentage value, accepting `,` or `.` as the decimal point.
pub fn parse_percentage(text: &str) -> Option<f64> {
    text.trim().replace(',', ".").parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_counts_strip_either_separator() {
        assert_eq!(parse_vote_count("1,234,567"), Some(1_234_567));
        assert_eq!(parse_vote_count("1.234.567"), Some(1_234_567));
        assert_eq!(parse_vote_count("1 234 567"), Some(1_234_567));
        assert_eq!(parse_vote_count("12.345 votos"), Some(12_345));
        assert_eq!(parse_vote_count("sin datos"), None);
    }

    #[test]
    fn digits_only_rejects_mixed_lines() {
        assert_eq!(digits_only("123.456"), Some(123_456));
        assert_eq!(digits_only("  9041 "), Some(9041));
        assert_eq!(digits_only("48%"), None);
        assert_eq!(digits_only("PARTIDO 123"), None);
        assert_eq!(digits_only(""), None);
    }

    #[test]
    fn percentages_accept_decimal_comma() {
        assert_eq!(parse_percentage("57,31"), Some(57.31));
        assert_eq!(parse_percentage("57.31"), Some(57.31));
        assert_eq!(parse_percentage("100"), Some(100.0));
        assert_eq!(parse_percentage("n/a"), None);
    }
}
