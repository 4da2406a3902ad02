//! Locale-aware value parsers.
//!
//! Source cells mix currency symbols, Italian digit separators (`.` for
//! thousands, `,` for decimals), and free-text placeholders for missing data
//! (`ND`, `-`, `None`). Every parser here is total: any input, including
//! garbage text, resolves to null rather than an error, so a single
//! malformed cell can never fail a batch.

use std::sync::OnceLock;

use regex::Regex;

use crate::data::RawCell;
use crate::text;

/// Tokens that stand in for a missing value, compared case-insensitively.
const NULL_TOKENS: &[&str] = &["", "nd", "none", "-", "nan"];

fn number_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid number pattern"))
}

fn is_null_token(s: &str) -> bool {
    let lowered = s.to_lowercase();
    NULL_TOKENS.contains(&lowered.as_str())
}

fn first_number(s: &str) -> Option<f64> {
    number_pattern()
        .find(s)
        .and_then(|m| m.as_str().parse().ok())
}

/// Parses a price cell: currency symbol and whitespace stripped, accents
/// folded, Italian thousands/decimal separators normalized, first numeric
/// substring taken.
///
/// `"1.234,56 €"` -> `1234.56`; `"—"` -> `None`.
pub fn parse_price(cell: &RawCell) -> Option<f64> {
    let raw = cell.as_text()?;
    let folded = text::fold_accents(&raw);
    let stripped: String = folded
        .chars()
        .filter(|c| *c != '€' && !c.is_whitespace())
        .collect();
    if is_null_token(&stripped) {
        return None;
    }
    let cleaned = stripped.replace('.', "").replace(',', ".");
    first_number(&cleaned)
}

/// Parses a plain numeric cell under the same Italian separator convention,
/// without currency stripping. `"1.200"` -> `1200.0`; `"95,5"` -> `95.5`.
pub fn parse_number(cell: &RawCell) -> Option<f64> {
    let raw = cell.as_text()?;
    let trimmed = raw.trim();
    if is_null_token(trimmed) {
        return None;
    }
    let cleaned = trimmed.replace('.', "").replace(',', ".");
    first_number(&cleaned)
}

/// Parses a paired cell such as `"95/70"` into its first two numbers, in
/// order of appearance. Single-locale decimals only (`,` -> `.`), no
/// thousands handling. Extra numbers beyond the second are ignored.
pub fn parse_pair_slash(cell: &RawCell) -> (Option<f64>, Option<f64>) {
    let Some(raw) = cell.as_text() else {
        return (None, None);
    };
    let cleaned = raw.trim().replace(',', ".");
    if is_null_token(&cleaned) {
        return (None, None);
    }
    let mut numbers = number_pattern()
        .find_iter(&cleaned)
        .filter_map(|m| m.as_str().parse::<f64>().ok());
    (numbers.next(), numbers.next())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> RawCell {
        RawCell::Text(s.to_string())
    }

    #[test]
    fn null_tokens_parse_to_none_in_any_case() {
        for token in ["", "nd", "ND", "NONE", "none", "-", "NaN", "nan"] {
            assert_eq!(parse_price(&text(token)), None, "price {token:?}");
            assert_eq!(parse_number(&text(token)), None, "number {token:?}");
            assert_eq!(parse_pair_slash(&text(token)), (None, None), "pair {token:?}");
        }
        assert_eq!(parse_price(&RawCell::Empty), None);
        assert_eq!(parse_number(&RawCell::Empty), None);
        assert_eq!(parse_pair_slash(&RawCell::Empty), (None, None));
    }

    #[test]
    fn parse_price_handles_italian_conventions() {
        assert_eq!(parse_price(&text("1.234,56 €")), Some(1234.56));
        assert_eq!(parse_price(&text("€ 33.500")), Some(33500.0));
        assert_eq!(parse_price(&text("24900")), Some(24900.0));
        assert_eq!(parse_price(&text("—")), None);
        assert_eq!(parse_price(&text("da definire")), None);
    }

    #[test]
    fn parse_price_accepts_numeric_cells() {
        assert_eq!(parse_price(&RawCell::Number(33500.0)), Some(33500.0));
    }

    #[test]
    fn parse_number_handles_separators() {
        assert_eq!(parse_number(&text("95,5")), Some(95.5));
        assert_eq!(parse_number(&text("1.200")), Some(1200.0));
        assert_eq!(parse_number(&text("  180 km/h")), Some(180.0));
        assert_eq!(parse_number(&text("n/a ma 5")), Some(5.0));
    }

    #[test]
    fn parse_pair_slash_takes_first_two_numbers() {
        assert_eq!(parse_pair_slash(&text("95/70")), (Some(95.0), Some(70.0)));
        assert_eq!(parse_pair_slash(&text("80")), (Some(80.0), None));
        assert_eq!(parse_pair_slash(&text("-")), (None, None));
        assert_eq!(parse_pair_slash(&text("4/5/6")), (Some(4.0), Some(5.0)));
        assert_eq!(parse_pair_slash(&text("2,5/3,5")), (Some(2.5), Some(3.5)));
    }
}
