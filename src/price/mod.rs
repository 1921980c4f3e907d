//! Price text normalization
//!
//! Marketplace pages render prices as free-form text ("US $1,299.99",
//! "$100 to $200", "Free"). This module turns that text into a number.
//! A return value of `0.0` always means "no price could be read" and must not
//! be mistaken for a free item.

use lazy_static::lazy_static;
use regex::Regex;

/// Currency marks recognised in price text
pub const CURRENCY_MARKS: [char; 4] = ['$', '€', '£', '¥'];

/// Separators that open the upper half of a price range
const RANGE_DELIMITERS: [&str; 3] = [" to ", "-", "–"];

lazy_static! {
    /// First decimal or integer number in a price string
    static ref NUMBER_REGEX: Regex = Regex::new(r"\d+\.?\d*").expect("price regex is valid");
}

/// Parses free-form price text into a numeric value
///
/// Currency symbols and thousands separators are stripped first. When the text
/// encodes a range, only the lower bound is read. The first decimal or integer
/// number found is returned; text with no number yields `0.0`.
///
/// # Examples
///
/// ```
/// use price_ripple::price::normalize_price;
///
/// assert_eq!(normalize_price("$1,299.99"), 1299.99);
/// assert_eq!(normalize_price("$100 to $200"), 100.0);
/// assert_eq!(normalize_price("Free"), 0.0);
/// ```
pub fn normalize_price(text: &str) -> f64 {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != ',' && !CURRENCY_MARKS.contains(c))
        .collect();

    let bound = lower_bound(&cleaned);

    NUMBER_REGEX
        .find(bound)
        .and_then(|m| m.as_str().trim_end_matches('.').parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Returns the part of `text` before a range delimiter, if the text is a range
///
/// A delimiter only counts when a digit precedes it, so "Pre-owned $25" is
/// not mistaken for a range.
fn lower_bound(text: &str) -> &str {
    // ASCII lowercasing keeps byte offsets aligned with `text`
    let lower = text.to_ascii_lowercase();

    for delimiter in RANGE_DELIMITERS {
        if let Some(idx) = lower.find(delimiter) {
            let head = &text[..idx];
            if head.chars().any(|c| c.is_ascii_digit()) {
                return head;
            }
        }
    }

    text
}

/// Returns true if the text looks like a rendered price
///
/// Used by the content heuristic to spot price fragments in unstructured
/// markup: the text must carry a currency mark and a readable number.
pub fn looks_like_price(text: &str) -> bool {
    text.chars().any(|c| CURRENCY_MARKS.contains(&c)) && normalize_price(text) > 0.0
}

/// Returns true if the text is a price and nothing else
///
/// Words other than range separators ("to") and short upper-case currency
/// codes ("US", "CAD") make the text more than a price, so
/// "$50 Amazon Gift Card" is not a bare price while "US $45.50" is.
pub fn is_bare_price(text: &str) -> bool {
    looks_like_price(text)
        && text.split_whitespace().all(|word| {
            let letters: String = word.chars().filter(|c| c.is_alphabetic()).collect();
            letters.is_empty()
                || letters.eq_ignore_ascii_case("to")
                || (letters.len() <= 3 && letters.chars().all(|c| c.is_ascii_uppercase()))
        })
}

/// Formats a price for display, e.g. `1234.5` becomes `$1,234.50`
pub fn format_price(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}
