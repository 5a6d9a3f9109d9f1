//! # Amount Input
//!
//! Parsing of amounts typed into form fields, Brazilian style (`1234,50`).
//!
//! ```text
//! typed          normalized     Money
//! ─────          ──────────     ─────
//! ""             "0,00"         0
//! "12"           "12,00"        1200
//! "12,5"         "12,50"        1250
//! ",99"          "0,99"         99
//! "R$ 1.234,567" "1234,56"      123456
//! "1,2,,"        "1,20"         120
//! ```
//!
//! Everything but digits and commas is dropped, so the thousands dot is
//! ignored rather than read as a decimal point.

use tillbook_core::Money;

/// Integer and two-digit fractional part of the typed text.
fn split_amount(input: &str) -> (String, String) {
    let mut kept: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',')
        .collect();

    if kept.matches(',').count() > 1 {
        let trimmed_len = kept.trim_end_matches(',').len();
        kept.truncate(trimmed_len);
    }

    let mut parts = kept.split(',');
    let integer: String = parts.next().unwrap_or_default().to_string();
    let integer = if integer.is_empty() { "0".to_string() } else { integer };

    let mut fraction: String = parts.next().unwrap_or_default().chars().take(2).collect();
    while fraction.len() < 2 {
        fraction.push('0');
    }

    (integer, fraction)
}

/// The field text after it loses focus, e.g. `"12,5"` → `"12,50"`.
pub fn normalize_amount_input(input: &str) -> String {
    let (integer, fraction) = split_amount(input);
    let integer = integer.trim_start_matches('0');
    let integer = if integer.is_empty() { "0" } else { integer };
    format!("{},{}", integer, fraction)
}

/// Parses typed text into an amount. Empty input is zero; values past the
/// representable range saturate.
pub fn parse_amount(input: &str) -> Money {
    let (integer, fraction) = split_amount(input);

    let whole = integer.bytes().fold(0_i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });
    let cents = fraction
        .bytes()
        .fold(0_i64, |acc, b| acc * 10 + i64::from(b - b'0'));

    Money::from_cents(whole.saturating_mul(100).saturating_add(cents))
}

/// Text to prefill an edit field with, e.g. `1234,50`.
pub fn format_amount_input(amount: Money) -> String {
    let cents = amount.cents();
    format!(
        "{}{},{:02}",
        if cents < 0 { "-" } else { "" },
        (cents / 100).unsigned_abs(),
        (cents % 100).unsigned_abs()
    )
}
