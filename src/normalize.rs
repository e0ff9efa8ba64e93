//! Cell normalization helpers shared by validation, dedup and segmentation.
//!
//! Every function here is pure and total: malformed input maps to `None` or
//! an empty string, never to a panic and never to a default business value.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::constants::normalize::{DATETIME_FORMATS, DATE_FORMATS, EMPTY_SENTINELS};
use crate::data::Value;
use crate::types::DocumentDigits;

/// Parse a cell into a date, preferring day-first interpretations.
///
/// Accepts already-typed dates, `DD/MM/YYYY`-family strings, ISO dates and
/// ISO timestamps (with or without fractional seconds / offset). Returns
/// `None` for anything unparsable, including numeric cells.
pub fn normalize_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Date(date) => Some(*date),
        Value::Null | Value::Number(_) => None,
        Value::Text(raw) => parse_date_text(raw.trim()),
    }
}

fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    if raw.is_empty() {
        return None;
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(stamp) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(stamp.date());
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|stamp| stamp.date_naive())
}

/// Parse a cell into a decimal amount.
///
/// Currency symbols, non-breaking spaces and stray punctuation are stripped
/// first. When both `.` and `,` appear, the last one is the decimal
/// separator and every earlier one is a thousands separator; a separator
/// repeated more than once is always a thousands separator. Returns `None`
/// for empty or unparsable input.
pub fn normalize_decimal(value: &Value) -> Option<f64> {
    match value {
        Value::Null | Value::Date(_) => None,
        Value::Number(n) => Some(*n),
        Value::Text(raw) => parse_decimal_text(raw),
    }
}

fn parse_decimal_text(raw: &str) -> Option<f64> {
    let mut cleaned = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '0'..='9' | ',' | '.' => cleaned.push(ch),
            '-' if cleaned.is_empty() => cleaned.push(ch),
            _ => {}
        }
    }
    if !cleaned.chars().any(|ch| ch.is_ascii_digit()) {
        return None;
    }

    let normalized = match cleaned.rfind([',', '.']) {
        None => cleaned,
        Some(last) => {
            let separator = char::from(cleaned.as_bytes()[last]);
            if cleaned.matches(separator).count() > 1 {
                // A repeated separator can only group thousands.
                cleaned
                    .chars()
                    .filter(|ch| ch.is_ascii_digit() || *ch == '-')
                    .collect()
            } else {
                let mut out = String::with_capacity(cleaned.len());
                for (idx, ch) in cleaned.char_indices() {
                    match ch {
                        ',' | '.' if idx == last => out.push('.'),
                        ',' | '.' => {}
                        _ => out.push(ch),
                    }
                }
                out
            }
        }
    };
    normalized.parse().ok()
}

/// Reduce a document cell (CPF/CNPJ) to its digits, preserving leading
/// zeros. Null and blank cells map to an empty string.
pub fn normalize_document(value: &Value) -> DocumentDigits {
    value
        .render()
        .chars()
        .filter(char::is_ascii_digit)
        .collect()
}

/// Returns `true` for null cells and for text that is blank or a textual
/// "nan"/"none"-style sentinel after trim.
pub fn is_empty_cell(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Text(text) => {
            let trimmed = text.trim();
            trimmed.is_empty() || EMPTY_SENTINELS.contains(&trimmed.to_ascii_lowercase().as_str())
        }
        _ => false,
    }
}

/// First value that is neither null, blank, nor an empty-cell sentinel.
pub fn first_non_empty<'a>(values: &[&'a Value]) -> Option<&'a Value> {
    values.iter().copied().find(|value| !is_empty_cell(value))
}
