//! Canonical comparison keys for raw cell values.
//!
//! Every function here is total: absent or empty input yields an empty
//! string, never an error. The string normalizers are idempotent.

use std::cmp::Ordering;

use unicode_normalization::UnicodeNormalization;

use crate::model::CellValue;

/// Literal transaction type (after `normalize_type`) that marks a sale row.
pub const SALE_TYPE: &str = "venda";

/// Combining diacritical marks block (U+0300..U+036F).
fn is_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// Lowercase, decompose, drop diacritics.
fn fold(s: &str) -> String {
    s.to_lowercase().nfd().filter(|c| !is_diacritic(*c)).collect()
}

/// Trim, then drop trailing ".0" spreadsheet float artifacts.
fn strip_float_suffix(s: &str) -> &str {
    let mut s = s.trim();
    while let Some(rest) = s.strip_suffix(".0") {
        s = rest.trim_end();
    }
    s
}

/// Account code join key: trimmed, ".0" stripped, leading zeros dropped
/// when purely numeric.
pub fn normalize_code(value: &CellValue) -> String {
    let s = strip_float_suffix(&value.to_text()).to_string();
    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        let digits = s.trim_start_matches('0');
        if digits.is_empty() {
            return "0".to_string();
        }
        return digits.to_string();
    }
    s
}

/// Account name join key: accent- and case-folded, whitespace collapsed.
pub fn normalize_name(value: &CellValue) -> String {
    let folded = fold(&value.to_text());
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cycle label: trimmed and ".0" stripped. No case folding.
pub fn normalize_cycle(value: &CellValue) -> String {
    normalize_cycle_str(&value.to_text())
}

pub fn normalize_cycle_str(s: &str) -> String {
    strip_float_suffix(s).to_string()
}

/// Transaction type, only compared against [`SALE_TYPE`].
pub fn normalize_type(value: &CellValue) -> String {
    value.to_text().trim().to_lowercase()
}

/// Header key for fuzzy column matching: folded, ASCII alphanumerics only.
pub fn normalize_column_name(name: &str) -> String {
    fold(name).chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// Case- and accent-insensitive ordering used for every label sort.
///
/// Ties on the folded form fall back to the raw strings so the order is total.
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    fold(a).cmp(&fold(b)).then_with(|| a.cmp(b))
}
