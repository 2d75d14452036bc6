//! Regex patterns for bill field extraction.
//!
//! The amount patterns are assembled from configurable word lists so a
//! deployment can extend the keyword or glyph sets; the statics below are
//! the same builders applied to the default lists.

use lazy_static::lazy_static;
use regex::Regex;

/// Keywords that anchor a total when they precede an amount.
pub const DEFAULT_AMOUNT_KEYWORDS: &[&str] = &["BALANCE", "PAID", "TOTAL", "AMOUNT", "DUE"];

/// Currency tokens that anchor an amount directly before it.
pub const DEFAULT_CURRENCY_TOKENS: &[&str] = &["AED", "د.إ"];

/// Single glyphs OCR commonly produces in place of the Dirham sign.
pub const DEFAULT_CONFUSABLE_GLYPHS: &str = "B8DÐĐ|";

/// Token whose presence switches total selection to first-match.
pub const DEFAULT_FIRST_MATCH_CUE: &str = "BALANCE";

/// Number with optional comma grouping and exactly two fractional digits.
const AMOUNT_NUMBER: &str = r"([\d,]+\.\d{2})";

/// Loose numeric date: d/m/y or d-m-y with a consistent separator.
const DATE_GRAMMAR: &str = r"\d{1,2}/\d{1,2}/(?:\d{4}|\d{2})|\d{1,2}-\d{1,2}-(?:\d{4}|\d{2})";

/// Build the keyword-anchored amount pattern.
///
/// Returns `None` when there are no keywords to anchor on.
pub fn keyword_amount_pattern<S: AsRef<str>>(keywords: &[S]) -> Option<String> {
    let alternatives = escaped_alternatives(keywords);
    if alternatives.is_empty() {
        return None;
    }
    Some(format!(r"(?is)(?:{}).*?{}", alternatives.join("|"), AMOUNT_NUMBER))
}

/// Build the currency-glyph-anchored amount pattern.
///
/// Returns `None` when neither tokens nor glyphs are configured.
pub fn glyph_amount_pattern<S: AsRef<str>>(tokens: &[S], glyphs: &str) -> Option<String> {
    let mut alternatives = escaped_alternatives(tokens);
    if !glyphs.is_empty() {
        let class: String = glyphs
            .chars()
            .map(|c| regex::escape(c.encode_utf8(&mut [0; 4])))
            .collect();
        alternatives.push(format!("[{}]", class));
    }
    if alternatives.is_empty() {
        return None;
    }
    Some(format!(r"(?is)(?:{})\s?{}", alternatives.join("|"), AMOUNT_NUMBER))
}

fn escaped_alternatives<S: AsRef<str>>(words: &[S]) -> Vec<String> {
    words
        .iter()
        .map(|w| w.as_ref().trim())
        .filter(|w| !w.is_empty())
        .map(regex::escape)
        .collect()
}

lazy_static! {
    pub static ref KEYWORD_AMOUNT: Regex = Regex::new(
        &keyword_amount_pattern(DEFAULT_AMOUNT_KEYWORDS).unwrap_or_default()
    ).unwrap();

    pub static ref GLYPH_AMOUNT: Regex = Regex::new(
        &glyph_amount_pattern(DEFAULT_CURRENCY_TOKENS, DEFAULT_CONFUSABLE_GLYPHS).unwrap_or_default()
    ).unwrap();

    pub static ref BILL_DATE: Regex = Regex::new(DATE_GRAMMAR).unwrap();

    // One Unicode decimal digit (general category Nd)
    pub static ref DECIMAL_DIGIT: Regex = Regex::new(r"^\d$").unwrap();

    // Whole-string form, for validating corrected dates
    pub static ref BILL_DATE_EXACT: Regex = Regex::new(
        &format!("^(?:{})$", DATE_GRAMMAR)
    ).unwrap();
}
