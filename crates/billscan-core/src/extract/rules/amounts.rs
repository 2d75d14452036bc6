//! Total amount extraction for bills.

use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{debug, trace};

use super::patterns::{DECIMAL_DIGIT, DEFAULT_FIRST_MATCH_CUE, GLYPH_AMOUNT, KEYWORD_AMOUNT};
use super::FieldRule;

/// What an amount pattern anchors on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// A total-like keyword somewhere before the number.
    Keyword,
    /// A currency token or OCR look-alike glyph right before the number.
    CurrencyGlyph,
}

/// A compiled amount pattern. Capture group 1 is the numeric token.
#[derive(Debug, Clone)]
pub struct AmountPattern {
    pub anchor: Anchor,
    pub regex: Regex,
}

impl AmountPattern {
    pub fn new(anchor: Anchor, regex: Regex) -> Self {
        Self { anchor, regex }
    }
}

/// A positive amount found in the text.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateAmount {
    /// Parsed value, always > 0.
    pub value: Decimal,
    /// Pattern that produced it.
    pub anchor: Anchor,
    /// Byte span of the whole match in the source text.
    pub position: (usize, usize),
    /// Matched source text.
    pub source: String,
}

/// How the total is chosen from the candidate pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// First candidate in pattern-then-position order.
    FirstMatch,
    /// Largest candidate value; the earliest wins ties.
    Largest,
}

/// Total amount extractor.
///
/// Patterns are applied in order and every match of every pattern joins a
/// single pool, so pool order is pattern order first, text position second.
#[derive(Debug, Clone)]
pub struct AmountExtractor {
    patterns: Vec<AmountPattern>,
    first_match_cue: String,
}

impl AmountExtractor {
    /// Extractor with the default keyword and currency-glyph patterns.
    pub fn new() -> Self {
        Self {
            patterns: vec![
                AmountPattern::new(Anchor::Keyword, KEYWORD_AMOUNT.clone()),
                AmountPattern::new(Anchor::CurrencyGlyph, GLYPH_AMOUNT.clone()),
            ],
            first_match_cue: DEFAULT_FIRST_MATCH_CUE.to_string(),
        }
    }

    /// Extractor over an explicit ordered pattern list.
    ///
    /// An empty cue disables first-match selection.
    pub fn with_patterns(patterns: Vec<AmountPattern>, first_match_cue: &str) -> Self {
        Self {
            patterns,
            first_match_cue: first_match_cue.trim().to_uppercase(),
        }
    }

    pub fn patterns(&self) -> &[AmountPattern] {
        &self.patterns
    }

    /// Decide the selection policy for a text.
    pub fn selection_for(&self, text: &str) -> Selection {
        if !self.first_match_cue.is_empty() && text.to_uppercase().contains(&self.first_match_cue) {
            Selection::FirstMatch
        } else {
            Selection::Largest
        }
    }

    /// Selected total, or zero when nothing matched.
    pub fn total(&self, text: &str) -> Decimal {
        self.find(text).map(|c| c.value).unwrap_or(Decimal::ZERO)
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldRule for AmountExtractor {
    type Output = CandidateAmount;

    fn find(&self, text: &str) -> Option<Self::Output> {
        let candidates = self.find_all(text);
        let selection = self.selection_for(text);
        debug!(
            "Amount pool has {} candidates, selecting by {:?}",
            candidates.len(),
            selection
        );

        match selection {
            Selection::FirstMatch => candidates.into_iter().next(),
            Selection::Largest => candidates
                .into_iter()
                .reduce(|best, c| if c.value > best.value { c } else { best }),
        }
    }

    fn find_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for pattern in &self.patterns {
            for caps in pattern.regex.captures_iter(text) {
                let (Some(full_match), Some(token)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };

                match parse_amount(token.as_str()) {
                    Some(value) if value > Decimal::ZERO => {
                        results.push(CandidateAmount {
                            value,
                            anchor: pattern.anchor,
                            position: (full_match.start(), full_match.end()),
                            source: full_match.as_str().to_string(),
                        });
                    }
                    Some(_) => trace!("Dropping non-positive amount {:?}", token.as_str()),
                    None => trace!("Dropping unparseable amount {:?}", token.as_str()),
                }
            }
        }

        results
    }
}

/// Parse an amount token such as "1,250.00" into a decimal.
///
/// Commas are thousands separators. Digits from any script (Arabic-Indic,
/// full-width, Devanagari, ...) are read by value.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let normalized: String = s
        .trim()
        .chars()
        .filter(|c| *c != ',')
        .map(ascii_digit)
        .collect();

    Decimal::from_str(&normalized).ok()
}

fn is_decimal_digit(c: char) -> bool {
    DECIMAL_DIGIT.is_match(c.encode_utf8(&mut [0; 4]))
}

/// Map a decimal digit of any script to its ASCII form.
///
/// Decimal digits are encoded in contiguous runs of whole 0-9 sets, so a
/// digit's value is its distance from the start of its run, modulo 10.
fn ascii_digit(c: char) -> char {
    if c.is_ascii() || !is_decimal_digit(c) {
        return c;
    }

    let mut zero = c as u32;
    while let Some(prev) = zero.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(prev) {
            break;
        }
        zero -= 1;
    }
    char::from_digit((c as u32 - zero) % 10, 10).unwrap_or(c)
}
