//! Bill field extraction.
//!
//! [`FieldExtractor`] turns raw OCR text into [`ExtractedFields`]. It never
//! fails: anything it cannot find falls back to a sentinel or zero, and a
//! person is expected to review the result before it is stored.

pub mod rules;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::error::ExtractionError;
use crate::models::bill::{ExtractedFields, UNKNOWN};
use crate::models::config::ExtractionConfig;

use rules::patterns::{glyph_amount_pattern, keyword_amount_pattern};
use rules::{
    AmountExtractor, AmountPattern, Anchor, DateExtractor, FieldRule, HeaderExtractor,
    DEFAULT_MAX_HEADER_CHARS, DEFAULT_MIN_HEADER_CHARS,
};

/// Result type for extractor construction.
pub type Result<T> = std::result::Result<T, ExtractionError>;

lazy_static! {
    static ref DEFAULT_EXTRACTOR: FieldExtractor = FieldExtractor::new();
}

/// Extract fields with the default configuration.
pub fn extract(raw_text: &str) -> ExtractedFields {
    DEFAULT_EXTRACTOR.extract(raw_text)
}

/// Header, date and total extractor.
///
/// Holds three independent rules and no per-call state, so one instance can
/// be shared across threads.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    amounts: AmountExtractor,
    header: HeaderExtractor,
    date: DateExtractor,
}

impl FieldExtractor {
    /// Extractor with the default patterns.
    pub fn new() -> Self {
        Self {
            amounts: AmountExtractor::new(),
            header: HeaderExtractor::new(),
            date: DateExtractor::new(),
        }
    }

    /// Build an extractor from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        if config.max_header_chars == 0 || config.max_header_chars > DEFAULT_MAX_HEADER_CHARS {
            return Err(ExtractionError::InvalidConfig(format!(
                "max_header_chars must be between 1 and {}",
                DEFAULT_MAX_HEADER_CHARS
            )));
        }
        if config.min_header_chars < DEFAULT_MIN_HEADER_CHARS {
            return Err(ExtractionError::InvalidConfig(format!(
                "min_header_chars must be at least {}",
                DEFAULT_MIN_HEADER_CHARS
            )));
        }

        let mut patterns = Vec::with_capacity(2);
        if let Some(pattern) = keyword_amount_pattern(&config.amount_keywords) {
            patterns.push(compile(Anchor::Keyword, "keyword amount", &pattern)?);
        }
        if let Some(pattern) = glyph_amount_pattern(&config.currency_tokens, &config.confusable_glyphs) {
            patterns.push(compile(Anchor::CurrencyGlyph, "currency amount", &pattern)?);
        }
        if patterns.is_empty() {
            return Err(ExtractionError::InvalidConfig(
                "no amount keywords, currency tokens or glyphs configured".to_string(),
            ));
        }

        Ok(Self {
            amounts: AmountExtractor::with_patterns(patterns, &config.first_match_cue),
            header: HeaderExtractor::new()
                .with_min_chars(config.min_header_chars)
                .with_max_chars(config.max_header_chars),
            date: DateExtractor::new(),
        })
    }

    /// Extract header, date and total from raw OCR text.
    pub fn extract(&self, raw_text: &str) -> ExtractedFields {
        let fields = ExtractedFields {
            header: self.header.find(raw_text).unwrap_or_else(|| UNKNOWN.to_string()),
            date: self.date.find(raw_text).unwrap_or_else(|| UNKNOWN.to_string()),
            total: self.amounts.total(raw_text),
        };

        debug!(
            "Extracted header={:?} date={:?} total={}",
            fields.header, fields.date, fields.total
        );

        fields
    }

    pub fn amounts(&self) -> &AmountExtractor {
        &self.amounts
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn compile(anchor: Anchor, name: &'static str, pattern: &str) -> Result<AmountPattern> {
    let regex = Regex::new(pattern).map_err(|source| ExtractionError::Pattern { name, source })?;
    Ok(AmountPattern::new(anchor, regex))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_balance_bill() {
        let fields = extract("TOTAL DUE: AED 1,250.00\nBALANCE 1,000.00");

        assert_eq!(fields.header, "TOTAL DUE: AED 1,250.00");
        assert_eq!(fields.date, UNKNOWN);
        // BALANCE present: first pooled candidate, which is the TOTAL line's
        assert_eq!(fields.total, dec("1250.00"));
    }

    #[test]
    fn test_balance_stated_first() {
        let fields = extract("Carrefour\nBALANCE 1,000.00\nTOTAL 1,250.00");

        assert_eq!(fields.total, dec("1000.00"));
    }

    #[test]
    fn test_largest_without_balance() {
        let fields = extract("Invoice\nSubtotal 100.00\nAMOUNT 450.75");

        assert_eq!(fields.header, "Invoice");
        assert_eq!(fields.total, dec("450.75"));
    }

    #[test]
    fn test_no_totals() {
        let fields = extract("Shop XYZ\n12/08/2024\nno numeric totals here");

        assert_eq!(
            fields,
            ExtractedFields {
                header: "Shop XYZ".to_string(),
                date: "12/08/2024".to_string(),
                total: Decimal::ZERO,
            }
        );
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(extract(""), ExtractedFields::unknown());
    }

    #[test]
    fn test_bilingual_receipt() {
        let text = "\n\
            ..\n\
            مطعم الشرفة  AL SHURFA RESTAURANT\n\
            TRN: 100345678900003\n\
            Date: 14-02-2025   Inv# 2231\n\
            Chicken Biryani        د.إ 32.00\n\
            Mint Lemonade          د.إ 14.50\n\
            VAT 5%                 2.30\n\
            Total Amount   AED 48.80\n";

        let fields = extract(text);

        assert_eq!(fields.header, "مطعم الشرفة  AL SHURFA RESTAURANT");
        assert_eq!(fields.date, "14-02-2025");
        assert_eq!(fields.total, dec("48.80"));
    }

    #[test]
    fn test_from_default_config_matches_new() {
        let configured = FieldExtractor::from_config(&ExtractionConfig::default()).unwrap();
        let text = "Al Madina\nTOTAL 15.00\nBalance 9.50\nPAID AED 20.00";

        assert_eq!(configured.extract(text), FieldExtractor::new().extract(text));
    }

    #[test]
    fn test_config_extends_keywords() {
        let mut config = ExtractionConfig::default();
        config.amount_keywords = vec!["NET".to_string()];
        config.currency_tokens.clear();
        config.confusable_glyphs.clear();
        let extractor = FieldExtractor::from_config(&config).unwrap();

        assert_eq!(extractor.amounts().patterns().len(), 1);
        assert_eq!(extractor.extract("TOTAL 90.00\nNET 80.00").total, dec("80.00"));
    }

    #[test]
    fn test_config_header_limits() {
        let mut config = ExtractionConfig::default();
        config.min_header_chars = 5;
        config.max_header_chars = 4;
        let extractor = FieldExtractor::from_config(&config).unwrap();

        assert_eq!(extractor.extract("ABCD\nEmirates NBD").header, "Emir");
    }

    #[test]
    fn test_configured_headers_stay_within_limits() {
        let mut config = ExtractionConfig::default();
        config.max_header_chars = DEFAULT_MAX_HEADER_CHARS;
        config.min_header_chars = DEFAULT_MIN_HEADER_CHARS;
        let extractor = FieldExtractor::from_config(&config).unwrap();

        let fields = extractor.extract(&"X".repeat(80));
        assert_eq!(fields.header.chars().count(), 50);
        assert!(fields.validate().is_empty());

        assert_eq!(extractor.extract("ab\nReal Vendor").header, "Real Vendor");
    }

    #[test]
    fn test_extractor_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FieldExtractor>();
        assert_send_sync::<AmountExtractor>();
    }

    #[test]
    fn test_invalid_config() {
        let mut config = ExtractionConfig::default();
        config.max_header_chars = 0;
        assert!(matches!(
            FieldExtractor::from_config(&config),
            Err(ExtractionError::InvalidConfig(_))
        ));

        let mut config = ExtractionConfig::default();
        config.max_header_chars = 80;
        assert!(matches!(
            FieldExtractor::from_config(&config),
            Err(ExtractionError::InvalidConfig(_))
        ));

        let mut config = ExtractionConfig::default();
        config.min_header_chars = 1;
        assert!(matches!(
            FieldExtractor::from_config(&config),
            Err(ExtractionError::InvalidConfig(_))
        ));

        let mut config = ExtractionConfig::default();
        config.amount_keywords.clear();
        config.currency_tokens.clear();
        config.confusable_glyphs.clear();
        assert!(matches!(
            FieldExtractor::from_config(&config),
            Err(ExtractionError::InvalidConfig(_))
        ));
    }
}
