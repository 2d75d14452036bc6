//! Rule-based field extractors for bills.

pub mod amounts;
pub mod dates;
pub mod header;
pub mod patterns;

pub use amounts::{parse_amount, Anchor, AmountExtractor, AmountPattern, CandidateAmount, Selection};
pub use dates::{interpret_date, DateExtractor};
pub use header::{truncate_chars, HeaderExtractor, DEFAULT_MAX_HEADER_CHARS, DEFAULT_MIN_HEADER_CHARS};

/// Trait for field rules.
///
/// Rules are independent: each one reads the whole text and keeps no state
/// between calls.
pub trait FieldRule {
    /// The type of value this rule produces.
    type Output;

    /// Select the field value from text, if any candidate exists.
    fn find(&self, text: &str) -> Option<Self::Output>;

    /// Every candidate for the field, in discovery order.
    fn find_all(&self, text: &str) -> Vec<Self::Output>;
}
