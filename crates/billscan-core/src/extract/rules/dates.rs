//! Date extraction for bills.

use chrono::NaiveDate;

use super::patterns::BILL_DATE;
use super::FieldRule;

/// Date field extractor.
///
/// Dates are returned verbatim; no calendar validation happens here.
#[derive(Debug, Clone)]
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldRule for DateExtractor {
    type Output = String;

    fn find(&self, text: &str) -> Option<Self::Output> {
        BILL_DATE.find(text).map(|m| m.as_str().to_string())
    }

    fn find_all(&self, text: &str) -> Vec<Self::Output> {
        BILL_DATE
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

/// Read an extracted date as day-month-year.
///
/// Bills in the target region print day first. Returns `None` for strings
/// outside the date grammar or for impossible calendar dates.
pub fn interpret_date(s: &str) -> Option<NaiveDate> {
    let mut parts = s.split(['/', '-']);
    let day: u32 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let year = parse_year(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }

    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    match s.len() {
        // Two-digit year: 00-50 is the 2000s, 51-99 the 1900s
        2 if year <= 50 => Some(2000 + year),
        2 => Some(1900 + year),
        4 => Some(year),
        _ => None,
    }
}
