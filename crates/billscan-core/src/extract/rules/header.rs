//! Header (vendor line) extraction.

use super::FieldRule;

/// Lines this short after trimming are treated as OCR noise.
pub const DEFAULT_MIN_HEADER_CHARS: usize = 3;

/// Headers are cut to this many characters.
pub const DEFAULT_MAX_HEADER_CHARS: usize = 50;

/// Picks the first meaningful line of the text as the bill header.
#[derive(Debug, Clone)]
pub struct HeaderExtractor {
    min_chars: usize,
    max_chars: usize,
}

impl HeaderExtractor {
    pub fn new() -> Self {
        Self {
            min_chars: DEFAULT_MIN_HEADER_CHARS,
            max_chars: DEFAULT_MAX_HEADER_CHARS,
        }
    }

    /// Set the minimum trimmed line length a header must have.
    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    /// Set the truncation length.
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }
}

impl Default for HeaderExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldRule for HeaderExtractor {
    type Output = String;

    fn find(&self, text: &str) -> Option<Self::Output> {
        meaningful_lines(text, self.min_chars)
            .next()
            .map(|line| truncate_chars(line, self.max_chars))
    }

    /// Every surviving line, trimmed but not truncated.
    fn find_all(&self, text: &str) -> Vec<Self::Output> {
        meaningful_lines(text, self.min_chars).map(str::to_string).collect()
    }
}

fn meaningful_lines(text: &str, min_chars: usize) -> impl Iterator<Item = &str> {
    text.split('\n')
        .map(str::trim)
        .filter(move |line| line.chars().count() >= min_chars)
}

/// Cut a string to at most `max` characters.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
