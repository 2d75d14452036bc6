//! Bill data models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::extract::rules::patterns::BILL_DATE_EXACT;
use crate::extract::rules::{interpret_date, truncate_chars, DEFAULT_MAX_HEADER_CHARS};

/// Sentinel for a header or date that could not be found.
pub const UNKNOWN: &str = "Unknown";

/// Fields extracted from one bill.
///
/// Produced once by the extractor and never changed by it. Callers that let a
/// person correct the values derive a new copy with the `with_*` methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFields {
    /// Vendor or header line, at most 50 characters.
    pub header: String,

    /// Date substring as printed, or [`UNKNOWN`].
    pub date: String,

    /// Bill total; zero when no amount was found.
    pub total: Decimal,
}

impl ExtractedFields {
    /// Result for a document with nothing recognizable.
    pub fn unknown() -> Self {
        Self {
            header: UNKNOWN.to_string(),
            date: UNKNOWN.to_string(),
            total: Decimal::ZERO,
        }
    }

    /// Copy with a corrected header, truncated to the header limit.
    pub fn with_header(mut self, header: &str) -> Self {
        self.header = truncate_chars(header.trim(), DEFAULT_MAX_HEADER_CHARS);
        self
    }

    /// Copy with a corrected date.
    pub fn with_date(mut self, date: &str) -> Self {
        self.date = date.trim().to_string();
        self
    }

    /// Copy with a corrected total.
    pub fn with_total(mut self, total: Decimal) -> Self {
        self.total = total;
        self
    }

    pub fn has_header(&self) -> bool {
        self.header != UNKNOWN
    }

    pub fn has_date(&self) -> bool {
        self.date != UNKNOWN
    }

    /// The date read day-first, when it is a real calendar date.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        interpret_date(&self.date)
    }

    /// Check the record and return a list of issues.
    ///
    /// Freshly extracted records always pass; corrected copies may not.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.header.trim().is_empty() {
            issues.push("Header is empty".to_string());
        }
        if self.header.chars().count() > DEFAULT_MAX_HEADER_CHARS {
            issues.push(format!(
                "Header is longer than {} characters",
                DEFAULT_MAX_HEADER_CHARS
            ));
        }
        if self.date != UNKNOWN && !BILL_DATE_EXACT.is_match(&self.date) {
            issues.push(format!("Date '{}' is not a d/m/y or d-m-y date", self.date));
        }
        if self.total < Decimal::ZERO {
            issues.push("Total is negative".to_string());
        }

        issues
    }
}

impl Default for ExtractedFields {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Kind of document handed to the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Raster image (photo or scan).
    Image,
    /// PDF, rasterized page by page before OCR.
    Pdf,
    /// Text that was already recognized.
    Text,
}

impl DocumentKind {
    /// Resolve from a MIME type such as `application/pdf`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.trim().to_ascii_lowercase();
        match mime.as_str() {
            "application/pdf" => Some(Self::Pdf),
            "text/plain" => Some(Self::Text),
            m if m.starts_with("image/") => Some(Self::Image),
            _ => None,
        }
    }

    /// Resolve from a file extension, without the dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "png" | "jpg" | "jpeg" | "tif" | "tiff" | "bmp" => Some(Self::Image),
            "txt" => Some(Self::Text),
            _ => None,
        }
    }

    /// Resolve from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// Facts about a scanned document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanMetadata {
    /// Document kind.
    pub kind: DocumentKind,

    /// Size of the input document in bytes.
    pub byte_len: usize,

    /// Pages recognized (1 for images and text).
    pub page_count: usize,

    /// Wall time spent recognizing and extracting.
    pub processing_time_ms: u64,
}

/// Output of the scanning pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Extracted fields.
    pub fields: ExtractedFields,

    /// Recognized text the fields were extracted from.
    pub raw_text: String,

    /// Scan metadata.
    pub metadata: ScanMetadata,
}
