//! Data models.

pub mod bill;
pub mod config;

pub use bill::{DocumentKind, ExtractedFields, ScanMetadata, ScanResult, UNKNOWN};
pub use config::{BillscanConfig, ExtractionConfig, OcrConfig, PdfConfig};
