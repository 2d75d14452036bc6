//! Core library for bill scanning.
//!
//! This crate provides:
//! - Seams for the external OCR and PDF rasterization collaborators
//! - A scanning pipeline turning document bytes into recognized text
//! - Heuristic field extraction (header, date, total) from noisy OCR text
//! - Bill data models and JSON configuration

pub mod error;
pub mod extract;
pub mod models;
pub mod ocr;

pub use error::{BillscanError, ExtractionError, OcrError, RasterError, Result};
pub use extract::{extract, FieldExtractor};
pub use models::bill::{DocumentKind, ExtractedFields, ScanMetadata, ScanResult, UNKNOWN};
pub use models::config::{BillscanConfig, ExtractionConfig, OcrConfig, PdfConfig};
pub use ocr::{BillScanner, PageRasterizer, TextRecognizer};

#[cfg(feature = "native")]
pub use ocr::{PopplerRasterizer, TesseractRecognizer};
