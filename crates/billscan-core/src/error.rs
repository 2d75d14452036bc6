//! Error types for the billscan-core library.

use thiserror::Error;

/// Main error type for the billscan library.
#[derive(Error, Debug)]
pub enum BillscanError {
    /// OCR collaborator error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// PDF rasterization collaborator error.
    #[error("rasterization error: {0}")]
    Raster(#[from] RasterError),

    /// Extractor construction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Image decoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors reported by a text recognizer.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The recognizer executable could not be started.
    #[error("failed to launch recognizer `{command}`: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The recognizer ran but reported failure.
    #[error("recognizer exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    /// The image could not be handed to the recognizer.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// No recognition language was declared.
    #[error("no recognition language declared")]
    NoLanguages,
}

/// Errors reported by a PDF page rasterizer.
#[derive(Error, Debug)]
pub enum RasterError {
    /// The rasterizer executable could not be started.
    #[error("failed to launch rasterizer `{command}`: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The rasterizer ran but reported failure.
    #[error("rasterizer exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    /// A rendered page could not be loaded.
    #[error("failed to load rendered page {page}: {reason}")]
    PageLoad { page: usize, reason: String },

    /// The PDF rendered to no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Scratch-space I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors building a field extractor from configuration.
///
/// Extraction itself never fails; only an unusable configuration does.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The configuration is self-contradictory or empty.
    #[error("invalid extraction config: {0}")]
    InvalidConfig(String),

    /// A configured pattern failed to compile.
    #[error("failed to compile {name} pattern: {source}")]
    Pattern {
        name: &'static str,
        #[source]
        source: regex::Error,
    },
}

/// Result type for the billscan library.
pub type Result<T> = std::result::Result<T, BillscanError>;
