//! Configuration structures for the scanning pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::extract::rules::patterns::{
    DEFAULT_AMOUNT_KEYWORDS, DEFAULT_CONFUSABLE_GLYPHS, DEFAULT_CURRENCY_TOKENS,
    DEFAULT_FIRST_MATCH_CUE,
};
use crate::extract::rules::{DEFAULT_MAX_HEADER_CHARS, DEFAULT_MIN_HEADER_CHARS};

/// Main configuration for billscan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BillscanConfig {
    /// OCR collaborator configuration.
    pub ocr: OcrConfig,

    /// PDF rasterization collaborator configuration.
    pub pdf: PdfConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,
}

/// OCR collaborator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract executable.
    pub tesseract_cmd: PathBuf,

    /// Recognition languages, as tesseract language codes.
    pub languages: Vec<String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_cmd: PathBuf::from("tesseract"),
            // Bills are printed bilingual: Latin and Arabic script
            languages: vec!["eng".to_string(), "ara".to_string()],
        }
    }
}

/// PDF rasterization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// pdftoppm executable (from poppler-utils).
    pub pdftoppm_cmd: PathBuf,

    /// DPI for rendering PDF pages to images.
    pub render_dpi: u32,

    /// Maximum pages to render (0 = unlimited).
    pub max_pages: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            pdftoppm_cmd: PathBuf::from("pdftoppm"),
            render_dpi: 200,
            max_pages: 0,
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Keywords that anchor a total (matched case-insensitively).
    pub amount_keywords: Vec<String>,

    /// Currency tokens that directly precede an amount.
    pub currency_tokens: Vec<String>,

    /// Single characters OCR confuses with the currency sign.
    pub confusable_glyphs: String,

    /// When present in the text, the first candidate wins instead of the largest.
    pub first_match_cue: String,

    /// Minimum trimmed length of a header line.
    pub min_header_chars: usize,

    /// Header truncation length.
    pub max_header_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            amount_keywords: DEFAULT_AMOUNT_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            currency_tokens: DEFAULT_CURRENCY_TOKENS.iter().map(|s| s.to_string()).collect(),
            confusable_glyphs: DEFAULT_CONFUSABLE_GLYPHS.to_string(),
            first_match_cue: DEFAULT_FIRST_MATCH_CUE.to_string(),
            min_header_chars: DEFAULT_MIN_HEADER_CHARS,
            max_header_chars: DEFAULT_MAX_HEADER_CHARS,
        }
    }
}

impl BillscanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
