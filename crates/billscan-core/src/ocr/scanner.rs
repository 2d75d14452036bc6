//! Scanning pipeline: document bytes to recognized text to fields.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{BillscanError, OcrError, RasterError};
use crate::extract::FieldExtractor;
use crate::models::bill::{DocumentKind, ScanMetadata, ScanResult};
use crate::models::config::OcrConfig;

use super::{PageRasterizer, TextRecognizer};

/// Runs a document through OCR and field extraction.
pub struct BillScanner<R, P> {
    recognizer: R,
    rasterizer: P,
    extractor: FieldExtractor,
    languages: Vec<String>,
}

impl<R: TextRecognizer, P: PageRasterizer> BillScanner<R, P> {
    /// Create a scanner with the default extractor and languages.
    pub fn new(recognizer: R, rasterizer: P) -> Self {
        Self {
            recognizer,
            rasterizer,
            extractor: FieldExtractor::new(),
            languages: OcrConfig::default().languages,
        }
    }

    /// Set the field extractor.
    pub fn with_extractor(mut self, extractor: FieldExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Set the recognition languages.
    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        self.languages = languages;
        self
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    /// Recognize a document's text.
    ///
    /// Returns the text and the number of pages it came from. PDF pages are
    /// joined with newlines.
    pub fn recognize_text(
        &self,
        data: &[u8],
        kind: DocumentKind,
    ) -> Result<(String, usize), BillscanError> {
        match kind {
            DocumentKind::Text => Ok((String::from_utf8_lossy(data).into_owned(), 1)),
            DocumentKind::Image => {
                self.check_languages()?;
                let image = image::load_from_memory(data)?;
                let text = self.recognizer.recognize(&image, &self.languages)?;
                Ok((text, 1))
            }
            DocumentKind::Pdf => {
                self.check_languages()?;
                let pages = self.rasterizer.rasterize(data)?;
                if pages.is_empty() {
                    return Err(RasterError::NoPages.into());
                }
                debug!("Rasterized {} PDF pages", pages.len());

                let mut texts = Vec::with_capacity(pages.len());
                for (i, page) in pages.iter().enumerate() {
                    let text = self.recognizer.recognize(page, &self.languages).map_err(|e| {
                        warn!("OCR failed on page {}: {}", i + 1, e);
                        e
                    })?;
                    texts.push(text);
                }

                Ok((texts.join("\n"), pages.len()))
            }
        }
    }

    /// Recognize a document and extract its fields.
    pub fn scan(&self, data: &[u8], kind: DocumentKind) -> Result<ScanResult, BillscanError> {
        let start = Instant::now();
        info!("Scanning {:?} document ({} bytes)", kind, data.len());

        let (raw_text, page_count) = self.recognize_text(data, kind)?;
        if raw_text.trim().is_empty() {
            warn!("No text recognized; fields will fall back to defaults");
        }

        let fields = self.extractor.extract(&raw_text);

        Ok(ScanResult {
            fields,
            raw_text,
            metadata: ScanMetadata {
                kind,
                byte_len: data.len(),
                page_count,
                processing_time_ms: start.elapsed().as_millis() as u64,
            },
        })
    }

    fn check_languages(&self) -> Result<(), OcrError> {
        if self.languages.iter().all(|l| l.trim().is_empty()) {
            return Err(OcrError::NoLanguages);
        }
        Ok(())
    }
}

#[cfg(feature = "native")]
impl BillScanner<super::TesseractRecognizer, super::PopplerRasterizer> {
    /// Scanner driving the external tesseract and pdftoppm tools.
    pub fn from_config(config: &crate::models::config::BillscanConfig) -> Result<Self, BillscanError> {
        let recognizer = super::TesseractRecognizer::new(&config.ocr.tesseract_cmd);
        let rasterizer = super::PopplerRasterizer::new(&config.pdf.pdftoppm_cmd)
            .with_dpi(config.pdf.render_dpi)
            .with_max_pages(config.pdf.max_pages);
        let extractor = FieldExtractor::from_config(&config.extraction)?;

        Ok(Self::new(recognizer, rasterizer)
            .with_extractor(extractor)
            .with_languages(config.ocr.languages.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GenericImageView, ImageFormat};
    use rust_decimal::Decimal;
    use std::io::Cursor;
    use std::str::FromStr;

    /// Recognizer that reads text off the image width.
    struct PagesByWidth(Vec<&'static str>);

    impl TextRecognizer for PagesByWidth {
        fn recognize(&self, image: &DynamicImage, languages: &[String]) -> Result<String, OcrError> {
            assert_eq!(languages, ["eng", "ara"]);
            let (width, _) = image.dimensions();
            self.0
                .get(width as usize - 1)
                .map(|s| s.to_string())
                .ok_or_else(|| OcrError::InvalidImage(format!("no page {}", width)))
        }
    }

    /// Rasterizer returning one blank page per width.
    struct Pages(Vec<u32>);

    impl PageRasterizer for Pages {
        fn rasterize(&self, _pdf: &[u8]) -> Result<Vec<DynamicImage>, RasterError> {
            Ok(self.0.iter().map(|w| DynamicImage::new_rgb8(*w, 1)).collect())
        }
    }

    fn png_bytes(width: u32) -> Vec<u8> {
        let mut data = Vec::new();
        DynamicImage::new_rgb8(width, 1)
            .write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
            .unwrap();
        data
    }

    #[test]
    fn test_scan_image() {
        let scanner = BillScanner::new(
            PagesByWidth(vec!["ADNOC Station 221\n01/03/2025\nTOTAL AED 120.00"]),
            Pages(vec![]),
        );
        let data = png_bytes(1);

        let result = scanner.scan(&data, DocumentKind::Image).unwrap();

        assert_eq!(result.fields.header, "ADNOC Station 221");
        assert_eq!(result.fields.date, "01/03/2025");
        assert_eq!(result.fields.total, Decimal::from_str("120.00").unwrap());
        assert_eq!(result.metadata.byte_len, data.len());
        assert_eq!(result.metadata.page_count, 1);
    }

    #[test]
    fn test_scan_pdf_joins_pages_with_newline() {
        let scanner = BillScanner::new(
            PagesByWidth(vec!["Page one header", "BALANCE 75.00"]),
            Pages(vec![1, 2]),
        );

        let result = scanner.scan(b"%PDF-1.7", DocumentKind::Pdf).unwrap();

        assert_eq!(result.raw_text, "Page one header\nBALANCE 75.00");
        assert_eq!(result.fields.total, Decimal::from_str("75.00").unwrap());
        assert_eq!(result.metadata.page_count, 2);
    }

    #[test]
    fn test_scan_text_passthrough() {
        let scanner = BillScanner::new(PagesByWidth(vec![]), Pages(vec![]));

        let result = scanner.scan(b"Spinneys\nAMOUNT 3.25", DocumentKind::Text).unwrap();

        assert_eq!(result.fields.header, "Spinneys");
        assert_eq!(result.fields.total, Decimal::from_str("3.25").unwrap());
    }

    #[test]
    fn test_empty_pdf_is_an_error() {
        let scanner = BillScanner::new(PagesByWidth(vec![]), Pages(vec![]));

        let err = scanner.scan(b"%PDF-1.7", DocumentKind::Pdf).unwrap_err();
        assert!(matches!(err, BillscanError::Raster(RasterError::NoPages)));
    }

    #[test]
    fn test_page_ocr_failure_propagates() {
        let scanner = BillScanner::new(PagesByWidth(vec!["only one"]), Pages(vec![1, 2]));

        let err = scanner.scan(b"%PDF-1.7", DocumentKind::Pdf).unwrap_err();
        assert!(matches!(err, BillscanError::Ocr(OcrError::InvalidImage(_))));
    }

    #[test]
    fn test_undecodable_image() {
        let scanner = BillScanner::new(PagesByWidth(vec![]), Pages(vec![]));

        let err = scanner.scan(b"not an image", DocumentKind::Image).unwrap_err();
        assert!(matches!(err, BillscanError::Image(_)));
    }

    #[test]
    fn test_no_languages() {
        let scanner = BillScanner::new(PagesByWidth(vec!["x"]), Pages(vec![]))
            .with_languages(Vec::new());

        let err = scanner.scan(&png_bytes(1), DocumentKind::Image).unwrap_err();
        assert!(matches!(err, BillscanError::Ocr(OcrError::NoLanguages)));
    }

    #[test]
    fn test_blank_recognition_still_yields_fields() {
        let scanner = BillScanner::new(PagesByWidth(vec!["   \n"]), Pages(vec![]));

        let result = scanner.scan(&png_bytes(1), DocumentKind::Image).unwrap();
        assert_eq!(result.fields, crate::ExtractedFields::unknown());
    }
}
