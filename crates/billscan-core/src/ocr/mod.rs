//! Seams for the OCR and PDF rasterization collaborators.
//!
//! Neither text recognition nor PDF rendering happens in this crate. The
//! traits below describe what the scanner needs from them; the `native`
//! feature provides adapters that drive the `tesseract` and `pdftoppm`
//! executables.

mod scanner;

#[cfg(feature = "native")]
mod poppler;
#[cfg(feature = "native")]
mod tesseract;

pub use scanner::BillScanner;

#[cfg(feature = "native")]
pub use poppler::PopplerRasterizer;
#[cfg(feature = "native")]
pub use tesseract::TesseractRecognizer;

use image::DynamicImage;

use crate::error::{OcrError, RasterError};

/// Produces text from an image.
pub trait TextRecognizer: Send + Sync {
    /// Recognize all text in `image` using the declared languages.
    ///
    /// Languages are engine codes such as `eng` or `ara`.
    fn recognize(&self, image: &DynamicImage, languages: &[String]) -> Result<String, OcrError>;
}

/// Renders PDF pages to images.
pub trait PageRasterizer: Send + Sync {
    /// Render every page of `pdf`, in page order.
    fn rasterize(&self, pdf: &[u8]) -> Result<Vec<DynamicImage>, RasterError>;
}

impl<T: TextRecognizer + ?Sized> TextRecognizer for Box<T> {
    fn recognize(&self, image: &DynamicImage, languages: &[String]) -> Result<String, OcrError> {
        (**self).recognize(image, languages)
    }
}

impl<T: PageRasterizer + ?Sized> PageRasterizer for Box<T> {
    fn rasterize(&self, pdf: &[u8]) -> Result<Vec<DynamicImage>, RasterError> {
        (**self).rasterize(pdf)
    }
}
