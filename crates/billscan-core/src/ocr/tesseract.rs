//! Text recognition through the tesseract executable.

use std::path::{Path, PathBuf};
use std::process::Command;

use image::{DynamicImage, ImageFormat};
use tracing::{debug, trace};

use crate::error::OcrError;

use super::TextRecognizer;

/// Recognizer that shells out to `tesseract <image> stdout -l <langs>`.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    command: PathBuf,
}

impl TesseractRecognizer {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &Path {
        &self.command
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, image: &DynamicImage, languages: &[String]) -> Result<String, OcrError> {
        let languages: Vec<&str> = languages
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect();
        if languages.is_empty() {
            return Err(OcrError::NoLanguages);
        }

        let file = tempfile::Builder::new()
            .prefix("billscan-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| OcrError::InvalidImage(format!("cannot create temp file: {}", e)))?;
        image
            .save_with_format(file.path(), ImageFormat::Png)
            .map_err(|e| OcrError::InvalidImage(e.to_string()))?;

        let lang = languages.join("+");
        debug!("Running {} with -l {}", self.command.display(), lang);

        let output = Command::new(&self.command)
            .arg(file.path())
            .arg("stdout")
            .arg("-l")
            .arg(&lang)
            .output()
            .map_err(|source| OcrError::Launch {
                command: self.command.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(OcrError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        trace!("Recognized {} characters", text.chars().count());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_executable() {
        let recognizer = TesseractRecognizer::new("/nonexistent/billscan-tesseract");
        let image = DynamicImage::new_rgb8(2, 2);

        let err = recognizer
            .recognize(&image, &["eng".to_string()])
            .unwrap_err();
        assert!(matches!(err, OcrError::Launch { .. }));
    }

    #[test]
    fn test_blank_languages_rejected_before_launch() {
        let recognizer = TesseractRecognizer::new("/nonexistent/billscan-tesseract");
        let image = DynamicImage::new_rgb8(2, 2);

        let err = recognizer.recognize(&image, &[" ".to_string()]).unwrap_err();
        assert!(matches!(err, OcrError::NoLanguages));
    }
}
