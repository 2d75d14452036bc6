//! PDF page rendering through poppler's pdftoppm.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use image::DynamicImage;
use tracing::debug;

use crate::error::RasterError;

use super::PageRasterizer;

/// Rasterizer that shells out to `pdftoppm -r <dpi> -png`.
#[derive(Debug, Clone)]
pub struct PopplerRasterizer {
    command: PathBuf,
    dpi: u32,
    max_pages: usize,
}

impl PopplerRasterizer {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            dpi: 200,
            max_pages: 0,
        }
    }

    /// Set the render resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Limit the number of rendered pages (0 = all).
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn command(&self) -> &Path {
        &self.command
    }
}

impl Default for PopplerRasterizer {
    fn default() -> Self {
        Self::new("pdftoppm")
    }
}

impl PageRasterizer for PopplerRasterizer {
    fn rasterize(&self, pdf: &[u8]) -> Result<Vec<DynamicImage>, RasterError> {
        let dir = tempfile::Builder::new().prefix("billscan-").tempdir()?;
        let input = dir.path().join("input.pdf");
        fs::write(&input, pdf)?;

        let mut command = Command::new(&self.command);
        command.arg("-r").arg(self.dpi.to_string()).arg("-png");
        if self.max_pages > 0 {
            command.arg("-l").arg(self.max_pages.to_string());
        }
        command.arg(&input).arg(dir.path().join("page"));

        debug!("Running {} at {} dpi", self.command.display(), self.dpi);
        let output = command.output().map_err(|source| RasterError::Launch {
            command: self.command.display().to_string(),
            source,
        })?;

        if !output.status.success() {
            return Err(RasterError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let pages = rendered_pages(dir.path())?;
        if pages.is_empty() {
            return Err(RasterError::NoPages);
        }
        debug!("pdftoppm rendered {} pages", pages.len());

        pages
            .iter()
            .enumerate()
            .map(|(i, path)| {
                image::open(path).map_err(|e| RasterError::PageLoad {
                    page: i + 1,
                    reason: e.to_string(),
                })
            })
            .collect()
    }
}

/// Rendered page files in page order.
///
/// pdftoppm zero-pads page numbers to a common width, so name order is page
/// order.
fn rendered_pages(dir: &Path) -> Result<Vec<PathBuf>, RasterError> {
    let mut pages: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            let is_png = path.extension().and_then(|e| e.to_str()) == Some("png");
            let is_page = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("page-"));
            is_png && is_page
        })
        .collect();
    pages.sort();
    Ok(pages)
}
