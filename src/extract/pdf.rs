//! Per-page PDF operations behind a capability interface, with the
//! poppler-utils production implementation.

use std::path::{Path, PathBuf};
use std::process::Command;

use super::{handle_cmd_output, ExtractError};

/// Resolution used when rendering pages for OCR.
const RENDER_DPI: &str = "300";

/// Per-page PDF operations.
///
/// Production shells out to the poppler utilities; the engine's per-page
/// text-vs-OCR decision logic is tested against stub implementations,
/// mirroring [`OcrBackend`](super::OcrBackend).
pub trait PdfToolkit: Send + Sync {
    /// Short toolkit identifier (e.g. "poppler").
    fn name(&self) -> &'static str;

    /// Number of pages in the document.
    fn page_count(&self, pdf_path: &Path) -> Result<u32, ExtractError>;

    /// Text layer of a single page (1-based).
    fn page_text(&self, pdf_path: &Path, page: u32) -> Result<String, ExtractError>;

    /// Whether a page contains embedded raster images.
    fn page_has_images(&self, pdf_path: &Path, page: u32) -> Result<bool, ExtractError>;

    /// Render a single page into `output_dir`, returning the image path.
    fn render_page(
        &self,
        pdf_path: &Path,
        page: u32,
        output_dir: &Path,
    ) -> Result<PathBuf, ExtractError>;
}

/// poppler-utils toolkit: `pdfinfo`, `pdftotext`, `pdfimages`, `pdftoppm`.
pub struct PopplerToolkit;

impl PopplerToolkit {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PopplerToolkit {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfToolkit for PopplerToolkit {
    fn name(&self) -> &'static str {
        "poppler"
    }

    fn page_count(&self, pdf_path: &Path) -> Result<u32, ExtractError> {
        let output = Command::new("pdfinfo").arg(pdf_path).output();
        let stdout =
            handle_cmd_output(output, "pdfinfo (install poppler-utils)", "pdfinfo failed")?;

        for line in stdout.lines() {
            if let Some(rest) = line.strip_prefix("Pages:") {
                if let Ok(pages) = rest.trim().parse() {
                    return Ok(pages);
                }
            }
        }
        Err(ExtractError::Malformed(
            "pdfinfo output had no page count".to_string(),
        ))
    }

    fn page_text(&self, pdf_path: &Path, page: u32) -> Result<String, ExtractError> {
        let page_str = page.to_string();
        let output = Command::new("pdftotext")
            .args(["-layout", "-enc", "UTF-8", "-f", &page_str, "-l", &page_str])
            .arg(pdf_path)
            .arg("-") // stdout
            .output();

        handle_cmd_output(
            output,
            "pdftotext (install poppler-utils)",
            &format!("pdftotext failed on page {}", page),
        )
    }

    fn page_has_images(&self, pdf_path: &Path, page: u32) -> Result<bool, ExtractError> {
        let page_str = page.to_string();
        let output = Command::new("pdfimages")
            .args(["-list", "-f", &page_str, "-l", &page_str])
            .arg(pdf_path)
            .output();

        let stdout = handle_cmd_output(
            output,
            "pdfimages (install poppler-utils)",
            &format!("pdfimages failed on page {}", page),
        )?;

        // First two lines are the column header and its underline; anything
        // after that is one image per line.
        let image_rows = stdout
            .lines()
            .skip(2)
            .filter(|line| !line.trim().is_empty())
            .count();
        Ok(image_rows > 0)
    }

    fn render_page(
        &self,
        pdf_path: &Path,
        page: u32,
        output_dir: &Path,
    ) -> Result<PathBuf, ExtractError> {
        let page_str = page.to_string();
        let output_prefix = output_dir.join("page");

        let status = Command::new("pdftoppm")
            .args(["-png", "-r", RENDER_DPI, "-f", &page_str, "-l", &page_str])
            .arg(pdf_path)
            .arg(&output_prefix)
            .status();

        match status {
            Ok(s) if s.success() => find_page_image(output_dir, page).ok_or_else(|| {
                ExtractError::ToolFailed(format!("pdftoppm produced no image for page {}", page))
            }),
            Ok(_) => Err(ExtractError::ToolFailed(
                "pdftoppm failed to render PDF page".to_string(),
            )),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ExtractError::ToolNotFound(
                "pdftoppm (install poppler-utils)".to_string(),
            )),
            Err(e) => Err(ExtractError::Io(e)),
        }
    }
}

/// Find the image file for a specific page number.
///
/// pdftoppm zero-pads the page number to the document's width, so probe the
/// plausible widths (page-1.png, page-01.png, page-001.png, ...).
fn find_page_image(dir: &Path, page: u32) -> Option<PathBuf> {
    for digits in [1, 2, 3, 4] {
        let filename = format!("page-{:0width$}.png", page, width = digits);
        let path = dir.join(&filename);
        if path.exists() {
            return Some(path);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_page_image_probes_padding_widths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("page-007.png"), b"png").unwrap();
        assert_eq!(
            find_page_image(dir.path(), 7),
            Some(dir.path().join("page-007.png"))
        );
        assert_eq!(find_page_image(dir.path(), 8), None);
    }
}
