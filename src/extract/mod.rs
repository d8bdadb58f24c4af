//! Text extraction from classified documents.
//!
//! Dispatches on [`DocumentKind`](crate::mime::DocumentKind):
//! - plain text: permissive (lossy) read
//! - PDF: per-page text layer via pdftotext, with a 300 DPI pdftoppm render
//!   + OCR fallback for pages that are image-bearing or textless
//! - OOXML documents: paragraph text out of the zip archive
//! - legacy `.doc`: external converter behind [`LegacyDocConverter`]
//! - images: whitespace-crop preprocessing, then OCR
//!
//! Every failure in here degrades to empty text for the affected file; the
//! batch is never aborted by a single document.

mod docx;
mod engine;
mod legacy;
mod ocr;
mod pdf;

pub use engine::ExtractionEngine;
pub use legacy::{CatdocConverter, LegacyDocConverter};
pub use ocr::{OcrBackend, TesseractBackend};
pub use pdf::{PdfToolkit, PopplerToolkit};

use thiserror::Error;

/// Errors that can occur during text extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("Malformed document: {0}")]
    Malformed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Handle command output, extracting stdout on success or mapping failure
/// modes onto `ExtractError`.
pub(crate) fn handle_cmd_output(
    result: std::io::Result<std::process::Output>,
    tool_name: &str,
    error_prefix: &str,
) -> Result<String, ExtractError> {
    match result {
        Ok(output) => {
            if output.status.success() {
                Ok(String::from_utf8_lossy(&output.stdout).to_string())
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(ExtractError::ToolFailed(format!(
                    "{}: {}",
                    error_prefix,
                    stderr.trim()
                )))
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ExtractError::ToolNotFound(tool_name.to_string()))
        }
        Err(e) => Err(ExtractError::Io(e)),
    }
}
