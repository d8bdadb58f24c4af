//! OCR capability interface and the Tesseract command-line backend.

use std::path::Path;
use std::process::Command;

use super::{handle_cmd_output, ExtractError};

/// Trait for OCR backends.
///
/// The engine's control flow is tested against stub implementations
/// returning canned results; production uses [`TesseractBackend`].
pub trait OcrBackend: Send + Sync {
    /// Short backend identifier (e.g. "tesseract").
    fn name(&self) -> &'static str;

    /// Whether the backend's dependencies are installed.
    fn is_available(&self) -> bool;

    /// What is needed to make this backend available.
    fn availability_hint(&self) -> String;

    /// Extract text from an image file.
    fn run_ocr(&self, image_path: &Path) -> Result<String, ExtractError>;
}

/// Tesseract OCR via the system binary.
pub struct TesseractBackend {
    language: String,
}

impl TesseractBackend {
    pub fn new() -> Self {
        Self {
            language: "eng".to_string(),
        }
    }

    pub fn with_language(mut self, lang: &str) -> Self {
        self.language = lang.to_string();
        self
    }
}

impl Default for TesseractBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrBackend for TesseractBackend {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn is_available(&self) -> bool {
        which::which("tesseract").is_ok()
    }

    fn availability_hint(&self) -> String {
        "Install tesseract-ocr and ensure 'tesseract' is in PATH".to_string()
    }

    fn run_ocr(&self, image_path: &Path) -> Result<String, ExtractError> {
        let output = Command::new("tesseract")
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.language])
            .output();

        handle_cmd_output(
            output,
            "tesseract (install tesseract-ocr)",
            "tesseract failed",
        )
    }
}
