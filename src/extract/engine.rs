//! Extraction engine: dispatch by document kind, degrade-to-empty on failure.

use std::path::Path;

use image::DynamicImage;
use tempfile::TempDir;

use crate::image_prep;
use crate::mime::DocumentKind;

use super::{
    docx, CatdocConverter, ExtractError, LegacyDocConverter, OcrBackend, PdfToolkit,
    PopplerToolkit, TesseractBackend,
};

/// Text extraction engine.
///
/// OCR, legacy-doc conversion, and the per-page PDF operations are injected
/// capabilities so the dispatch and per-page decision logic can be
/// exercised without the real tools.
pub struct ExtractionEngine {
    ocr: Box<dyn OcrBackend>,
    legacy: Box<dyn LegacyDocConverter>,
    pdf: Box<dyn PdfToolkit>,
}

impl Default for ExtractionEngine {
    fn default() -> Self {
        Self {
            ocr: Box::new(TesseractBackend::new()),
            legacy: Box::new(CatdocConverter::new()),
            pdf: Box::new(PopplerToolkit::new()),
        }
    }
}

impl ExtractionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ocr_backend(mut self, ocr: Box<dyn OcrBackend>) -> Self {
        self.ocr = ocr;
        self
    }

    pub fn with_legacy_converter(mut self, legacy: Box<dyn LegacyDocConverter>) -> Self {
        self.legacy = legacy;
        self
    }

    pub fn with_pdf_toolkit(mut self, pdf: Box<dyn PdfToolkit>) -> Self {
        self.pdf = pdf;
        self
    }

    /// Extract text from a file of the given kind.
    ///
    /// Never fails: corrupt files, missing external tools, and codec errors
    /// all degrade to an empty string for this file, logged, so one bad
    /// document cannot abort the batch.
    pub fn extract(&self, path: &Path, kind: DocumentKind) -> String {
        let result = match kind {
            DocumentKind::Text => self.read_text(path),
            DocumentKind::Pdf => self.extract_pdf(path),
            DocumentKind::Docx => docx::extract_paragraphs(path),
            DocumentKind::LegacyDoc => self.extract_legacy(path),
            DocumentKind::Image => self.extract_image(path),
        };

        match result {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!("extraction failed for {}: {}", path.display(), err);
                String::new()
            }
        }
    }

    /// Permissive plain-text read: invalid byte sequences are dropped.
    fn read_text(&self, path: &Path) -> Result<String, ExtractError> {
        let bytes = std::fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).to_string())
    }

    /// Per-page PDF extraction.
    ///
    /// A page's text layer is used verbatim (untrimmed) only when text was
    /// found and the page carries no embedded images; otherwise the whole
    /// page is rendered at 300 DPI and OCRed. Pages are concatenated in
    /// order, each followed by a newline; only the final result is trimmed.
    fn extract_pdf(&self, path: &Path) -> Result<String, ExtractError> {
        let pages = self.pdf.page_count(path)?;
        let mut full_text = String::new();

        for page in 1..=pages {
            let layer_text = self.pdf.page_text(path, page).unwrap_or_default();
            // If pdfimages is unusable the presence of images is unknowable;
            // fall through to OCR, the conservative path.
            let has_images = self.pdf.page_has_images(path, page).unwrap_or(true);

            if !layer_text.trim().is_empty() && !has_images {
                full_text.push_str(&layer_text);
            } else {
                tracing::info!(
                    "page {} of {} has images or no text layer, running OCR",
                    page,
                    path.display()
                );
                match self.ocr_pdf_page(path, page) {
                    Ok(ocr_text) => full_text.push_str(&ocr_text),
                    Err(err) => {
                        // Page degrades to whatever the text layer had.
                        tracing::warn!(
                            "OCR failed for page {} of {}: {}",
                            page,
                            path.display(),
                            err
                        );
                        full_text.push_str(&layer_text);
                    }
                }
            }
            full_text.push('\n');
        }

        Ok(full_text.trim().to_string())
    }

    /// Render one page as an image and OCR it.
    fn ocr_pdf_page(&self, path: &Path, page: u32) -> Result<String, ExtractError> {
        let temp_dir = TempDir::new()?;
        let image_path = self.pdf.render_page(path, page, temp_dir.path())?;
        let image = image::open(&image_path).map_err(|e| ExtractError::Image(e.to_string()))?;
        self.ocr_image(image)
    }

    fn extract_legacy(&self, path: &Path) -> Result<String, ExtractError> {
        match self.legacy.convert(path) {
            Ok(text) => Ok(text),
            Err(ExtractError::ToolNotFound(tool)) => {
                // Converter unavailable is an empty result, not a failure.
                tracing::warn!(
                    "legacy converter unavailable ({}), skipping {}",
                    tool,
                    path.display()
                );
                Ok(String::new())
            }
            Err(err) => Err(err),
        }
    }

    fn extract_image(&self, path: &Path) -> Result<String, ExtractError> {
        let image = image::open(path).map_err(|e| ExtractError::Image(e.to_string()))?;
        self.ocr_image(image)
    }

    /// Preprocess and OCR a decoded image.
    ///
    /// Grayscale conversion happens only when the preprocessor did not take
    /// the crop path: that path already worked from a grayscale derivative,
    /// and OCR accuracy depends on the two paths staying consistent.
    fn ocr_image(&self, image: DynamicImage) -> Result<String, ExtractError> {
        let (image, was_cropped) = image_prep::preprocess(image);
        let image = if was_cropped {
            image
        } else {
            DynamicImage::ImageLuma8(image.to_luma8())
        };

        let temp_dir = TempDir::new()?;
        let input_path = temp_dir.path().join("ocr-input.png");
        image
            .save(&input_path)
            .map_err(|e| ExtractError::Image(e.to_string()))?;

        let text = self.ocr.run_ocr(&input_path)?;
        Ok(text.trim().to_string())
    }
}
