use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::ExtractionError;

/// Result of extracting one prescription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// OCR text after dictionary correction.
    pub full_text: String,
    /// Medication names found in `full_text`, sorted. `None` when nothing matched.
    pub recognized_medications: Option<Vec<String>>,
}

/// How an input file is turned into a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    Image,
    Pdf,
}

impl InputFormat {
    /// Decided by extension: `.pdf` (any case) is a PDF, everything else is
    /// handed to the image decoder.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => Self::Pdf,
            _ => Self::Image,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Pdf => "pdf",
        }
    }
}

/// Turns raw image bytes into an OCR-ready raster (PNG bytes).
pub trait ImagePreprocessor {
    fn preprocess(&self, image_bytes: &[u8]) -> Result<Vec<u8>, ExtractionError>;
}

/// OCR engine abstraction (allows mocking for tests)
pub trait OcrEngine {
    /// Raw UTF-8 text recognized in an encoded image.
    fn ocr_image(&self, image_bytes: &[u8]) -> Result<String, ExtractionError>;
}

impl<T: OcrEngine + ?Sized> OcrEngine for Arc<T> {
    fn ocr_image(&self, image_bytes: &[u8]) -> Result<String, ExtractionError> {
        (**self).ocr_image(image_bytes)
    }
}

/// Renders the first page of a PDF to encoded image bytes.
pub trait PdfRasterizer {
    fn render_first_page(&self, pdf_path: &Path) -> Result<Vec<u8>, ExtractionError>;
}

/// File-level extraction: raster acquisition, OCR, correction, recognition.
pub trait TextExtractor {
    fn extract_file(&self, path: &Path) -> Result<ExtractionResult, ExtractionError>;
}
