pub mod types;
pub mod preprocess;
pub mod ocr;
pub mod pdfium;
pub mod report;
pub mod orchestrator;

pub use types::*;
pub use preprocess::*;
pub use ocr::*;
pub use pdfium::*;
pub use report::*;
pub use orchestrator::*;

use thiserror::Error;

use crate::pipeline::correction::LexiconError;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unreadable input: {0}")]
    UnreadableInput(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("OCR engine initialization failed: {0}")]
    OcrInit(String),

    #[error("OCR processing failed: {0}")]
    OcrProcessing(String),

    #[error("PDF rendering failed: {0}")]
    PdfRendering(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error(transparent)]
    Lexicon(#[from] LexiconError),
}
