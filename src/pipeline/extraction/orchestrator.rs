use std::path::Path;
use std::sync::Arc;

#[cfg(feature = "ocr")]
use super::ocr::BundledTesseract;
#[cfg(not(feature = "ocr"))]
use super::ocr::TesseractCli;
use super::pdfium::PdfiumRenderer;
use super::preprocess::BinarizingPreprocessor;
use super::types::{
    ExtractionResult, ImagePreprocessor, InputFormat, OcrEngine, PdfRasterizer, TextExtractor,
};
use super::ExtractionError;
use crate::config::RxConfig;
use crate::pipeline::correction::{recognize, tokenize, Corrector, Lexicon, MedicationSet};

/// Tokenize, correct, and recognize medications in raw OCR text. No I/O.
pub fn extract(raw_text: &str, corrector: &Corrector, medications: &MedicationSet) -> ExtractionResult {
    let tokens = tokenize(raw_text);
    let full_text = corrector.correct(&tokens);
    let recognized_medications = recognize(&full_text, medications);

    ExtractionResult {
        full_text,
        recognized_medications,
    }
}

/// Encoded image bytes for `path`: page 1 of a PDF, or the file itself.
///
/// A PDF without a rasterizer fails with `UnsupportedFormat` before the file
/// is touched.
pub fn load_input(
    path: &Path,
    pdf_rasterizer: Option<&dyn PdfRasterizer>,
) -> Result<Vec<u8>, ExtractionError> {
    match InputFormat::from_path(path) {
        InputFormat::Pdf => {
            let rasterizer = pdf_rasterizer.ok_or_else(|| {
                ExtractionError::UnsupportedFormat("PDF input requires a PDF rasterizer".into())
            })?;
            rasterizer.render_first_page(path)
        }
        InputFormat::Image => std::fs::read(path)
            .map_err(|e| ExtractionError::UnreadableInput(format!("{}: {e}", path.display()))),
    }
}

/// The OCR engine for this build: in-process Tesseract with the `ocr`
/// feature, the `tesseract` executable otherwise.
#[cfg(feature = "ocr")]
pub fn default_ocr_engine(config: &RxConfig) -> Result<Box<dyn OcrEngine + Send + Sync>, ExtractionError> {
    Ok(Box::new(BundledTesseract::new(config.tessdata_dir.as_deref())?))
}

#[cfg(not(feature = "ocr"))]
pub fn default_ocr_engine(config: &RxConfig) -> Result<Box<dyn OcrEngine + Send + Sync>, ExtractionError> {
    Ok(Box::new(TesseractCli::new(&config.tesseract_bin)))
}

/// Prescription extractor: raster acquisition and OCR through injected
/// collaborators, then correction against a shared lexicon.
pub struct PrescriptionExtractor {
    preprocessor: Box<dyn ImagePreprocessor + Send + Sync>,
    ocr_engine: Box<dyn OcrEngine + Send + Sync>,
    pdf_rasterizer: Option<Box<dyn PdfRasterizer + Send + Sync>>,
    lexicon: Arc<Lexicon>,
}

impl PrescriptionExtractor {
    pub fn new(
        preprocessor: Box<dyn ImagePreprocessor + Send + Sync>,
        ocr_engine: Box<dyn OcrEngine + Send + Sync>,
        lexicon: Arc<Lexicon>,
    ) -> Self {
        Self {
            preprocessor,
            ocr_engine,
            pdf_rasterizer: None,
            lexicon,
        }
    }

    /// Enable PDF input.
    pub fn with_pdf_rasterizer(mut self, rasterizer: Box<dyn PdfRasterizer + Send + Sync>) -> Self {
        self.pdf_rasterizer = Some(rasterizer);
        self
    }

    /// Default adapters: binarizing preprocessor, the build's OCR engine, and
    /// PDFium when the library binds.
    pub fn from_config(config: &RxConfig, lexicon: Arc<Lexicon>) -> Result<Self, ExtractionError> {
        let extractor = Self::new(
            Box::new(BinarizingPreprocessor::default()),
            default_ocr_engine(config)?,
            lexicon,
        );
        match PdfiumRenderer::new(config.pdfium_library.as_deref()) {
            Ok(renderer) => Ok(extractor.with_pdf_rasterizer(Box::new(renderer))),
            Err(e) => {
                tracing::debug!(error = %e, "PDF input disabled");
                Ok(extractor)
            }
        }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn supports_pdf(&self) -> bool {
        self.pdf_rasterizer.is_some()
    }

    /// Run the full pipeline on one file.
    pub fn process_file(&self, path: &Path) -> Result<ExtractionResult, ExtractionError> {
        let format = InputFormat::from_path(path);
        tracing::info!(path = %path.display(), format = format.as_str(), "Starting extraction");

        let rasterizer = self.pdf_rasterizer.as_ref().map(|r| &**r as &dyn PdfRasterizer);
        let image_bytes = load_input(path, rasterizer)?;
        let prepared = self.preprocessor.preprocess(&image_bytes)?;
        let raw_text = self.ocr_engine.ocr_image(&prepared)?;
        let result = self.extract_text(&raw_text);

        log_completion(&result);
        Ok(result)
    }

    /// Correction and recognition on already-recognized text.
    pub fn extract_text(&self, raw_text: &str) -> ExtractionResult {
        extract(raw_text, self.lexicon.corrector(), self.lexicon.medications())
    }
}

impl TextExtractor for PrescriptionExtractor {
    fn extract_file(&self, path: &Path) -> Result<ExtractionResult, ExtractionError> {
        self.process_file(path)
    }
}

fn log_completion(result: &ExtractionResult) {
    tracing::info!(
        chars = result.full_text.len(),
        medications = result.recognized_medications.as_ref().map_or(0, Vec::len),
        "Extraction complete"
    );
}

/// One-shot flow: configuration from the environment and the default
/// adapters, with the lexicon loaded fresh.
///
/// The input is read and preprocessed before the dictionaries, so input
/// problems are reported ahead of dictionary problems. PDFium is only bound
/// for PDF input.
pub fn process_image(path: &Path) -> Result<ExtractionResult, ExtractionError> {
    let config = RxConfig::from_env();
    let format = InputFormat::from_path(path);
    tracing::info!(path = %path.display(), format = format.as_str(), "Starting extraction");

    let renderer = match format {
        InputFormat::Pdf => Some(PdfiumRenderer::new(config.pdfium_library.as_deref())?),
        InputFormat::Image => None,
    };
    let image_bytes = load_input(path, renderer.as_ref().map(|r| r as &dyn PdfRasterizer))?;
    let prepared = BinarizingPreprocessor::default().preprocess(&image_bytes)?;

    let lexicon = Lexicon::load(&config.lexicon)?;
    let raw_text = default_ocr_engine(&config)?.ocr_image(&prepared)?;
    let result = extract(&raw_text, lexicon.corrector(), lexicon.medications());

    log_completion(&result);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::correction::{CorrectionConfig, DictionaryEntry, FrequencyIndex};
    use crate::pipeline::extraction::ocr::MockOcrEngine;
    use std::io::Cursor;

    /// Hands the input bytes straight to OCR.
    struct PassthroughPreprocessor;

    impl ImagePreprocessor for PassthroughPreprocessor {
        fn preprocess(&self, image_bytes: &[u8]) -> Result<Vec<u8>, ExtractionError> {
            Ok(image_bytes.to_vec())
        }
    }

    struct StaticRasterizer(Vec<u8>);

    impl PdfRasterizer for StaticRasterizer {
        fn render_first_page(&self, _pdf_path: &Path) -> Result<Vec<u8>, ExtractionError> {
            Ok(self.0.clone())
        }
    }

    fn lexicon(words: &[(&str, u64)], meds: &[&str]) -> Arc<Lexicon> {
        let index = FrequencyIndex::build(
            words.iter().map(|&(t, f)| DictionaryEntry::new(t, f)),
            1,
            7,
        );
        Arc::new(
            Lexicon::new(
                Arc::new(index),
                MedicationSet::from_names(meds.iter().copied()),
                CorrectionConfig::default(),
            )
            .unwrap(),
        )
    }

    fn amoxicillin_lexicon() -> Arc<Lexicon> {
        lexicon(&[("amoxicillin", 100)], &["amoxicillin"])
    }

    fn extractor(ocr: Arc<MockOcrEngine>) -> PrescriptionExtractor {
        PrescriptionExtractor::new(
            Box::new(PassthroughPreprocessor),
            Box::new(ocr),
            amoxicillin_lexicon(),
        )
    }

    // ── extract ──

    #[test]
    fn extract_corrects_and_recognizes() {
        let lex = amoxicillin_lexicon();
        let result = extract(
            "Amoxiciliin 500 mg twice daily",
            lex.corrector(),
            lex.medications(),
        );
        assert_eq!(result.full_text, "amoxicillin 500 mg twice daily");
        assert_eq!(result.recognized_medications, Some(vec!["amoxicillin".to_string()]));
    }

    #[test]
    fn extract_without_match_is_none() {
        let lex = amoxicillin_lexicon();
        let result = extract("Take with food", lex.corrector(), lex.medications());
        assert_eq!(result.full_text, "Take with food");
        assert_eq!(result.recognized_medications, None);
    }

    #[test]
    fn extract_reports_substring_matches() {
        let lex = lexicon(&[("ramipril", 10)], &["ram", "ramipril"]);
        let result = extract("ramipril 5mg", lex.corrector(), lex.medications());
        assert_eq!(
            result.recognized_medications,
            Some(vec!["ram".to_string(), "ramipril".to_string()])
        );
    }

    #[test]
    fn extract_empty_text() {
        let lex = amoxicillin_lexicon();
        let result = extract("", lex.corrector(), lex.medications());
        assert_eq!(result.full_text, "");
        assert_eq!(result.recognized_medications, None);
    }

    // ── process_file ──

    #[test]
    fn image_file_runs_full_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rx.png");
        std::fs::write(&path, b"not really decoded").unwrap();

        let ocr = Arc::new(MockOcrEngine::new("Amoxiciliin 500 mg twice daily"));
        let result = extractor(Arc::clone(&ocr)).process_file(&path).unwrap();

        assert_eq!(result.full_text, "amoxicillin 500 mg twice daily");
        assert_eq!(result.recognized_medications, Some(vec!["amoxicillin".to_string()]));
        assert_eq!(ocr.calls(), 1);
    }

    #[test]
    fn pdf_without_rasterizer_fails_before_ocr() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rx.PDF");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let ocr = Arc::new(MockOcrEngine::new("unused"));
        let ex = extractor(Arc::clone(&ocr));
        assert!(!ex.supports_pdf());

        let err = ex.process_file(&path).unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedFormat(_)));
        assert_eq!(ocr.calls(), 0);
    }

    #[test]
    fn pdf_goes_through_rasterizer() {
        let ocr = Arc::new(MockOcrEngine::new("amoxicilin"));
        let ex = extractor(Arc::clone(&ocr))
            .with_pdf_rasterizer(Box::new(StaticRasterizer(b"page one".to_vec())));

        // The static rasterizer never opens the path
        let result = ex.process_file(Path::new("missing.pdf")).unwrap();
        assert_eq!(result.full_text, "amoxicillin");
        assert_eq!(ocr.calls(), 1);
    }

    #[test]
    fn missing_image_is_unreadable_input() {
        let ocr = Arc::new(MockOcrEngine::new("unused"));
        let err = extractor(Arc::clone(&ocr))
            .process_file(Path::new("/nonexistent/rxscan-test/rx.png"))
            .unwrap_err();
        assert!(matches!(err, ExtractionError::UnreadableInput(_)));
        assert_eq!(ocr.calls(), 0);
    }

    #[test]
    fn undecodable_image_is_unreadable_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rx.jpg");
        std::fs::write(&path, vec![0x42u8; 256]).unwrap();

        let ocr = Arc::new(MockOcrEngine::new("unused"));
        let ex = PrescriptionExtractor::new(
            Box::new(BinarizingPreprocessor::default()),
            Box::new(Arc::clone(&ocr)),
            amoxicillin_lexicon(),
        );
        let err = ex.process_file(&path).unwrap_err();
        assert!(matches!(err, ExtractionError::UnreadableInput(_)));
        assert_eq!(ocr.calls(), 0);
    }

    #[test]
    fn real_preprocessor_feeds_ocr() {
        use image::{DynamicImage, GrayImage, ImageOutputFormat, Luma};

        let img = GrayImage::from_fn(32, 32, |x, y| Luma([((x * 37 + y * 91) % 256) as u8]));
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(img)
            .write_to(&mut cursor, ImageOutputFormat::Png)
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::write(&path, cursor.into_inner()).unwrap();

        let ocr = Arc::new(MockOcrEngine::new("Amoxicillin"));
        let ex = PrescriptionExtractor::new(
            Box::new(BinarizingPreprocessor::default()),
            Box::new(Arc::clone(&ocr)),
            amoxicillin_lexicon(),
        );
        let result = ex.extract_file(&path).unwrap();
        assert_eq!(result.full_text, "amoxicillin");
        assert_eq!(ocr.calls(), 1);
    }

    #[test]
    fn from_config_without_pdfium_disables_pdf() {
        use crate::config::LexiconConfig;

        let config = RxConfig {
            lexicon: LexiconConfig::in_dir(Path::new("/nonexistent/rxscan-test")),
            tesseract_bin: "/nonexistent/rxscan-test/tesseract".into(),
            tessdata_dir: None,
            pdfium_library: Some("/nonexistent/rxscan-test/libpdfium.so".into()),
        };
        let ex = PrescriptionExtractor::from_config(&config, amoxicillin_lexicon()).unwrap();
        assert!(!ex.supports_pdf());
        assert_eq!(ex.extract_text("Amoxicilin").full_text, "amoxicillin");
    }

    #[test]
    fn input_errors_win_over_missing_dictionaries() {
        use crate::config::{ENV_DICTIONARY_DIR, ENV_FREQ_DICT, ENV_MED_DICT, ENV_PDFIUM};

        let empty_dictionaries = tempfile::tempdir().unwrap();
        let inputs = tempfile::tempdir().unwrap();
        let pdf = inputs.path().join("rx.pdf");
        std::fs::write(&pdf, b"%PDF-1.4\n").unwrap();

        std::env::set_var(ENV_DICTIONARY_DIR, empty_dictionaries.path());
        std::env::set_var(ENV_PDFIUM, "/nonexistent/rxscan-test/libpdfium.so");
        std::env::remove_var(ENV_FREQ_DICT);
        std::env::remove_var(ENV_MED_DICT);

        let pdf_err = process_image(&pdf).unwrap_err();
        let png_err = process_image(&inputs.path().join("missing.png")).unwrap_err();

        std::env::remove_var(ENV_DICTIONARY_DIR);
        std::env::remove_var(ENV_PDFIUM);

        assert!(matches!(pdf_err, ExtractionError::UnsupportedFormat(_)), "got {pdf_err:?}");
        assert!(matches!(png_err, ExtractionError::UnreadableInput(_)), "got {png_err:?}");
    }

    #[test]
    fn extractor_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PrescriptionExtractor>();
    }
}
