use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::types::OcrEngine;
use super::ExtractionError;

/// LSTM engine only.
const OCR_ENGINE_MODE: &str = "1";
/// Assume a single uniform block of text.
const PAGE_SEGMENTATION_MODE: &str = "6";

#[cfg(feature = "ocr")]
const DEFAULT_LANG: &str = "eng";

/// In-process Tesseract via libtesseract.
/// Only available when compiled with the `ocr` feature flag.
#[cfg(feature = "ocr")]
#[derive(Debug, Clone)]
pub struct BundledTesseract {
    tessdata_dir: Option<PathBuf>,
    lang: String,
}

#[cfg(feature = "ocr")]
impl BundledTesseract {
    /// `None` leaves tessdata discovery to Tesseract (`TESSDATA_PREFIX`).
    pub fn new(tessdata_dir: Option<&std::path::Path>) -> Result<Self, ExtractionError> {
        if let Some(dir) = tessdata_dir {
            if !dir.join(format!("{DEFAULT_LANG}.traineddata")).exists() {
                return Err(ExtractionError::OcrInit(format!(
                    "{DEFAULT_LANG}.traineddata not found in {}",
                    dir.display()
                )));
            }
        }
        Ok(Self {
            tessdata_dir: tessdata_dir.map(std::path::Path::to_path_buf),
            lang: DEFAULT_LANG.to_string(),
        })
    }

    /// Set language(s) for OCR (e.g., "eng", "eng+fra")
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }
}

#[cfg(feature = "ocr")]
impl OcrEngine for BundledTesseract {
    fn ocr_image(&self, image_bytes: &[u8]) -> Result<String, ExtractionError> {
        let tessdata = match &self.tessdata_dir {
            Some(dir) => Some(
                dir.to_str()
                    .ok_or_else(|| ExtractionError::OcrInit("Invalid tessdata path".into()))?,
            ),
            None => None,
        };

        let tess = tesseract::Tesseract::new_with_oem(
            tessdata,
            Some(&self.lang),
            tesseract::OcrEngineMode::LstmOnly,
        )
        .map_err(|e| ExtractionError::OcrInit(format!("{e:?}")))?;

        let mut tess = tess
            .set_variable("tessedit_pageseg_mode", PAGE_SEGMENTATION_MODE)
            .map_err(|e| ExtractionError::OcrInit(format!("{e:?}")))?
            .set_image_from_mem(image_bytes)
            .map_err(|e| ExtractionError::OcrProcessing(format!("{e:?}")))?;

        let text = tess
            .get_text()
            .map_err(|e| ExtractionError::OcrProcessing(format!("{e:?}")))?;

        tracing::debug!(chars = text.len(), lang = %self.lang, "Tesseract recognized text");
        Ok(text)
    }
}

/// Tesseract driven through its command-line interface. Used when the crate
/// is built without the `ocr` feature.
///
/// Image bytes go in on stdin and recognized text comes back on stdout, so
/// nothing touches disk.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    binary: PathBuf,
    lang: Option<String>,
}

impl TesseractCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            lang: None,
        }
    }

    /// Tesseract language code, e.g. `"eng"` or `"eng+fra"`.
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(["stdin", "stdout", "--oem", OCR_ENGINE_MODE, "--psm", PAGE_SEGMENTATION_MODE]);
        if let Some(lang) = &self.lang {
            cmd.args(["-l", lang]);
        }
        cmd
    }
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl OcrEngine for TesseractCli {
    fn ocr_image(&self, image_bytes: &[u8]) -> Result<String, ExtractionError> {
        let mut child = self
            .command()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => ExtractionError::OcrInit(format!(
                    "tesseract not found at {}",
                    self.binary.display()
                )),
                _ => ExtractionError::OcrInit(e.to_string()),
            })?;

        // Tesseract reads the whole image before writing anything. It may also
        // exit without reading, so the child is reaped before the write result
        // is looked at.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(image_bytes),
            None => Ok(()),
        };

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::OcrProcessing(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        written?;

        let text = String::from_utf8(output.stdout)
            .map_err(|e| ExtractionError::OcrProcessing(format!("non UTF-8 output: {e}")))?;

        tracing::debug!(chars = text.len(), "Tesseract recognized text");
        Ok(text)
    }
}

/// Mock OCR engine for unit testing without Tesseract.
#[derive(Debug, Default)]
pub struct MockOcrEngine {
    pub text: String,
    calls: AtomicUsize,
}

impl MockOcrEngine {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of images this engine has been asked to read.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OcrEngine for MockOcrEngine {
    fn ocr_image(&self, _image_bytes: &[u8]) -> Result<String, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}
