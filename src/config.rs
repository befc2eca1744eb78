use std::path::{Path, PathBuf};

use crate::pipeline::correction::{CorrectionConfig, DictionaryFormat, IndexConfig};

/// Application-level constants
pub const APP_NAME: &str = "rxscan";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const FREQUENCY_DICTIONARY_FILE: &str = "pharmacy_dict.txt";
pub const MEDICATION_NAMES_FILE: &str = "medicine_names.txt";

pub(crate) const ENV_DICTIONARY_DIR: &str = "RXSCAN_DICTIONARY_DIR";
pub(crate) const ENV_FREQ_DICT: &str = "RXSCAN_FREQ_DICT";
pub(crate) const ENV_MED_DICT: &str = "RXSCAN_MED_DICT";
const ENV_TESSERACT: &str = "RXSCAN_TESSERACT";
const ENV_TESSDATA: &str = "RXSCAN_TESSDATA";
pub(crate) const ENV_PDFIUM: &str = "RXSCAN_PDFIUM";
/// Honoured when `RXSCAN_PDFIUM` is unset.
const ENV_PDFIUM_FALLBACK: &str = "PDFIUM_DYNAMIC_LIB_PATH";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "rxscan=info,rxscan_lib=info"
}

/// Get the application data directory (`<data dir>/rxscan`).
/// Falls back to the working directory when the platform has no data dir.
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Directory holding the dictionary files.
///
/// `RXSCAN_DICTIONARY_DIR` wins; otherwise `./dictionary` when it exists,
/// else `<data dir>/rxscan/dictionary`.
pub fn dictionary_dir() -> PathBuf {
    if let Some(dir) = env_path(ENV_DICTIONARY_DIR) {
        return dir;
    }
    let local = PathBuf::from("dictionary");
    if local.is_dir() {
        return local;
    }
    app_data_dir().join("dictionary")
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Where the correction lexicon comes from and how it is indexed.
#[derive(Debug, Clone)]
pub struct LexiconConfig {
    pub frequency_dictionary: PathBuf,
    pub medication_names: PathBuf,
    pub format: DictionaryFormat,
    pub index: IndexConfig,
    pub correction: CorrectionConfig,
}

impl LexiconConfig {
    /// Default file names inside `dir`, distance 1, prefix length 7.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            frequency_dictionary: dir.join(FREQUENCY_DICTIONARY_FILE),
            medication_names: dir.join(MEDICATION_NAMES_FILE),
            format: DictionaryFormat::default(),
            index: IndexConfig::default(),
            correction: CorrectionConfig::default(),
        }
    }
}

/// Runtime configuration for the prescription scanner.
#[derive(Debug, Clone)]
pub struct RxConfig {
    pub lexicon: LexiconConfig,
    /// `tesseract` executable, used when built without the `ocr` feature.
    pub tesseract_bin: PathBuf,
    /// tessdata directory for in-process OCR. `None` lets Tesseract decide.
    pub tessdata_dir: Option<PathBuf>,
    /// PDFium library file. `None` searches the usual locations.
    pub pdfium_library: Option<PathBuf>,
}

impl RxConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut lexicon = LexiconConfig::in_dir(&dictionary_dir());
        if let Some(path) = env_path(ENV_FREQ_DICT) {
            lexicon.frequency_dictionary = path;
        }
        if let Some(path) = env_path(ENV_MED_DICT) {
            lexicon.medication_names = path;
        }

        Self {
            lexicon,
            tesseract_bin: env_path(ENV_TESSERACT).unwrap_or_else(|| PathBuf::from("tesseract")),
            tessdata_dir: env_path(ENV_TESSDATA),
            pdfium_library: env_path(ENV_PDFIUM).or_else(|| env_path(ENV_PDFIUM_FALLBACK)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_name_is_rxscan() {
        assert_eq!(APP_NAME, "rxscan");
    }

    #[test]
    fn app_data_dir_ends_with_app_name() {
        assert!(app_data_dir().ends_with("rxscan"));
    }

    #[test]
    fn lexicon_config_uses_standard_file_names() {
        let config = LexiconConfig::in_dir(Path::new("/opt/rx"));
        assert_eq!(
            config.frequency_dictionary,
            PathBuf::from("/opt/rx/pharmacy_dict.txt")
        );
        assert_eq!(
            config.medication_names,
            PathBuf::from("/opt/rx/medicine_names.txt")
        );
    }

    #[test]
    fn lexicon_config_defaults_to_distance_one_prefix_seven() {
        let config = LexiconConfig::in_dir(Path::new("."));
        assert_eq!(config.index.max_distance, 1);
        assert_eq!(config.index.prefix_length, 7);
        assert_eq!(config.correction.max_distance, 1);
        assert_eq!(config.format.term_index, 0);
        assert_eq!(config.format.count_index, 1);
    }

    #[test]
    fn default_log_filter_targets_crate() {
        assert!(default_log_filter().contains("rxscan"));
    }
}
