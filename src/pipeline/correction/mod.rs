pub mod symspell;
pub mod dictionary;
pub mod confusion;
pub mod tokenizer;
pub mod corrector;
pub mod medications;
pub mod lexicon;

pub use symspell::{DictionaryEntry, FrequencyIndex, IndexConfig, Suggestion, Verbosity};
pub use dictionary::{DictionaryFormat, LoadReport, SkippedRow};
pub use confusion::ConfusionTable;
pub use tokenizer::{tokenize, Token, TokenKind};
pub use corrector::{Correction, CorrectionConfig, Corrector, TokenCorrection};
pub use medications::{recognize, MedicationSet};
pub use lexicon::{Lexicon, SharedLexicon};

use std::path::PathBuf;

use thiserror::Error;

/// A single dictionary row that could not be used. Recovered by skipping it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("missing term column")]
    MissingTerm,

    #[error("missing frequency column")]
    MissingFrequency,

    #[error("non-numeric frequency: {0:?}")]
    InvalidFrequency(String),
}

#[derive(Error, Debug)]
pub enum DictionaryError {
    #[error("Cannot read dictionary {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Dictionary {path} has no usable entries ({skipped} malformed rows skipped)")]
    Empty { path: PathBuf, skipped: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Lookup distance {requested} exceeds index distance {max}")]
    DistanceExceedsIndex { requested: usize, max: usize },
}

#[derive(Error, Debug)]
pub enum MedicationError {
    #[error("Cannot read medication list {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to assemble a lexicon from its source files.
#[derive(Error, Debug)]
pub enum LexiconError {
    #[error(transparent)]
    Dictionary(#[from] DictionaryError),

    #[error(transparent)]
    Medication(#[from] MedicationError),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}
