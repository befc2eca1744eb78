//! The correction lexicon: frequency index + medication names, loaded together.
//!
//! `Lexicon` is immutable and `Send + Sync`. Hosts that serve many requests
//! build it once and share it behind an `Arc`; `SharedLexicon` adds whole-snapshot
//! replacement for hosts that reload dictionaries at runtime.

use std::sync::{Arc, PoisonError, RwLock};

use super::corrector::{CorrectionConfig, Corrector};
use super::dictionary::{load_index, LoadReport};
use super::medications::MedicationSet;
use super::symspell::FrequencyIndex;
use super::{LexiconError, LookupError};
use crate::config::LexiconConfig;

#[derive(Debug)]
pub struct Lexicon {
    corrector: Corrector,
    medications: MedicationSet,
    load_report: LoadReport,
}

impl Lexicon {
    /// Assemble from already-built parts.
    pub fn new(
        index: Arc<FrequencyIndex>,
        medications: MedicationSet,
        correction: CorrectionConfig,
    ) -> Result<Self, LookupError> {
        Ok(Self {
            corrector: Corrector::new(index, correction)?,
            medications,
            load_report: LoadReport::default(),
        })
    }

    /// Read both dictionary files and build the index.
    pub fn load(config: &LexiconConfig) -> Result<Self, LexiconError> {
        let (index, load_report) =
            load_index(&config.frequency_dictionary, &config.format, config.index)?;
        let medications = MedicationSet::load(&config.medication_names)?;
        let corrector = Corrector::new(Arc::new(index), config.correction.clone())?;

        if !load_report.skipped.is_empty() {
            tracing::warn!(
                skipped = load_report.skipped_count(),
                path = %config.frequency_dictionary.display(),
                "Dictionary rows skipped during load"
            );
        }

        Ok(Self {
            corrector,
            medications,
            load_report,
        })
    }

    pub fn corrector(&self) -> &Corrector {
        &self.corrector
    }

    pub fn medications(&self) -> &MedicationSet {
        &self.medications
    }

    /// Rows accepted and skipped when the dictionary was read.
    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }
}

/// A lexicon that can be swapped while readers hold older snapshots.
///
/// Readers clone the current `Arc`; `replace` installs a fully built lexicon
/// under the write lock. Nothing is mutated in place.
#[derive(Debug)]
pub struct SharedLexicon {
    current: RwLock<Arc<Lexicon>>,
}

impl SharedLexicon {
    pub fn new(lexicon: Lexicon) -> Self {
        Self {
            current: RwLock::new(Arc::new(lexicon)),
        }
    }

    /// The lexicon in effect right now.
    pub fn snapshot(&self) -> Arc<Lexicon> {
        // The guarded value is only ever swapped whole, so a poisoned lock still holds a valid Arc
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Install `lexicon`, returning the one it replaced.
    pub fn replace(&self, lexicon: Lexicon) -> Arc<Lexicon> {
        let next = Arc::new(lexicon);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }

    /// Load a new lexicon outside the lock, then swap it in.
    pub fn reload(&self, config: &LexiconConfig) -> Result<(), LexiconError> {
        let lexicon = Lexicon::load(config)?;
        self.replace(lexicon);
        tracing::info!("Lexicon reloaded");
        Ok(())
    }
}
