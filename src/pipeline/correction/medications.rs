//! Medication name recognition over corrected text.
//!
//! A name is recognized when it occurs as a case-insensitive substring
//! anywhere in the text. There is no word-boundary check, so "ram" is found
//! inside "ramipril".

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use super::MedicationError;

/// Lowercase medication names. Ordered so recognition output is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MedicationSet {
    names: BTreeSet<String>,
}

impl MedicationSet {
    /// Build from names: trimmed, lowercased, blanks dropped.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| n.as_ref().trim().to_lowercase())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    /// Parse one name per line.
    pub fn parse(source: &str) -> Self {
        Self::from_names(source.lines())
    }

    pub fn load(path: &Path) -> Result<Self, MedicationError> {
        let source = fs::read_to_string(path).map_err(|source| MedicationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let set = Self::parse(&source);
        tracing::info!(path = %path.display(), names = set.len(), "Loaded medication names");
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.to_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// Every medication name found in `text`, sorted ascending.
/// `None` when nothing matched.
pub fn recognize(text: &str, meds: &MedicationSet) -> Option<Vec<String>> {
    let haystack = text.to_lowercase();
    let found: Vec<String> = meds
        .iter()
        .filter(|name| haystack.contains(*name))
        .map(str::to_string)
        .collect();

    if found.is_empty() {
        None
    } else {
        Some(found)
    }
}
