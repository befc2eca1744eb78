//! Frequency dictionary loading.
//!
//! One entry per line: a term column and a frequency column, split on
//! whitespace unless a separator is configured. Malformed rows are skipped
//! and reported; only a dictionary with no usable rows is fatal.

use std::fs;
use std::path::Path;

use serde::Serialize;

use super::symspell::{DictionaryEntry, FrequencyIndex, IndexConfig};
use super::{DictionaryError, RowError};

/// Column layout of a dictionary file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryFormat {
    pub term_index: usize,
    pub count_index: usize,
    /// `None` splits on any run of whitespace.
    pub separator: Option<char>,
}

impl Default for DictionaryFormat {
    fn default() -> Self {
        Self {
            term_index: 0,
            count_index: 1,
            separator: None,
        }
    }
}

/// A row dropped during loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    /// 1-based line number in the source.
    pub line: usize,
    pub reason: String,
}

/// Outcome of a dictionary load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: Vec<SkippedRow>,
}

impl LoadReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Parse one dictionary row.
pub fn parse_row(line: &str, format: &DictionaryFormat) -> Result<DictionaryEntry, RowError> {
    let fields: Vec<&str> = match format.separator {
        Some(sep) => line.split(sep).map(str::trim).collect(),
        None => line.split_whitespace().collect(),
    };

    let term = fields
        .get(format.term_index)
        .copied()
        .filter(|t| !t.is_empty())
        .ok_or(RowError::MissingTerm)?;

    let raw_count = fields
        .get(format.count_index)
        .copied()
        .filter(|c| !c.is_empty())
        .ok_or(RowError::MissingFrequency)?;

    let frequency = raw_count
        .parse::<u64>()
        .map_err(|_| RowError::InvalidFrequency(raw_count.to_string()))?;

    Ok(DictionaryEntry::new(term.to_lowercase(), frequency))
}

/// Parse dictionary text. Blank lines are ignored; malformed rows are skipped.
pub fn parse_dictionary(
    source: &str,
    format: &DictionaryFormat,
) -> (Vec<DictionaryEntry>, LoadReport) {
    let mut entries = Vec::new();
    let mut report = LoadReport::default();

    for (i, line) in source.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_row(line, format) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::warn!(line = i + 1, error = %e, "Skipping malformed dictionary row");
                report.skipped.push(SkippedRow {
                    line: i + 1,
                    reason: e.to_string(),
                });
            }
        }
    }

    report.loaded = entries.len();
    (entries, report)
}

/// Read and parse a dictionary file.
pub fn load_dictionary(
    path: &Path,
    format: &DictionaryFormat,
) -> Result<(Vec<DictionaryEntry>, LoadReport), DictionaryError> {
    let source = fs::read_to_string(path).map_err(|source| DictionaryError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let (entries, report) = parse_dictionary(&source, format);
    if entries.is_empty() {
        return Err(DictionaryError::Empty {
            path: path.to_path_buf(),
            skipped: report.skipped_count(),
        });
    }

    tracing::info!(
        path = %path.display(),
        loaded = report.loaded,
        skipped = report.skipped_count(),
        "Loaded frequency dictionary"
    );

    Ok((entries, report))
}

/// Load a dictionary file and build its deletion index.
pub fn load_index(
    path: &Path,
    format: &DictionaryFormat,
    config: IndexConfig,
) -> Result<(FrequencyIndex, LoadReport), DictionaryError> {
    let (entries, report) = load_dictionary(path, format)?;
    Ok((FrequencyIndex::with_config(entries, config), report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parses_whitespace_separated_rows() {
        let entry = parse_row("Amoxicillin   120", &DictionaryFormat::default()).unwrap();
        assert_eq!(entry, DictionaryEntry::new("amoxicillin", 120));
    }

    #[test]
    fn parses_custom_separator_and_columns() {
        let format = DictionaryFormat {
            term_index: 1,
            count_index: 0,
            separator: Some(','),
        };
        let entry = parse_row("42, tablet", &format).unwrap();
        assert_eq!(entry, DictionaryEntry::new("tablet", 42));
    }

    #[test]
    fn rejects_missing_frequency() {
        let err = parse_row("ibuprofen", &DictionaryFormat::default()).unwrap_err();
        assert!(matches!(err, RowError::MissingFrequency));
    }

    #[test]
    fn rejects_non_numeric_frequency() {
        let err = parse_row("ibuprofen many", &DictionaryFormat::default()).unwrap_err();
        assert!(matches!(err, RowError::InvalidFrequency(ref raw) if raw == "many"));
    }

    #[test]
    fn rejects_negative_frequency() {
        let err = parse_row("ibuprofen -3", &DictionaryFormat::default()).unwrap_err();
        assert!(matches!(err, RowError::InvalidFrequency(_)));
    }

    #[test]
    fn blank_lines_are_not_reported() {
        let (entries, report) = parse_dictionary("\n  \ntablet 3\n\n", &DictionaryFormat::default());
        assert_eq!(entries.len(), 1);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn malformed_row_is_skipped_and_counted() {
        let file = write_temp("twice notanumber\ndaily 250\n");
        let (entries, report) = load_dictionary(file.path(), &DictionaryFormat::default()).unwrap();

        assert_eq!(entries, vec![DictionaryEntry::new("daily", 250)]);
        assert_eq!(report.loaded, 1);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.skipped[0].line, 1);
    }

    #[test]
    fn dictionary_with_no_valid_rows_is_fatal() {
        let file = write_temp("broken\nalso broken\n");
        let err = load_dictionary(file.path(), &DictionaryFormat::default()).unwrap_err();
        assert!(matches!(err, DictionaryError::Empty { skipped: 2, .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_dictionary(&dir.path().join("absent.txt"), &DictionaryFormat::default())
            .unwrap_err();
        assert!(matches!(err, DictionaryError::Io { .. }));
    }

    #[test]
    fn load_index_builds_lookup_structure() {
        let file = write_temp("amoxicillin 100\nmg x\n");
        let (index, report) =
            load_index(file.path(), &DictionaryFormat::default(), IndexConfig::default()).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(index.frequency("amoxicillin"), Some(100));
    }
}
