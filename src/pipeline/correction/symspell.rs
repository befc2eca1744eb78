//! Bounded-edit-distance lookup over a frequency dictionary.
//!
//! Symmetric-delete index: every dictionary term contributes the strings
//! reachable by deleting up to `max_distance` characters from its first
//! `prefix_length` characters. A query generates the same deletion variants,
//! unions the terms they point at, and verifies each candidate with a true
//! Levenshtein distance. Lookup cost is independent of dictionary size.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::LookupError;

/// Index into `FrequencyIndex::entries`.
type TermId = usize;

/// One weighted dictionary term. Terms are stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub term: String,
    pub frequency: u64,
}

impl DictionaryEntry {
    pub fn new(term: impl Into<String>, frequency: u64) -> Self {
        Self {
            term: term.into(),
            frequency,
        }
    }
}

/// Construction parameters for the deletion index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Largest distance any lookup may request. Fixed for the index lifetime.
    pub max_distance: usize,
    /// Number of leading characters used to build and query the index.
    pub prefix_length: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_distance: 1,
            prefix_length: 7,
        }
    }
}

/// How many suggestions a lookup returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Only the best-ranked candidate, or nothing.
    Closest,
    /// Every candidate within the requested distance, best first.
    All,
}

/// A dictionary term within edit range of a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub term: String,
    pub distance: usize,
    pub frequency: u64,
}

impl Suggestion {
    /// Ranking: smaller distance first, then higher frequency, then term order.
    fn rank(&self, other: &Self) -> Ordering {
        self.distance
            .cmp(&other.distance)
            .then_with(|| other.frequency.cmp(&self.frequency))
            .then_with(|| self.term.cmp(&other.term))
    }
}

/// Immutable symmetric-delete index. `Send + Sync`; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct FrequencyIndex {
    config: IndexConfig,
    entries: Vec<DictionaryEntry>,
    term_ids: HashMap<String, TermId>,
    /// Maps a deletion variant (e.g. "amoxcil") to the terms it came from.
    deletes: HashMap<String, HashSet<TermId>>,
}

impl FrequencyIndex {
    /// Build the index. Terms are lowercased; duplicate terms have their
    /// frequencies summed. Empty terms are ignored.
    pub fn build<I>(entries: I, max_distance: usize, prefix_length: usize) -> Self
    where
        I: IntoIterator<Item = DictionaryEntry>,
    {
        Self::with_config(
            entries,
            IndexConfig {
                max_distance,
                prefix_length,
            },
        )
    }

    pub fn with_config<I>(entries: I, config: IndexConfig) -> Self
    where
        I: IntoIterator<Item = DictionaryEntry>,
    {
        let config = IndexConfig {
            max_distance: config.max_distance,
            prefix_length: config.prefix_length.max(1),
        };

        let mut index = Self {
            config,
            entries: Vec::new(),
            term_ids: HashMap::new(),
            deletes: HashMap::new(),
        };

        for entry in entries {
            index.insert(entry);
        }

        tracing::debug!(
            terms = index.entries.len(),
            variants = index.deletes.len(),
            max_distance = config.max_distance,
            prefix_length = config.prefix_length,
            "Built frequency index"
        );

        index
    }

    fn insert(&mut self, entry: DictionaryEntry) {
        let term = entry.term.trim().to_lowercase();
        if term.is_empty() {
            return;
        }

        if let Some(&id) = self.term_ids.get(&term) {
            let existing = &mut self.entries[id];
            existing.frequency = existing.frequency.saturating_add(entry.frequency);
            return;
        }

        let id = self.entries.len();
        let prefix = prefix_of(&term, self.config.prefix_length);
        for variant in deletion_variants(&prefix, self.config.max_distance) {
            self.deletes.entry(variant).or_default().insert(id);
        }
        self.term_ids.insert(term.clone(), id);
        self.entries.push(DictionaryEntry::new(term, entry.frequency));
    }

    pub fn config(&self) -> IndexConfig {
        self.config
    }

    pub fn max_distance(&self) -> usize {
        self.config.max_distance
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Frequency of an exact (case-insensitive) dictionary term.
    pub fn frequency(&self, term: &str) -> Option<u64> {
        self.term_ids
            .get(&term.to_lowercase())
            .map(|&id| self.entries[id].frequency)
    }

    /// Find dictionary terms within `max_distance` edits of `input`.
    ///
    /// Fails when `max_distance` exceeds the distance the index was built for.
    pub fn lookup(
        &self,
        input: &str,
        verbosity: Verbosity,
        max_distance: usize,
    ) -> Result<Vec<Suggestion>, LookupError> {
        if max_distance > self.config.max_distance {
            return Err(LookupError::DistanceExceedsIndex {
                requested: max_distance,
                max: self.config.max_distance,
            });
        }
        Ok(self.lookup_within(input, verbosity, max_distance))
    }

    /// Lookup with a distance already validated against the index bound.
    pub(crate) fn lookup_within(
        &self,
        input: &str,
        verbosity: Verbosity,
        max_distance: usize,
    ) -> Vec<Suggestion> {
        let query = input.to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        if let Some(&id) = self.term_ids.get(&query) {
            if verbosity == Verbosity::Closest || max_distance == 0 {
                return vec![self.suggestion(id, 0)];
            }
        } else if max_distance == 0 {
            return Vec::new();
        }

        let query_len = query.chars().count();
        let prefix = prefix_of(&query, self.config.prefix_length);

        let mut candidates: HashSet<TermId> = HashSet::new();
        for variant in deletion_variants(&prefix, max_distance) {
            if let Some(ids) = self.deletes.get(&variant) {
                candidates.extend(ids.iter().copied());
            }
        }

        let mut suggestions: Vec<Suggestion> = candidates
            .into_iter()
            .filter_map(|id| {
                let term = &self.entries[id].term;
                // Quick length filter: lengths differing by more than the bound can't match
                if term.chars().count().abs_diff(query_len) > max_distance {
                    return None;
                }
                let distance = edit_distance(&query, term);
                (distance <= max_distance).then(|| self.suggestion(id, distance))
            })
            .collect();

        suggestions.sort_by(Suggestion::rank);
        if verbosity == Verbosity::Closest {
            suggestions.truncate(1);
        }
        suggestions
    }

    fn suggestion(&self, id: TermId, distance: usize) -> Suggestion {
        let entry = &self.entries[id];
        Suggestion {
            term: entry.term.clone(),
            distance,
            frequency: entry.frequency,
        }
    }
}

/// First `prefix_length` characters of `term`.
fn prefix_of(term: &str, prefix_length: usize) -> String {
    term.chars().take(prefix_length).collect()
}

/// All unique strings reachable by deleting up to `max_distance` characters,
/// including the word itself.
fn deletion_variants(word: &str, max_distance: usize) -> HashSet<String> {
    let mut variants = HashSet::new();
    variants.insert(word.to_string());

    let mut frontier = vec![word.to_string()];
    for _ in 0..max_distance {
        let mut next = Vec::new();
        for edit in &frontier {
            let chars: Vec<char> = edit.chars().collect();
            for skip in 0..chars.len() {
                let deleted: String = chars
                    .iter()
                    .enumerate()
                    .filter(|&(i, _)| i != skip)
                    .map(|(_, &c)| c)
                    .collect();
                if variants.insert(deleted.clone()) {
                    next.push(deleted);
                }
            }
        }
        frontier = next;
    }

    variants
}

/// Levenshtein distance (insertions, deletions, substitutions) over chars.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0usize; n + 1];

    for (i, &a_ch) in a_chars.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &b_ch) in b_chars.iter().enumerate() {
            let cost = usize::from(a_ch != b_ch);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}
