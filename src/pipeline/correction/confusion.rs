//! Digit/letter look-alikes that OCR engines commonly confuse.
//!
//! Pure data. The correction path does not branch on it yet; it is carried
//! in `CorrectionConfig` so alternate-query strategies can be layered on
//! without changing the engine's construction.

use std::collections::BTreeMap;

/// Maps an intended character to the glyphs commonly misread as it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionTable {
    map: BTreeMap<char, Vec<char>>,
}

impl ConfusionTable {
    /// The standard OCR table: '0'↔'O', '1'↔'l'/'I', '5'↔'S', '8'↔'B'.
    pub fn ocr_default() -> Self {
        Self::from_pairs([
            ('0', vec!['O']),
            ('1', vec!['l', 'I']),
            ('5', vec!['S']),
            ('8', vec!['B']),
        ])
    }

    pub fn empty() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (char, Vec<char>)>,
    {
        Self {
            map: pairs.into_iter().collect(),
        }
    }

    /// Glyphs commonly misread as `intended`.
    pub fn lookalikes(&self, intended: char) -> &[char] {
        self.map.get(&intended).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The character a misread glyph most likely stood for.
    pub fn canonical(&self, misread: char) -> Option<char> {
        self.map
            .iter()
            .find(|(_, glyphs)| glyphs.contains(&misread))
            .map(|(&intended, _)| intended)
    }

    /// Every string obtained from `term` by swapping exactly one character
    /// with a confusable counterpart, in either direction.
    pub fn variants(&self, term: &str) -> Vec<String> {
        let chars: Vec<char> = term.chars().collect();
        let mut out = Vec::new();

        for (i, &c) in chars.iter().enumerate() {
            let mut swaps: Vec<char> = self.lookalikes(c).to_vec();
            if let Some(intended) = self.canonical(c) {
                swaps.push(intended);
            }
            for swap in swaps {
                let mut variant = chars.clone();
                variant[i] = swap;
                out.push(variant.into_iter().collect());
            }
        }

        out
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &[char])> {
        self.map.iter().map(|(&c, glyphs)| (c, glyphs.as_slice()))
    }
}

impl Default for ConfusionTable {
    fn default() -> Self {
        Self::ocr_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_contents() {
        let table = ConfusionTable::ocr_default();
        assert_eq!(table.lookalikes('0'), &['O']);
        assert_eq!(table.lookalikes('1'), &['l', 'I']);
        assert_eq!(table.lookalikes('5'), &['S']);
        assert_eq!(table.lookalikes('8'), &['B']);
        assert_eq!(table.iter().count(), 4);
    }

    #[test]
    fn unknown_character_has_no_lookalikes() {
        assert!(ConfusionTable::ocr_default().lookalikes('x').is_empty());
    }

    #[test]
    fn canonical_is_reverse_lookup() {
        let table = ConfusionTable::ocr_default();
        assert_eq!(table.canonical('O'), Some('0'));
        assert_eq!(table.canonical('l'), Some('1'));
        assert_eq!(table.canonical('I'), Some('1'));
        assert_eq!(table.canonical('z'), None);
    }

    #[test]
    fn variants_swap_one_position_at_a_time() {
        let table = ConfusionTable::ocr_default();
        let variants = table.variants("5O");
        assert_eq!(variants, vec!["SO".to_string(), "50".to_string()]);
    }

    #[test]
    fn variants_of_plain_word_are_empty() {
        assert!(ConfusionTable::ocr_default().variants("tab").is_empty());
    }

    #[test]
    fn empty_table() {
        let table = ConfusionTable::empty();
        assert!(table.is_empty());
        assert!(table.variants("10").is_empty());
    }
}
