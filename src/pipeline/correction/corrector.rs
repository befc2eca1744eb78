//! Post-OCR dictionary correction.
//!
//! Each word token is looked up in the frequency index under a strict edit
//! bound; the best candidate replaces it. Unit and other tokens pass through
//! untouched, so dosages and punctuation are never rewritten.
//!
//! Candidates come back lowercase and case is not restored: "Amoxiciliin"
//! becomes "amoxicillin".

use std::sync::Arc;

use serde::Serialize;

use super::confusion::ConfusionTable;
use super::symspell::{FrequencyIndex, Verbosity};
use super::tokenizer::{tokenize, Token};
use super::LookupError;

/// Correction engine settings, injected at construction.
#[derive(Debug, Clone)]
pub struct CorrectionConfig {
    /// Edit bound for word lookups. Must not exceed the index's bound.
    pub max_distance: usize,
    /// OCR look-alike table carried for alternate-query strategies.
    pub confusions: ConfusionTable,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            max_distance: 1,
            confusions: ConfusionTable::ocr_default(),
        }
    }
}

/// What happened to a single token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Correction {
    /// A dictionary term within the bound replaced the token.
    Corrected { term: String, distance: usize },
    /// Not a word, or no candidate within the bound.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenCorrection {
    pub original: Token,
    pub correction: Correction,
}

impl TokenCorrection {
    pub fn matched(&self) -> bool {
        matches!(self.correction, Correction::Corrected { .. })
    }

    /// Text to emit for this token.
    pub fn replacement(&self) -> &str {
        match &self.correction {
            Correction::Corrected { term, .. } => term,
            Correction::Unchanged => &self.original.text,
        }
    }
}

#[derive(Debug)]
pub struct Corrector {
    index: Arc<FrequencyIndex>,
    config: CorrectionConfig,
}

impl Corrector {
    /// Fails when the configured distance exceeds what the index was built for.
    pub fn new(index: Arc<FrequencyIndex>, config: CorrectionConfig) -> Result<Self, LookupError> {
        if config.max_distance > index.max_distance() {
            return Err(LookupError::DistanceExceedsIndex {
                requested: config.max_distance,
                max: index.max_distance(),
            });
        }
        Ok(Self { index, config })
    }

    /// Default settings: distance 1, standard OCR confusion table.
    pub fn with_defaults(index: Arc<FrequencyIndex>) -> Result<Self, LookupError> {
        Self::new(index, CorrectionConfig::default())
    }

    pub fn index(&self) -> &FrequencyIndex {
        &self.index
    }

    pub fn confusions(&self) -> &ConfusionTable {
        &self.config.confusions
    }

    pub fn max_distance(&self) -> usize {
        self.config.max_distance
    }

    /// Correct a single token.
    pub fn correct_token(&self, token: &Token) -> TokenCorrection {
        let correction = if token.is_word() {
            self.index
                .lookup_within(&token.text, Verbosity::Closest, self.config.max_distance)
                .into_iter()
                .next()
                .map(|best| Correction::Corrected {
                    term: best.term,
                    distance: best.distance,
                })
                .unwrap_or(Correction::Unchanged)
        } else {
            Correction::Unchanged
        };

        TokenCorrection {
            original: token.clone(),
            correction,
        }
    }

    /// Per-token outcomes, in input order.
    pub fn correct_tokens(&self, tokens: &[Token]) -> Vec<TokenCorrection> {
        tokens.iter().map(|t| self.correct_token(t)).collect()
    }

    /// Corrected text: one output piece per input token, no separators added.
    pub fn correct(&self, tokens: &[Token]) -> String {
        let corrections = self.correct_tokens(tokens);

        let changed = corrections.iter().filter(|c| c.matched()).count();
        tracing::debug!(tokens = tokens.len(), matched = changed, "Applied dictionary correction");

        corrections.iter().map(TokenCorrection::replacement).collect()
    }

    /// Tokenize and correct raw text.
    pub fn correct_text(&self, text: &str) -> String {
        self.correct(&tokenize(text))
    }
}
