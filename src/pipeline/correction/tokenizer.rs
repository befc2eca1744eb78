//! Lossless tokenization of OCR text into word, unit and other runs.
//!
//! The input is partitioned into maximal runs of word characters (`\w`) and
//! non-word characters (`\W`). Concatenating every token's text in order
//! reproduces the input exactly.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+|\W+").unwrap());

/// Dosage units that must survive verbatim: optional digits/whitespace then mg, g or ml.
static UNIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\d*\s*(?:mg|g|ml)$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Alphabetic run, eligible for dictionary correction.
    Word,
    /// Dosage unit such as `500mg` or `ml`. Never corrected.
    Unit,
    /// Digits, punctuation, whitespace, mixed alphanumerics. Passed through.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
    /// Byte range of the token in the source text.
    pub span: Range<usize>,
}

impl Token {
    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }
}

/// Classify one maximal run.
pub fn classify(run: &str) -> TokenKind {
    if UNIT.is_match(run) {
        TokenKind::Unit
    } else if !run.is_empty() && run.chars().all(char::is_alphabetic) {
        TokenKind::Word
    } else {
        TokenKind::Other
    }
}

/// Split `text` into classified tokens covering every byte of the input.
pub fn tokenize(text: &str) -> Vec<Token> {
    RUNS.find_iter(text)
        .map(|m| Token {
            text: m.as_str().to_string(),
            kind: classify(m.as_str()),
            span: m.range(),
        })
        .collect()
}

/// Reassemble tokens without adding or removing separators.
pub fn join_tokens(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.text.as_str()).collect()
}
