//! Human-readable rendering of an extraction result.

use std::sync::LazyLock;

use regex::Regex;

use super::types::ExtractionResult;

static NEWLINE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n+").unwrap());

const INDENT: &str = "    ";

/// Collapse newline runs, trim, and indent every line.
pub fn format_text_block(text: &str) -> String {
    let collapsed = NEWLINE_RUNS.replace_all(text, "\n");
    collapsed
        .trim()
        .split('\n')
        .map(|line| format!("{INDENT}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The report printed by the command-line tool, newline terminated.
pub fn render_report(result: &ExtractionResult) -> String {
    let mut out = String::from("OCR RESULTS\n\nEXTRACTED TEXT:\n");
    out.push_str(&format_text_block(&result.full_text));
    out.push('\n');

    if let Some(names) = &result.recognized_medications {
        out.push_str("\nRECOGNIZED MEDICATIONS:\n");
        for name in names {
            out.push_str(&format!("{INDENT}{name}\n"));
        }
    }

    out
}
