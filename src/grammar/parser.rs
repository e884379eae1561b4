use once_cell::sync::Lazy;
use regex::Regex;

use super::prompt::{CORRECTED_MARKER, EXPLANATIONS_MARKER};

/// Corrected text plus the reasons for each correction, in the order given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarCheckResult {
    pub corrected_text: String,
    pub explanations: Vec<String>,
}

// The corrected block ends at the first "Explanations:" marker that closes its
// line, even when the model left it on the same line as the corrected text.
static CORRECTED_RE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?s){}[ \t]*(.*?)(?:{}[ \t]*(?:\r?\n|\z)|\z)",
        regex::escape(CORRECTED_MARKER),
        regex::escape(EXPLANATIONS_MARKER)
    );
    Regex::new(&pattern).expect("corrected-text pattern is valid")
});

static EXPLANATIONS_RE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?s){}[ \t]*(?:\r?\n|\z)(.*)\z",
        regex::escape(EXPLANATIONS_MARKER)
    );
    Regex::new(&pattern).expect("explanations pattern is valid")
});

static BULLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-\s*").expect("bullet pattern is valid"));

/// Extracts a [`GrammarCheckResult`] from a completion laid out as
///
/// ```text
/// Corrected text: <text>
/// Explanations:
/// - <explanation>
/// ```
///
/// Never fails: without a "Corrected text:" marker, or with nothing after it,
/// the corrected text is `fallback` (the text that was sent for checking), and
/// without an "Explanations:" marker the explanation list is empty.
pub fn parse_response(raw: &str, fallback: &str) -> GrammarCheckResult {
    let corrected_text = CORRECTED_RE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string());

    let explanations = EXPLANATIONS_RE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| {
            m.as_str()
                .lines()
                .map(|line| BULLET_RE.replace(line.trim(), "").trim().to_string())
                .filter(|line| !line.is_empty())
                .collect()
        })
        .unwrap_or_default();

    GrammarCheckResult {
        corrected_text,
        explanations,
    }
}
