//! Pure artifact classifiers.
//!
//! Every classifier is side-effect free and fails safe toward
//! `Incomplete`: unparseable content is never an error, it simply does
//! not count as done. A phase wrongly reported incomplete only costs a
//! retry; a phase wrongly reported complete skips validation downstream.

use serde::Deserialize;
use std::path::Path;

/// Result of classifying an artifact's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Complete,
    Incomplete,
}

impl Classification {
    pub fn is_complete(self) -> bool {
        self == Classification::Complete
    }
}

/// Sentinel text the assistant leaves in a question file before real
/// questions exist (matched case-insensitively).
const WAITING_SENTINEL: &str = "waiting for";

/// Tokens that mark a JSON artifact as template output (matched
/// case-insensitively against the raw text).
const JSON_PLACEHOLDER_TOKENS: &[&str] = &["placeholder", "[tbd]", "todo:", "fill_me"];

/// Classify markdown document content.
///
/// Incomplete when any placeholder marker survives: a bracketed
/// ALL-CAPS token (`[PRODUCT NAME]`), a `TODO:`, a `[TBD]`, or a
/// header whose first following line still starts with an unfilled
/// bracket.
pub fn classify_markdown(content: &str) -> Classification {
    if content.contains("TODO:") || content.contains("[TBD]") {
        return Classification::Incomplete;
    }
    if has_bracketed_caps_token(content) {
        return Classification::Incomplete;
    }
    if header_followed_by_bracket(content) {
        return Classification::Incomplete;
    }
    Classification::Complete
}

/// One entry of a question-set artifact.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionEntry {
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

/// Classify a question-set artifact for the `questions-generate` phase.
///
/// Parse failure or an empty list is incomplete. Exactly one entry
/// whose question text contains the "waiting for" sentinel is the
/// assistant's own placeholder, so still incomplete. Two or more
/// entries always count as complete regardless of content.
pub fn classify_question_set(content: &str) -> Classification {
    let entries: Vec<QuestionEntry> = match serde_json::from_str(content) {
        Ok(entries) => entries,
        Err(_) => return Classification::Incomplete,
    };
    match entries.as_slice() {
        [] => Classification::Incomplete,
        [only] if only.question.to_lowercase().contains(WAITING_SENTINEL) => {
            Classification::Incomplete
        }
        _ => Classification::Complete,
    }
}

/// Classify a question-set artifact for the `questions-answer` phase.
///
/// Complete only when the file parses, is non-empty, and every entry
/// carries a non-blank answer.
pub fn classify_question_answers(content: &str) -> Classification {
    let entries: Vec<QuestionEntry> = match serde_json::from_str(content) {
        Ok(entries) => entries,
        Err(_) => return Classification::Incomplete,
    };
    if entries.is_empty() || entries.iter().any(|e| e.answer.trim().is_empty()) {
        Classification::Incomplete
    } else {
        Classification::Complete
    }
}

/// Classify a structured JSON artifact.
///
/// Incomplete if any generic placeholder token appears anywhere in the
/// raw text. No parse is attempted; template output is template output
/// whether or not it is valid JSON.
pub fn classify_json_artifact(content: &str) -> Classification {
    let lowered = content.to_lowercase();
    if JSON_PLACEHOLDER_TOKENS.iter().any(|t| lowered.contains(t)) {
        Classification::Incomplete
    } else {
        Classification::Complete
    }
}

/// Check a file against a minimum byte floor.
///
/// Guards against truncated or mid-save writes that pass the textual
/// classifiers. A missing or unreadable file fails the check.
pub fn meets_minimum_size(path: &Path, min_bytes: u64) -> bool {
    match std::fs::metadata(path) {
        Ok(meta) => meta.len() >= min_bytes,
        Err(_) => false,
    }
}

/// True if the text contains a bracketed token made of uppercase
/// letters (plus spaces, digits, `_`, `-`), e.g. `[PRODUCT NAME]`.
fn has_bracketed_caps_token(content: &str) -> bool {
    let bytes = content.as_bytes();
    let mut i = 0;
    while let Some(open) = content[i..].find('[') {
        let start = i + open + 1;
        let Some(close) = content[start..].find(']') else {
            return false;
        };
        let token = &content[start..start + close];
        if is_caps_token(token) {
            return true;
        }
        i = start + close + 1;
        if i >= bytes.len() {
            break;
        }
    }
    false
}

fn is_caps_token(token: &str) -> bool {
    let has_upper = token.chars().any(|c| c.is_ascii_uppercase());
    has_upper
        && !token.is_empty()
        && token.chars().all(|c| {
            c.is_ascii_uppercase() || c.is_ascii_digit() || c == ' ' || c == '_' || c == '-'
        })
}

/// True if any markdown header's first following non-empty line starts
/// with an unfilled bracket.
fn header_followed_by_bracket(content: &str) -> bool {
    let mut lines = content.lines();
    while let Some(line) = lines.next() {
        if !line.trim_start().starts_with('#') {
            continue;
        }
        for following in lines.clone() {
            let trimmed = following.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.starts_with('[') {
                return true;
            }
            break;
        }
    }
    false
}
