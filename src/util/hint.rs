//! Candidate external-identity hints extracted from free-text annotations.
//!
//! Annotation fields are written by officers with no format discipline, so
//! extraction is heuristic by design: a fixed set of pattern rules, tolerant
//! of anything, returning an ordered deduplicated hint list. Matching rules
//! consume the list without caring how messy the source text was.

use crate::util::text::normalize;

/// Labels whose `label: value` prefix marks an external-identity hint.
const HINT_LABELS: &[&str] = &[
    "discord", "contact", "main", "alt", "owner", "acc", "account",
];

const SEGMENT_DELIMITERS: &[char] = &[',', ';', '|', '/', '\n'];

/// Extracts candidate identity hints from an annotation, in pattern order:
/// `label: value` prefixes, then `alt of X` / `main is X` back-references,
/// then bare `@mention` markers.
///
/// Each hint is punctuation-trimmed; hints shorter than 2 characters are
/// dropped; duplicates (by normalized form) keep their first position.
/// Unparseable or empty input yields an empty list, never an error.
pub fn extract_hints(note: &str) -> Vec<String> {
    let mut hints: Vec<String> = Vec::new();
    let mut seen: Vec<String> = Vec::new();

    let mut push = |raw: &str, hints: &mut Vec<String>, seen: &mut Vec<String>| {
        let trimmed = trim_punctuation(raw);
        if trimmed.chars().count() < 2 {
            return;
        }
        let key = normalize(trimmed);
        if key.is_empty() || seen.contains(&key) {
            return;
        }
        seen.push(key);
        hints.push(trimmed.to_string());
    };

    // Rule 1: "label: value" prefixes, segment by segment.
    for segment in note.split(SEGMENT_DELIMITERS) {
        if let Some((label, value)) = segment.split_once(':') {
            let label = label.trim().to_lowercase();
            if HINT_LABELS.contains(&label.as_str()) {
                push(value, &mut hints, &mut seen);
            }
        }
    }

    // Rule 2: "alt of X" / "main is X" back-references.
    for segment in note.split(SEGMENT_DELIMITERS) {
        let lower = segment.to_lowercase();
        for marker in ["alt of ", "main is "] {
            if let Some(pos) = lower.find(marker) {
                // The index comes from the lowercased copy; case folding
                // can change byte offsets in the original.
                let value = segment.get(pos + marker.len()..).unwrap_or("");
                let value = value.split_whitespace().next().unwrap_or("");
                push(value, &mut hints, &mut seen);
            }
        }
    }

    // Rule 3: bare @mention markers.
    for token in note.split_whitespace() {
        if let Some(mention) = token.strip_prefix('@') {
            push(mention, &mut hints, &mut seen);
        }
    }

    hints
}

/// Strips leading/trailing punctuation and whitespace, keeping interior
/// characters intact.
fn trim_punctuation(value: &str) -> &str {
    value.trim_matches(|c: char| !c.is_alphanumeric())
}
