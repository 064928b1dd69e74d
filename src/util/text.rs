//! Text canonicalization used by every identity comparison.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonicalizes text for matching: NFKD decomposition, diacritic strip,
/// lowercase, trim.
///
/// Pure and total: malformed or empty input yields the empty string, never
/// an error.
pub fn normalize(text: &str) -> String {
    text.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect::<String>()
        .trim()
        .to_string()
}
