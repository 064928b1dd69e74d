//! Fuzzy similarity scoring between already-normalized name strings.

/// Scores how alike two normalized strings are, in `[0.0, 1.0]`.
///
/// - identical strings score 1.0;
/// - one string containing the other scores by shared length,
///   `2 * shorter / (shorter + longer)`, so a dropped trailing letter stays
///   close to 1.0;
/// - anything else falls back to the normalized Levenshtein ratio.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let (shorter, longer) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };

    if longer.contains(shorter) {
        let short_len = shorter.chars().count() as f64;
        let long_len = longer.chars().count() as f64;
        return 2.0 * short_len / (short_len + long_len);
    }

    strsim::normalized_levenshtein(a, b)
}
