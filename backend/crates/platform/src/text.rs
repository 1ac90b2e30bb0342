//! Free-text answer comparison
//!
//! Player input arrives in whatever form their keyboard produced, so both
//! sides are normalized before comparing:
//! 1. Unicode NFKC (full-width letters, ligatures, composed accents)
//! 2. Trim surrounding whitespace
//! 3. Lower-case

use unicode_normalization::UnicodeNormalization;

/// Normalize a free-text answer for comparison.
///
/// ```
/// use platform::text::normalize_answer;
/// assert_eq!(normalize_answer("  ＥＬＥＰＨＡＮＴ "), "elephant");
/// ```
pub fn normalize_answer(raw: &str) -> String {
    let normalized: String = raw.nfkc().collect();
    normalized.trim().to_lowercase()
}

/// Levenshtein edit distance counted over chars, not bytes.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Two rolling rows of the DP table.
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Compare two answers after normalization, allowing `tolerance` edits.
pub fn within_distance(candidate: &str, reference: &str, tolerance: usize) -> bool {
    let candidate = normalize_answer(candidate);
    let reference = normalize_answer(reference);
    levenshtein(&candidate, &reference) <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_answer() {
        assert_eq!(normalize_answer("Hello"), "hello");
        assert_eq!(normalize_answer("\t Paris \n"), "paris");
        // NFKC folds the "fi" ligature
        assert_eq!(normalize_answer("\u{FB01}sh"), "fish");
    }

    #[test]
    fn test_levenshtein_known_values() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("", "ab"), 2);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("elephant", "elefant"), 2);
        assert_eq!(levenshtein("elephant", "elephnt"), 1);
    }

    #[test]
    fn test_levenshtein_counts_chars() {
        // One multi-byte substitution is one edit
        assert_eq!(levenshtein("café", "cafe"), 1);
        assert_eq!(levenshtein("ёж", "еж"), 1);
    }

    #[test]
    fn test_within_distance() {
        assert!(within_distance("Elefant", "elephant", 2));
        assert!(within_distance("ELEPHANT", "elephant", 0));
        assert!(!within_distance("giraffe", "elephant", 2));
    }
}
