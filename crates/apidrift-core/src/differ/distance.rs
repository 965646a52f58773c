//! Edit-distance and set-overlap helpers behind the similarity engine.

use std::collections::BTreeSet;

/// Levenshtein distance over arbitrary sequences.
pub fn distance_elements<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];
    for (i, left) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, right) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(left != right);
            let insertion = current[j] + 1;
            let deletion = previous[j + 1] + 1;
            current[j + 1] = substitution.min(insertion).min(deletion);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

/// Levenshtein distance over characters.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    distance_elements(&a, &b)
}

/// `1 - distance / max_len`, with two empty sequences scoring 1.
pub fn normalized_similarity<T: PartialEq>(a: &[T], b: &[T]) -> f64 {
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 1.0;
    }
    1.0 - distance_elements(a, b) as f64 / longest as f64
}

pub fn string_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    normalized_similarity(&a, &b)
}

/// Word-sequence similarity for free text.
pub fn text_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let a: Vec<&str> = a.split_whitespace().collect();
    let b: Vec<&str> = b.split_whitespace().collect();
    normalized_similarity(&a, &b)
}

/// Jaccard index; two empty sets are identical.
pub fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 1.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_basic() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("same", "same"), 0);
    }

    #[test]
    fn test_distance_elements_over_words() {
        let a = ["fit", "the", "model"];
        let b = ["fit", "a", "model", "quickly"];
        assert_eq!(distance_elements(&a, &b), 2);
    }

    #[test]
    fn test_string_similarity_bounds() {
        assert_eq!(string_similarity("Test", "Test"), 1.0);
        assert!((string_similarity("Test", "TestA") - 0.8).abs() < 1e-9);
        assert_eq!(string_similarity("", ""), 1.0);
        assert_eq!(string_similarity("ab", "cd"), 0.0);
    }

    #[test]
    fn test_text_similarity_word_level() {
        assert_eq!(text_similarity("This is a test", "This is a test"), 1.0);
        assert!((text_similarity("This is a test", "This is another test") - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_jaccard() {
        let a: BTreeSet<&str> = ["x", "y"].into_iter().collect();
        let b: BTreeSet<&str> = ["y", "z"].into_iter().collect();
        assert!((jaccard(&a, &b) - 1.0 / 3.0).abs() < 1e-9);
        let empty: BTreeSet<&str> = BTreeSet::new();
        assert_eq!(jaccard(&empty, &empty), 1.0);
    }
}
