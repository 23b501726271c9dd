//! Normalised string similarity used by the fuzzy matcher.
//!
//! The score is the indel ratio `2 * lcs(a, b) / (|a| + |b|)`, where `lcs` is the
//! longest common subsequence over characters. It is order-sensitive, case- and
//! whitespace-sensitive, and lies in `[0, 1]` with `1` meaning identical strings.

/// Similarity of two strings in `[0, 1]`.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

/// [`ratio`] over pre-split characters.
pub fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    (2 * lcs_len(a, b)) as f64 / total as f64
}

/// Best score two strings of these lengths could possibly reach.
///
/// Used to skip pairs whose lengths alone rule out a match.
pub fn max_ratio(len_a: usize, len_b: usize) -> f64 {
    let total = len_a + len_b;
    if total == 0 {
        return 1.0;
    }
    (2 * len_a.min(len_b)) as f64 / total as f64
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return 0;
    }

    let mut prev = vec![0usize; short.len() + 1];
    let mut curr = vec![0usize; short.len() + 1];

    for &lc in long {
        for (j, &sc) in short.iter().enumerate() {
            curr[j + 1] = if lc == sc {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[short.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_and_empty() {
        assert_eq!(ratio("Beirut", "Beirut"), 1.0);
        assert_eq!(ratio("", ""), 1.0);
        assert_eq!(ratio("Beirut", ""), 0.0);
    }

    #[test]
    fn test_one_edit_passes_threshold() {
        let score = ratio("Beirut", "Beirutt");
        assert!(score >= 0.9, "score was {}", score);
        assert!((score - 12.0 / 13.0).abs() < 1e-9);
    }

    #[test]
    fn test_unrelated_names_fall_far_below() {
        assert!(ratio("Beirut", "Paris") < 0.5);
    }

    #[test]
    fn test_order_and_case_sensitive() {
        assert!(ratio("ab", "ba") < 1.0);
        assert!(ratio("beirut", "BEIRUT") < 0.1);
    }

    #[test]
    fn test_symmetric() {
        assert_eq!(ratio("Dayr al-Qamar", "Deir el Qamar"), ratio("Deir el Qamar", "Dayr al-Qamar"));
    }

    #[test]
    fn test_max_ratio_bounds_actual_score() {
        let pairs = [("Tripoli", "Trablus"), ("Sidon", "Saida"), ("Acre", "Akka ")];
        for (a, b) in pairs {
            let bound = max_ratio(a.chars().count(), b.chars().count());
            assert!(ratio(a, b) <= bound);
        }
        assert!(max_ratio(3, 10) < 0.9);
    }
}
