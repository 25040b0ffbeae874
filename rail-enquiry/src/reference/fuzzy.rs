//! Approximate string matching.
//!
//! Scores are on a 0-100 scale built from normalised Levenshtein
//! similarity. `weighted_ratio` combines a plain comparison, a best
//! substring comparison and a word-order-insensitive comparison, scaling
//! the latter two down as the lengths diverge so a short query does not
//! match every long name equally well.

use strsim::normalized_levenshtein;

/// Lowercase, replace anything that is not alphanumeric with a space, and
/// collapse whitespace.
pub fn normalize(s: &str) -> String {
    let mapped: String = s
        .chars()
        .flat_map(|c| {
            let c = if c.is_alphanumeric() { c } else { ' ' };
            c.to_lowercase()
        })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Similarity of two whole strings.
pub fn ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    to_score(normalized_levenshtein(a, b))
}

/// Best similarity of the shorter string against every equally long
/// window of the longer one.
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (short, long) = if a_chars.len() <= b_chars.len() {
        (a_chars, b_chars)
    } else {
        (b_chars, a_chars)
    };

    if short.is_empty() {
        return 0;
    }
    if short.len() == long.len() {
        return ratio(a, b);
    }

    let needle: String = short.iter().collect();
    let mut best = 0;
    for window in long.windows(short.len()) {
        let candidate: String = window.iter().collect();
        best = best.max(ratio(&needle, &candidate));
        if best == 100 {
            break;
        }
    }
    best
}

/// Similarity after sorting the whitespace-separated words of each string.
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    ratio(&sort_tokens(a), &sort_tokens(b))
}

/// Combined score used to rank reference list candidates.
pub fn weighted_ratio(query: &str, choice: &str) -> u8 {
    let q = normalize(query);
    let c = normalize(choice);
    if q.is_empty() || c.is_empty() {
        return 0;
    }

    let base = ratio(&q, &c);
    let (q_len, c_len) = (q.chars().count() as f64, c.chars().count() as f64);
    let len_ratio = q_len.max(c_len) / q_len.min(c_len);

    if len_ratio < 1.5 {
        let sorted = scale(token_sort_ratio(&q, &c), 0.95);
        return base.max(sorted);
    }

    let partial_scale = if len_ratio < 8.0 { 0.9 } else { 0.6 };
    let partial = scale(partial_ratio(&q, &c), partial_scale);
    let partial_sorted = scale(
        partial_ratio(&sort_tokens(&q), &sort_tokens(&c)),
        0.95 * partial_scale,
    );
    base.max(partial).max(partial_sorted)
}

fn sort_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn to_score(similarity: f64) -> u8 {
    (similarity * 100.0).round().clamp(0.0, 100.0) as u8
}

fn scale(score: u8, factor: f64) -> u8 {
    (f64::from(score) * factor).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_punctuation_and_case() {
        assert_eq!(normalize("NDLS - NEW  DELHI"), "ndls new delhi");
        assert_eq!(normalize("  H.NIZAMUDDIN "), "h nizamuddin");
        assert_eq!(normalize("---"), "");
    }

    #[test]
    fn identical_strings_score_100() {
        assert_eq!(ratio("new delhi", "new delhi"), 100);
        assert_eq!(weighted_ratio("New Delhi", "NEW DELHI"), 100);
    }

    #[test]
    fn empty_strings_score_0() {
        assert_eq!(ratio("", "abc"), 0);
        assert_eq!(partial_ratio("", "abc"), 0);
        assert_eq!(weighted_ratio("", "abc"), 0);
    }

    #[test]
    fn partial_finds_substring() {
        assert_eq!(partial_ratio("delhi", "ndls new delhi"), 100);
        assert!(partial_ratio("delhy", "ndls new delhi") >= 80);
    }

    #[test]
    fn token_sort_ignores_word_order() {
        assert_eq!(token_sort_ratio("delhi new", "new delhi"), 100);
    }

    #[test]
    fn name_matches_full_entry_better_than_neighbour() {
        let good = weighted_ratio("NEW DELHI", "NDLS - NEW DELHI");
        let bad = weighted_ratio("NEW DELHI", "DLI - DELHI");
        assert_eq!(good, 90);
        assert!(good > bad, "{good} <= {bad}");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn scores_are_bounded(a in "[a-z ]{0,20}", b in "[a-z ]{0,20}") {
            prop_assert!(weighted_ratio(&a, &b) <= 100);
            prop_assert!(partial_ratio(&a, &b) <= 100);
        }

        #[test]
        fn ratio_is_symmetric(a in "[a-z]{1,12}", b in "[a-z]{1,12}") {
            prop_assert_eq!(ratio(&a, &b), ratio(&b, &a));
        }

        #[test]
        fn self_match_is_perfect(a in "[a-z]{1,8}( [a-z]{1,8}){0,3}") {
            prop_assert_eq!(weighted_ratio(&a, &a), 100);
        }
    }
}
