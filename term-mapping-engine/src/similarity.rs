//! String similarity used for fuzzy dictionary lookups.

use std::cmp::Ordering;

/// Similarity between two strings, in `[0, 1]` (1 = identical).
pub trait Similarity: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> f64;
}

/// Ratcliff/Obershelp "gestalt" ratio: `2·M / (|a| + |b|)` where `M` is the
/// number of characters in the recursively found longest common blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceRatio;

impl Similarity for SequenceRatio {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let total = a.len() + b.len();
        if total == 0 {
            return 1.0;
        }
        let matched = matching_characters(&a, &b);
        (2 * matched) as f64 / total as f64
    }
}

/// `1 - levenshtein(a, b) / max(|a|, |b|)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedLevenshtein;

impl Similarity for NormalizedLevenshtein {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        strsim::normalized_levenshtein(a, b)
    }
}

/// Candidates scoring at least `cutoff` against `word`, best first, at most `n`.
///
/// Each candidate is scored as `similarity(candidate, word)`; the ratio is not
/// symmetric, and this is the order `difflib.get_close_matches` uses. Equal
/// scores are ordered by the candidate string, larger first, so the result
/// does not depend on the iteration order of `candidates`.
pub fn close_matches<'a, I>(
    word: &str,
    candidates: I,
    n: usize,
    cutoff: f64,
    similarity: &dyn Similarity,
) -> Vec<(&'a str, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    if n == 0 || !(0.0..=1.0).contains(&cutoff) {
        return Vec::new();
    }

    let mut scored: Vec<(&'a str, f64)> = candidates
        .into_iter()
        .map(|candidate| (candidate, similarity.similarity(candidate, word)))
        .filter(|(_, score)| *score >= cutoff)
        .collect();

    scored.sort_by(|(left, left_score), (right, right_score)| {
        right_score
            .partial_cmp(left_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| right.cmp(left))
    });
    scored.truncate(n);
    scored
}

/// Total size of the matching blocks between `a` and `b`.
fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }

    matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]` as `(i, j, size)`.
/// Ties go to the block starting earliest in `a`, then earliest in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (Some(a_range), Some(b_range)) = (a.get(alo..ahi), b.get(blo..bhi)) else {
        return (alo, blo, 0);
    };

    let mut best = (alo, blo, 0);
    // run[j + 1] = length of the common block ending at a[i], b[blo + j]
    let mut previous = vec![0usize; b_range.len() + 1];

    for (i, ca) in a_range.iter().enumerate() {
        let mut current = vec![0usize; b_range.len() + 1];
        for (j, cb) in b_range.iter().enumerate() {
            if ca != cb {
                continue;
            }
            let size = previous.get(j).copied().unwrap_or(0) + 1;
            if let Some(slot) = current.get_mut(j + 1) {
                *slot = size;
            }
            if size > best.2 {
                best = (alo + i + 1 - size, blo + j + 1 - size, size);
            }
        }
        previous = current;
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_sequence_ratio_identical_and_empty() {
        assert!(approx(SequenceRatio.similarity("asthma", "asthma"), 1.0));
        assert!(approx(SequenceRatio.similarity("", ""), 1.0));
        assert!(approx(SequenceRatio.similarity("abc", ""), 0.0));
    }

    #[test]
    fn test_sequence_ratio_misspelling() {
        // "diabet" + "s" match: 2 * 7 / 16
        assert!(approx(SequenceRatio.similarity("diabetis", "diabetes"), 0.875));
        // "abcd" vs "bcde": block "bcd" gives 2 * 3 / 8
        assert!(approx(SequenceRatio.similarity("abcd", "bcde"), 0.75));
    }

    #[test]
    fn test_sequence_ratio_recurses_on_both_sides() {
        // "pneu" + "monia" around a substituted character
        let score = SequenceRatio.similarity("pneuxmonia", "pneumonia");
        assert!(approx(score, 18.0 / 19.0));
    }

    #[test]
    fn test_levenshtein() {
        assert!(approx(NormalizedLevenshtein.similarity("kitten", "sitting"), 1.0 - 3.0 / 7.0));
        assert!(approx(NormalizedLevenshtein.similarity("", ""), 1.0));
    }

    #[test]
    fn test_close_matches_orders_and_limits() {
        let candidates = ["diabetes", "diabetic", "asthma", "diabetes type"];
        let matches = close_matches("diabetis", candidates, 2, 0.8, &SequenceRatio);

        assert_eq!(matches.len(), 2);
        let (best, best_score) = matches[0];
        assert_eq!(best, "diabetic");
        assert!(approx(best_score, 0.875));
        assert_eq!(matches[1].0, "diabetes");
    }

    #[test]
    fn test_sequence_ratio_is_asymmetric() {
        assert!(approx(SequenceRatio.similarity("aaddcada", "acaddda"), 0.8));
        assert!(approx(SequenceRatio.similarity("acaddda", "aaddcada"), 2.0 / 3.0));
    }

    #[test]
    fn test_close_matches_scores_candidate_against_word() {
        let matches = close_matches("acaddda", ["aaddcada"], 3, 0.8, &SequenceRatio);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].0, "aaddcada");
        assert!(approx(matches[0].1, 0.8));
    }

    #[test]
    fn test_close_matches_respects_cutoff() {
        let matches = close_matches("fever", ["pneumonia", "asthma"], 3, 0.8, &SequenceRatio);
        assert!(matches.is_empty());
    }

    #[test]
    fn test_close_matches_rejects_invalid_parameters() {
        assert!(close_matches("a", ["a"], 0, 0.8, &SequenceRatio).is_empty());
        assert!(close_matches("a", ["a"], 3, 1.5, &SequenceRatio).is_empty());
    }
}
