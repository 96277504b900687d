//! Gestalt pattern matching (Ratcliff/Obershelp) used to reconcile free text
//! with known names: LLM category suggestions, player names, team names.

/// Similarity in `[0, 1]`: twice the number of matched characters over the
/// total number of characters in both strings.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

/// Case-insensitive `ratio(a, b) >= threshold`.
pub fn is_similar(a: &str, b: &str, threshold: f64) -> bool {
    ratio(&a.to_lowercase(), &b.to_lowercase()) >= threshold
}

/// Up to `n` candidates scoring at least `cutoff` against `word`, best first.
/// Ties keep the order of `candidates`.
pub fn close_matches<'a, S: AsRef<str>>(
    word: &str,
    candidates: &'a [S],
    n: usize,
    cutoff: f64,
) -> Vec<&'a str> {
    let mut scored: Vec<(f64, usize)> = candidates
        .iter()
        .enumerate()
        .map(|(idx, candidate)| (ratio(candidate.as_ref(), word), idx))
        .filter(|(score, _)| *score >= cutoff)
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
    scored
        .into_iter()
        .take(n)
        .map(|(_, idx)| candidates[idx].as_ref())
        .collect()
}

/// Best candidate scoring at least `cutoff`, if any.
pub fn best_match<'a, S: AsRef<str>>(word: &str, candidates: &'a [S], cutoff: f64) -> Option<&'a str> {
    close_matches(word, candidates, 1, cutoff).into_iter().next()
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (i, j, size) = longest_match(a, b);
    if size == 0 {
        return 0;
    }
    size + matching_chars(&a[..i], &b[..j]) + matching_chars(&a[i + size..], &b[j + size..])
}

/// Longest common block, earliest in `a` then earliest in `b` on ties.
fn longest_match(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for i in 0..a.len() {
        for j in 0..b.len() {
            curr[j + 1] = if a[i] == b[j] { prev[j] + 1 } else { 0 };
            let size = curr[j + 1];
            if size > best.2 {
                best = (i + 1 - size, j + 1 - size, size);
            }
        }
        std::mem::swap(&mut prev, &mut curr);
        curr.iter_mut().for_each(|v| *v = 0);
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_one() {
        assert_eq!(ratio("History", "History"), 1.0);
        assert_eq!(ratio("", ""), 1.0);
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert_eq!(ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn ratio_counts_recursive_blocks() {
        // "abcd" vs "bcde": block "bcd" → 2*3/8
        assert!((ratio("abcd", "bcde") - 0.75).abs() < 1e-9);
    }

    #[test]
    fn is_similar_ignores_case() {
        assert!(is_similar("JOSÉ FIGUEIRAS", "José Figueiras", 0.8));
        assert!(!is_similar("Os Sabichões", "José Figueiras", 0.8));
    }

    #[test]
    fn close_matches_orders_best_first_and_respects_cutoff() {
        let names = ["Astronomy", "Astrology", "Politics"];
        let matches = close_matches("Astronomie", &names, 3, 0.6);
        assert_eq!(matches.first(), Some(&"Astronomy"));
        assert!(!matches.contains(&"Politics"));
    }

    #[test]
    fn best_match_returns_none_below_cutoff() {
        let names = ["History", "Geography"];
        assert_eq!(best_match("Cinema", &names, 0.6), None);
        assert_eq!(best_match("Histroy", &names, 0.6), Some("History"));
    }
}
