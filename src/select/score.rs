//! Best-subset reduction used by every ranking stage.

/// Keep every candidate whose score equals the maximum score.
///
/// Order is preserved and ties are kept. With `min_score`, the result is empty
/// unless the maximum score is strictly greater than `min_score`.
pub fn select_best<T, S, F>(candidates: Vec<T>, score: F, min_score: Option<S>) -> Vec<T>
where
    S: Ord + Copy,
    F: Fn(&T) -> S,
{
    let scores: Vec<S> = candidates.iter().map(&score).collect();
    let Some(&best) = scores.iter().max() else {
        return Vec::new();
    };
    if let Some(min) = min_score {
        if best <= min {
            return Vec::new();
        }
    }

    candidates
        .into_iter()
        .zip(scores)
        .filter_map(|(c, s)| (s == best).then_some(c))
        .collect()
}
