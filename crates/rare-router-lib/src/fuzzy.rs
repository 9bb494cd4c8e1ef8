//! Approximate name matching for autocomplete and "did you mean" hints.
//!
//! Scores are tiered so that left-to-right typing wins over raw edit
//! similarity. The first tier that matches decides the score:
//!
//! | tier | rule (case-insensitive)                       | score            |
//! |------|-----------------------------------------------|------------------|
//! | 1    | exact match                                   | 1.0              |
//! | 2    | candidate starts with the query               | 0.9              |
//! | 3    | candidate contains the query                  | 0.7              |
//! | 4    | a whitespace-delimited word starts with query | 0.6              |
//! | 5    | Levenshtein similarity >= 0.5                 | similarity * 0.5 |
//!
//! Anything else scores 0 and is never returned by [`rank`].

use std::cmp::Ordering;

use serde::Serialize;

/// Minimum score used by [`rank`] callers that do not care about a threshold.
pub const DEFAULT_MIN_SCORE: f64 = 0.1;

/// Minimum edit similarity before a candidate is considered at all.
const MIN_EDIT_SIMILARITY: f64 = 0.5;

/// Factor applied to edit similarity so it ranks below every substring tier.
const EDIT_SCALE: f64 = 0.5;

/// A scored candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FuzzyMatch<'a> {
    pub candidate: &'a str,
    pub score: f64,
}

/// Score how well `candidate` matches `query`, in `[0, 1]`.
pub fn score(query: &str, candidate: &str) -> f64 {
    let query = query.trim().to_lowercase();
    let candidate = candidate.trim().to_lowercase();

    if query == candidate {
        return 1.0;
    }
    if candidate.starts_with(&query) {
        return 0.9;
    }
    if candidate.contains(&query) {
        return 0.7;
    }
    if candidate
        .split_whitespace()
        .any(|word| word.starts_with(&query))
    {
        return 0.6;
    }

    let max_len = query.chars().count().max(candidate.chars().count());
    if max_len == 0 {
        return 0.0;
    }

    let distance = strsim::levenshtein(&query, &candidate);
    let similarity = 1.0 - distance as f64 / max_len as f64;
    if similarity < MIN_EDIT_SIMILARITY {
        return 0.0;
    }

    similarity * EDIT_SCALE
}

/// Boolean form of [`score`].
pub fn fuzzy_match(query: &str, target: &str, threshold: f64) -> bool {
    score(query, target) >= threshold
}

/// Rank string candidates by [`score`], best first.
///
/// Candidates scoring zero or below `min_score` are dropped. Ties keep their
/// input order. An empty query returns every candidate with score 1.0.
pub fn rank<'a, S: AsRef<str>>(
    query: &str,
    candidates: &'a [S],
    min_score: f64,
) -> Vec<FuzzyMatch<'a>> {
    rank_by(query, candidates, min_score, |c| c.as_ref())
        .into_iter()
        .map(|(item, score)| FuzzyMatch {
            candidate: item.as_ref(),
            score,
        })
        .collect()
}

/// Rank arbitrary items by the name returned from `key`.
pub fn rank_by<'a, T, F>(query: &str, items: &'a [T], min_score: f64, key: F) -> Vec<(&'a T, f64)>
where
    F: Fn(&T) -> &str,
{
    if query.trim().is_empty() {
        return items.iter().map(|item| (item, 1.0)).collect();
    }

    let mut scored: Vec<(&'a T, f64)> = items
        .iter()
        .map(|item| (item, score(query, key(item))))
        .filter(|(_, s)| *s > 0.0 && *s >= min_score)
        .collect();

    // `sort_by` is stable, so equal scores keep input order.
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored
}

/// Best `limit` candidate names for a query, for use in error hints.
pub fn suggest<S: AsRef<str>>(query: &str, candidates: &[S], limit: usize) -> Vec<String> {
    if query.trim().is_empty() {
        return Vec::new();
    }
    rank(query, candidates, DEFAULT_MIN_SCORE)
        .into_iter()
        .take(limit)
        .map(|m| m.candidate.to_string())
        .collect()
}
