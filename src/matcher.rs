use serde::Serialize;

use crate::category::{Category, ScoreVector};
use crate::index::KeywordIndex;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchDetail {
    pub keyword: String,
    pub category: Category,
    pub keyword_type: String,
    pub weight: f64,
    /// Char offsets `[start, end)` into the case-folded text.
    pub span: (usize, usize),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchOutcome {
    pub scores: ScoreVector,
    pub matches: Vec<MatchDetail>,
}

/// Sliding-window lookup of every substring up to the longest keyword.
///
/// Runs in O(text length x max keyword length) regardless of dictionary
/// size. Overlapping and nested hits all count: "美味しい" scores both
/// "美味しい" and any shorter keyword inside it.
pub fn search(text: &str, index: &KeywordIndex) -> MatchOutcome {
    let mut outcome = MatchOutcome::default();
    let width = index.max_keyword_length();
    if text.is_empty() || width == 0 {
        return outcome;
    }

    let folded: Vec<char> = text.to_lowercase().chars().collect();
    let mut window = String::with_capacity(width * 4);
    for start in 0..folded.len() {
        let max_end = (start + width).min(folded.len());
        window.clear();
        for end in start + 1..=max_end {
            window.push(folded[end - 1]);
            for entry in index.lookup(&window) {
                outcome.scores[entry.category] += entry.weight;
                outcome.matches.push(MatchDetail {
                    keyword: window.clone(),
                    category: entry.category,
                    keyword_type: entry.keyword_type.clone(),
                    weight: entry.weight,
                    span: (start, end),
                });
            }
        }
    }
    log::trace!("matcher: {} hits, raw scores {:?}", outcome.matches.len(), outcome.scores);
    outcome
}
