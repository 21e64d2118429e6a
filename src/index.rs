use std::collections::HashMap;

use serde::Serialize;

use crate::category::{Category, ScoreVector};
use crate::config::KeywordDictionary;

/// Per-type weights. Types not listed here weigh 1.0.
const TYPE_WEIGHTS: &[(&str, f64)] = &[
    ("feeling_expressions", 1.5),
    ("core_keywords", 1.3),
    ("auxiliary_expressions", 1.1),
    ("context_keywords", 0.9),
    ("modifiers", 0.8),
];

pub fn type_weight(keyword_type: &str) -> f64 {
    TYPE_WEIGHTS
        .iter()
        .find(|(t, _)| *t == keyword_type)
        .map(|(_, w)| *w)
        .unwrap_or(1.0)
}

pub fn normalize_keyword(keyword: &str) -> String {
    keyword.trim().to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexEntry {
    pub category: Category,
    pub keyword_type: String,
    pub weight: f64,
}

/// One dictionary line, kept in declaration order for the stages that
/// re-scan the dictionary rather than the index.
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    pub category: Category,
    pub keyword_type: String,
    pub keyword: String,
    pub normalized: String,
}

#[derive(Debug, Clone, Default)]
pub struct KeywordIndex {
    entries: HashMap<String, Vec<IndexEntry>>,
    occurrences: Vec<Occurrence>,
    max_keyword_length: usize,
}

impl KeywordIndex {
    pub fn build(dictionary: &KeywordDictionary) -> Self {
        let mut index = Self::default();
        for (category, keyword_type, keyword) in dictionary.iter() {
            let normalized = normalize_keyword(keyword);
            if normalized.is_empty() {
                log::debug!("skipping blank {category}/{keyword_type} keyword");
                continue;
            }

            let entry = IndexEntry {
                category,
                keyword_type: keyword_type.to_string(),
                weight: type_weight(keyword_type),
            };
            let slot = index.entries.entry(normalized.clone()).or_default();
            if !slot.contains(&entry) {
                slot.push(entry);
            }

            // Raw length, not normalized, bounds the scan window.
            index.max_keyword_length = index.max_keyword_length.max(keyword.chars().count());
            index.occurrences.push(Occurrence {
                category,
                keyword_type: keyword_type.to_string(),
                keyword: keyword.to_string(),
                normalized,
            });
        }
        log::debug!(
            "keyword index built: {} keywords, max length {}",
            index.entries.len(),
            index.max_keyword_length
        );
        index
    }

    pub fn lookup(&self, normalized: &str) -> &[IndexEntry] {
        self.entries
            .get(normalized)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, normalized: &str) -> bool {
        self.entries.contains_key(normalized)
    }

    pub fn max_keyword_length(&self) -> usize {
        self.max_keyword_length
    }

    /// Distinct normalized keywords.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn occurrences(&self) -> &[Occurrence] {
        &self.occurrences
    }

    /// Dictionary lines whose keyword appears in `folded` (already
    /// whitespace-normalized and lowercased).
    pub fn occurrences_in<'a>(&'a self, folded: &'a str) -> impl Iterator<Item = &'a Occurrence> {
        self.occurrences
            .iter()
            .filter(move |o| folded.contains(o.normalized.as_str()))
    }

    /// Number of dictionary lines present in `folded`, per category.
    pub fn occurrence_counts(&self, folded: &str) -> [usize; 4] {
        let mut counts = [0; 4];
        for occurrence in self.occurrences_in(folded) {
            counts[occurrence.category.index()] += 1;
        }
        counts
    }

    /// Same counts as [`KeywordIndex::occurrence_counts`], as scores.
    pub fn occurrence_scores(&self, folded: &str) -> ScoreVector {
        let counts = self.occurrence_counts(folded);
        ScoreVector::from_array(counts.map(|c| c as f64))
    }
}
