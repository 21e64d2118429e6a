use serde::Serialize;

use crate::category::{Category, Confidence, ScoreVector};
use crate::HP;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub primary: Category,
    pub confidence: Confidence,
    pub ambiguous: bool,
    pub secondary: Vec<Category>,
    pub ambiguity_score: f64,
    pub max_score: f64,
    pub second_max: f64,
    pub gap: f64,
}

/// Highest-scoring category. Ties go to the earlier category in
/// SENSE, THINK, ACT, RELATE order.
pub fn primary(scores: &ScoreVector) -> Category {
    let mut best = Category::Sense;
    for (category, score) in scores.iter() {
        if score > scores[best] {
            best = category;
        }
    }
    best
}

pub fn confidence_for(gap: f64, max_score: f64) -> Confidence {
    if gap > HP.high_confidence_gap && max_score > HP.high_confidence_max {
        Confidence::High
    } else if gap > HP.medium_confidence_gap && max_score > HP.medium_confidence_max {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

pub fn resolve(scores: &ScoreVector, threshold: f64) -> Resolution {
    let primary = primary(scores);
    let [max_score, second_max, ..] = scores.sorted_desc();
    let gap = max_score - second_max;
    let confidence = confidence_for(gap, max_score);

    // A four-way tie at zero is the most ambiguous input there is.
    let ambiguous = gap < threshold;
    let (secondary, ambiguity_score) = if ambiguous {
        let secondary = scores
            .iter()
            .filter(|(c, s)| *c != primary && max_score - s <= threshold)
            .map(|(c, _)| c)
            .collect();
        (secondary, (1.0 - gap / threshold).clamp(0.0, 1.0))
    } else {
        (Vec::new(), 0.0)
    };

    if ambiguous {
        log::debug!("ambiguous: {primary} vs {secondary:?}, gap {gap:.3}");
    }

    Resolution {
        primary,
        confidence,
        ambiguous,
        secondary,
        ambiguity_score,
        max_score,
        second_max,
        gap,
    }
}
