use serde::Serialize;

use crate::category::{Category, ScoreVector, SentenceType};
use crate::config::AnalyzerConfig;
use crate::index::KeywordIndex;
use crate::morphology::{self, Token};
use crate::HP;

/// Expressions of heightened feeling. Each one present adds to the FEEL
/// bonus.
pub const FEEL_MARKERS: &[&str] = &[
    "感動",
    "心が動く",
    "胸が熱く",
    "涼しく",
    "心が温かく",
    "気持ちがいい",
    "心が踊る",
    "感情",
    "心が満たされる",
];

pub fn exclamation_count(text: &str) -> usize {
    text.chars().filter(|c| matches!(c, '!' | '！')).count()
}

/// 0.5 per marker present plus 0.2 per exclamation mark, capped at 2.0.
pub fn feel_score(text: &str) -> f64 {
    let markers = FEEL_MARKERS.iter().filter(|m| text.contains(*m)).count();
    let score = markers as f64 * HP.feel_marker_bonus
        + exclamation_count(text) as f64 * HP.feel_exclamation_bonus;
    score.min(HP.feel_cap)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntensityWord {
    pub word: String,
    pub multiplier: f64,
}

/// First configured intensity word found in `text`, in table order.
pub fn first_intensity_word(text: &str, config: &AnalyzerConfig) -> Option<IntensityWord> {
    config
        .intensity_words
        .iter()
        .find(|(word, _)| text.contains(word.as_str()))
        .map(|(word, multiplier)| IntensityWord {
            word: word.clone(),
            multiplier: *multiplier,
        })
}

pub fn is_negated(text: &str, config: &AnalyzerConfig) -> bool {
    config
        .negation_patterns
        .iter()
        .any(|p| text.contains(p.as_str()))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Adjustment {
    /// Normalized scores.
    pub scores: ScoreVector,
    /// Scores after every stage but normalization.
    pub weighted: ScoreVector,
    pub feel_score: f64,
    pub intensity: Option<IntensityWord>,
    pub negated: bool,
}

/// Applies the context stages to raw matcher scores. Stage order is fixed:
/// intensity, FEEL, negation, repetition, sentence-type congruence,
/// morphology, normalization.
pub struct ScoreAdjuster<'a> {
    config: &'a AnalyzerConfig,
    index: &'a KeywordIndex,
}

impl<'a> ScoreAdjuster<'a> {
    pub fn new(config: &'a AnalyzerConfig, index: &'a KeywordIndex) -> Self {
        Self { config, index }
    }

    pub fn adjust(
        &self,
        raw: ScoreVector,
        text: &str,
        sentence_type: SentenceType,
        tokens: Option<&[Token]>,
    ) -> Adjustment {
        let mut scores = raw;

        let intensity = first_intensity_word(text, self.config);
        if let Some(found) = &intensity {
            scores.scale_nonzero(found.multiplier);
            log::trace!("intensity '{}' x{}: {:?}", found.word, found.multiplier, scores);
        }

        let feel = feel_score(text);
        if feel > 0.0 {
            for category in Category::ALL {
                if scores[category] > 0.0 {
                    scores[category] += feel;
                }
            }
            log::trace!("feel +{feel}: {scores:?}");
        }

        let negated = is_negated(text, self.config);
        if negated {
            scores.scale_all(HP.negation_factor);
            log::trace!("negation x{}: {:?}", HP.negation_factor, scores);
        }

        let counts = self.index.occurrence_counts(&text.to_lowercase());
        for category in Category::ALL {
            let count = counts[category.index()];
            if count > 1 {
                let bonus = (HP.repetition_step * count as f64).min(HP.repetition_cap);
                scores[category] *= 1.0 + bonus;
            }
        }

        let weights = &self.config.context_weights;
        for category in Category::ALL {
            scores[category] *= if sentence_type.favours(category) {
                weights.sentence_type_match_bonus
            } else {
                weights.sentence_type_mismatch_penalty
            };
        }
        log::trace!("context ({sentence_type}): {scores:?}");

        if let Some(tokens) = tokens {
            morphology::boost(&mut scores, tokens, self.index);
            log::trace!("morphology ({} tokens): {:?}", tokens.len(), scores);
        }

        Adjustment {
            scores: scores.normalized(),
            weighted: scores,
            feel_score: feel,
            intensity,
            negated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeywordDictionary;

    fn config() -> AnalyzerConfig {
        AnalyzerConfig {
            keywords: KeywordDictionary::new()
                .with_keywords(Category::Sense, "feeling_expressions", &["美味しい", "美しい"])
                .with_keywords(Category::Act, "core_keywords", &["完走"]),
            ..AnalyzerConfig::builtin()
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn feel_score_counts_markers_and_exclamations() {
        assert_eq!(feel_score("普通の日"), 0.0);
        assert!(close(feel_score("感動した！"), 0.7));
        assert!(close(feel_score("感動!!!"), 1.1));
        assert_eq!(feel_score("感動と感情で心が動く!!!!!!"), 2.0);
    }

    #[test]
    fn first_intensity_word_follows_table_order() {
        let config = config();
        // とても precedes 本当に in the table.
        let found = first_intensity_word("本当にとても", &config).unwrap();
        assert_eq!(found.word, "とても");
        assert_eq!(found.multiplier, 1.8);
        assert!(first_intensity_word("普通", &config).is_none());
    }

    #[test]
    fn sv_sentence_applies_every_stage() {
        let config = config();
        let index = KeywordIndex::build(&config.keywords);
        let adjuster = ScoreAdjuster::new(&config, &index);
        let raw = ScoreVector::from_array([1.5, 0.0, 0.0, 0.0]);

        let out = adjuster.adjust(raw, "とても美味しい！", SentenceType::Sv, None);

        // 1.5 x 1.8, + 0.2 feel, x 1.2 congruence.
        let expected = (1.5 * 1.8 + 0.2) * 1.2;
        assert!(close(out.weighted[Category::Sense], expected));
        assert_eq!(out.scores[Category::Sense], 1.0);
        assert!(!out.negated);
        assert!(close(out.feel_score, 0.2));
        assert_eq!(out.intensity.unwrap().word, "とても");
    }

    #[test]
    fn feel_bonus_skips_zero_categories() {
        let config = config();
        let index = KeywordIndex::build(&config.keywords);
        let adjuster = ScoreAdjuster::new(&config, &index);
        let raw = ScoreVector::from_array([0.0, 0.0, 1.3, 0.0]);

        let out = adjuster.adjust(raw, "感動", SentenceType::Sov, None);

        assert_eq!(out.weighted[Category::Sense], 0.0);
        assert!(close(out.weighted[Category::Act], (1.3 + 0.5) * 1.2));
    }

    #[test]
    fn negation_scales_every_score() {
        let config = config();
        let index = KeywordIndex::build(&config.keywords);
        let adjuster = ScoreAdjuster::new(&config, &index);
        let raw = ScoreVector::from_array([1.5, 0.0, 0.0, 0.0]);

        let plain = adjuster.adjust(raw, "美味しい", SentenceType::Sv, None);
        let negated = adjuster.adjust(raw, "美味しくない", SentenceType::Sv, None);

        assert!(negated.negated);
        assert!(close(
            negated.weighted[Category::Sense],
            plain.weighted[Category::Sense] * 0.3
        ));
    }

    #[test]
    fn repetition_needs_two_distinct_lines() {
        let config = config();
        let index = KeywordIndex::build(&config.keywords);
        let adjuster = ScoreAdjuster::new(&config, &index);
        let raw = ScoreVector::from_array([3.0, 0.0, 0.0, 0.0]);

        // Two SENSE lines present: x (1 + 0.4).
        let both = adjuster.adjust(raw, "美味しい美しい", SentenceType::Sv, None);
        assert!(close(both.weighted[Category::Sense], 3.0 * 1.4 * 1.2));

        // One line repeated twice still counts once.
        let repeated = adjuster.adjust(raw, "美味しい美味しい", SentenceType::Sv, None);
        assert!(close(repeated.weighted[Category::Sense], 3.0 * 1.2));
    }

    #[test]
    fn congruence_reverses_for_sov() {
        let config = config();
        let index = KeywordIndex::build(&config.keywords);
        let adjuster = ScoreAdjuster::new(&config, &index);
        let raw = ScoreVector::uniform(1.0);

        let sv = adjuster.adjust(raw, "x", SentenceType::Sv, None).weighted;
        let sov = adjuster.adjust(raw, "x", SentenceType::Sov, None).weighted;

        assert!(close(sv[Category::Think], 1.2));
        assert!(close(sv[Category::Relate], 0.8));
        assert!(close(sov[Category::Think], 0.8));
        assert!(close(sov[Category::Relate], 1.2));
    }

    #[test]
    fn tokens_add_morphology_boost_after_congruence() {
        let config = config();
        let index = KeywordIndex::build(&config.keywords);
        let adjuster = ScoreAdjuster::new(&config, &index);
        let tokens = [Token::new("完走", "完走", "名詞")];

        let out = adjuster.adjust(ScoreVector::zero(), "完走", SentenceType::Sov, Some(&tokens));

        assert!(close(out.weighted[Category::Act], 0.3 * 0.9));
        assert_eq!(out.scores[Category::Act], 1.0);
    }

    #[test]
    fn zero_scores_stay_zero() {
        let config = config();
        let index = KeywordIndex::build(&config.keywords);
        let adjuster = ScoreAdjuster::new(&config, &index);

        let out = adjuster.adjust(ScoreVector::zero(), "とても感動！", SentenceType::Sv, None);

        assert!(out.scores.is_all_zero());
        assert!(out.feel_score > 0.0);
    }
}
