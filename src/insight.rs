//! Secondary readings of a statement: how intense it is, which emotional
//! patterns it shows, how the dominant category moves across its parts,
//! and how far the classification can be trusted.

use serde::Serialize;

use crate::adjust::{self, exclamation_count, FEEL_MARKERS};
use crate::category::{Category, ScoreVector};
use crate::config::AnalyzerConfig;
use crate::index::KeywordIndex;
use crate::morphology::{PosClass, Token};
use crate::HP;

// ---------------------------------------------------------------------------
// Intensity and patterns
// ---------------------------------------------------------------------------

/// 1.0, plus 0.3 per exclamation mark, times the first intensity word,
/// plus 0.2 per adjective and 0.4 per interjection token. Capped at 3.0.
pub fn emotion_intensity(text: &str, config: &AnalyzerConfig, tokens: Option<&[Token]>) -> f64 {
    let mut intensity =
        HP.intensity_base + exclamation_count(text) as f64 * HP.intensity_per_exclamation;
    if let Some(found) = adjust::first_intensity_word(text, config) {
        intensity *= found.multiplier;
    }
    for token in tokens.unwrap_or_default() {
        intensity += match token.pos_class() {
            PosClass::Adjective => HP.intensity_per_adjective,
            PosClass::Interjection => HP.intensity_per_interjection,
            _ => 0.0,
        };
    }
    intensity.min(HP.intensity_cap)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionPattern {
    Exclamation,
    Emphasis,
    Gratitude,
    Achievement,
    Feel,
}

impl EmotionPattern {
    pub fn label_ja(self) -> &'static str {
        match self {
            EmotionPattern::Exclamation => "感嘆表現",
            EmotionPattern::Emphasis => "強調表現",
            EmotionPattern::Gratitude => "感謝表現",
            EmotionPattern::Achievement => "達成表現",
            EmotionPattern::Feel => "FEEL要素あり",
        }
    }
}

const EMPHASIS_WORDS: &[&str] = &["とても", "すごく", "非常に"];
const GRATITUDE_WORDS: &[&str] = &["ありがとう", "感謝"];
const ACHIEVEMENT_WORDS: &[&str] = &["できた", "やった", "成功"];

pub fn detect_patterns(text: &str, feel_score: f64) -> Vec<EmotionPattern> {
    let any = |words: &[&str]| words.iter().any(|w| text.contains(w));
    let mut patterns = Vec::new();
    if exclamation_count(text) > 0 {
        patterns.push(EmotionPattern::Exclamation);
    }
    if any(EMPHASIS_WORDS) {
        patterns.push(EmotionPattern::Emphasis);
    }
    if any(GRATITUDE_WORDS) {
        patterns.push(EmotionPattern::Gratitude);
    }
    if any(ACHIEVEMENT_WORDS) {
        patterns.push(EmotionPattern::Achievement);
    }
    if feel_score > 0.0 {
        patterns.push(EmotionPattern::Feel);
    }
    patterns
}

pub fn feel_indicators(text: &str) -> Vec<String> {
    let mut indicators: Vec<String> = FEEL_MARKERS
        .iter()
        .filter(|m| text.contains(*m))
        .map(|m| m.to_string())
        .collect();
    let exclamations = exclamation_count(text);
    if exclamations > 0 {
        indicators.push(format!("感嘆符({exclamations}個)"));
    }
    indicators
}

// ---------------------------------------------------------------------------
// Progression and mixed emotions
// ---------------------------------------------------------------------------

const PART_SEPARATORS: &[&str] = &[
    "。", "、", "が", "けれど", "しかし", "でも", "そして", "また", "そこで", "！", "!",
];

/// Splits on punctuation and connectives, one separator at a time, dropping
/// blank pieces.
pub fn split_parts(text: &str) -> Vec<String> {
    let mut parts = vec![text.trim().to_string()];
    for separator in PART_SEPARATORS {
        parts = parts
            .iter()
            .flat_map(|part| part.split(separator))
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
    }
    parts
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressionStep {
    pub position: usize,
    pub text_part: String,
    pub dominant_emotion: Category,
    pub score: f64,
    pub all_scores: ScoreVector,
}

/// Dominant category of each part with at least one keyword. Parts shorter
/// than two characters are skipped but keep their position.
pub fn emotion_progression(text: &str, index: &KeywordIndex) -> Vec<ProgressionStep> {
    split_parts(text)
        .into_iter()
        .enumerate()
        .filter(|(_, part)| part.chars().count() >= 2)
        .filter_map(|(position, part)| {
            let all_scores = index.occurrence_scores(&part.to_lowercase());
            let dominant = crate::resolve::primary(&all_scores);
            let score = all_scores[dominant];
            (score > 0.0).then(|| ProgressionStep {
                position,
                text_part: part,
                dominant_emotion: dominant,
                score,
                all_scores,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MixedEmotion {
    pub category: Category,
    pub score: f64,
    pub rank: usize,
    /// Score relative to the strongest category.
    pub ratio: f64,
}

/// Listed only when at least two categories reach 0.5.
pub fn mixed_emotions(scores: &ScoreVector) -> Vec<MixedEmotion> {
    let mut significant: Vec<(Category, f64)> = scores
        .iter()
        .filter(|(_, s)| *s >= HP.mixed_emotion_threshold)
        .collect();
    if significant.len() < 2 {
        return Vec::new();
    }
    // Stable sort keeps declaration order among equal scores.
    significant.sort_by(|a, b| b.1.total_cmp(&a.1));
    let top = significant[0].1;
    significant
        .into_iter()
        .enumerate()
        .map(|(i, (category, score))| MixedEmotion {
            category,
            score,
            rank: i + 1,
            ratio: if top > 0.0 { score / top } else { 0.0 },
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Quality assessment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextCategory {
    Short,
    Normal,
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reliability {
    VeryLow,
    Low,
    Medium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Approach {
    InteractiveEnhancement,
    SegmentAnalysis,
    GuidedInput,
    ManualCategorization,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityAssessment {
    pub text_category: TextCategory,
    pub reliability: Reliability,
    pub suggestions: Vec<String>,
    pub alternative_approaches: Vec<Approach>,
}

impl QualityAssessment {
    fn suggest(&mut self, suggestion: &str, approach: Approach) {
        self.suggestions.push(suggestion.to_string());
        self.alternative_approaches.push(approach);
    }
}

pub fn assess_quality(
    text_length: usize,
    scores: &ScoreVector,
    keyword_count: usize,
) -> QualityAssessment {
    let mut quality = QualityAssessment {
        text_category: TextCategory::Normal,
        reliability: Reliability::Medium,
        suggestions: Vec::new(),
        alternative_approaches: Vec::new(),
    };

    if text_length < HP.quality_short_text {
        quality.text_category = TextCategory::Short;
        if keyword_count == 0 {
            quality.reliability = Reliability::Low;
        }
        quality.suggest(
            "より詳細な感動体験の記述をお試しください",
            Approach::InteractiveEnhancement,
        );
    } else if text_length > HP.quality_long_text {
        quality.text_category = TextCategory::Long;
        let spread = scores
            .iter()
            .filter(|(_, s)| *s > HP.quality_spread_score)
            .count();
        if spread > 2 {
            quality.suggest(
                "複数の感動体験が混在している可能性があります",
                Approach::SegmentAnalysis,
            );
        }
    }

    if keyword_count == 0 {
        quality.suggest(
            "STAR理論のキーワードが検出されませんでした",
            Approach::GuidedInput,
        );
    }

    if scores.max() < HP.quality_min_score {
        quality.reliability = Reliability::VeryLow;
        quality.suggest(
            "感動体験の表現が不明確な可能性があります",
            Approach::ManualCategorization,
        );
    }
    quality
}

// ---------------------------------------------------------------------------
// Structure templates
// ---------------------------------------------------------------------------

pub fn structure_pattern(category: Category) -> &'static str {
    match category {
        Category::Sense => "SENSE型（SV構造）: 私は【感動事象の主体】を【知覚動詞】した。その結果、【美・味・匂い等】に対して【きれい・おいしい等】と感じて感動した。",
        Category::Think => "THINK型（SV構造）: 私は【感動事象の主体】を【知覚動詞】した。その結果、【理解・発見・納得等】に対して【わかった・なるほど等】と感じて感動した。",
        Category::Act => "ACT型（SOV構造）: 私は【感動事象の主体】が【感動事象の対象】に【行為動詞】するのを【知覚動詞】した。その結果、【努力・達成・成長等】に対して【できた・やった等】と感じて感動した。",
        Category::Relate => "RELATE型（SOV構造）: 私は【感動事象の主体】が【感動事象の対象】に【関係動詞】するのを【知覚動詞】した。その結果、【愛・絆・感謝等】に対して【ありがたい・すばらしい等】と感じて感動した。",
    }
}
