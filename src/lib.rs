pub mod adjust;
pub mod category;
pub mod config;
pub mod error;
pub mod index;
pub mod insight;
pub mod matcher;
pub mod morphology;
pub mod report;
pub mod resolve;
pub mod sentence;

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

pub use adjust::IntensityWord;
pub use category::{Category, Confidence, ScoreVector, SentenceType};
pub use config::{AnalyzerConfig, ContextWeights, KeywordDictionary};
pub use error::{AnalyzeError, ConfigError, TokenizeError};
pub use index::KeywordIndex;
pub use insight::{EmotionPattern, MixedEmotion, ProgressionStep, QualityAssessment};
pub use matcher::MatchDetail;
pub use morphology::{LexiconTokenizer, Token, Tokenizer};
pub use sentence::SentenceEvidence;

use adjust::ScoreAdjuster;

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceDetail {
    pub score_gap: f64,
    pub max_score: f64,
    pub second_max: f64,
    pub text_length: usize,
    pub keyword_count: usize,
    pub short_text_penalty: bool,
    pub no_keywords_penalty: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisDetail {
    pub text_length: usize,
    pub keyword_count: usize,
    pub raw_scores: ScoreVector,
    /// Adjusted scores before normalization.
    pub weighted_scores: ScoreVector,
    pub matches: Vec<MatchDetail>,
    pub feel_score: f64,
    pub feel_indicators: Vec<String>,
    pub emotion_intensity: f64,
    pub detected_patterns: Vec<EmotionPattern>,
    pub intensity_word: Option<IntensityWord>,
    pub negated: bool,
    pub sentence_evidence: SentenceEvidence,
    pub emotion_progression: Vec<ProgressionStep>,
    pub mixed_emotions: Vec<MixedEmotion>,
    pub quality: QualityAssessment,
    pub tokens: Option<Vec<Token>>,
    pub pos_tags: Vec<String>,
}

/// Why a result carries default values instead of an analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Fallback {
    EmptyInput,
    InternalFailure { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub text: String,
    pub scores: ScoreVector,
    pub primary_category: Category,
    pub confidence: Confidence,
    pub sentence_type: SentenceType,
    pub keywords: Vec<String>,
    pub structure_pattern: String,
    pub ambiguous: bool,
    pub secondary_categories: Vec<Category>,
    pub ambiguity_score: f64,
    pub confidence_detail: ConfidenceDetail,
    pub detail: AnalysisDetail,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<Fallback>,
}

impl AnalysisResult {
    fn fallback(text: String, fallback: Fallback, threshold: f64) -> Self {
        let text_length = text.chars().count();
        let scores = ScoreVector::zero();
        let resolution = resolve::resolve(&scores, threshold);
        AnalysisResult {
            text,
            scores,
            primary_category: Category::Sense,
            confidence: Confidence::Low,
            sentence_type: SentenceType::Sv,
            keywords: vec![],
            structure_pattern: insight::structure_pattern(Category::Sense).to_string(),
            ambiguous: resolution.ambiguous,
            secondary_categories: resolution.secondary,
            ambiguity_score: resolution.ambiguity_score,
            confidence_detail: ConfidenceDetail {
                score_gap: 0.0,
                max_score: 0.0,
                second_max: 0.0,
                text_length,
                keyword_count: 0,
                short_text_penalty: text_length < HP.short_text_chars,
                no_keywords_penalty: true,
            },
            detail: AnalysisDetail {
                text_length,
                keyword_count: 0,
                raw_scores: scores,
                weighted_scores: scores,
                matches: vec![],
                feel_score: 0.0,
                feel_indicators: vec![],
                emotion_intensity: HP.intensity_base,
                detected_patterns: vec![],
                intensity_word: None,
                negated: false,
                sentence_evidence: SentenceEvidence::Default,
                emotion_progression: vec![],
                mixed_emotions: vec![],
                quality: insight::assess_quality(text_length, &scores, 0),
                tokens: None,
                pos_tags: vec![],
            },
            fallback: Some(fallback),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

// ---------------------------------------------------------------------------
// Hyperparameters
// ---------------------------------------------------------------------------

pub(crate) struct Hyperparameters {
    pub feel_marker_bonus: f64,
    pub feel_exclamation_bonus: f64,
    pub feel_cap: f64,
    pub negation_factor: f64,
    pub repetition_step: f64,
    pub repetition_cap: f64,
    pub morphology_boost: f64,
    pub pos_weight_adjective: f64,
    pub pos_weight_verb: f64,
    pub pos_weight_noun: f64,
    pub pos_weight_other: f64,
    pub high_confidence_gap: f64,
    pub high_confidence_max: f64,
    pub medium_confidence_gap: f64,
    pub medium_confidence_max: f64,
    pub short_text_chars: usize,
    pub intensity_base: f64,
    pub intensity_per_exclamation: f64,
    pub intensity_per_adjective: f64,
    pub intensity_per_interjection: f64,
    pub intensity_cap: f64,
    pub mixed_emotion_threshold: f64,
    pub quality_short_text: usize,
    pub quality_long_text: usize,
    pub quality_spread_score: f64,
    pub quality_min_score: f64,
}

pub(crate) static HP: Hyperparameters = Hyperparameters {
    feel_marker_bonus: 0.5,
    feel_exclamation_bonus: 0.2,
    feel_cap: 2.0,
    negation_factor: 0.3,
    repetition_step: 0.2,
    repetition_cap: 0.8,
    morphology_boost: 0.3,
    pos_weight_adjective: 1.2,
    pos_weight_verb: 1.1,
    pos_weight_noun: 0.9,
    pos_weight_other: 1.0,
    high_confidence_gap: 0.5,
    high_confidence_max: 0.3,
    medium_confidence_gap: 0.2,
    medium_confidence_max: 0.2,
    short_text_chars: 10,
    intensity_base: 1.0,
    intensity_per_exclamation: 0.3,
    intensity_per_adjective: 0.2,
    intensity_per_interjection: 0.4,
    intensity_cap: 3.0,
    mixed_emotion_threshold: 0.5,
    quality_short_text: 15,
    quality_long_text: 200,
    quality_spread_score: 0.2,
    quality_min_score: 0.1,
};

// ---------------------------------------------------------------------------
// Compiled patterns
// ---------------------------------------------------------------------------

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Trims and collapses every whitespace run to a single space.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Statements used by `--samples` and the benchmark.
pub const SAMPLE_STATEMENTS: &[&str] = &[
    "この料理、本当においしい！素晴らしい味でした。",
    "やっと数学の問題が解けた！理解できて嬉しい。",
    "マラソンを完走できて本当に嬉しい。頑張った甲斐があった。",
    "友達が励ましてくれて心から感謝している。温かい気持ちになった。",
    "夕日がとても美しく、心が洗われるような気持ちになった。",
];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// The classification engine. Immutable once built, so one instance can
/// serve any number of threads.
pub struct StarAnalyzer {
    config: AnalyzerConfig,
    index: KeywordIndex,
    tokenizer: Option<Box<dyn Tokenizer>>,
}

impl fmt::Debug for StarAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StarAnalyzer")
            .field("keywords", &self.index.len())
            .field("tokenizer", &self.tokenizer.as_ref().map(|t| t.name()))
            .finish()
    }
}

impl Default for StarAnalyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::builtin())
    }
}

impl StarAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        let index = KeywordIndex::build(&config.keywords);
        Self {
            config,
            index,
            tokenizer: None,
        }
    }

    pub fn with_tokenizer(mut self, tokenizer: impl Tokenizer + 'static) -> Self {
        log::debug!("using tokenizer '{}'", tokenizer.name());
        self.tokenizer = Some(Box::new(tokenizer));
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn index(&self) -> &KeywordIndex {
        &self.index
    }

    pub fn tokenizer_name(&self) -> Option<&str> {
        self.tokenizer.as_deref().map(|t| t.name())
    }

    /// Never fails: blank input and internal errors both produce a default
    /// result whose `fallback` field says why.
    pub fn analyze(&self, text: &str) -> AnalysisResult {
        match self.try_analyze(text) {
            Ok(result) => result,
            Err(err) => {
                log::error!("analysis failed: {err}");
                AnalysisResult::fallback(
                    normalize_whitespace(text),
                    Fallback::InternalFailure {
                        message: err.to_string(),
                    },
                    self.config.ambiguity_threshold,
                )
            }
        }
    }

    /// Entry point for untyped input. Anything but a JSON string is
    /// rejected.
    pub fn analyze_value(
        &self,
        value: &serde_json::Value,
    ) -> Result<AnalysisResult, AnalyzeError> {
        match value {
            serde_json::Value::String(text) => Ok(self.analyze(text)),
            other => Err(AnalyzeError::InvalidInputType {
                found: json_type_name(other),
            }),
        }
    }

    pub fn try_analyze(&self, text: &str) -> Result<AnalysisResult, AnalyzeError> {
        let text = normalize_whitespace(text);
        if text.is_empty() {
            return Ok(AnalysisResult::fallback(
                text,
                Fallback::EmptyInput,
                self.config.ambiguity_threshold,
            ));
        }

        let outcome = matcher::search(&text, &self.index);
        let (sentence_type, sentence_evidence) = sentence::classify_with_evidence(&text);
        let tokens = self.tokens(&text);

        let adjustment = ScoreAdjuster::new(&self.config, &self.index).adjust(
            outcome.scores,
            &text,
            sentence_type,
            tokens.as_deref(),
        );
        if !adjustment.weighted.is_finite() || !adjustment.scores.is_finite() {
            return Err(AnalyzeError::Internal(format!(
                "non-finite scores {:?}",
                adjustment.weighted
            )));
        }

        let resolution = resolve::resolve(&adjustment.scores, self.config.ambiguity_threshold);
        let keywords = self.extract_keywords(&text);
        let keyword_count = self.count_keywords(&text);
        let text_length = text.chars().count();

        log::debug!(
            "{} ({}, {}): {:?}",
            resolution.primary,
            sentence_type,
            resolution.confidence,
            adjustment.scores
        );

        let pos_tags = tokens
            .iter()
            .flatten()
            .map(|t| format!("{}({})", t.surface, t.pos))
            .collect();

        Ok(AnalysisResult {
            scores: adjustment.scores,
            primary_category: resolution.primary,
            confidence: resolution.confidence,
            sentence_type,
            structure_pattern: insight::structure_pattern(resolution.primary).to_string(),
            ambiguous: resolution.ambiguous,
            secondary_categories: resolution.secondary,
            ambiguity_score: resolution.ambiguity_score,
            confidence_detail: ConfidenceDetail {
                score_gap: resolution.gap,
                max_score: resolution.max_score,
                second_max: resolution.second_max,
                text_length,
                keyword_count,
                short_text_penalty: text_length < HP.short_text_chars,
                no_keywords_penalty: keyword_count == 0,
            },
            detail: AnalysisDetail {
                text_length,
                keyword_count: keywords.len(),
                raw_scores: outcome.scores,
                weighted_scores: adjustment.weighted,
                matches: outcome.matches,
                feel_score: adjustment.feel_score,
                feel_indicators: insight::feel_indicators(&text),
                emotion_intensity: insight::emotion_intensity(
                    &text,
                    &self.config,
                    tokens.as_deref(),
                ),
                detected_patterns: insight::detect_patterns(&text, adjustment.feel_score),
                intensity_word: adjustment.intensity,
                negated: adjustment.negated,
                sentence_evidence,
                emotion_progression: insight::emotion_progression(&text, &self.index),
                mixed_emotions: insight::mixed_emotions(&adjustment.scores),
                quality: insight::assess_quality(text_length, &adjustment.scores, keyword_count),
                tokens,
                pos_tags,
            },
            keywords,
            text,
            fallback: None,
        })
    }

    /// Dictionary keywords present in `text`, each once, in dictionary
    /// order.
    pub fn extract_keywords(&self, text: &str) -> Vec<String> {
        let folded = text.to_lowercase();
        let mut keywords: Vec<String> = Vec::new();
        for occurrence in self.index.occurrences_in(&folded) {
            let keyword = occurrence.keyword.trim();
            if !keywords.iter().any(|k| k == keyword) {
                keywords.push(keyword.to_string());
            }
        }
        keywords
    }

    /// Dictionary lines present in `text`. A keyword listed under several
    /// categories counts once per listing.
    pub fn count_keywords(&self, text: &str) -> usize {
        self.index.occurrences_in(&text.to_lowercase()).count()
    }

    /// The only place the tokenizer is called. A failing tokenizer costs a
    /// warning, never the analysis.
    fn tokens(&self, text: &str) -> Option<Vec<Token>> {
        let tokenizer = self.tokenizer.as_deref()?;
        match tokenizer.tokenize(text) {
            Ok(tokens) => Some(tokens),
            Err(err) => {
                log::warn!("tokenizer '{}' failed: {err}", tokenizer.name());
                None
            }
        }
    }
}

static DEFAULT_ANALYZER: Lazy<StarAnalyzer> = Lazy::new(StarAnalyzer::default);

/// Analyze with the built-in dictionary and no tokenizer.
pub fn analyze(text: &str) -> AnalysisResult {
    DEFAULT_ANALYZER.analyze(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_runs_collapse() {
        assert_eq!(normalize_whitespace("  夕日が\n\tきれい   だ "), "夕日が きれい だ");
        assert_eq!(normalize_whitespace(" \n "), "");
    }

    #[test]
    fn empty_input_is_a_marked_default() {
        let result = analyze("   ");
        assert_eq!(result.fallback, Some(Fallback::EmptyInput));
        assert_eq!(result.primary_category, Category::Sense);
        assert_eq!(result.confidence, Confidence::Low);
        assert!(result.scores.is_all_zero());
        assert!(result.ambiguous);
        assert_eq!(result.ambiguity_score, 1.0);
        assert!(result.is_fallback());
        assert!(!analyze("すごい").is_fallback());
    }

    #[test]
    fn infinite_multiplier_becomes_internal_failure() {
        let mut config = AnalyzerConfig::builtin();
        config.intensity_words.insert("とても".to_string(), f64::INFINITY);
        let analyzer = StarAnalyzer::new(config);

        assert!(matches!(
            analyzer.try_analyze("とてもおいしい"),
            Err(AnalyzeError::Internal(_))
        ));
        let result = analyzer.analyze("とてもおいしい");
        assert!(matches!(result.fallback, Some(Fallback::InternalFailure { .. })));
        assert_eq!(result.text, "とてもおいしい");
        assert!(result.scores.is_all_zero());
    }

    #[test]
    fn keywords_are_deduplicated_in_dictionary_order() {
        let analyzer = StarAnalyzer::default();
        let keywords = analyzer.extract_keywords("すごい発見、すごい");
        let first = keywords.iter().position(|k| k == "すごい");
        assert!(first.is_some());
        assert_eq!(keywords.iter().filter(|k| *k == "すごい").count(), 1);
    }

    #[test]
    fn analyzer_exposes_its_config_and_index() {
        let config = AnalyzerConfig {
            ambiguity_threshold: 0.3,
            ..AnalyzerConfig::builtin()
        };
        let analyzer = StarAnalyzer::new(config);
        assert_eq!(analyzer.config().ambiguity_threshold, 0.3);
        assert_eq!(
            analyzer.index().occurrences().len(),
            KeywordIndex::build(&analyzer.config().keywords).occurrences().len()
        );
        assert!(!analyzer.index().lookup("おいしい").is_empty());
    }

    #[test]
    fn analyzer_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StarAnalyzer>();
    }

    #[test]
    fn result_serializes_scores_as_map() {
        let json = serde_json::to_value(analyze("この料理、本当においしい！")).unwrap();
        assert!(json["scores"]["SENSE"].is_number());
        assert_eq!(json["primary_category"], "SENSE");
        assert!(json.get("fallback").is_none());
    }
}
