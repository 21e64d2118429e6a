use std::io::Write;
use std::sync::Arc;
use std::thread;

use serde_json::json;
use star_analysis::{
    analyze, AnalyzeError, AnalyzerConfig, Category, Confidence, ConfigError, EmotionPattern,
    Fallback, LexiconTokenizer, SentenceType, StarAnalyzer, Token, TokenizeError, Tokenizer,
    SAMPLE_STATEMENTS,
};

struct FixedTokenizer(Vec<Token>);

impl Tokenizer for FixedTokenizer {
    fn name(&self) -> &str {
        "fixed"
    }

    fn tokenize(&self, _text: &str) -> Result<Vec<Token>, TokenizeError> {
        Ok(self.0.clone())
    }
}

struct BrokenTokenizer;

impl Tokenizer for BrokenTokenizer {
    fn name(&self) -> &str {
        "broken"
    }

    fn tokenize(&self, _text: &str) -> Result<Vec<Token>, TokenizeError> {
        Err(TokenizeError::Failed("dictionary corrupted".to_string()))
    }
}

fn temp_json(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn delicious_food_is_sense() {
    let result = analyze("この料理、本当においしい！");
    assert_eq!(result.primary_category, Category::Sense);
    assert_eq!(result.sentence_type, SentenceType::Sv);
    assert_eq!(result.confidence, Confidence::High);
    assert!(
        result.keywords.iter().any(|k| k == "おいしい"),
        "keywords were {:?}",
        result.keywords
    );
    assert_eq!(result.keywords, ["おいしい", "料理"]);
    assert!(result.fallback.is_none());
}

#[test]
fn finishing_a_marathon_is_act() {
    let result = analyze("マラソンを完走できて嬉しい");
    assert_eq!(result.sentence_type, SentenceType::Sov);
    assert_eq!(result.primary_category, Category::Act);
    assert_eq!(result.keywords, ["完走"]);
}

#[test]
fn solving_a_problem_is_think() {
    let result = analyze("やっと問題が解けた！");
    assert_eq!(result.primary_category, Category::Think);
    let result = analyze("なるほど、そういうことか！");
    assert_eq!(result.primary_category, Category::Think);
}

#[test]
fn gratitude_toward_a_friend_is_relate() {
    let result = analyze("友達が励ましてくれて感謝している");
    assert_eq!(result.primary_category, Category::Relate);
    assert_eq!(result.keywords, ["感謝", "感謝している", "友達"]);
    assert!(result
        .detail
        .detected_patterns
        .contains(&EmotionPattern::Gratitude));
}

#[test]
fn negation_lowers_the_weighted_score() {
    let plain = analyze("美味しい");
    let negated = analyze("美味しくない");
    assert!(negated.detail.negated);
    assert!(
        negated.detail.weighted_scores[Category::Sense]
            < plain.detail.weighted_scores[Category::Sense],
        "negated {} vs plain {}",
        negated.detail.weighted_scores[Category::Sense],
        plain.detail.weighted_scores[Category::Sense]
    );
}

#[test]
fn scores_sum_to_one_or_zero() {
    for text in SAMPLE_STATEMENTS.iter().chain(["今日は晴れ", "すごい"].iter()) {
        let total = analyze(text).scores.total();
        assert!(
            total == 0.0 || (total - 1.0).abs() < 1e-9,
            "{text}: scores sum to {total}"
        );
    }
}

#[test]
fn primary_is_the_first_highest_score() {
    for text in SAMPLE_STATEMENTS {
        let result = analyze(text);
        let best = result.scores.max();
        let expected = Category::ALL
            .into_iter()
            .find(|c| result.scores[*c] == best)
            .unwrap();
        assert_eq!(result.primary_category, expected, "{text}");
    }
}

#[test]
fn analysis_is_idempotent() {
    for text in SAMPLE_STATEMENTS {
        assert_eq!(analyze(text), analyze(text), "{text}");
    }
}

#[test]
fn whitespace_is_normalized_before_analysis() {
    let messy = analyze("  この料理、\n本当に  おいしい！ ");
    assert_eq!(messy.text, "この料理、 本当に おいしい！");
    assert_eq!(messy.primary_category, Category::Sense);
}

#[test]
fn blank_input_returns_low_confidence_default() {
    for text in ["", "   ", "\n\t"] {
        let result = analyze(text);
        assert_eq!(result.fallback, Some(Fallback::EmptyInput));
        assert_eq!(result.primary_category, Category::Sense);
        assert_eq!(result.confidence, Confidence::Low);
        assert!(result.scores.is_all_zero());
        assert!(result.confidence_detail.no_keywords_penalty);
    }
}

#[test]
fn text_without_keywords_is_a_low_confidence_tie() {
    let result = analyze("今日は晴れ");
    assert!(result.scores.is_all_zero());
    assert_eq!(result.confidence, Confidence::Low);
    assert!(result.ambiguous);
    assert_eq!(
        result.secondary_categories,
        [Category::Think, Category::Act, Category::Relate]
    );
    assert_eq!(result.ambiguity_score, 1.0);
    assert!(result.fallback.is_none());
    assert!(result.confidence_detail.short_text_penalty);
}

#[test]
fn non_string_json_is_rejected() {
    let analyzer = StarAnalyzer::default();
    for (value, expected) in [
        (json!(42), "number"),
        (json!(null), "null"),
        (json!(["すごい"]), "array"),
        (json!({"text": "すごい"}), "object"),
        (json!(true), "boolean"),
    ] {
        match analyzer.analyze_value(&value) {
            Err(AnalyzeError::InvalidInputType { found }) => assert_eq!(found, expected),
            other => panic!("{value} should be rejected, got {other:?}"),
        }
    }
    let ok = analyzer.analyze_value(&json!("すごい")).unwrap();
    assert_eq!(ok.primary_category, Category::Think);
}

#[test]
fn shared_keyword_is_ambiguous_under_a_wider_threshold() {
    let strict = analyze("すごい");
    assert_eq!(strict.primary_category, Category::Think);
    assert!(!strict.ambiguous);

    let config = AnalyzerConfig {
        ambiguity_threshold: 0.25,
        ..AnalyzerConfig::builtin()
    };
    let result = StarAnalyzer::new(config).analyze("すごい");
    assert!(result.ambiguous);
    assert_eq!(result.secondary_categories, [Category::Act]);
    assert!(
        (result.ambiguity_score - 0.2).abs() < 1e-6,
        "ambiguity score {}",
        result.ambiguity_score
    );
}

#[test]
fn analyzer_is_shared_across_threads() {
    let analyzer = Arc::new(StarAnalyzer::default());
    let expected: Vec<_> = SAMPLE_STATEMENTS.iter().map(|t| analyzer.analyze(t)).collect();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let analyzer = Arc::clone(&analyzer);
            thread::spawn(move || {
                SAMPLE_STATEMENTS
                    .iter()
                    .map(|t| analyzer.analyze(t))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn config_file_replaces_the_dictionary() {
    let file = temp_json(
        r#"{
            "keywords": {
                "SENSE": {"core_keywords": ["海"]},
                "THINK": {},
                "ACT": {"core_keywords": ["泳いだ"]},
                "RELATE": {}
            },
            "ambiguity_threshold": 0.1
        }"#,
    );
    let config = AnalyzerConfig::load(file.path()).unwrap();
    assert_eq!(config.ambiguity_threshold, 0.1);
    assert_eq!(config.keywords.keyword_count(), 2);

    let analyzer = StarAnalyzer::new(config);
    let result = analyzer.analyze("海で泳いだ");
    assert_eq!(result.keywords, ["海", "泳いだ"]);
    assert_eq!(result.primary_category, Category::Sense);
    assert!(analyzer.analyze("おいしい").scores.is_all_zero());
}

#[test]
fn malformed_config_falls_back_to_builtin() {
    let file = temp_json("{not json");
    assert!(matches!(
        AnalyzerConfig::load(file.path()),
        Err(ConfigError::Parse(_))
    ));
    assert_eq!(
        AnalyzerConfig::load_or_default(file.path()),
        AnalyzerConfig::builtin()
    );

    let missing_relate = temp_json(r#"{"keywords": {"SENSE": {}, "THINK": {}, "ACT": {}}}"#);
    let err = AnalyzerConfig::load(missing_relate.path()).unwrap_err();
    assert!(err.to_string().contains("RELATE"), "unexpected error: {err}");
}

#[test]
fn tokens_add_a_part_of_speech_boost() {
    let text = "この料理、本当においしい！";
    let plain = analyze(text);
    let analyzer = StarAnalyzer::default()
        .with_tokenizer(FixedTokenizer(vec![Token::new("おいしい", "おいしい", "形容詞")]));
    let boosted = analyzer.analyze(text);

    let gain = boosted.detail.weighted_scores[Category::Sense]
        - plain.detail.weighted_scores[Category::Sense];
    assert!((gain - 0.3 * 1.2).abs() < 1e-9, "gain {gain}");
    assert_eq!(boosted.detail.pos_tags, ["おいしい(形容詞)"]);
    assert!(boosted.detail.emotion_intensity > plain.detail.emotion_intensity);
    assert_eq!(analyzer.tokenizer_name(), Some("fixed"));
}

#[test]
fn failing_tokenizer_degrades_to_plain_analysis() {
    let text = "マラソンを完走できて嬉しい";
    let analyzer = StarAnalyzer::default().with_tokenizer(BrokenTokenizer);
    let result = analyzer.analyze(text);
    assert!(result.detail.tokens.is_none());
    assert_eq!(result, analyze(text));
}

#[test]
fn lexicon_file_drives_the_tokenizer() {
    let file = temp_json(r#"[{"surface": "おいしい", "pos": "形容詞"}, {"surface": "料理", "pos": "名詞"}]"#);
    let lexicon = LexiconTokenizer::load(file.path()).unwrap();
    assert_eq!(lexicon.len(), 2);

    let result = StarAnalyzer::default()
        .with_tokenizer(lexicon)
        .analyze("この料理、本当においしい！");
    let tokens = result.detail.tokens.unwrap();
    assert!(tokens.iter().any(|t| t.surface == "料理" && t.pos == "名詞"));
    assert!(tokens.iter().any(|t| t.pos == "未知語"));
}

#[test]
fn feel_markers_show_up_in_detail() {
    let result = analyze("感動した！とても美しい景色だった");
    assert_eq!(result.primary_category, Category::Sense);
    assert_eq!(result.detail.feel_indicators, ["感動", "感嘆符(1個)"]);
    assert!((result.detail.feel_score - 0.7).abs() < 1e-9);
    assert_eq!(result.detail.intensity_word.as_ref().unwrap().word, "とても");
}
