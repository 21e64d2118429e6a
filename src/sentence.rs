use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::category::SentenceType;

// ---------------------------------------------------------------------------
// Compiled patterns
// ---------------------------------------------------------------------------

// Checked in this order; the first hit decides. SOV rules run before SV
// rules, so a text satisfying both is SOV.
static SOV_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // Subject + object + verb
        Regex::new(r"(.+?)が(.+?)を(.+?)(?:する|した|している|してる)").unwrap(),
        Regex::new(r"(.+?)が(.+?)に(.+?)(?:する|した|している|してる)").unwrap(),
        Regex::new(r"(.+?)が(.+?)と(.+?)(?:する|した|している|してる)").unwrap(),
        // Object particle followed by an action
        Regex::new(r"(.+?)を(.+?)(?:する|した|できる|できた|やる|やった)").unwrap(),
        Regex::new(r"(.+?)に(.+?)(?:する|した|なる|なった|与える|与えた)").unwrap(),
        Regex::new(r"(.+?)と(.+?)(?:する|した|いる|いた|なる|なった)").unwrap(),
        // Achievement and participation stems
        Regex::new(r"(.+?)を(?:完走|達成|克服|成功|クリア)").unwrap(),
        Regex::new(r"(.+?)に(?:挑戦|参加|貢献|協力)").unwrap(),
        // Relationship verbs
        Regex::new(r"(.+?)(?:を|に)(?:助け|支え|励まし|応援|理解)").unwrap(),
        Regex::new(r"(.+?)(?:から|に)(?:助けられ|支えられ|励まされ|応援され)").unwrap(),
    ]
});

static SV_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // Perception
        Regex::new(r"(.+?)(?:を|が)(?:見|聞|感じ|味わ|触|嗅)").unwrap(),
        Regex::new(r"(.+?)(?:が|は)(?:美し|きれ|おいし|心地よ|かぐわし)").unwrap(),
        // Cognition
        Regex::new(r"(.+?)(?:が|を)(?:わか|理解|発見|解|判明)").unwrap(),
        Regex::new(r"(.+?)(?:が|は)(?:すご|面白|興味深|素晴らし)").unwrap(),
        // State change of the subject alone
        Regex::new(r"(.+?)(?:が|は)(?:なっ|変わっ|見え|聞こえ)").unwrap(),
    ]
});

const OBJECT_PARTICLES: &[char] = &['を', 'に', 'と'];

const ACTION_ENDINGS: &[&str] = &["する", "した", "やる", "やった", "できた"];

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Which rule decided the sentence type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", content = "position", rename_all = "snake_case")]
pub enum SentenceEvidence {
    SovPattern(usize),
    SvPattern(usize),
    ParticleHeuristic,
    Default,
}

pub fn classify(text: &str) -> SentenceType {
    classify_with_evidence(text).0
}

pub fn classify_with_evidence(text: &str) -> (SentenceType, SentenceEvidence) {
    if let Some(i) = SOV_PATTERNS.iter().position(|re| re.is_match(text)) {
        return (SentenceType::Sov, SentenceEvidence::SovPattern(i));
    }
    if let Some(i) = SV_PATTERNS.iter().position(|re| re.is_match(text)) {
        return (SentenceType::Sv, SentenceEvidence::SvPattern(i));
    }
    if text.contains(OBJECT_PARTICLES) && ACTION_ENDINGS.iter().any(|v| text.contains(v)) {
        return (SentenceType::Sov, SentenceEvidence::ParticleHeuristic);
    }
    // SENSE/THINK statements are the more basic shape.
    (SentenceType::Sv, SentenceEvidence::Default)
}
