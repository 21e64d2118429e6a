use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::category::{Category, ScoreVector};
use crate::error::TokenizeError;
use crate::index::{normalize_keyword, KeywordIndex};
use crate::HP;

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub surface: String,
    #[serde(default)]
    pub base_form: String,
    pub pos: String,
    #[serde(default)]
    pub pos_detail: String,
    #[serde(default)]
    pub reading: String,
}

impl Token {
    pub fn new(surface: &str, base_form: &str, pos: &str) -> Self {
        Self {
            surface: surface.to_string(),
            base_form: base_form.to_string(),
            pos: pos.to_string(),
            pos_detail: "*".to_string(),
            reading: surface.to_string(),
        }
    }

    /// Blank optional fields take the surface form, as tokenizers do for
    /// words without a separate dictionary form.
    fn filled(mut self) -> Self {
        if self.base_form.is_empty() {
            self.base_form = self.surface.clone();
        }
        if self.reading.is_empty() {
            self.reading = self.surface.clone();
        }
        if self.pos_detail.is_empty() {
            self.pos_detail = "*".to_string();
        }
        self
    }

    pub fn pos_class(&self) -> PosClass {
        PosClass::of(&self.pos)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosClass {
    Adjective,
    Verb,
    Noun,
    Interjection,
    Other,
}

impl PosClass {
    /// Accepts IPADIC-style Japanese tags (形容詞,自立,...) and plain
    /// English names.
    pub fn of(pos: &str) -> Self {
        let pos = pos.trim();
        let is = |ja: &str, en: &str| pos.starts_with(ja) || pos.eq_ignore_ascii_case(en);
        if is("形容詞", "adjective") {
            PosClass::Adjective
        } else if is("動詞", "verb") {
            PosClass::Verb
        } else if is("名詞", "noun") {
            PosClass::Noun
        } else if is("感動詞", "interjection") {
            PosClass::Interjection
        } else {
            PosClass::Other
        }
    }

    pub fn weight(self) -> f64 {
        match self {
            PosClass::Adjective => HP.pos_weight_adjective,
            PosClass::Verb => HP.pos_weight_verb,
            PosClass::Noun => HP.pos_weight_noun,
            PosClass::Interjection | PosClass::Other => HP.pos_weight_other,
        }
    }
}

// ---------------------------------------------------------------------------
// Tokenizer seam
// ---------------------------------------------------------------------------

/// Optional morphological analyzer. The engine works without one; when
/// present it adds a small part-of-speech weighted boost.
pub trait Tokenizer: Send + Sync {
    fn name(&self) -> &str;

    fn tokenize(&self, text: &str) -> Result<Vec<Token>, TokenizeError>;
}

/// Adds `0.3 x pos weight` to a category once per keyword group that lists
/// the token's base form or surface form.
pub fn boost(scores: &mut ScoreVector, tokens: &[Token], index: &KeywordIndex) {
    for token in tokens {
        let weight = HP.morphology_boost * token.pos_class().weight();
        let mut groups: Vec<(Category, &str)> = Vec::new();
        for form in [&token.base_form, &token.surface] {
            for entry in index.lookup(&normalize_keyword(form)) {
                let group = (entry.category, entry.keyword_type.as_str());
                if !groups.contains(&group) {
                    groups.push(group);
                }
            }
        }
        for (category, _) in groups {
            scores[category] += weight;
        }
    }
}

// ---------------------------------------------------------------------------
// Lexicon tokenizer
// ---------------------------------------------------------------------------

const UNKNOWN_POS: &str = "未知語";

/// Greedy longest-match segmentation over a fixed word list. Characters no
/// entry covers are grouped into `未知語` tokens.
#[derive(Debug, Clone, Default)]
pub struct LexiconTokenizer {
    entries: HashMap<String, Token>,
    max_len: usize,
}

impl LexiconTokenizer {
    pub fn new(tokens: impl IntoIterator<Item = Token>) -> Self {
        let mut lexicon = Self::default();
        for token in tokens {
            let token = token.filled();
            lexicon.max_len = lexicon.max_len.max(token.surface.chars().count());
            lexicon.entries.insert(token.surface.clone(), token);
        }
        lexicon
    }

    /// Reads a JSON array of tokens.
    pub fn from_json(content: &str) -> Result<Self, TokenizeError> {
        let tokens: Vec<Token> = serde_json::from_str(content)
            .map_err(|e| TokenizeError::Unavailable(format!("malformed lexicon: {e}")))?;
        Ok(Self::new(tokens))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TokenizeError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TokenizeError::Unavailable(format!("cannot read lexicon {}: {e}", path.display()))
        })?;
        let lexicon = Self::from_json(&content)?;
        log::info!("loaded lexicon {} ({} entries)", path.display(), lexicon.len());
        Ok(lexicon)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn longest_at(&self, chars: &[char], start: usize) -> Option<(usize, &Token)> {
        let limit = self.max_len.min(chars.len() - start);
        (1..=limit).rev().find_map(|len| {
            let candidate: String = chars[start..start + len].iter().collect();
            self.entries.get(&candidate).map(|token| (len, token))
        })
    }
}

impl Tokenizer for LexiconTokenizer {
    fn name(&self) -> &str {
        "lexicon"
    }

    fn tokenize(&self, text: &str) -> Result<Vec<Token>, TokenizeError> {
        if self.entries.is_empty() {
            return Err(TokenizeError::Unavailable("lexicon is empty".to_string()));
        }

        let chars: Vec<char> = text.chars().collect();
        let mut tokens = Vec::new();
        let mut unknown = String::new();
        let flush = |unknown: &mut String, tokens: &mut Vec<Token>| {
            if !unknown.is_empty() {
                let surface = std::mem::take(unknown);
                tokens.push(Token::new(&surface, &surface, UNKNOWN_POS));
            }
        };

        let mut pos = 0;
        while pos < chars.len() {
            match self.longest_at(&chars, pos) {
                Some((len, token)) => {
                    flush(&mut unknown, &mut tokens);
                    tokens.push(token.clone());
                    pos += len;
                }
                None => {
                    if chars[pos].is_whitespace() {
                        flush(&mut unknown, &mut tokens);
                    } else {
                        unknown.push(chars[pos]);
                    }
                    pos += 1;
                }
            }
        }
        flush(&mut unknown, &mut tokens);
        Ok(tokens)
    }
}
