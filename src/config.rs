use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::category::Category;
use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Ordered map
// ---------------------------------------------------------------------------

/// Insertion-ordered map. Several stages are "first match wins", so the
/// order a table was written in is part of its meaning.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<K, V>(Vec<(K, V)>);

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<K, V> OrderedMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.0.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: PartialEq, V> OrderedMap<K, V> {
    /// Replace the value of an existing key in place, or append.
    pub fn insert(&mut self, key: K, value: V) {
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        self.0
            .iter()
            .find(|(k, _)| {
                let k: &Q = k.borrow();
                k == key
            })
            .map(|(_, v)| v)
    }

    fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        self.0
            .iter_mut()
            .find(|(k, _)| {
                let k: &Q = k.borrow();
                k == key
            })
            .map(|(_, v)| v)
    }
}

impl<K: PartialEq, V> FromIterator<(K, V)> for OrderedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<K: Serialize, V: Serialize> Serialize for OrderedMap<K, V> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct OrderedMapVisitor<K, V>(PhantomData<fn() -> (K, V)>);

impl<'de, K, V> Visitor<'de> for OrderedMapVisitor<K, V>
where
    K: Deserialize<'de> + PartialEq,
    V: Deserialize<'de>,
{
    type Value = OrderedMap<K, V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut map = OrderedMap::new();
        while let Some((key, value)) = access.next_entry()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl<'de, K, V> Deserialize<'de> for OrderedMap<K, V>
where
    K: Deserialize<'de> + PartialEq,
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

// ---------------------------------------------------------------------------
// Keyword dictionary
// ---------------------------------------------------------------------------

type RawDictionary = OrderedMap<Category, OrderedMap<String, Vec<String>>>;

/// category -> keyword type -> keywords, each level in declaration order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawDictionary", into = "RawDictionary")]
pub struct KeywordDictionary {
    groups: [OrderedMap<String, Vec<String>>; 4],
}

impl KeywordDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut dictionary = Self::new();
        for (category, groups) in BUILTIN_KEYWORDS {
            for (keyword_type, keywords) in groups.iter() {
                dictionary.extend(
                    *category,
                    *keyword_type,
                    keywords.iter().map(|k| k.to_string()),
                );
            }
        }
        dictionary
    }

    /// Builder form of [`KeywordDictionary::extend`].
    pub fn with_keywords(
        mut self,
        category: Category,
        keyword_type: &str,
        keywords: &[&str],
    ) -> Self {
        self.extend(category, keyword_type, keywords.iter().map(|k| k.to_string()));
        self
    }

    /// Append keywords to a type group, creating the group if needed.
    pub fn extend<I>(&mut self, category: Category, keyword_type: &str, keywords: I)
    where
        I: IntoIterator<Item = String>,
    {
        let groups = &mut self.groups[category.index()];
        match groups.get_mut(keyword_type) {
            Some(existing) => existing.extend(keywords),
            None => groups.insert(keyword_type.to_string(), keywords.into_iter().collect()),
        }
    }

    pub fn groups(&self, category: Category) -> impl Iterator<Item = (&str, &[String])> {
        self.groups[category.index()]
            .iter()
            .map(|(t, ks)| (t.as_str(), ks.as_slice()))
    }

    /// Every `(category, keyword_type, keyword)` in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &str, &str)> {
        Category::ALL.into_iter().flat_map(move |category| {
            self.groups(category).flat_map(move |(keyword_type, keywords)| {
                keywords
                    .iter()
                    .map(move |k| (category, keyword_type, k.as_str()))
            })
        })
    }

    pub fn keyword_count(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.keyword_count() == 0
    }
}

impl TryFrom<RawDictionary> for KeywordDictionary {
    type Error = ConfigError;

    fn try_from(raw: RawDictionary) -> Result<Self, Self::Error> {
        let mut dictionary = KeywordDictionary::new();
        let mut seen = [false; 4];
        for (category, groups) in raw.0 {
            seen[category.index()] = true;
            dictionary.groups[category.index()] = groups;
        }
        if let Some(missing) = Category::ALL.into_iter().find(|c| !seen[c.index()]) {
            return Err(ConfigError::Invalid(format!(
                "keyword dictionary has no {missing} section"
            )));
        }
        Ok(dictionary)
    }
}

impl From<KeywordDictionary> for RawDictionary {
    fn from(dictionary: KeywordDictionary) -> Self {
        Category::ALL
            .into_iter()
            .zip(dictionary.groups)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Analyzer configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextWeights {
    pub same_category_bonus: f64,
    pub cross_category_penalty: f64,
    pub sentence_type_match_bonus: f64,
    pub sentence_type_mismatch_penalty: f64,
}

impl Default for ContextWeights {
    fn default() -> Self {
        Self {
            same_category_bonus: 1.3,
            cross_category_penalty: 0.9,
            sentence_type_match_bonus: 1.2,
            sentence_type_mismatch_penalty: 0.8,
        }
    }
}

/// Everything the engine reads at construction time. Missing keys in a
/// config file fall back to the built-in values key by key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub keywords: KeywordDictionary,
    pub intensity_words: OrderedMap<String, f64>,
    pub negation_patterns: Vec<String>,
    pub context_weights: ContextWeights,
    pub ambiguity_threshold: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

impl AnalyzerConfig {
    pub fn builtin() -> Self {
        Self {
            keywords: KeywordDictionary::builtin(),
            intensity_words: BUILTIN_INTENSITY_WORDS
                .iter()
                .map(|(w, m)| (w.to_string(), *m))
                .collect(),
            negation_patterns: BUILTIN_NEGATION_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            context_weights: ContextWeights::default(),
            ambiguity_threshold: 0.15,
        }
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&content)?;
        log::info!(
            "loaded config from {} ({} keywords)",
            path.display(),
            config.keywords.keyword_count()
        );
        Ok(config)
    }

    /// Like [`AnalyzerConfig::load`], but a missing or malformed file only
    /// costs a warning.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("{err}; using built-in keyword dictionary");
                Self::builtin()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.ambiguity_threshold.is_finite() || self.ambiguity_threshold <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "ambiguity_threshold must be a positive number, got {}",
                self.ambiguity_threshold
            )));
        }
        for (word, multiplier) in self.intensity_words.iter() {
            if word.trim().is_empty() {
                return Err(ConfigError::Invalid("empty intensity word".to_string()));
            }
            if !multiplier.is_finite() || *multiplier < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "intensity multiplier for '{word}' must be finite and non-negative"
                )));
            }
        }
        if self.negation_patterns.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::Invalid("empty negation pattern".to_string()));
        }
        let w = &self.context_weights;
        for (name, value) in [
            ("same_category_bonus", w.same_category_bonus),
            ("cross_category_penalty", w.cross_category_penalty),
            ("sentence_type_match_bonus", w.sentence_type_match_bonus),
            ("sentence_type_mismatch_penalty", w.sentence_type_mismatch_penalty),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "context weight {name} must be finite and non-negative"
                )));
            }
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ---------------------------------------------------------------------------
// Built-in tables
// ---------------------------------------------------------------------------

const BUILTIN_INTENSITY_WORDS: &[(&str, f64)] = &[
    ("非常に", 2.0),
    ("とても", 1.8),
    ("すごく", 1.7),
    ("本当に", 1.5),
    ("かなり", 1.3),
    ("まあまあ", 0.8),
    ("少し", 0.6),
    ("ちょっと", 0.5),
];

const BUILTIN_NEGATION_PATTERNS: &[&str] = &[
    "ない",
    "なかった",
    "ません",
    "ませんでした",
    "じゃない",
    "ではない",
    "くない",
    "ではなかった",
];

type BuiltinGroups = &'static [(&'static str, &'static [&'static str])];

const BUILTIN_KEYWORDS: &[(Category, BuiltinGroups)] = &[
    (
        Category::Sense,
        &[
            (
                "feeling_expressions",
                &[
                    "きれい", "おいしい", "気持ちいい", "かぐわしい", "綺麗", "美しい", "美味しい",
                    "美味い", "うまい", "心地よい", "いい匂い", "さっぱり", "すっきり", "香ばしい",
                    "鮮やか", "明るい", "温かい", "冷たい", "柔らかい", "滑らか", "静か", "澄んだ",
                    "清潔", "新鮮", "爽快",
                ],
            ),
            ("core_keywords", &["美", "味", "匂い", "触", "心地よさ"]),
            (
                "auxiliary_expressions",
                &[
                    "見る", "聞く", "味わう", "触る", "嗅ぐ", "感じる", "見つめる", "眺める", "聴く",
                    "食べる", "飲む", "触れる",
                ],
            ),
            (
                "context_keywords",
                &[
                    "景色", "風景", "色", "花", "料理", "食べ物", "飲み物", "香り", "肌触り", "質感",
                    "音楽", "声", "自然音",
                ],
            ),
        ],
    ),
    (
        Category::Think,
        &[
            (
                "feeling_expressions",
                &[
                    "わかった", "なるほど", "すごい", "へー", "知らなかった", "面白い", "理解できた",
                    "納得", "発見した", "気づいた", "勉強になる", "解けた", "興味深い", "判明した",
                    "ひらめいた", "学んだ", "覚えた", "驚いた", "びっくりした", "目から鱗",
                    "想像以上", "意外", "新しい発見",
                ],
            ),
            ("core_keywords", &["理解", "発見", "納得", "圧倒", "学習", "気づき"]),
            (
                "auxiliary_expressions",
                &[
                    "理解する", "発見する", "学ぶ", "気づく", "知る", "わかる", "解く", "解ける",
                    "覚える", "見つける", "察する",
                ],
            ),
            (
                "context_keywords",
                &[
                    "知識", "情報", "事実", "真実", "問題", "課題", "謎", "疑問", "答え", "解決策",
                    "方法", "コツ", "仕組み", "原理", "アイデア",
                ],
            ),
        ],
    ),
    (
        Category::Act,
        &[
            (
                "feeling_expressions",
                &[
                    "できた", "やった", "よかった", "すごい", "達成", "成長", "頑張った", "成功",
                    "完走", "クリア", "突破", "進歩", "成功した", "達成した", "完成した", "完走した",
                    "突破した", "挑戦した", "努力した", "成長した", "進歩した", "上達した",
                    "体験した", "経験した", "満足した", "充実した", "特別だった", "貴重だった",
                    "幸運だった",
                ],
            ),
            (
                "core_keywords",
                &[
                    "努力", "上達", "進歩", "達成", "挑戦", "経験", "成功", "完走", "成長", "特別感",
                    "稀有", "遭遇", "幸運",
                ],
            ),
            (
                "auxiliary_expressions",
                &[
                    "頑張る", "挑戦する", "達成する", "成長する", "経験する", "完走する",
                    "クリアする", "突破する", "努力する", "成功する", "体験する", "乗り越える",
                ],
            ),
            (
                "context_keywords",
                &[
                    "活動", "行動", "実践", "トライ", "試み", "取り組み", "体験", "出来事", "機会",
                    "チャンス", "価値", "意義", "やりがい", "充実感", "満足感",
                ],
            ),
        ],
    ),
    (
        Category::Relate,
        &[
            (
                "feeling_expressions",
                &[
                    "すばらしい", "ありがたい", "一緒だ", "うれしい", "愛おしい", "温かい",
                    "つながり", "感謝", "愛情", "絆", "支え", "感謝している", "助かった",
                    "救われた", "支えられた", "共感する", "理解される", "心が通う",
                    "親近感を覚える", "やさしい", "思いやりがある", "尊敬する", "認められる",
                    "褒められる", "安らぎがある",
                ],
            ),
            (
                "core_keywords",
                &[
                    "愛", "絆", "感謝", "共感", "支援", "協力", "友情", "家族", "やさしさ", "親近感",
                    "愛着", "調和", "一体感", "承認", "尊敬",
                ],
            ),
            (
                "auxiliary_expressions",
                &[
                    "助ける", "支える", "共感する", "愛する", "感謝する", "励ます", "応援する",
                    "理解する", "受け入れる", "協力する", "思いやる", "気遣う", "認める", "褒める",
                ],
            ),
            (
                "context_keywords",
                &[
                    "愛情", "思いやり", "優しさ", "温かさ", "心", "つながり", "関係", "友達", "仲間",
                    "恩", "人情", "情", "同情", "お礼", "謝意",
                ],
            ),
        ],
    ),
];
