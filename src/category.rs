use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ParseCategoryError;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Sense,
    Think,
    Act,
    Relate,
}

impl Category {
    /// Declaration order. Every tie between categories resolves to the
    /// earliest entry of this array.
    pub const ALL: [Category; 4] = [
        Category::Sense,
        Category::Think,
        Category::Act,
        Category::Relate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Sense => "SENSE",
            Category::Think => "THINK",
            Category::Act => "ACT",
            Category::Relate => "RELATE",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Short Japanese gloss used by the text report.
    pub fn gloss(self) -> &'static str {
        match self {
            Category::Sense => "感覚",
            Category::Think => "思考",
            Category::Act => "行動",
            Category::Relate => "関係",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Score vector
// ---------------------------------------------------------------------------

/// One score per category, always all four.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoreVector([f64; 4]);

impl ScoreVector {
    pub fn zero() -> Self {
        Self([0.0; 4])
    }

    pub fn uniform(value: f64) -> Self {
        Self([value; 4])
    }

    pub fn from_array(values: [f64; 4]) -> Self {
        Self(values)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        Category::ALL.into_iter().map(move |c| (c, self.0[c.index()]))
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn max(&self) -> f64 {
        self.0.iter().copied().fold(0.0, f64::max)
    }

    pub fn is_all_zero(&self) -> bool {
        self.0.iter().all(|v| *v == 0.0)
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    /// Multiply every non-zero score by `factor`.
    pub fn scale_nonzero(&mut self, factor: f64) {
        for v in self.0.iter_mut().filter(|v| **v != 0.0) {
            *v *= factor;
        }
    }

    pub fn scale_all(&mut self, factor: f64) {
        for v in self.0.iter_mut() {
            *v *= factor;
        }
    }

    /// Scores divided by their sum. An all-zero vector stays all-zero.
    pub fn normalized(&self) -> Self {
        let total = self.total();
        if total > 0.0 {
            Self(self.0.map(|v| v / total))
        } else {
            *self
        }
    }

    /// Scores in descending order, highest first.
    pub fn sorted_desc(&self) -> [f64; 4] {
        let mut values = self.0;
        values.sort_by(|a, b| b.total_cmp(a));
        values
    }
}

impl Index<Category> for ScoreVector {
    type Output = f64;

    fn index(&self, category: Category) -> &f64 {
        &self.0[category.index()]
    }
}

impl IndexMut<Category> for ScoreVector {
    fn index_mut(&mut self, category: Category) -> &mut f64 {
        &mut self.0[category.index()]
    }
}

impl Serialize for ScoreVector {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(4))?;
        for (category, score) in self.iter() {
            map.serialize_entry(category.as_str(), &score)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Sentence type and confidence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentenceType {
    #[serde(rename = "SV")]
    Sv,
    #[serde(rename = "SOV")]
    Sov,
}

impl SentenceType {
    pub fn as_str(self) -> &'static str {
        match self {
            SentenceType::Sv => "SV",
            SentenceType::Sov => "SOV",
        }
    }

    pub fn label_ja(self) -> &'static str {
        match self {
            SentenceType::Sv => "SV型",
            SentenceType::Sov => "SOV型",
        }
    }

    /// Categories this sentence shape is congruent with.
    pub fn favours(self, category: Category) -> bool {
        match self {
            SentenceType::Sv => matches!(category, Category::Sense | Category::Think),
            SentenceType::Sov => matches!(category, Category::Act | Category::Relate),
        }
    }
}

impl fmt::Display for SentenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }

    pub fn label_ja(self) -> &'static str {
        match self {
            Confidence::Low => "低",
            Confidence::Medium => "中",
            Confidence::High => "高",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
