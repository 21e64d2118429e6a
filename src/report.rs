use std::fmt::{self, Write};

use crate::category::{Category, Confidence};
use crate::{AnalysisResult, Fallback};

const BAR_WIDTH: usize = 20;
const RULE_WIDTH: usize = 60;

/// `score` in [0, 1] as a fixed-width bar of filled and empty cells.
pub fn bar(score: f64, width: usize) -> String {
    let filled = ((score.clamp(0.0, 1.0) * width as f64) as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

pub fn interpretation(category: Category, confidence: Confidence) -> String {
    let base = match category {
        Category::Sense => "五感的な体験による感動です。美しさ、味覚、心地よさなどの感覚的要素が強く表現されています。",
        Category::Think => "知的な発見や理解による感動です。新しい知識の獲得や気づきが感動の源泉となっています。",
        Category::Act => "体験や達成による感動です。努力の結果や成長、挑戦の成功が感動を生み出しています。",
        Category::Relate => "人間関係や絆による感動です。愛情、感謝、つながりなどの関係性が感動の核となっています。",
    };
    let note = match confidence {
        Confidence::High => "この分析結果は高い信頼度を持っています。",
        Confidence::Medium => "この分析結果は中程度の信頼度です。",
        Confidence::Low => {
            "この分析結果は低い信頼度です。より多くの感情表現があると正確性が向上します。"
        }
    };
    format!("{base}\n  {note}")
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "なし".to_string()
    } else {
        items.join(", ")
    }
}

/// Multi-line human-readable report.
pub fn render(result: &AnalysisResult) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    write_report(&mut out, result).map(|()| out).unwrap_or_default()
}

fn write_report(out: &mut String, result: &AnalysisResult) -> fmt::Result {
    let rule = "=".repeat(RULE_WIDTH);
    let detail = &result.detail;

    writeln!(out, "{rule}")?;
    writeln!(out, "STAR分析結果")?;
    writeln!(out, "{rule}")?;
    writeln!(out, "分析対象: {}", result.text)?;
    match &result.fallback {
        Some(Fallback::EmptyInput) => {
            writeln!(out, "注意: 入力が空のため既定値を表示しています")?
        }
        Some(Fallback::InternalFailure { message }) => {
            writeln!(out, "注意: 分析に失敗したため既定値を表示しています ({message})")?
        }
        None => {}
    }
    writeln!(
        out,
        "主分類: {} ({})",
        result.primary_category,
        result.primary_category.gloss()
    )?;
    writeln!(out, "信頼度: {}", result.confidence.label_ja())?;
    writeln!(out, "文型: {}", result.sentence_type.label_ja())?;
    if result.ambiguous {
        let secondary: Vec<String> = result
            .secondary_categories
            .iter()
            .map(|c| c.to_string())
            .collect();
        writeln!(
            out,
            "曖昧: {} (曖昧度 {:.2})",
            secondary.join(", "),
            result.ambiguity_score
        )?;
    }

    writeln!(out, "\n各要素のスコア:")?;
    for (category, score) in result.scores.iter() {
        writeln!(
            out,
            "  {:6}: {:4.2} {}",
            category.as_str(),
            score,
            bar(score, BAR_WIDTH)
        )?;
    }

    writeln!(out, "\n検出キーワード: {}", list_or_none(&result.keywords))?;
    writeln!(out, "\n感動の基本構造文パターン:\n  {}", result.structure_pattern)?;

    if !result.is_fallback() {
        writeln!(out, "\nFEEL要素:")?;
        writeln!(out, "  FEELスコア: {:.2}", detail.feel_score)?;
        writeln!(out, "  FEEL指標: {}", list_or_none(&detail.feel_indicators))?;
    }

    let patterns: Vec<String> = detail
        .detected_patterns
        .iter()
        .map(|p| p.label_ja().to_string())
        .collect();
    writeln!(out, "\n詳細情報:")?;
    writeln!(out, "  テキスト長: {}文字", detail.text_length)?;
    writeln!(out, "  キーワード数: {}個", detail.keyword_count)?;
    writeln!(out, "  感情強度: {:.2}", detail.emotion_intensity)?;
    writeln!(out, "  検出パターン: {}", list_or_none(&patterns))?;
    for step in &detail.emotion_progression {
        writeln!(
            out,
            "  流れ[{}]: {} → {}",
            step.position, step.text_part, step.dominant_emotion
        )?;
    }
    for suggestion in &detail.quality.suggestions {
        writeln!(out, "  提案: {suggestion}")?;
    }

    writeln!(out, "\n分析の解釈:")?;
    writeln!(
        out,
        "  {}",
        interpretation(result.primary_category, result.confidence)
    )?;
    write!(out, "{rule}")
}
