//! 検証結果の表示

use crate::validator::{BatchSummary, FileReport};
use insight_forge_common::{normalize_header, MatchResult, ValidationResult};

/// 信頼度をパーセント表記に
pub fn format_confidence(confidence: Option<f64>) -> String {
    match confidence {
        Some(c) => format!("{:.0}%", c * 100.0),
        None => "-".to_string(),
    }
}

/// 1ファイル分の判定結果を人間向けテキストにする
pub fn render_validation(file_name: &str, result: &ValidationResult) -> String {
    let mut out = String::new();

    if result.is_valid {
        out.push_str(&format!("✔ {}: 取り込み可能\n", file_name));
    } else {
        out.push_str(&format!("✘ {}: 取り込み不可\n", file_name));
    }

    if let Some(detected) = result.detected_type {
        out.push_str(&format!("  推定種別: {}\n", detected));
    }
    out.push_str(&format!("  信頼度: {}\n", format_confidence(result.confidence)));

    if !result.matched_fields.is_empty() {
        out.push_str(&format!("  一致列: {}\n", result.matched_fields.join(", ")));
    }
    if !result.missing_fields.is_empty() {
        out.push_str(&format!("  不足列: {}\n", result.missing_fields.join(", ")));
    }
    if let Some(error) = &result.error {
        out.push_str(&format!("  {}\n", error));
    }
    for suggestion in &result.suggestions {
        out.push_str(&format!("  - {}\n", suggestion));
    }

    out
}

/// 見出し一覧（生 / 正規化後）
pub fn render_headers(headers: &[String]) -> String {
    if headers.is_empty() {
        return "見出しがありません\n".to_string();
    }

    headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("  {:>2}. {}  →  {}\n", i + 1, h, normalize_header(h)))
        .collect()
}

/// スキーマ別スコア
pub fn render_detection(matched: &MatchResult) -> String {
    let mut out = String::new();
    for score in [&matched.produtos, &matched.movimentacoes] {
        out.push_str(&format!(
            "  {}: {}/{} ({})\n",
            score.import_type.label(),
            score.score(),
            score.total(),
            format_confidence(Some(score.confidence))
        ));
        if !score.missing_fields.is_empty() {
            out.push_str(&format!("    不足列: {}\n", score.missing_fields.join(", ")));
        }
    }
    out.push_str(&format!("  推定種別: {}\n", matched.detected_type));
    out
}

/// バッチ集計
pub fn render_summary(summary: &BatchSummary) -> String {
    format!(
        "合計 {}件 / 取り込み可 {}件 / 取り込み不可 {}件\n",
        summary.total, summary.accepted, summary.rejected
    )
}

/// バッチ結果（全件）
pub fn render_batch(reports: &[FileReport]) -> String {
    let mut out: String = reports
        .iter()
        .map(|r| render_validation(&r.file_name, &r.result))
        .collect();
    out.push('\n');
    out.push_str(&render_summary(&BatchSummary::from_reports(reports)));
    out
}
