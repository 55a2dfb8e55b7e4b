//! インポート可否判定モジュール
//!
//! 見出しの照合結果と宣言されたインポート種別から、アップロード可否を決める。
//! 判定は同期・冪等で、結果は画面表示用の助言にすぎない。
//!
//! ## 判定順序
//! 1. 見出しなし → 空ファイル
//! 2. 推定スキーマが宣言と異なる（unknown以外） → 種別変更を提案
//! 3. 信頼度 ≥ 受理閾値 かつ 推定 = 宣言 → 受理
//! 4. 信頼度 < 下限 → 見出し未認識
//! 5. 下限 ≤ 信頼度 < 受理閾値 → 部分一致（不足列を提示）
//! 6. 信頼度 ≥ 受理閾値 だが推定が unknown（同点） → 判別不能

use crate::error::Result;
use crate::extract::extract_headers;
use crate::matcher::{match_headers, MatchResult, SchemaScore};
use crate::schema::{DetectedType, ImportType, SchemaTables};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ACCEPTANCE_THRESHOLD: f64 = 0.6;
pub const DEFAULT_LOW_CONFIDENCE_FLOOR: f64 = 0.4;

/// 判定の閾値
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionPolicy {
    /// この信頼度以上で受理
    pub acceptance_threshold: f64,
    /// この信頼度未満は「未認識」扱い
    pub low_confidence_floor: f64,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            acceptance_threshold: DEFAULT_ACCEPTANCE_THRESHOLD,
            low_confidence_floor: DEFAULT_LOW_CONFIDENCE_FLOOR,
        }
    }
}

impl DecisionPolicy {
    /// 閾値の整合性チェック
    pub fn validate(&self) -> Result<()> {
        let in_range = |v: f64| (0.0..=1.0).contains(&v);
        if !in_range(self.acceptance_threshold) || !in_range(self.low_confidence_floor) {
            return Err(crate::Error::Config(
                "thresholds must be between 0.0 and 1.0".into(),
            ));
        }
        if self.low_confidence_floor > self.acceptance_threshold {
            return Err(crate::Error::Config(format!(
                "low confidence floor ({}) must not exceed acceptance threshold ({})",
                self.low_confidence_floor, self.acceptance_threshold
            )));
        }
        Ok(())
    }
}

/// 却下理由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RejectionReason {
    UnreadableFile,
    EmptyHeaders,
    SchemaMismatch,
    LowConfidence,
    PartialMatch,
    Ambiguous,
}

/// 判定結果（ブラウザ側の `{ isValid, error?, detectedType?, confidence?, suggestions? }` と同形）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectionReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_type: Option<DetectedType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub matched_fields: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_fields: Vec<String>,
}

impl ValidationResult {
    fn rejected(reason: RejectionReason, error: String) -> Self {
        Self {
            is_valid: false,
            error: Some(error),
            reason: Some(reason),
            detected_type: None,
            confidence: None,
            suggestions: Vec::new(),
            matched_fields: Vec::new(),
            missing_fields: Vec::new(),
        }
    }

    /// ファイル読み込み失敗
    pub fn unreadable(cause: impl std::fmt::Display) -> Self {
        Self::rejected(
            RejectionReason::UnreadableFile,
            format!("Não foi possível ler o arquivo: {}", cause),
        )
    }

    /// 見出しなし
    pub fn empty() -> Self {
        let mut result = Self::rejected(
            RejectionReason::EmptyHeaders,
            "Arquivo vazio ou sem cabeçalhos válidos.".into(),
        );
        result
            .suggestions
            .push("Verifique se a primeira linha do arquivo contém os nomes das colunas.".into());
        result
    }

    fn with_score(mut self, detected: DetectedType, score: &SchemaScore) -> Self {
        self.detected_type = Some(detected);
        self.confidence = Some(score.confidence);
        self.matched_fields = score.matched_fields.clone();
        self.missing_fields = score.missing_fields.clone();
        self
    }
}

/// 見出しリストを判定する
pub fn validate_headers<S: AsRef<str>>(
    headers: &[S],
    expected: ImportType,
    tables: &SchemaTables,
    policy: &DecisionPolicy,
) -> ValidationResult {
    if headers.iter().all(|h| h.as_ref().trim().is_empty()) {
        tracing::warn!(expected = %expected, "no readable headers");
        return ValidationResult::empty();
    }

    let matched = match_headers(headers, tables);
    let result = decide(&matched, expected, tables, policy);

    if result.is_valid {
        tracing::info!(
            expected = %expected,
            confidence = result.confidence.unwrap_or_default(),
            "import file accepted"
        );
    } else {
        tracing::warn!(
            expected = %expected,
            detected = %matched.detected_type,
            reason = ?result.reason,
            "import file rejected"
        );
    }

    result
}

/// ファイル名とバイト列から判定する（読み込み失敗も結果に畳み込む）
pub fn validate_bytes(
    file_name: &str,
    bytes: &[u8],
    expected: ImportType,
    tables: &SchemaTables,
    policy: &DecisionPolicy,
) -> ValidationResult {
    match extract_headers(file_name, bytes) {
        Ok(headers) => validate_headers(&headers, expected, tables, policy),
        Err(e) => {
            tracing::warn!(file = file_name, error = %e, "could not read import file");
            ValidationResult::unreadable(e)
        }
    }
}

fn decide(
    matched: &MatchResult,
    expected: ImportType,
    tables: &SchemaTables,
    policy: &DecisionPolicy,
) -> ValidationResult {
    let detected = matched.detected_type;
    let score = matched.for_type(expected);
    let confidence = score.confidence;

    if let Some(other) = detected.import_type().filter(|t| *t != expected) {
        let mut result = ValidationResult::rejected(
            RejectionReason::SchemaMismatch,
            format!(
                "Os cabeçalhos parecem ser de {}, mas o tipo de importação selecionado é {}.",
                other.label(),
                expected.label()
            ),
        )
        .with_score(detected, score);
        result.suggestions.push(format!(
            "Altere o tipo de importação para \"{}\".",
            other.label()
        ));
        return result;
    }

    if confidence >= policy.acceptance_threshold && detected == DetectedType::from(expected) {
        return ValidationResult {
            is_valid: true,
            error: None,
            reason: None,
            detected_type: Some(detected),
            confidence: Some(confidence),
            suggestions: Vec::new(),
            matched_fields: score.matched_fields.clone(),
            missing_fields: score.missing_fields.clone(),
        };
    }

    let (reason, message) = if confidence < policy.low_confidence_floor {
        (
            RejectionReason::LowConfidence,
            format!(
                "Os cabeçalhos não foram reconhecidos como {}.",
                expected.label()
            ),
        )
    } else if confidence < policy.acceptance_threshold {
        (
            RejectionReason::PartialMatch,
            format!(
                "Os cabeçalhos correspondem apenas parcialmente a {} ({:.0}%).",
                expected.label(),
                confidence * 100.0
            ),
        )
    } else {
        (
            RejectionReason::Ambiguous,
            "Não foi possível determinar o tipo do arquivo: os cabeçalhos correspondem igualmente a Produtos e Movimentações.".to_string(),
        )
    };
    let mut result = ValidationResult::rejected(reason, message).with_score(detected, score);

    let table = tables.get(expected);
    for missing in &score.missing_fields {
        if let Some(field) = table.field(missing) {
            result.suggestions.push(format!(
                "Coluna ausente: {} (aceita: {}).",
                field.canonical,
                field.variants.join(", ")
            ));
        }
    }
    result.suggestions.push(
        "Verifique os nomes das colunas ou utilize o modelo de importação.".into(),
    );

    result
}
