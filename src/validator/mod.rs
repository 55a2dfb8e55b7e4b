//! インポートファイル検証
//!
//! ファイルを非同期で全量読み込みし、共通ライブラリの判定にかける。
//! 部分読み込み・中断はしない。

use crate::error::{ForgeError, Result};
use crate::scanner::ImportFile;
use indicatif::{ProgressBar, ProgressStyle};
use insight_forge_common::{
    extract_headers, match_headers, validate_bytes, DecisionPolicy, ImportType, MatchResult,
    SchemaTables, ValidationResult,
};
use serde::Serialize;
use std::path::Path;

/// バッチ検証の1件分
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    pub file_name: String,
    pub path: String,
    #[serde(flatten)]
    pub result: ValidationResult,
}

/// バッチ検証の集計
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
}

impl BatchSummary {
    pub fn from_reports(reports: &[FileReport]) -> Self {
        let accepted = reports.iter().filter(|r| r.result.is_valid).count();
        Self {
            total: reports.len(),
            accepted,
            rejected: reports.len() - accepted,
        }
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ForgeError::FileNotFound(path.display().to_string()))
    }
}

/// ファイルを読み込んで判定する
///
/// 読み込み失敗は `ValidationResult` の却下として返す。
/// ファイル自体が存在しない場合のみエラー。
pub async fn validate_file(
    path: &Path,
    expected: ImportType,
    tables: &SchemaTables,
    policy: &DecisionPolicy,
) -> Result<ValidationResult> {
    ensure_exists(path)?;
    let file_name = file_name_of(path);

    let result = match tokio::fs::read(path).await {
        Ok(bytes) => validate_bytes(&file_name, &bytes, expected, tables, policy),
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "read failed");
            ValidationResult::unreadable(e)
        }
    };

    Ok(result)
}

/// ファイルの見出しを読み込む
pub async fn read_headers(path: &Path) -> Result<Vec<String>> {
    ensure_exists(path)?;
    let bytes = tokio::fs::read(path).await?;
    Ok(extract_headers(&file_name_of(path), &bytes)?)
}

/// 見出しを読み込んで両スキーマのスコアを求める
pub async fn detect_file(path: &Path, tables: &SchemaTables) -> Result<(Vec<String>, MatchResult)> {
    let headers = read_headers(path).await?;
    let matched = match_headers(&headers, tables);
    Ok((headers, matched))
}

/// 複数ファイルを順に検証する
pub async fn validate_files(
    files: &[ImportFile],
    expected: ImportType,
    tables: &SchemaTables,
    policy: &DecisionPolicy,
    show_progress: bool,
) -> Result<Vec<FileReport>> {
    let progress = if show_progress {
        let bar = ProgressBar::new(files.len() as u64);
        if let Ok(style) = ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}") {
            bar.set_style(style);
        }
        bar
    } else {
        ProgressBar::hidden()
    };

    let mut reports = Vec::with_capacity(files.len());
    for file in files {
        progress.set_message(file.file_name.clone());
        let result = validate_file(&file.path, expected, tables, policy).await?;
        reports.push(FileReport {
            file_name: file.file_name.clone(),
            path: file.path.display().to_string(),
            result,
        });
        progress.inc(1);
    }
    progress.finish_and_clear();

    Ok(reports)
}
