//! スキーマ照合モジュール
//!
//! 正規化済み見出しを各同義語テーブルと照合し、スコアと推定スキーマを返す。
//!
//! ## 照合ルール
//! - 見出しが表記を含む、または表記が見出しを含めば一致（双方向の部分一致）
//! - 逆方向（表記 ⊇ 見出し）は見出しが `MIN_REVERSE_MATCH_LEN` 文字以上のときのみ
//! - スコア = 一致した正規フィールド数、信頼度 = スコア / フィールド総数

use crate::normalize::normalize_header;
use crate::schema::{DetectedType, ImportType, SchemaTables, SynonymTable};
use serde::Serialize;

/// 逆方向一致に必要な見出しの最小文字数
///
/// "a" のような1文字見出しが "categoria" に含まれて一致するのを防ぐ。
pub const MIN_REVERSE_MATCH_LEN: usize = 3;

/// 1スキーマに対する照合結果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaScore {
    pub import_type: ImportType,
    /// 一致した正規フィールド（テーブル順）
    pub matched_fields: Vec<String>,
    /// 見つからなかった正規フィールド（テーブル順）
    pub missing_fields: Vec<String>,
    pub confidence: f64,
}

impl SchemaScore {
    pub fn score(&self) -> usize {
        self.matched_fields.len()
    }

    pub fn total(&self) -> usize {
        self.matched_fields.len() + self.missing_fields.len()
    }
}

/// 両スキーマの照合結果と推定スキーマ
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub produtos: SchemaScore,
    pub movimentacoes: SchemaScore,
    pub detected_type: DetectedType,
}

impl MatchResult {
    /// 指定スキーマの照合結果（推定結果とは独立）
    pub fn for_type(&self, import_type: ImportType) -> &SchemaScore {
        match import_type {
            ImportType::Produtos => &self.produtos,
            ImportType::Movimentacoes => &self.movimentacoes,
        }
    }
}

/// 正規化済み見出しと正規化済み表記の一致判定
pub fn header_matches_variant(header: &str, variant: &str) -> bool {
    if header.is_empty() || variant.is_empty() {
        return false;
    }
    if header.contains(variant) {
        return true;
    }
    header.chars().count() >= MIN_REVERSE_MATCH_LEN && variant.contains(header)
}

/// 1つの同義語テーブルに対して照合する
///
/// `normalized_headers` は `normalize_header` 済みであること。
pub fn score_table(normalized_headers: &[String], table: &SynonymTable) -> SchemaScore {
    let mut matched_fields = Vec::new();
    let mut missing_fields = Vec::new();

    for field in &table.fields {
        let hit = normalized_headers.iter().find(|header| {
            field
                .variants
                .iter()
                .any(|variant| header_matches_variant(header, variant))
        });

        match hit {
            Some(header) => {
                tracing::debug!(
                    schema = %table.import_type,
                    field = %field.canonical,
                    header = %header,
                    "field matched"
                );
                matched_fields.push(field.canonical.clone());
            }
            None => missing_fields.push(field.canonical.clone()),
        }
    }

    let confidence = if table.is_empty() {
        0.0
    } else {
        matched_fields.len() as f64 / table.len() as f64
    };

    SchemaScore {
        import_type: table.import_type,
        matched_fields,
        missing_fields,
        confidence,
    }
}

/// 生の見出しを正規化して両スキーマと照合する
pub fn match_headers<S: AsRef<str>>(headers: &[S], tables: &SchemaTables) -> MatchResult {
    let normalized: Vec<String> = headers
        .iter()
        .map(|h| normalize_header(h.as_ref()))
        .filter(|h| !h.is_empty())
        .collect();

    let produtos = score_table(&normalized, &tables.produtos);
    let movimentacoes = score_table(&normalized, &tables.movimentacoes);
    let detected_type = detect(&produtos, &movimentacoes);

    tracing::debug!(
        produtos = produtos.score(),
        movimentacoes = movimentacoes.score(),
        detected = %detected_type,
        "schema scores"
    );

    MatchResult {
        produtos,
        movimentacoes,
        detected_type,
    }
}

/// スコアが厳密に高い方を推定スキーマとする（同点は unknown）
fn detect(produtos: &SchemaScore, movimentacoes: &SchemaScore) -> DetectedType {
    match produtos.score().cmp(&movimentacoes.score()) {
        std::cmp::Ordering::Greater => DetectedType::Produtos,
        std::cmp::Ordering::Less => DetectedType::Movimentacoes,
        std::cmp::Ordering::Equal => DetectedType::Unknown,
    }
}
