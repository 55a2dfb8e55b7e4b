//! インポート種別と同義語テーブル
//!
//! 見出し照合に使う2種類のスキーマ（produtos / movimentacoes）を定義する。
//! 各フィールドは正規化済みの表記ゆれを持つ。

use crate::normalize::normalize_header;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// ユーザーが宣言するインポート種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportType {
    Produtos,
    Movimentacoes,
}

impl ImportType {
    pub const ALL: [ImportType; 2] = [ImportType::Produtos, ImportType::Movimentacoes];

    /// 識別子（設定ファイル・API共通）
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportType::Produtos => "produtos",
            ImportType::Movimentacoes => "movimentacoes",
        }
    }

    /// 画面表示用ラベル
    pub fn label(&self) -> &'static str {
        match self {
            ImportType::Produtos => "Produtos",
            ImportType::Movimentacoes => "Movimentações",
        }
    }
}

impl std::fmt::Display for ImportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ImportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_header(s).as_str() {
            "produtos" | "produto" => Ok(ImportType::Produtos),
            "movimentacoes" | "movimentacao" => Ok(ImportType::Movimentacoes),
            _ => Err(format!(
                "Unknown import type: {}. Use produtos or movimentacoes",
                s
            )),
        }
    }
}

/// 見出しから推定されたスキーマ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectedType {
    Produtos,
    Movimentacoes,
    Unknown,
}

impl DetectedType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectedType::Produtos => "produtos",
            DetectedType::Movimentacoes => "movimentacoes",
            DetectedType::Unknown => "unknown",
        }
    }

    pub fn import_type(&self) -> Option<ImportType> {
        match self {
            DetectedType::Produtos => Some(ImportType::Produtos),
            DetectedType::Movimentacoes => Some(ImportType::Movimentacoes),
            DetectedType::Unknown => None,
        }
    }
}

impl From<ImportType> for DetectedType {
    fn from(t: ImportType) -> Self {
        match t {
            ImportType::Produtos => DetectedType::Produtos,
            ImportType::Movimentacoes => DetectedType::Movimentacoes,
        }
    }
}

impl std::fmt::Display for DetectedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 正規フィールドと、その受理する表記ゆれ（正規化済み）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSynonyms {
    pub canonical: String,
    pub variants: Vec<String>,
}

impl FieldSynonyms {
    fn new(canonical: &str, variants: &[&str]) -> Self {
        Self {
            canonical: canonical.to_string(),
            variants: variants.iter().map(|v| normalize_header(v)).collect(),
        }
    }
}

/// 1スキーマ分の同義語テーブル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymTable {
    pub import_type: ImportType,
    pub fields: Vec<FieldSynonyms>,
}

impl SynonymTable {
    /// 組み込みテーブル
    pub fn builtin(import_type: ImportType) -> Self {
        let fields = match import_type {
            ImportType::Produtos => vec![
                FieldSynonyms::new("nome", &["nome", "produto", "nomeproduto"]),
                FieldSynonyms::new("categoria", &["categoria", "cat"]),
                FieldSynonyms::new("preco", &["preco", "valor", "price", "valorunitario"]),
                FieldSynonyms::new("custo", &["custo", "custounitario"]),
                FieldSynonyms::new("descricao", &["descricao", "desc", "description"]),
                FieldSynonyms::new("quantidade", &["quantidade", "qtd", "qtde", "estoque"]),
            ],
            ImportType::Movimentacoes => vec![
                FieldSynonyms::new(
                    "produto",
                    &["nome", "produto", "nomedoproduto", "nomeproduto"],
                ),
                FieldSynonyms::new("quantidade", &["quantidade", "qtd", "qtde"]),
                FieldSynonyms::new("data", &["data", "dataoperacao", "datamovimento"]),
                FieldSynonyms::new(
                    "tipo",
                    &["tipo", "tipomovimentacao", "tipooperacao", "operacao"],
                ),
            ],
        };

        Self { import_type, fields }
    }

    /// 追加の表記ゆれをマージする
    ///
    /// 未知のフィールド名は無視する。重複する表記は追加しない。
    pub fn with_extra(mut self, extra: &HashMap<String, Vec<String>>) -> Self {
        for field in &mut self.fields {
            let Some(additions) = extra.get(&field.canonical) else {
                continue;
            };
            for variant in additions {
                let normalized = normalize_header(variant);
                if !normalized.is_empty() && !field.variants.contains(&normalized) {
                    field.variants.push(normalized);
                }
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, canonical: &str) -> Option<&FieldSynonyms> {
        self.fields.iter().find(|f| f.canonical == canonical)
    }
}

/// 両スキーマのテーブル一式
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaTables {
    pub produtos: SynonymTable,
    pub movimentacoes: SynonymTable,
}

impl Default for SchemaTables {
    fn default() -> Self {
        Self {
            produtos: SynonymTable::builtin(ImportType::Produtos),
            movimentacoes: SynonymTable::builtin(ImportType::Movimentacoes),
        }
    }
}

impl SchemaTables {
    /// 設定の追加同義語（種別 → フィールド → 表記）を反映
    pub fn with_extra(extra: &HashMap<ImportType, HashMap<String, Vec<String>>>) -> Self {
        let empty = HashMap::new();
        Self {
            produtos: SynonymTable::builtin(ImportType::Produtos)
                .with_extra(extra.get(&ImportType::Produtos).unwrap_or(&empty)),
            movimentacoes: SynonymTable::builtin(ImportType::Movimentacoes)
                .with_extra(extra.get(&ImportType::Movimentacoes).unwrap_or(&empty)),
        }
    }

    pub fn get(&self, import_type: ImportType) -> &SynonymTable {
        match import_type {
            ImportType::Produtos => &self.produtos,
            ImportType::Movimentacoes => &self.movimentacoes,
        }
    }
}
