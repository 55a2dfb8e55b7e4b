//! 見出し正規化モジュール
//!
//! アップロードされた見出しと同義語テーブルの双方に同じ処理を適用する。
//! 正規化後の値は比較専用で、画面には表示しない。

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// 見出しを比較用に正規化する
///
/// 1. 小文字化
/// 2. NFD分解してダイアクリティカルマークを除去
/// 3. 空白をすべて除去
///
/// ```
/// use insight_forge_common::normalize::normalize_header;
///
/// assert_eq!(normalize_header("Preço Unitário"), "precounitario");
/// assert_eq!(normalize_header("  Data da Movimentação "), "datadamovimentacao");
/// ```
pub fn normalize_header(input: &str) -> String {
    input
        .chars()
        .flat_map(char::to_lowercase)
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// 見出しリストをまとめて正規化（順序・重複は保持）
pub fn normalize_headers<S: AsRef<str>>(headers: &[S]) -> Vec<String> {
    headers.iter().map(|h| normalize_header(h.as_ref())).collect()
}
