//! JavaScript側に渡すデータ型

use insight_forge_common::DisplayClaims;
use serde::Serialize;

/// 後続の選択に追い越された検証結果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsStaleResult {
    pub stale: bool,
}

impl Default for JsStaleResult {
    fn default() -> Self {
        Self { stale: true }
    }
}

/// 画面表示用のセッション情報（未検証）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsDisplayClaims {
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    pub is_admin: bool,
    pub verified: bool,
}

impl From<&DisplayClaims> for JsDisplayClaims {
    fn from(claims: &DisplayClaims) -> Self {
        Self {
            display_name: claims.display_name().to_string(),
            email: claims.email.clone(),
            role: claims.role.clone(),
            expires_at: claims.exp,
            is_admin: claims.is_admin(),
            verified: false,
        }
    }
}
