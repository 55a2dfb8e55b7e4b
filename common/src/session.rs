//! セッション状態（表示用）
//!
//! 認証サーバーが発行した署名付きトークンのペイロードを読み、
//! 画面表示用の名前・メール・ロールを取り出す。
//!
//! 署名は検証しない。ここで得たクレームは表示専用で、
//! 権限判定は必ずサーバー側で行うこと。

use crate::error::{Error, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// 管理者ロール名
const ADMIN_ROLES: &[&str] = &["admin", "administrador"];

/// 未検証の表示用クレーム
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayClaims {
    #[serde(alias = "nome")]
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(alias = "perfil")]
    pub role: Option<String>,
    pub sub: Option<String>,
    /// 有効期限（UNIX秒）
    pub exp: Option<i64>,
}

impl DisplayClaims {
    /// 画面に出す名前（name → email → sub の順）
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .or(self.sub.as_deref())
            .unwrap_or("")
    }

    /// 管理画面メニューの表示判定
    pub fn is_admin(&self) -> bool {
        self.role
            .as_deref()
            .map(|role| ADMIN_ROLES.contains(&role.to_lowercase().as_str()))
            .unwrap_or(false)
    }
}

/// トークンのペイロードを署名検証なしでデコードする
pub fn decode_display_claims(token: &str) -> Result<DisplayClaims> {
    let token = token.trim().trim_start_matches("Bearer ").trim();
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(Error::InvalidToken("expected three dot-separated segments".into()));
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| Error::InvalidToken(format!("payload is not base64url: {}", e)))?;

    let claims: DisplayClaims = serde_json::from_slice(&bytes)
        .map_err(|e| Error::InvalidToken(format!("payload is not a JSON object: {}", e)))?;

    Ok(claims)
}

/// 認証状態
///
/// ログイン・ログアウトのみが状態を変更する。
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    token: Option<String>,
    claims: Option<DisplayClaims>,
}

impl AuthState {
    pub fn new() -> Self {
        Self::default()
    }

    /// トークンを保持し、表示用クレームを取り出す
    pub fn login(&mut self, token: &str) -> Result<&DisplayClaims> {
        let claims = decode_display_claims(token)?;
        tracing::info!(user = claims.display_name(), "session started");
        self.token = Some(token.trim().to_string());
        Ok(self.claims.insert(claims))
    }

    pub fn logout(&mut self) {
        if self.token.is_some() {
            tracing::info!("session ended");
        }
        self.token = None;
        self.claims = None;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn claims(&self) -> Option<&DisplayClaims> {
        self.claims.as_ref()
    }

    /// 表示上のログイン判定（`now` はUNIX秒）
    pub fn is_authenticated(&self, now: i64) -> bool {
        match &self.claims {
            Some(claims) => claims.exp.map_or(true, |exp| exp > now),
            None => false,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.claims.as_ref().is_some_and(DisplayClaims::is_admin)
    }
}

/// ローディング表示状態
///
/// 複数の処理が重なっても、すべて終わるまで表示を維持する。
#[derive(Debug, Clone, Default)]
pub struct LoadingState {
    pending: usize,
}

impl LoadingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_loading(&mut self) {
        self.pending += 1;
    }

    pub fn hide_loading(&mut self) {
        self.pending = self.pending.saturating_sub(1);
    }

    pub fn is_loading(&self) -> bool {
        self.pending > 0
    }
}
