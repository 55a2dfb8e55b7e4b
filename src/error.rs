use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForgeError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("インポート対象ファイルが見つかりません: {0}")]
    NoImportFiles(String),

    #[error("インポート種別が指定されていません。`--tipo produtos|movimentacoes` で指定してください")]
    MissingImportType,

    #[error("テンプレート生成エラー: {0}")]
    Template(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] insight_forge_common::Error),
}

pub type Result<T> = std::result::Result<T, ForgeError>;
