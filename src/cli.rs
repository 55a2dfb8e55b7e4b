use clap::{Parser, Subcommand};
use insight_forge_common::ImportType;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "forge-import")]
#[command(about = "Insight Forge インポートファイル検証ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ファイルの見出しを検証（取り込み可否を判定）
    Validate {
        /// CSV/XLSXファイル
        #[arg(required = true)]
        file: PathBuf,

        /// インポート種別 (produtos/movimentacoes)。省略時は設定値 → 対話選択
        #[arg(short, long)]
        tipo: Option<ImportType>,

        /// 結果をJSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 抽出した見出しを表示
    Headers {
        /// CSV/XLSXファイル
        #[arg(required = true)]
        file: PathBuf,
    },

    /// 見出しからインポート種別を推定
    Detect {
        /// CSV/XLSXファイル
        #[arg(required = true)]
        file: PathBuf,

        /// 結果をJSONで出力
        #[arg(long)]
        json: bool,
    },

    /// フォルダ内のファイルを一括検証
    Batch {
        /// 対象フォルダ
        #[arg(required = true)]
        folder: PathBuf,

        /// インポート種別 (produtos/movimentacoes)
        #[arg(short, long)]
        tipo: Option<ImportType>,

        /// サブフォルダも再帰的にスキャン
        #[arg(short = 'r', long)]
        recursive: bool,

        /// 結果をJSONで出力
        #[arg(long)]
        json: bool,
    },

    /// インポート用テンプレートを生成
    Template {
        /// インポート種別 (produtos/movimentacoes)
        #[arg(short, long)]
        tipo: ImportType,

        /// 出力形式 (csv/xlsx)
        #[arg(short, long, default_value = "xlsx")]
        format: TemplateFormat,

        /// 出力ファイル（省略時: ./modelo_<種別>.<拡張子>）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// トークンの表示用クレームを確認（署名は検証しない）
    Token {
        /// 認証トークン
        #[arg(required = true)]
        token: String,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// 受理閾値 (0.0-1.0)
        #[arg(long)]
        set_threshold: Option<f64>,

        /// 低信頼度の下限 (0.0-1.0)
        #[arg(long)]
        set_floor: Option<f64>,

        /// 既定のインポート種別
        #[arg(long)]
        set_default_type: Option<ImportType>,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TemplateFormat {
    Csv,
    #[default]
    Xlsx,
}

impl TemplateFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            TemplateFormat::Csv => "csv",
            TemplateFormat::Xlsx => "xlsx",
        }
    }
}

impl std::str::FromStr for TemplateFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(TemplateFormat::Csv),
            "xlsx" | "excel" => Ok(TemplateFormat::Xlsx),
            _ => Err(format!("Unknown format: {}. Use csv or xlsx", s)),
        }
    }
}

impl std::fmt::Display for TemplateFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}
