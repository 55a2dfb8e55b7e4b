use anyhow::Context;
use clap::Parser;
use insight_forge::{cli, config, error, report, scanner, template, type_selector, validator};
use insight_forge_common::AuthState;
use cli::{Cli, Commands};
use config::{Config, ConfigUpdate};
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let load_config = || {
        Config::load().context("設定の読み込みに失敗しました（`forge-import config` で修正できます）")
    };
    let interactive = std::io::stdin().is_terminal();

    match cli.command {
        Commands::Validate { file, tipo, json } => {
            let config = load_config()?;
            let (tables, policy) = (config.tables(), config.policy());
            let expected =
                type_selector::resolve_import_type(tipo, config.default_import_type, interactive)?;
            let result = validator::validate_file(&file, expected, &tables, &policy).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                let file_name = file.display().to_string();
                print!("{}", report::render_validation(&file_name, &result));
            }

            if !result.is_valid {
                std::process::exit(1);
            }
        }

        Commands::Headers { file } => {
            let headers = validator::read_headers(&file).await?;
            println!("📄 {} ({}列)", file.display(), headers.len());
            print!("{}", report::render_headers(&headers));
        }

        Commands::Detect { file, json } => {
            let tables = load_config()?.tables();
            let (_, matched) = validator::detect_file(&file, &tables).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&matched)?);
            } else {
                println!("🔍 {}", file.display());
                print!("{}", report::render_detection(&matched));
            }
        }

        Commands::Batch { folder, tipo, recursive, json } => {
            let config = load_config()?;
            let (tables, policy) = (config.tables(), config.policy());
            let expected =
                type_selector::resolve_import_type(tipo, config.default_import_type, interactive)?;

            let files = scanner::scan_folder(&folder, recursive)?;
            if files.is_empty() {
                return Err(error::ForgeError::NoImportFiles(folder.display().to_string()).into());
            }
            tracing::info!(count = files.len(), folder = %folder.display(), "batch validation");

            let reports =
                validator::validate_files(&files, expected, &tables, &policy, !json).await?;
            let summary = validator::BatchSummary::from_reports(&reports);

            if json {
                let body = serde_json::json!({ "summary": summary, "files": reports });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                print!("{}", report::render_batch(&reports));
            }

            if summary.rejected > 0 {
                std::process::exit(1);
            }
        }

        Commands::Template { tipo, format, output } => {
            let path = template::write_template(tipo, format, output.as_deref())?;
            println!("✔ テンプレートを作成しました: {}", path.display());
        }

        Commands::Token { token } => {
            let mut auth = AuthState::new();
            let claims = auth.login(&token)?.clone();
            let now = chrono::Utc::now().timestamp();

            println!("⚠ 署名は検証していません（表示用の情報です）");
            println!("  名前: {}", claims.display_name());
            println!("  メール: {}", claims.email.as_deref().unwrap_or("-"));
            println!("  ロール: {}", claims.role.as_deref().unwrap_or("-"));
            if let Some(exp) = claims.exp {
                let expires = chrono::DateTime::from_timestamp(exp, 0)
                    .map(|d| d.to_rfc3339())
                    .unwrap_or_else(|| exp.to_string());
                println!("  有効期限: {}", expires);
            }
            println!("  有効: {}", if auth.is_authenticated(now) { "はい" } else { "いいえ" });
            println!("  管理者: {}", if auth.is_admin() { "はい" } else { "いいえ" });
        }

        Commands::Config { show, set_threshold, set_floor, set_default_type } => {
            let path = Config::config_path()?;
            let update = ConfigUpdate {
                acceptance_threshold: set_threshold,
                low_confidence_floor: set_floor,
                default_import_type: set_default_type,
            };

            let config = if update.is_empty() {
                Config::load_from(&path)?
            } else {
                let saved = Config::update_file(&path, &update)?;
                println!("✔ 設定を保存しました");
                saved
            };

            if show || update.is_empty() {
                println!("設定:");
                println!("  パス: {}", path.display());
                println!("  受理閾値: {}", config.acceptance_threshold);
                println!("  低信頼度の下限: {}", config.low_confidence_floor);
                println!(
                    "  既定の種別: {}",
                    config.default_import_type.map(|t| t.as_str()).unwrap_or("未設定")
                );
                let extra: usize = config
                    .extra_synonyms
                    .values()
                    .flat_map(|fields| fields.values())
                    .map(|v| v.len())
                    .sum();
                println!("  追加の表記ゆれ: {}件", extra);
                for name in [insight_forge::config::ENV_THRESHOLD, insight_forge::config::ENV_FLOOR] {
                    if let Ok(value) = std::env::var(name) {
                        println!("  環境変数 {}={}（保存されません）", name, value);
                    }
                }
                if let Err(e) = config.policy().validate() {
                    println!("⚠ {}", e);
                }
            }
        }
    }

    Ok(())
}
