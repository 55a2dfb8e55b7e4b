use crate::error::{ForgeError, Result};
use insight_forge_common::{DecisionPolicy, ImportType, SchemaTables};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// 受理閾値の環境変数
pub const ENV_THRESHOLD: &str = "INSIGHT_FORGE_THRESHOLD";
/// 下限の環境変数
pub const ENV_FLOOR: &str = "INSIGHT_FORGE_FLOOR";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub acceptance_threshold: f64,
    pub low_confidence_floor: f64,
    pub default_import_type: Option<ImportType>,
    /// 種別 → 正規フィールド → 追加の表記ゆれ
    pub extra_synonyms: HashMap<ImportType, HashMap<String, Vec<String>>>,
}

impl Default for Config {
    fn default() -> Self {
        let policy = DecisionPolicy::default();
        Self {
            acceptance_threshold: policy.acceptance_threshold,
            low_confidence_floor: policy.low_confidence_floor,
            default_import_type: None,
            extra_synonyms: HashMap::new(),
        }
    }
}

/// `config` コマンドで保存する変更
#[derive(Debug, Clone, Default)]
pub struct ConfigUpdate {
    pub acceptance_threshold: Option<f64>,
    pub low_confidence_floor: Option<f64>,
    pub default_import_type: Option<ImportType>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        self.acceptance_threshold.is_none()
            && self.low_confidence_floor.is_none()
            && self.default_import_type.is_none()
    }
}

impl Config {
    /// 検証に使う設定（ホームの設定ファイル + 環境変数）
    pub fn load() -> Result<Self> {
        Self::load_effective(&Self::config_path()?)
    }

    /// 設定ファイルを読み込み、環境変数で上書きして整合性を確認する
    pub fn load_effective(path: &Path) -> Result<Self> {
        let mut config = Self::load_from(path)?;
        config.apply_env_overrides()?;
        config.policy().validate()?;
        Ok(config)
    }

    /// 指定パスから読み込み（存在しなければ既定値）
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            tracing::debug!(path = %path.display(), "config loaded");
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// ファイルの値に変更を反映して保存する
    ///
    /// 環境変数の上書きは保存しない。ファイルの値が不整合でも、
    /// 変更後に整合していれば保存できる。
    pub fn update_file(path: &Path, update: &ConfigUpdate) -> Result<Self> {
        let mut config = Self::load_from(path)?;
        if let Some(value) = update.acceptance_threshold {
            config.acceptance_threshold = value;
        }
        if let Some(value) = update.low_confidence_floor {
            config.low_confidence_floor = value;
        }
        if let Some(t) = update.default_import_type {
            config.default_import_type = Some(t);
        }
        config.save_to(path)?;
        tracing::info!(path = %path.display(), "config saved");
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.policy().validate()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ForgeError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("insight-forge").join("config.json"))
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(value) = read_env_f64(ENV_THRESHOLD)? {
            self.acceptance_threshold = value;
        }
        if let Some(value) = read_env_f64(ENV_FLOOR)? {
            self.low_confidence_floor = value;
        }
        Ok(())
    }

    pub fn policy(&self) -> DecisionPolicy {
        DecisionPolicy {
            acceptance_threshold: self.acceptance_threshold,
            low_confidence_floor: self.low_confidence_floor,
        }
    }

    /// 組み込み同義語 + 追加同義語
    pub fn tables(&self) -> SchemaTables {
        SchemaTables::with_extra(&self.extra_synonyms)
    }
}

fn read_env_f64(name: &str) -> Result<Option<f64>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| ForgeError::Config(format!("{} は数値で指定してください: {}", name, raw))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("none.json")).unwrap();
        assert_eq!(config.acceptance_threshold, 0.6);
        assert_eq!(config.low_confidence_floor, 0.4);
        assert!(config.default_import_type.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.acceptance_threshold = 0.75;
        config.default_import_type = Some(ImportType::Movimentacoes);
        config
            .extra_synonyms
            .entry(ImportType::Produtos)
            .or_default()
            .insert("preco".into(), vec!["Preço de Venda".into()]);
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.acceptance_threshold, 0.75);
        assert_eq!(loaded.default_import_type, Some(ImportType::Movimentacoes));
        let preco = loaded.tables().produtos.field("preco").cloned().unwrap();
        assert!(preco.variants.contains(&"precodevenda".to_string()));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "default_import_type": "produtos" }"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.default_import_type, Some(ImportType::Produtos));
        assert_eq!(config.low_confidence_floor, 0.4);
    }

    #[test]
    fn test_update_does_not_persist_env_override() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        std::env::set_var(ENV_THRESHOLD, "0.9");
        let effective = Config::load_effective(&path).unwrap();
        assert_eq!(effective.acceptance_threshold, 0.9);

        let update = ConfigUpdate {
            low_confidence_floor: Some(0.3),
            ..ConfigUpdate::default()
        };
        Config::update_file(&path, &update).unwrap();
        std::env::remove_var(ENV_THRESHOLD);

        let stored = Config::load_from(&path).unwrap();
        assert_eq!(stored.acceptance_threshold, 0.6);
        assert_eq!(stored.low_confidence_floor, 0.3);
    }

    #[test]
    fn test_update_repairs_inconsistent_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "acceptance_threshold": 0.5, "low_confidence_floor": 0.7 }"#,
        )
        .unwrap();

        assert!(Config::load_from(&path).unwrap().policy().validate().is_err());

        // 不整合のままの変更は保存しない
        let still_broken = ConfigUpdate {
            default_import_type: Some(ImportType::Produtos),
            ..ConfigUpdate::default()
        };
        assert!(Config::update_file(&path, &still_broken).is_err());
        assert!(Config::load_from(&path).unwrap().default_import_type.is_none());

        let fix = ConfigUpdate {
            low_confidence_floor: Some(0.4),
            ..ConfigUpdate::default()
        };
        let repaired = Config::update_file(&path, &fix).unwrap();
        assert_eq!(repaired.acceptance_threshold, 0.5);
        assert_eq!(repaired.low_confidence_floor, 0.4);
        assert!(Config::load_from(&path).unwrap().policy().validate().is_ok());
    }

    #[test]
    fn test_update_is_empty() {
        assert!(ConfigUpdate::default().is_empty());
        let update = ConfigUpdate {
            acceptance_threshold: Some(0.7),
            ..ConfigUpdate::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn test_save_rejects_inconsistent_policy() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.low_confidence_floor = 0.9;
        assert!(config.save_to(&dir.path().join("config.json")).is_err());
    }
}
