//! インポート種別の対話式選択

use crate::error::{ForgeError, Result};
use dialoguer::Select;
use insight_forge_common::ImportType;

/// 引数 → 設定の既定値 → 対話選択 の順でインポート種別を決める
pub fn resolve_import_type(
    explicit: Option<ImportType>,
    configured: Option<ImportType>,
    interactive: bool,
) -> Result<ImportType> {
    if let Some(t) = explicit.or(configured) {
        return Ok(t);
    }
    if !interactive {
        return Err(ForgeError::MissingImportType);
    }
    select_import_type_interactive()?.ok_or(ForgeError::MissingImportType)
}

/// 対話式で種別を選択（キャンセル時は None）
pub fn select_import_type_interactive() -> Result<Option<ImportType>> {
    let labels: Vec<&str> = ImportType::ALL.iter().map(|t| t.label()).collect();

    let selection = Select::new()
        .with_prompt("Tipo de importação")
        .items(&labels)
        .default(0)
        .interact_opt()
        .map_err(|e| ForgeError::Config(format!("対話入力に失敗: {}", e)))?;

    Ok(selection.map(|i| ImportType::ALL[i]))
}
