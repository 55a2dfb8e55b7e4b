//! テンプレートファイルの書き出し

use crate::cli::TemplateFormat;
use crate::error::{ForgeError, Result};
use insight_forge_common::{template_csv, template_file_name, template_xlsx, ImportType};
use std::path::{Path, PathBuf};

/// テンプレートを書き出し、書き出し先を返す
///
/// `output` がディレクトリなら既定のファイル名で、その中に作成する。
pub fn write_template(
    import_type: ImportType,
    format: TemplateFormat,
    output: Option<&Path>,
) -> Result<PathBuf> {
    let default_name = template_file_name(import_type, format.extension());
    let path = match output {
        Some(p) if p.is_dir() => p.join(default_name),
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(default_name),
    };

    let bytes = match format {
        TemplateFormat::Csv => template_csv(import_type)?.into_bytes(),
        TemplateFormat::Xlsx => {
            template_xlsx(import_type).map_err(|e| ForgeError::Template(e.to_string()))?
        }
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, bytes)?;

    tracing::info!(path = %path.display(), import_type = %import_type, "template written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_csv_into_directory() {
        let dir = tempdir().unwrap();
        let path = write_template(ImportType::Produtos, TemplateFormat::Csv, Some(dir.path())).unwrap();
        assert_eq!(path, dir.path().join("modelo_produtos.csv"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Nome,Categoria,Preço"));
    }

    #[test]
    fn test_write_xlsx_to_file() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("out").join("mov.xlsx");
        let path = write_template(ImportType::Movimentacoes, TemplateFormat::Xlsx, Some(&target)).unwrap();
        assert_eq!(path, target);
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
