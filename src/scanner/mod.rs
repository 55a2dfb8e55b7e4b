use crate::error::{ForgeError, Result};
use insight_forge_common::is_supported_file;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ImportFile {
    pub path: PathBuf,
    pub file_name: String,
}

/// フォルダ内のインポート対象ファイル（CSV/XLSX等）を列挙する
pub fn scan_folder(folder: &Path, recursive: bool) -> Result<Vec<ImportFile>> {
    if !folder.is_dir() {
        return Err(ForgeError::FolderNotFound(folder.display().to_string()));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        // Excelの一時ファイル（~$xxx.xlsx）は除外
        if file_name.starts_with("~$") || !is_supported_file(&file_name) {
            continue;
        }

        files.push(ImportFile {
            path: path.to_path_buf(),
            file_name,
        });
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_scan_folder_not_found() {
        let result = scan_folder(Path::new("/nonexistent/folder"), false);
        assert!(matches!(result, Err(ForgeError::FolderNotFound(_))));
    }

    #[test]
    fn test_scan_folder_filters_and_sorts() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b_movimentos.xlsx"), b"x").unwrap();
        fs::write(dir.path().join("a_produtos.CSV"), b"x").unwrap();
        fs::write(dir.path().join("~$a_produtos.xlsx"), b"x").unwrap();
        fs::write(dir.path().join("relatorio.pdf"), b"x").unwrap();
        fs::write(dir.path().join("dados.json"), b"{}").unwrap();

        let files = scan_folder(dir.path(), false).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["a_produtos.CSV", "b_movimentos.xlsx"]);
    }

    #[test]
    fn test_scan_folder_recursive() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("2024");
        fs::create_dir_all(&sub).unwrap();
        fs::write(dir.path().join("raiz.csv"), b"x").unwrap();
        fs::write(sub.join("janeiro.csv"), b"x").unwrap();

        assert_eq!(scan_folder(dir.path(), false).unwrap().len(), 1);
        assert_eq!(scan_folder(dir.path(), true).unwrap().len(), 2);
    }
}
