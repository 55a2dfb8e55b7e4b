//! 見出し抽出モジュール
//!
//! ファイル名（拡張子）とバイト列から、1行目の列見出しを取り出す。
//! - CSV/TXT: 先頭レコードを `,` または `;` で分割
//! - XLSX/XLS/ODS等: 先頭シートの先頭行

use crate::error::{Error, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Cursor;

/// 区切り文字テキストとして扱う拡張子
const DELIMITED_EXTENSIONS: &[&str] = &["csv", "txt"];

/// スプレッドシートとして扱う拡張子
const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// ファイル形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Delimited,
    Spreadsheet,
}

impl FileFormat {
    /// ファイル名の拡張子から判定（大文字小文字は無視）
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();

        if DELIMITED_EXTENSIONS.contains(&ext.as_str()) {
            Ok(FileFormat::Delimited)
        } else if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
            Ok(FileFormat::Spreadsheet)
        } else {
            Err(Error::UnsupportedFormat(file_name.to_string()))
        }
    }
}

/// 対応拡張子かどうか
pub fn is_supported_file(file_name: &str) -> bool {
    FileFormat::from_file_name(file_name).is_ok()
}

/// バイト列から見出しを抽出する
///
/// 空白のみのセル・トークンは除外する。順序と重複は保持する。
pub fn extract_headers(file_name: &str, bytes: &[u8]) -> Result<Vec<String>> {
    let headers = match FileFormat::from_file_name(file_name)? {
        FileFormat::Delimited => extract_delimited_headers(bytes)?,
        FileFormat::Spreadsheet => extract_spreadsheet_headers(bytes)?,
    };

    tracing::debug!(file = file_name, count = headers.len(), "headers extracted");
    Ok(headers)
}

/// CSVテキストの先頭レコードから見出しを抽出
///
/// 区切り文字は先頭行から `,` / `;` を判定する。
pub fn extract_delimited_headers(bytes: &[u8]) -> Result<Vec<String>> {
    let text = decode_text(bytes);
    let first_line = text.lines().next().unwrap_or("");
    if first_line.trim().is_empty() {
        return Ok(Vec::new());
    }

    let delimiter = detect_delimiter(first_line);
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut record = StringRecord::new();
    if !reader.read_record(&mut record)? {
        return Ok(Vec::new());
    }

    Ok(record
        .iter()
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .collect())
}

/// 引用符の外側に多く現れる方を区切り文字とする（同数なら `,`）
fn detect_delimiter(line: &str) -> u8 {
    let mut in_quotes = false;
    let (mut commas, mut semicolons) = (0usize, 0usize);

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => commas += 1,
            ';' if !in_quotes => semicolons += 1,
            _ => {}
        }
    }

    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

/// UTF-8（BOM除去）として読み、不正ならLatin-1として解釈
fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            tracing::debug!("not valid UTF-8, decoding as Latin-1");
            bytes.iter().map(|&b| b as char).collect()
        }
    }
}

/// ワークブックの先頭シート・先頭行から見出しを抽出
pub fn extract_spreadsheet_headers(bytes: &[u8]) -> Result<Vec<String>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| Error::UnreadableFile(e.to_string()))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|e| Error::UnreadableFile(e.to_string()))?,
        None => return Err(Error::UnreadableFile("workbook has no sheets".into())),
    };

    let headers = range
        .rows()
        .next()
        .map(|row| {
            row.iter()
                .map(cell_to_string)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();

    Ok(headers)
}

/// セル値を文字列化（整数値の浮動小数は小数部なし）
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            format!("{}", *f as i64)
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_format_from_name() {
        assert_eq!(FileFormat::from_file_name("produtos.csv").unwrap(), FileFormat::Delimited);
        assert_eq!(FileFormat::from_file_name("PRODUTOS.CSV").unwrap(), FileFormat::Delimited);
        assert_eq!(FileFormat::from_file_name("mov.xlsx").unwrap(), FileFormat::Spreadsheet);
        assert_eq!(FileFormat::from_file_name("mov.ods").unwrap(), FileFormat::Spreadsheet);
        assert!(matches!(
            FileFormat::from_file_name("relatorio.pdf"),
            Err(Error::UnsupportedFormat(_))
        ));
        assert!(FileFormat::from_file_name("semextensao").is_err());
    }

    #[test]
    fn test_extract_comma_separated() {
        let csv = "Nome,Preço,Custo\nCaneta,2.50,1.00\n";
        let headers = extract_headers("p.csv", csv.as_bytes()).unwrap();
        assert_eq!(headers, vec!["Nome", "Preço", "Custo"]);
    }

    #[test]
    fn test_extract_semicolon_and_quotes() {
        let csv = "\"Nome\"; Descrição ;\"Quantidade\"\r\nx;y;1";
        let headers = extract_headers("p.csv", csv.as_bytes()).unwrap();
        assert_eq!(headers, vec!["Nome", "Descrição", "Quantidade"]);
    }

    #[test]
    fn test_extract_keeps_delimiter_inside_quotes() {
        let csv = "\"Preço, R$\",Nome";
        let headers = extract_headers("p.csv", csv.as_bytes()).unwrap();
        assert_eq!(headers, vec!["Preço, R$", "Nome"]);
    }

    #[test]
    fn test_extract_escaped_quotes() {
        let csv = "\"Preço \"\"R$\"\"\",Nome\n";
        let headers = extract_headers("p.csv", csv.as_bytes()).unwrap();
        assert_eq!(headers, vec!["Preço \"R$\"", "Nome"]);
    }

    #[test]
    fn test_extract_semicolon_with_commas_in_quotes() {
        let csv = "\"Preço, R$\";\"Custo, R$\";Nome";
        let headers = extract_headers("p.csv", csv.as_bytes()).unwrap();
        assert_eq!(headers, vec!["Preço, R$", "Custo, R$", "Nome"]);
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("Nome,Preço,Custo"), b',');
        assert_eq!(detect_delimiter("Nome;Preço;Custo"), b';');
        assert_eq!(detect_delimiter("\"a,b,c\";Nome"), b';');
        assert_eq!(detect_delimiter("Nome"), b',');
    }

    #[test]
    fn test_extract_strips_bom_and_blank_tokens() {
        let mut bytes = b"\xEF\xBB\xBF".to_vec();
        bytes.extend_from_slice("Nome,,Categoria,\n".as_bytes());
        let headers = extract_headers("p.csv", &bytes).unwrap();
        assert_eq!(headers, vec!["Nome", "Categoria"]);
    }

    #[test]
    fn test_extract_latin1_fallback() {
        // "Preço" を Latin-1 で
        let bytes = [b'P', b'r', b'e', 0xE7, b'o', b';', b'N', b'o', b'm', b'e'];
        let headers = extract_headers("p.csv", &bytes).unwrap();
        assert_eq!(headers, vec!["Preço", "Nome"]);
    }

    #[test]
    fn test_extract_empty_file() {
        assert!(extract_headers("vazio.csv", b"").unwrap().is_empty());
        assert!(extract_headers("vazio.csv", b"\n\nNome").unwrap().is_empty());
    }

    #[test]
    fn test_extract_duplicates_preserved() {
        let headers = extract_headers("p.csv", b"Nome,Nome,Qtd").unwrap();
        assert_eq!(headers, vec!["Nome", "Nome", "Qtd"]);
    }

    #[test]
    fn test_extract_corrupt_spreadsheet() {
        let result = extract_headers("quebrado.xlsx", b"definitely not a zip archive");
        assert!(matches!(result, Err(Error::UnreadableFile(_))));
    }

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&Data::Float(2024.0)), "2024");
        assert_eq!(cell_to_string(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_to_string(&Data::Int(7)), "7");
        assert_eq!(cell_to_string(&Data::String("Nome".into())), "Nome");
        assert_eq!(cell_to_string(&Data::Empty), "");
        assert_eq!(cell_to_string(&Data::Float(1e20)), "100000000000000000000");
    }
}
