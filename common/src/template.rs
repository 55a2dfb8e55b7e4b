//! インポート用テンプレート生成
//!
//! 見出し不一致で却下されたときに案内する雛形ファイル。
//! CSVは常に、XLSXは `excel` feature 有効時のみ生成できる。

use crate::schema::ImportType;
use csv::{Terminator, WriterBuilder};

/// テンプレートの列見出し（表示用）
pub fn template_headers(import_type: ImportType) -> &'static [&'static str] {
    match import_type {
        ImportType::Produtos => &["Nome", "Categoria", "Preço", "Custo", "Descrição", "Quantidade"],
        ImportType::Movimentacoes => &["Produto", "Quantidade", "Data", "Tipo"],
    }
}

/// 記入例の1行
pub fn template_example_row(import_type: ImportType) -> &'static [&'static str] {
    match import_type {
        ImportType::Produtos => &[
            "Caneta Azul",
            "Papelaria",
            "2.50",
            "1.20",
            "Caneta esferográfica azul",
            "100",
        ],
        ImportType::Movimentacoes => &["Caneta Azul", "10", "2024-01-15", "compra"],
    }
}

/// 既定のファイル名
pub fn template_file_name(import_type: ImportType, extension: &str) -> String {
    format!("modelo_{}.{}", import_type.as_str(), extension)
}

/// CSVテンプレート（見出し + 記入例）
pub fn template_csv(import_type: ImportType) -> crate::Result<String> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(template_headers(import_type))?;
    writer.write_record(template_example_row(import_type))?;

    let bytes = writer
        .into_inner()
        .map_err(|e| crate::Error::Template(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| crate::Error::Template(e.to_string()))
}

/// XLSXテンプレートをバッファに生成
#[cfg(feature = "excel")]
pub fn template_xlsx(import_type: ImportType) -> crate::Result<Vec<u8>> {
    use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook};

    let to_err = |e: rust_xlsxwriter::XlsxError| crate::Error::Template(e.to_string());

    let mut workbook = Workbook::new();
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_border(FormatBorder::Thin);

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(import_type.label()).map_err(to_err)?;

    for (col, header) in template_headers(import_type).iter().enumerate() {
        let col = col as u16;
        worksheet
            .write_string_with_format(0, col, *header, &header_format)
            .map_err(to_err)?;
        worksheet.set_column_width(col, 20).map_err(to_err)?;
    }

    for (col, value) in template_example_row(import_type).iter().enumerate() {
        let col = col as u16;
        match value.parse::<f64>() {
            Ok(number) => worksheet.write_number(1, col, number).map_err(to_err)?,
            Err(_) => worksheet.write_string(1, col, *value).map_err(to_err)?,
        };
    }

    workbook.save_to_buffer().map_err(to_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::{validate_headers, DecisionPolicy};
    use crate::schema::SchemaTables;

    #[test]
    fn test_template_headers_validate_as_own_type() {
        for import_type in ImportType::ALL {
            let result = validate_headers(
                template_headers(import_type),
                import_type,
                &SchemaTables::default(),
                &DecisionPolicy::default(),
            );
            assert!(result.is_valid, "{} template rejected: {:?}", import_type, result.error);
            assert_eq!(result.confidence, Some(1.0));
        }
    }

    #[test]
    fn test_template_csv_layout() {
        let csv = template_csv(ImportType::Movimentacoes).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Produto,Quantidade,Data,Tipo"));
        assert_eq!(lines.next(), Some("Caneta Azul,10,2024-01-15,compra"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_template_csv_validates() {
        use crate::decision::validate_bytes;

        for import_type in ImportType::ALL {
            let csv = template_csv(import_type).unwrap();
            let result = validate_bytes(
                &template_file_name(import_type, "csv"),
                csv.as_bytes(),
                import_type,
                &SchemaTables::default(),
                &DecisionPolicy::default(),
            );
            assert!(result.is_valid, "{:?}", result.error);
            assert_eq!(result.confidence, Some(1.0));
        }
    }

    #[test]
    fn test_template_file_name() {
        assert_eq!(
            template_file_name(ImportType::Produtos, "xlsx"),
            "modelo_produtos.xlsx"
        );
    }

    #[cfg(feature = "excel")]
    #[test]
    fn test_template_xlsx_validates() {
        use crate::decision::validate_bytes;

        for import_type in ImportType::ALL {
            let bytes = template_xlsx(import_type).unwrap();
            assert!(!bytes.is_empty());
            let result = validate_bytes(
                &template_file_name(import_type, "xlsx"),
                &bytes,
                import_type,
                &SchemaTables::default(),
                &DecisionPolicy::default(),
            );
            assert!(result.is_valid, "{:?}", result.error);
        }
    }
}
