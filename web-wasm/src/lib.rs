//! Insight Forge Web (WASM)
//!
//! アップロードフォームから呼ばれる検証API。
//! ファイル選択ごとにチケットを発行し、古い選択の結果は `{ stale: true }` で返す。

mod bindings;

use bindings::{JsDisplayClaims, JsStaleResult};
use insight_forge_common::{
    decode_display_claims, normalize_header, template_csv, validate_bytes, DecisionPolicy,
    ImportType, SchemaTables, Ticket, ValidationResult, ValidationSequencer,
};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, JsFuture};

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
}

/// 種別文字列をパース（JS向けエラー）
fn parse_import_type(value: &str) -> Result<ImportType, JsError> {
    value.parse::<ImportType>().map_err(|e| JsError::new(&e))
}

/// Fileの中身を全量読み込む
async fn read_file_bytes(file: &web_sys::File) -> Result<Vec<u8>, String> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| e.as_string().unwrap_or_else(|| format!("{:?}", e)))?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

/// 読み込み結果を判定し、後続の選択に追い越されていれば破棄する
fn settle_selection(
    sequencer: &ValidationSequencer,
    ticket: Ticket,
    file_name: &str,
    read: Result<Vec<u8>, String>,
    expected: ImportType,
    tables: &SchemaTables,
    policy: &DecisionPolicy,
) -> Result<ValidationResult, JsStaleResult> {
    let result = match read {
        Ok(bytes) => validate_bytes(file_name, &bytes, expected, tables, policy),
        Err(e) => ValidationResult::unreadable(e),
    };
    sequencer
        .settle(ticket, result)
        .ok_or_else(JsStaleResult::default)
}

/// アップロードフォーム1つにつき1インスタンス
#[wasm_bindgen]
pub struct ImportValidator {
    sequencer: Rc<ValidationSequencer>,
    tables: Rc<SchemaTables>,
    policy: DecisionPolicy,
}

impl Default for ImportValidator {
    fn default() -> Self {
        Self {
            sequencer: Rc::new(ValidationSequencer::new()),
            tables: Rc::new(SchemaTables::default()),
            policy: DecisionPolicy::default(),
        }
    }
}

#[wasm_bindgen]
impl ImportValidator {
    #[wasm_bindgen(constructor)]
    pub fn new() -> ImportValidator {
        Self::default()
    }

    /// 閾値を指定して生成
    #[wasm_bindgen(js_name = withThresholds)]
    pub fn with_thresholds(acceptance: f64, floor: f64) -> Result<ImportValidator, JsError> {
        let policy = DecisionPolicy {
            acceptance_threshold: acceptance,
            low_confidence_floor: floor,
        };
        policy.validate().map_err(|e| JsError::new(&e.to_string()))?;
        Ok(Self {
            policy,
            ..Self::default()
        })
    }

    /// ファイルを検証する
    ///
    /// 解決値は `{ isValid, error?, detectedType?, confidence?, suggestions? }`、
    /// 後続の選択に追い越された場合は `{ stale: true }`。
    pub fn validate(&self, file: web_sys::File, expected_type: String) -> js_sys::Promise {
        let expected = match parse_import_type(&expected_type) {
            Ok(t) => t,
            Err(e) => return js_sys::Promise::reject(&JsValue::from(e)),
        };

        let ticket = self.sequencer.begin();
        let sequencer = Rc::clone(&self.sequencer);
        let tables = Rc::clone(&self.tables);
        let policy = self.policy;

        future_to_promise(async move {
            let name = file.name();
            let read = read_file_bytes(&file).await;

            match settle_selection(&sequencer, ticket, &name, read, expected, &tables, &policy) {
                Ok(result) => serde_wasm_bindgen::to_value(&result).map_err(JsValue::from),
                Err(stale) => {
                    gloo::console::warn!(format!(
                        "descartando resultado obsoleto de {} (seleção #{})",
                        name,
                        ticket.id()
                    ));
                    serde_wasm_bindgen::to_value(&stale).map_err(JsValue::from)
                }
            }
        })
    }

    /// 見出し配列を直接検証する（同期）
    #[wasm_bindgen(js_name = validateHeaders)]
    pub fn validate_headers(
        &self,
        headers: Vec<String>,
        expected_type: String,
    ) -> Result<JsValue, JsError> {
        let expected = parse_import_type(&expected_type)?;
        let result = insight_forge_common::validate_headers(&headers, expected, &self.tables, &self.policy);
        serde_wasm_bindgen::to_value(&result).map_err(|e| JsError::new(&e.to_string()))
    }
}

/// CSVテンプレート文字列
#[wasm_bindgen(js_name = templateCsv)]
pub fn template_csv_js(expected_type: String) -> Result<String, JsError> {
    template_csv(parse_import_type(&expected_type)?).map_err(|e| JsError::new(&e.to_string()))
}

/// 比較用に正規化した見出し
#[wasm_bindgen(js_name = normalizeHeader)]
pub fn normalize_header_js(header: String) -> String {
    normalize_header(&header)
}

/// トークンの表示用クレーム（署名は検証しない）
#[wasm_bindgen(js_name = decodeSessionClaims)]
pub fn decode_session_claims(token: String) -> Result<JsValue, JsError> {
    let claims = decode_display_claims(&token).map_err(|e| JsError::new(&e.to_string()))?;
    serde_wasm_bindgen::to_value(&JsDisplayClaims::from(&claims))
        .map_err(|e| JsError::new(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use insight_forge_common::RejectionReason;

    const PRODUCTS_CSV: &[u8] = "Nome,Categoria,Preço,Custo,Descrição,Quantidade\n".as_bytes();

    fn settle(
        sequencer: &ValidationSequencer,
        ticket: Ticket,
        read: Result<Vec<u8>, String>,
    ) -> Result<ValidationResult, JsStaleResult> {
        settle_selection(
            sequencer,
            ticket,
            "produtos.csv",
            read,
            ImportType::Produtos,
            &SchemaTables::default(),
            &DecisionPolicy::default(),
        )
    }

    #[test]
    fn test_latest_selection_resolves_result() {
        let sequencer = ValidationSequencer::new();
        let ticket = sequencer.begin();

        let result = settle(&sequencer, ticket, Ok(PRODUCTS_CSV.to_vec())).unwrap();
        assert!(result.is_valid);
    }

    #[test]
    fn test_superseded_selection_is_stale() {
        let sequencer = ValidationSequencer::new();
        let first = sequencer.begin();
        let second = sequencer.begin();

        // 古い選択が後から完了しても結果は返さない
        let late = settle(&sequencer, first, Ok(PRODUCTS_CSV.to_vec()));
        assert!(matches!(late, Err(ref stale) if stale.stale));

        let current = settle(&sequencer, second, Ok(b"A,B,C\n".to_vec())).unwrap();
        assert!(!current.is_valid);
        assert_eq!(current.reason, Some(RejectionReason::LowConfidence));
    }

    #[test]
    fn test_read_failure_is_unreadable_result() {
        let sequencer = ValidationSequencer::new();
        let ticket = sequencer.begin();

        let result = settle(&sequencer, ticket, Err("NotReadableError".into())).unwrap();
        assert_eq!(result.reason, Some(RejectionReason::UnreadableFile));
        assert!(result.error.unwrap().contains("NotReadableError"));
    }

    #[test]
    fn test_unknown_import_type_is_error() {
        assert!("usuarios".parse::<ImportType>().is_err());
        assert!(" Movimentações ".parse::<ImportType>().is_ok());
    }
}
