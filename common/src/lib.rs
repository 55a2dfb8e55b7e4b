//! Insight Forge Common Library
//!
//! CLIとWeb(WASM)で共有されるインポートファイル検証ロジック

pub mod decision;
pub mod error;
pub mod extract;
pub mod matcher;
pub mod normalize;
pub mod schema;
pub mod sequence;
pub mod session;
pub mod template;

pub use decision::{validate_bytes, validate_headers, DecisionPolicy, RejectionReason, ValidationResult};
pub use error::{Error, Result};
pub use extract::{extract_headers, is_supported_file, FileFormat};
pub use matcher::{match_headers, MatchResult, SchemaScore};
pub use normalize::normalize_header;
pub use schema::{DetectedType, ImportType, SchemaTables, SynonymTable};
pub use sequence::{Ticket, ValidationSequencer};
pub use session::{decode_display_claims, AuthState, DisplayClaims, LoadingState};
pub use template::{template_csv, template_file_name, template_headers};
#[cfg(feature = "excel")]
pub use template::template_xlsx;
