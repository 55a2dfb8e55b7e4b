//! Insight Forge インポート検証 CLI ライブラリ

pub mod cli;
pub mod config;
pub mod error;
pub mod report;
pub mod scanner;
pub mod template;
pub mod type_selector;
pub mod validator;
