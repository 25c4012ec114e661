//! Top-level error type

use thiserror::Error;

use crate::analysis::AnalysisError;
use crate::config::ConfigError;
use crate::store::StoreError;

/// Errors surfaced by the store-backed operations
#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("template not found: {0}")]
    TemplateNotFound(String),

    #[error("saved query not found: {0}")]
    QueryNotFound(String),

    #[error("history item not found: {0}")]
    HistoryItemNotFound(String),

    #[error("template {0} must not be empty")]
    EmptyTemplateField(&'static str),

    #[error("invalid value assignment '{0}' (expected name=value)")]
    InvalidAssignment(String),

    #[error("failed to render report: {0}")]
    Report(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
