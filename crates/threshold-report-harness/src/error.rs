//! Harness-level failures.

use thiserror::Error;
use threshold_report_core::ReportError;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("unsupported dataset schema_version {found}, expected {expected}")]
    UnsupportedSchema { found: u32, expected: u32 },
    #[error("invalid report configuration: {0}")]
    Config(String),
}
