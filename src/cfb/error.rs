//! The closed set of failure modes this crate can raise.
//!
//! Every variant carries the structured data needed to render its own
//! diagnostic string (`sector index out of range`, `invalid value(...) for
//! ObjectType!`) through one `thiserror`-derived enum instead of scattered
//! `String` results.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CfbError {
    #[error("input is {actual} bytes, a compound file header requires at least 512")]
    TooSmall { actual: usize },

    #[error("unsupported format: {reason}")]
    UnsupportedFormat { reason: String },

    #[error("header field {field} mismatch: expected {expected}, got {actual}")]
    HeaderMismatch {
        field: &'static str,
        expected: String,
        actual: String,
    },

    #[error("inconsistent model: full_paths has {full_paths} entries, file_index has {file_index}")]
    InconsistentModel { full_paths: usize, file_index: usize },

    #[error("chain malformed: {reason}")]
    ChainMalformed { reason: String },
}

impl CfbError {
    pub(crate) fn header_mismatch(field: &'static str, expected: impl ToString, actual: impl ToString) -> Self {
        Self::HeaderMismatch {
            field,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub(crate) fn chain_malformed(reason: impl Into<String>) -> Self {
        Self::ChainMalformed { reason: reason.into() }
    }

    pub(crate) fn unsupported(reason: impl Into<String>) -> Self {
        Self::UnsupportedFormat { reason: reason.into() }
    }
}
