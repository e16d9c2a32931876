//! Fatal-error taxonomy for the analyzer.
//!
//! Only two kinds of failure are fatal enough to abort analysis of a
//! function: an unrecognized C type reaching variable declaration, and the
//! numerical domain backend reporting that one of its operations failed.
//! Everything else non-fatal is routed through [`crate::diagnostics`].

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("unknown C type `{0}`: cannot classify as int or real")]
    UnknownCType(String),

    #[error("numerical domain backend failed during `{operation}`: {reason}")]
    BackendFailure { operation: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
