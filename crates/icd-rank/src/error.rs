//! Error types for ranking configuration and the ranking pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Problems with a ranker configuration. Raised at startup, never per call.
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("failed to read ranker options {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse ranker options {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid ranker options: {0}")]
    Invalid(String),
}

/// Internal pipeline failures.
///
/// These never reach callers of [`crate::Ranker::rank`]; the boundary turns
/// them into the default fallback code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RankError {
    #[error("ranked result violates its invariants: {0}")]
    Invariant(String),
    #[error("ranking panicked: {0}")]
    Panicked(String),
}
