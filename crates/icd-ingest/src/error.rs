use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort reading a training table.
///
/// Individual malformed rows never produce one of these; they are counted and
/// skipped by the builder.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to open training table {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to read training table header: {0}")]
    Header(#[source] csv::Error),
    #[error("polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}

pub type Result<T> = std::result::Result<T, IngestError>;
