//! Library components of the `icd-rank` command-line tool.

pub mod batch;
pub mod logging;
pub mod summary;
