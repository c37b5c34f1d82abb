//! Import errors.

use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinError;

use crate::domain::imports::parser::ParseError;

/// Faults that end an import run. Rejected rows are not errors; they are returned as data.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read import source")]
    Read(#[source] ParseError),

    #[error("import worker failed")]
    Worker(#[source] JoinError),

    #[error("storage error")]
    Storage(#[from] sqlx::Error),

    #[error("import timed out after {0:?}")]
    Timeout(Duration),

    #[error("import cancelled")]
    Cancelled,
}
