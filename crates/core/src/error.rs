use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("Directory not found: {}", .path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Traversal was cancelled")]
    Cancelled,

    #[error("Aggregation task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

impl AggregateError {
    pub(crate) fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::DirectoryNotFound { path: path.into() }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::DirectoryNotFound { .. })
    }
}

/// Failure of a single probe call. Never leaves the probe layer; callers see
/// a zero duration instead.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Probe timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unparsable probe output: {0:?}")]
    InvalidOutput(String),
}
