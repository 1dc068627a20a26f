use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the analysis pipeline.
///
/// Enumeration and per-file read failures never appear here; they are logged
/// and recovered where they happen.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("repository root '{0}' is not a readable directory")]
    RepositoryNotFound(PathBuf),

    #[error("project directory '{0}' no longer exists")]
    ProjectMissing(PathBuf),

    #[error("failed to inspect '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("analysis cancelled")]
    Cancelled,
}

impl AnalysisError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AnalysisError::Cancelled)
    }
}
