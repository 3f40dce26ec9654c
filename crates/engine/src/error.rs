use std::io;
use std::path::PathBuf;

use gitcmd::CommitId;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Fatal, per-run failures of the replay engine.
///
/// Any of these aborts the run immediately. Completed target commits are
/// never rolled back; each is already a valid unit, and the next invocation
/// resumes from the first commit without a provenance marker.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An external git command failed.
    #[error(transparent)]
    Command(#[from] gitcmd::CommandError),

    /// The whole-tree normalization pass could not start.
    #[error(transparent)]
    Normalize(#[from] normalize::NormalizeError),

    /// I/O failure while mirroring the source tree into the target.
    #[error("mirror failure at '{}': {source}", path.display())]
    MirrorIo {
        /// Path the operation was working on.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The scratch worktree could not be prepared.
    #[error("failed to prepare scratch worktree: {0}")]
    Scratch(io::Error),

    /// The configured stop commit does not appear in the enumerated history.
    #[error("stop commit {0} is not part of the enumerated history")]
    StopCommitNotFound(CommitId),

    /// The target path is not a git repository; mirroring into it would
    /// scatter files with no way to commit them.
    #[error("target '{}' is not a git repository", .0.display())]
    TargetNotARepository(PathBuf),
}
