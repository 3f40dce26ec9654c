use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the whole-tree normalization pass.
///
/// Per-file read/write failures are deliberately absent here: the tree pass
/// logs them and continues, as a single unreadable file must not abort a
/// replay run.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The requested root is missing or not a directory.
    #[error("normalization root '{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),
}
