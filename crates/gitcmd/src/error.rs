use std::io;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors produced while executing an external command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The process could not be started at all.
    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        /// Rendered command line.
        command: String,
        /// Underlying spawn failure.
        source: io::Error,
    },

    /// The process ran and exited unsuccessfully.
    #[error("'{command}' exited with {status}: {stderr}")]
    Failed {
        /// Rendered command line.
        command: String,
        /// Exit status reported by the operating system.
        status: ExitStatus,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// The process succeeded but its output was not valid UTF-8.
    #[error("'{command}' produced non-UTF-8 output")]
    NonUtf8Output {
        /// Rendered command line.
        command: String,
    },

    /// The process output did not have the shape the caller asked git for.
    #[error("'{command}' produced unexpected output: {detail}")]
    UnexpectedOutput {
        /// Rendered command line.
        command: String,
        /// What was wrong with the output.
        detail: String,
    },
}
