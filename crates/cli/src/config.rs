use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// JSON run-configuration file.
///
/// Everything here can also be given on the command line; flags win for the
/// scalar fields, while the list fields are additive (file entries extend
/// the built-in tables, flag entries extend both).
///
/// ```json
/// {
///     "exclude": ["tests/", "code/dep_codecs/lib/"],
///     "crlf_basenames": ["Makefile.win"],
///     "crlf_suffixes": [".bat"],
///     "branch": "main",
///     "stop_at": "0123abcd...",
///     "workdir": "/var/cache/histmirror"
/// }
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Path prefixes excluded from the mirror.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Basenames added to the CRLF table.
    #[serde(default)]
    pub crlf_basenames: Vec<String>,

    /// Filename suffixes added to the CRLF table.
    #[serde(default)]
    pub crlf_suffixes: Vec<String>,

    /// Upstream ref to enumerate.
    #[serde(default)]
    pub branch: Option<String>,

    /// Inclusive stop commit.
    #[serde(default)]
    pub stop_at: Option<String>,

    /// Persistent scratch directory for the upstream worktree.
    #[serde(default)]
    pub workdir: Option<PathBuf>,
}

impl RunConfig {
    /// Loads and parses a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Errors produced while loading the run-configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file '{}': {source}", path.display())]
    Io {
        /// Configuration file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The file is not valid JSON for [`RunConfig`].
    #[error("failed to parse config file '{}': {source}", path.display())]
    Parse {
        /// Configuration file path.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },
}
