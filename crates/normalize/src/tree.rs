use std::borrow::Cow;
use std::fs;
use std::path::Path;

use tracing::warn;
use walkdir::WalkDir;

use crate::{LineEndingPolicy, NormalizeError, normalize_content};

/// Outcome counters for one whole-tree normalization pass.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct NormalizeSummary {
    examined: usize,
    rewritten: usize,
    skipped: usize,
}

impl NormalizeSummary {
    /// Regular files inspected, binaries included.
    #[must_use]
    pub fn files_examined(&self) -> usize {
        self.examined
    }

    /// Files whose bytes actually changed on disk.
    #[must_use]
    pub fn files_rewritten(&self) -> usize {
        self.rewritten
    }

    /// Files skipped because of a per-file I/O failure.
    #[must_use]
    pub fn files_skipped(&self) -> usize {
        self.skipped
    }
}

/// Normalizes line endings for every regular file below `root`.
///
/// Entries under a `.git` directory are never touched. Binary files pass
/// through unchanged, and a file is rewritten only when normalization
/// produced different bytes. Read or write failures on an individual file
/// are logged at warn level and counted in
/// [`NormalizeSummary::files_skipped`]; they do not abort the pass.
///
/// # Errors
///
/// Returns [`NormalizeError::NotADirectory`] when `root` does not name a
/// directory. Everything below that is handled per-file.
pub fn normalize_tree(
    root: &Path,
    policy: &LineEndingPolicy,
) -> Result<NormalizeSummary, NormalizeError> {
    if !root.is_dir() {
        return Err(NormalizeError::NotADirectory(root.to_path_buf()));
    }

    let mut summary = NormalizeSummary::default();
    let mut walker = WalkDir::new(root).into_iter();
    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                warn!(%error, "skipping unreadable tree entry");
                summary.skipped += 1;
                continue;
            }
        };
        if entry.file_type().is_dir() && entry.file_name() == ".git" {
            walker.skip_current_dir();
            continue;
        }
        if !entry.file_type().is_file() {
            continue;
        }

        summary.examined += 1;
        let path = entry.path();
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(error) => {
                warn!(path = %path.display(), %error, "skipping unreadable file");
                summary.skipped += 1;
                continue;
            }
        };

        let relative = path.strip_prefix(root).unwrap_or(path);
        match normalize_content(&data, relative, policy) {
            Cow::Borrowed(_) => {}
            Cow::Owned(normalized) => {
                if let Err(error) = fs::write(path, &normalized) {
                    warn!(path = %path.display(), %error, "skipping unwritable file");
                    summary.skipped += 1;
                    continue;
                }
                summary.rewritten += 1;
            }
        }
    }
    Ok(summary)
}
