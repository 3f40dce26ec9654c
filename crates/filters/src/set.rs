use std::path::Path;

use crate::FilterSetError;

/// Ordered set of path prefixes excluded from the mirror.
///
/// Each prefix is stored without a trailing slash; a candidate path is
/// excluded when it equals a prefix byte-for-byte or starts with the prefix
/// followed by `/`. This keeps the match a plain byte comparison while still
/// treating prefixes as whole components, so `tests/` can never swallow
/// `tests-extra/`.
///
/// The set is immutable once built. Construction order is preserved but has
/// no effect on matching; exclusion rules only ever widen the excluded set.
///
/// # Examples
///
/// ```
/// use filters::PathFilterSet;
/// use std::path::Path;
///
/// let set = PathFilterSet::from_prefixes(["vendor/"]).unwrap();
/// assert!(set.excluded(Path::new("vendor")));
/// assert!(set.excluded(Path::new("vendor/lib/a.c")));
/// assert!(!set.excluded(Path::new("vendored/lib/a.c")));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathFilterSet {
    prefixes: Vec<String>,
}

impl PathFilterSet {
    /// Builds a filter set from the supplied prefixes.
    ///
    /// Trailing slashes are stripped; `tests/` and `tests` configure the
    /// same rule. Interior slashes are kept verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`FilterSetError::EmptyPrefix`] when a prefix is empty or
    /// consists only of slashes, and [`FilterSetError::AbsolutePrefix`] when
    /// a prefix starts with `/`.
    pub fn from_prefixes<I, S>(prefixes: I) -> Result<Self, FilterSetError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut normalized = Vec::new();
        for prefix in prefixes {
            let prefix = prefix.into();
            if prefix.starts_with('/') {
                return Err(FilterSetError::AbsolutePrefix(prefix));
            }
            let trimmed = prefix.trim_end_matches('/');
            if trimmed.is_empty() {
                return Err(FilterSetError::EmptyPrefix);
            }
            normalized.push(trimmed.to_owned());
        }
        Ok(Self {
            prefixes: normalized,
        })
    }

    /// Returns `true` when `path` is excluded by one of the configured
    /// prefixes.
    ///
    /// `path` must be relative to the mirrored tree root. Comparison is
    /// performed on the `/`-joined component bytes, so callers may pass
    /// native [`Path`] values directly.
    #[must_use]
    pub fn excluded(&self, path: &Path) -> bool {
        if self.prefixes.is_empty() {
            return false;
        }
        let joined = join_components(path);
        self.prefixes.iter().any(|prefix| {
            let p = prefix.as_bytes();
            let c = joined.as_slice();
            c == p || (c.len() > p.len() && c.starts_with(p) && c[p.len()] == b'/')
        })
    }

    /// Returns `true` when no prefixes are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// Number of configured prefixes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    /// Iterates over the normalized prefixes in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.prefixes.iter().map(String::as_str)
    }
}

/// Joins the components of `path` with `/`, dropping `.` segments.
///
/// Windows-style separators in the input are handled by [`Path`]'s component
/// iteration, so `a\b` and `a/b` compare equal where the platform treats
/// them as equal.
fn join_components(path: &Path) -> Vec<u8> {
    let mut joined = Vec::with_capacity(path.as_os_str().len());
    for component in path.components() {
        if component.as_os_str() == "." {
            continue;
        }
        if !joined.is_empty() {
            joined.push(b'/');
        }
        joined.extend_from_slice(component.as_os_str().as_encoded_bytes());
    }
    joined
}
