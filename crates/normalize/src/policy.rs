use std::path::Path;

/// Line terminator a file should use after normalization.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LineEnding {
    /// Carriage return + line feed (`\r\n`).
    Crlf,
    /// Bare line feed (`\n`).
    Lf,
}

/// Static filename table selecting the line terminator for a path.
///
/// Resolution checks the basename against an exact-match list, then the
/// filename against a suffix list; any hit selects [`LineEnding::Crlf`] and
/// everything else resolves to [`LineEnding::Lf`]. The defaults mirror the
/// files MSVC tooling insists on editing with `CRLF` terminators:
///
/// ```
/// use normalize::{LineEnding, LineEndingPolicy};
/// use std::path::Path;
///
/// let policy = LineEndingPolicy::default();
/// assert_eq!(policy.resolve(Path::new("x/CMakeLists.txt")), LineEnding::Crlf);
/// assert_eq!(policy.resolve(Path::new("proj/app.vcxproj")), LineEnding::Crlf);
/// assert_eq!(policy.resolve(Path::new("README.md")), LineEnding::Lf);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineEndingPolicy {
    crlf_basenames: Vec<String>,
    crlf_suffixes: Vec<String>,
}

const DEFAULT_CRLF_BASENAMES: &[&str] = &["CMakeLists.txt"];
const DEFAULT_CRLF_SUFFIXES: &[&str] = &[".sln", ".vcxproj", ".vcxproj.filters", ".props"];

impl Default for LineEndingPolicy {
    fn default() -> Self {
        Self {
            crlf_basenames: DEFAULT_CRLF_BASENAMES
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            crlf_suffixes: DEFAULT_CRLF_SUFFIXES
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
        }
    }
}

impl LineEndingPolicy {
    /// Policy with an empty table; every filename resolves to `LF`.
    #[must_use]
    pub fn lf_only() -> Self {
        Self {
            crlf_basenames: Vec::new(),
            crlf_suffixes: Vec::new(),
        }
    }

    /// Adds basenames that resolve to `CRLF` on top of the current table.
    #[must_use]
    pub fn with_crlf_basenames<I, S>(mut self, basenames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.crlf_basenames.extend(basenames.into_iter().map(Into::into));
        self
    }

    /// Adds filename suffixes that resolve to `CRLF` on top of the current
    /// table.
    #[must_use]
    pub fn with_crlf_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.crlf_suffixes.extend(suffixes.into_iter().map(Into::into));
        self
    }

    /// Resolves the terminator for `path`.
    ///
    /// Paths without a resolvable filename (for example `..`) resolve to
    /// `LF`; nothing in the table can match them.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> LineEnding {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return LineEnding::Lf;
        };
        if self.crlf_basenames.iter().any(|b| b == name) {
            return LineEnding::Crlf;
        }
        if self.crlf_suffixes.iter().any(|s| name.ends_with(s.as_str())) {
            return LineEnding::Crlf;
        }
        LineEnding::Lf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_matches_msvc_formats() {
        let policy = LineEndingPolicy::default();
        for name in [
            "CMakeLists.txt",
            "code/CMakeLists.txt",
            "app.sln",
            "code/win32/app.vcxproj",
            "code/win32/app.vcxproj.filters",
            "build/common.props",
        ] {
            assert_eq!(policy.resolve(Path::new(name)), LineEnding::Crlf, "{name}");
        }
    }

    #[test]
    fn everything_else_resolves_to_lf() {
        let policy = LineEndingPolicy::default();
        for name in ["README.md", "src/main.c", "CMakeLists.txt.in", "slnfile"] {
            assert_eq!(policy.resolve(Path::new(name)), LineEnding::Lf, "{name}");
        }
    }

    #[test]
    fn basename_match_is_exact_not_suffix() {
        let policy = LineEndingPolicy::default();
        assert_eq!(
            policy.resolve(Path::new("NotCMakeLists.txt")),
            LineEnding::Lf
        );
    }

    #[test]
    fn extended_table_applies_after_defaults() {
        let policy = LineEndingPolicy::default()
            .with_crlf_basenames(["Makefile.win"])
            .with_crlf_suffixes([".bat"]);
        assert_eq!(policy.resolve(Path::new("Makefile.win")), LineEnding::Crlf);
        assert_eq!(policy.resolve(Path::new("run.bat")), LineEnding::Crlf);
        assert_eq!(policy.resolve(Path::new("Makefile")), LineEnding::Lf);
    }
}
