use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::Path;

use filters::PathFilterSet;
use walkdir::WalkDir;

use crate::{EngineError, EngineResult};

/// Behavioural switches for the full-replace tree mirror.
#[derive(Clone, Debug)]
pub struct MirrorOptions {
    preserved_roots: Vec<OsString>,
}

impl Default for MirrorOptions {
    /// Preserves the target's own control metadata: its history (`.git`)
    /// and its CI configuration (`.github`), neither of which may be
    /// overwritten or deleted by the mirror sweep.
    fn default() -> Self {
        Self {
            preserved_roots: vec![OsString::from(".git"), OsString::from(".github")],
        }
    }
}

impl MirrorOptions {
    /// Replaces the preserved top-level entries.
    #[must_use]
    pub fn with_preserved_roots<I, S>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.preserved_roots = roots.into_iter().map(Into::into).collect();
        self
    }

    fn is_preserved(&self, entry: &walkdir::DirEntry) -> bool {
        entry.depth() == 1
            && self
                .preserved_roots
                .iter()
                .any(|root| root.as_os_str() == entry.file_name())
    }
}

/// Outcome counters for one mirror pass.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MirrorSummary {
    copied: usize,
    unchanged: usize,
    deleted: usize,
}

impl MirrorSummary {
    /// Files and links written into the target.
    #[must_use]
    pub fn entries_copied(&self) -> usize {
        self.copied
    }

    /// Files found already byte-identical and left alone.
    #[must_use]
    pub fn entries_unchanged(&self) -> usize {
        self.unchanged
    }

    /// Target entries removed because they are absent upstream or excluded.
    #[must_use]
    pub fn entries_deleted(&self) -> usize {
        self.deleted
    }
}

/// Mirrors `source` into `dest` as a full-replace operation.
///
/// After this returns, `dest` contains exactly the non-excluded content of
/// `source`: missing files are copied, differing files overwritten, and
/// anything present in `dest` but absent from `source` (or matching an
/// exclusion prefix) is deleted, except the preserved control roots from
/// [`MirrorOptions`], which are never copied into nor removed. Excluded
/// directories are pruned from the walk, so their contents are never read.
///
/// The source side's own `.git` is skipped via the same preserved-root
/// mechanism: the worktree's repository state must not leak into the
/// target.
///
/// # Errors
///
/// Any I/O failure is structural and surfaces as
/// [`EngineError::MirrorIo`]; a half-mirrored target is left for the caller
/// to abandon (the next run re-mirrors from scratch before committing).
pub fn mirror_tree(
    source: &Path,
    dest: &Path,
    filters: &PathFilterSet,
    options: &MirrorOptions,
) -> EngineResult<MirrorSummary> {
    let mut summary = MirrorSummary::default();
    copy_sweep(source, dest, filters, options, &mut summary)?;
    delete_sweep(source, dest, filters, options, &mut summary)?;
    Ok(summary)
}

fn copy_sweep(
    source: &Path,
    dest: &Path,
    filters: &PathFilterSet,
    options: &MirrorOptions,
    summary: &mut MirrorSummary,
) -> EngineResult<()> {
    let mut walker = WalkDir::new(source).min_depth(1).into_iter();
    while let Some(entry) = walker.next() {
        let entry = entry.map_err(|e| walk_error(e, source))?;
        if options.is_preserved(&entry) {
            if entry.file_type().is_dir() {
                walker.skip_current_dir();
            }
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(source)
            .map_err(|_| mirror_io(entry.path(), io::Error::other("entry escaped source root")))?;
        if filters.excluded(rel) {
            if entry.file_type().is_dir() {
                walker.skip_current_dir();
            }
            continue;
        }

        let target = dest.join(rel);
        if entry.file_type().is_dir() {
            if let Ok(meta) = fs::symlink_metadata(&target) {
                if !meta.is_dir() {
                    fs::remove_file(&target).map_err(|e| mirror_io(&target, e))?;
                }
            }
            fs::create_dir_all(&target).map_err(|e| mirror_io(&target, e))?;
        } else if entry.file_type().is_symlink() {
            copy_symlink(entry.path(), &target, summary)?;
        } else {
            copy_file(entry.path(), &target, summary)?;
        }
    }
    Ok(())
}

fn delete_sweep(
    source: &Path,
    dest: &Path,
    filters: &PathFilterSet,
    options: &MirrorOptions,
    summary: &mut MirrorSummary,
) -> EngineResult<()> {
    let mut walker = WalkDir::new(dest).min_depth(1).into_iter();
    while let Some(entry) = walker.next() {
        let entry = entry.map_err(|e| walk_error(e, dest))?;
        if options.is_preserved(&entry) {
            if entry.file_type().is_dir() {
                walker.skip_current_dir();
            }
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(dest)
            .map_err(|_| mirror_io(entry.path(), io::Error::other("entry escaped target root")))?;

        let stale = filters.excluded(rel) || fs::symlink_metadata(source.join(rel)).is_err();
        if !stale {
            continue;
        }
        if entry.file_type().is_dir() {
            fs::remove_dir_all(entry.path()).map_err(|e| mirror_io(entry.path(), e))?;
            walker.skip_current_dir();
        } else {
            fs::remove_file(entry.path()).map_err(|e| mirror_io(entry.path(), e))?;
        }
        summary.deleted += 1;
    }
    Ok(())
}

fn copy_file(src: &Path, dst: &Path, summary: &mut MirrorSummary) -> EngineResult<()> {
    if let Ok(meta) = fs::symlink_metadata(dst) {
        if meta.is_dir() {
            fs::remove_dir_all(dst).map_err(|e| mirror_io(dst, e))?;
        } else if meta.is_file() && files_equal(src, dst)? {
            // Content matches; still align the mode in case only the
            // executable bit changed upstream.
            let perms = fs::metadata(src)
                .map_err(|e| mirror_io(src, e))?
                .permissions();
            fs::set_permissions(dst, perms).map_err(|e| mirror_io(dst, e))?;
            summary.unchanged += 1;
            return Ok(());
        } else if meta.is_symlink() {
            fs::remove_file(dst).map_err(|e| mirror_io(dst, e))?;
        }
    }
    fs::copy(src, dst).map_err(|e| mirror_io(dst, e))?;
    summary.copied += 1;
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path, summary: &mut MirrorSummary) -> EngineResult<()> {
    let link = fs::read_link(src).map_err(|e| mirror_io(src, e))?;
    match fs::symlink_metadata(dst) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(dst).map_err(|e| mirror_io(dst, e))?,
        Ok(_) => fs::remove_file(dst).map_err(|e| mirror_io(dst, e))?,
        Err(_) => {}
    }
    std::os::unix::fs::symlink(&link, dst).map_err(|e| mirror_io(dst, e))?;
    summary.copied += 1;
    Ok(())
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, _dst: &Path, _summary: &mut MirrorSummary) -> EngineResult<()> {
    tracing::warn!(path = %src.display(), "symlink mirroring is not supported on this platform");
    Ok(())
}

fn files_equal(a: &Path, b: &Path) -> EngineResult<bool> {
    let meta_a = fs::metadata(a).map_err(|e| mirror_io(a, e))?;
    let meta_b = fs::metadata(b).map_err(|e| mirror_io(b, e))?;
    if meta_a.len() != meta_b.len() {
        return Ok(false);
    }
    let bytes_a = fs::read(a).map_err(|e| mirror_io(a, e))?;
    let bytes_b = fs::read(b).map_err(|e| mirror_io(b, e))?;
    Ok(bytes_a == bytes_b)
}

fn mirror_io(path: &Path, source: io::Error) -> EngineError {
    EngineError::MirrorIo {
        path: path.to_path_buf(),
        source,
    }
}

fn walk_error(error: walkdir::Error, fallback: &Path) -> EngineError {
    let path = error
        .path()
        .map_or_else(|| fallback.to_path_buf(), Path::to_path_buf);
    EngineError::MirrorIo {
        path,
        source: error.into(),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn filters(prefixes: &[&str]) -> PathFilterSet {
        PathFilterSet::from_prefixes(prefixes.iter().copied()).unwrap()
    }

    #[test]
    fn mirrors_files_and_directories() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::create_dir_all(src.path().join("code/sub")).unwrap();
        fs::write(src.path().join("top.txt"), b"top").unwrap();
        fs::write(src.path().join("code/sub/deep.txt"), b"deep").unwrap();

        let summary = mirror_tree(
            src.path(),
            dst.path(),
            &PathFilterSet::default(),
            &MirrorOptions::default(),
        )
        .unwrap();

        assert_eq!(summary.entries_copied(), 2);
        assert_eq!(fs::read(dst.path().join("top.txt")).unwrap(), b"top");
        assert_eq!(
            fs::read(dst.path().join("code/sub/deep.txt")).unwrap(),
            b"deep"
        );
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::write(src.path().join("a.txt"), b"a").unwrap();

        let options = MirrorOptions::default();
        mirror_tree(src.path(), dst.path(), &PathFilterSet::default(), &options).unwrap();
        let summary =
            mirror_tree(src.path(), dst.path(), &PathFilterSet::default(), &options).unwrap();

        assert_eq!(summary.entries_copied(), 0);
        assert_eq!(summary.entries_unchanged(), 1);
        assert_eq!(summary.entries_deleted(), 0);
    }

    #[test]
    fn deletes_entries_absent_from_source() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::write(src.path().join("keep.txt"), b"keep").unwrap();
        fs::write(dst.path().join("keep.txt"), b"old").unwrap();
        fs::create_dir(dst.path().join("gone")).unwrap();
        fs::write(dst.path().join("gone/file.txt"), b"x").unwrap();

        let summary = mirror_tree(
            src.path(),
            dst.path(),
            &PathFilterSet::default(),
            &MirrorOptions::default(),
        )
        .unwrap();

        assert!(!dst.path().join("gone").exists());
        assert_eq!(fs::read(dst.path().join("keep.txt")).unwrap(), b"keep");
        assert_eq!(summary.entries_deleted(), 1);
    }

    #[test]
    fn excluded_prefixes_are_never_copied_and_are_removed() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::create_dir(src.path().join("tests")).unwrap();
        fs::write(src.path().join("tests/t.c"), b"t").unwrap();
        fs::write(src.path().join("main.c"), b"m").unwrap();
        // Stale excluded content already present in the target.
        fs::create_dir(dst.path().join("tests")).unwrap();
        fs::write(dst.path().join("tests/old.c"), b"old").unwrap();

        mirror_tree(
            src.path(),
            dst.path(),
            &filters(&["tests/"]),
            &MirrorOptions::default(),
        )
        .unwrap();

        assert!(dst.path().join("main.c").exists());
        assert!(!dst.path().join("tests").exists());
    }

    #[test]
    fn preserved_roots_survive_both_sweeps() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        // Source-side control dirs must not be copied.
        fs::create_dir(src.path().join(".git")).unwrap();
        fs::write(src.path().join(".git/HEAD"), b"ref").unwrap();
        fs::write(src.path().join("file.txt"), b"f").unwrap();
        // Target-side control dirs must not be deleted.
        fs::create_dir(dst.path().join(".git")).unwrap();
        fs::write(dst.path().join(".git/config"), b"cfg").unwrap();
        fs::create_dir(dst.path().join(".github")).unwrap();
        fs::write(dst.path().join(".github/workflow.yml"), b"ci").unwrap();

        mirror_tree(
            src.path(),
            dst.path(),
            &PathFilterSet::default(),
            &MirrorOptions::default(),
        )
        .unwrap();

        assert_eq!(fs::read(dst.path().join(".git/config")).unwrap(), b"cfg");
        assert_eq!(
            fs::read(dst.path().join(".github/workflow.yml")).unwrap(),
            b"ci"
        );
        assert!(!dst.path().join(".git/HEAD").exists());
    }

    #[test]
    fn overwrites_differing_content() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::write(src.path().join("a.txt"), b"new").unwrap();
        fs::write(dst.path().join("a.txt"), b"old bytes").unwrap();

        let summary = mirror_tree(
            src.path(),
            dst.path(),
            &PathFilterSet::default(),
            &MirrorOptions::default(),
        )
        .unwrap();

        assert_eq!(summary.entries_copied(), 1);
        assert_eq!(fs::read(dst.path().join("a.txt")).unwrap(), b"new");
    }

    #[cfg(unix)]
    #[test]
    fn mirrors_symlinks_as_symlinks() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::write(src.path().join("real.txt"), b"real").unwrap();
        std::os::unix::fs::symlink("real.txt", src.path().join("link.txt")).unwrap();

        mirror_tree(
            src.path(),
            dst.path(),
            &PathFilterSet::default(),
            &MirrorOptions::default(),
        )
        .unwrap();

        let link = dst.path().join("link.txt");
        assert!(fs::symlink_metadata(&link).unwrap().is_symlink());
        assert_eq!(fs::read_link(&link).unwrap().as_os_str(), "real.txt");
    }
}
