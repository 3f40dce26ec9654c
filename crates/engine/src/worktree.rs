use std::fs;
use std::path::{Path, PathBuf};

use gitcmd::{CommitId, GitRepo};
use tempfile::TempDir;

use crate::{EngineError, EngineResult};

const WORKTREE_DIR: &str = "upstream_worktree";

/// Owns the single disposable checkout of the upstream repository.
///
/// The manager clones the upstream once into a scratch location and then
/// serves [`checkout`](Self::checkout) requests against that clone. Each
/// checkout is forced and detached, so exactly one commit's tree is live at
/// a time with no residue from previously materialized commits. The mirror
/// step copies this tree wholesale and relies on that exclusivity.
///
/// When no scratch home is supplied the clone lives in a [`TempDir`] that is
/// removed when the manager is dropped. With an explicit home, a stale
/// worktree from an earlier run is deleted before cloning.
#[derive(Debug)]
pub struct WorktreeManager {
    repo: GitRepo,
    // Keeps the temp dir alive for the manager's lifetime.
    _scratch: Option<TempDir>,
}

impl WorktreeManager {
    /// Clones `upstream` into a scratch worktree.
    ///
    /// # Errors
    ///
    /// [`EngineError::Scratch`] when the scratch location cannot be
    /// prepared, [`EngineError::Command`] when the clone fails.
    pub fn create(upstream: &Path, scratch_home: Option<&Path>) -> EngineResult<Self> {
        let (home, scratch) = match scratch_home {
            Some(home) => {
                fs::create_dir_all(home).map_err(EngineError::Scratch)?;
                (home.to_path_buf(), None)
            }
            None => {
                let temp = TempDir::new().map_err(EngineError::Scratch)?;
                (temp.path().to_path_buf(), Some(temp))
            }
        };

        let worktree = home.join(WORKTREE_DIR);
        if worktree.exists() {
            fs::remove_dir_all(&worktree).map_err(EngineError::Scratch)?;
        }
        let repo = GitRepo::clone_to(upstream, &worktree)?;
        Ok(Self {
            repo,
            _scratch: scratch,
        })
    }

    /// Makes exactly `id`'s tree live in the worktree.
    pub fn checkout(&self, id: &CommitId) -> EngineResult<()> {
        self.repo.checkout_detached(id)?;
        Ok(())
    }

    /// Root of the checked-out tree.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.repo.root()
    }

    /// Repository handle on the scratch clone.
    #[must_use]
    pub fn repo(&self) -> &GitRepo {
        &self.repo
    }

    /// Path a manager with this scratch home would clone into.
    #[must_use]
    pub fn worktree_path(scratch_home: &Path) -> PathBuf {
        scratch_home.join(WORKTREE_DIR)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use gitcmd::CommitIdentity;
    use tempfile::TempDir;

    use super::*;

    fn identity() -> CommitIdentity {
        CommitIdentity::new("Test", "test@example.com", "1700000000")
    }

    fn seed_upstream(dir: &Path) -> (GitRepo, CommitId, CommitId) {
        let repo = GitRepo::init(dir).unwrap();
        fs::write(dir.join("a.txt"), b"one\n").unwrap();
        repo.stage_all().unwrap();
        repo.commit("first", &identity(), &identity(), false).unwrap();
        let first = repo.head_id().unwrap();
        fs::write(dir.join("a.txt"), b"two\n").unwrap();
        fs::write(dir.join("b.txt"), b"b\n").unwrap();
        repo.stage_all().unwrap();
        repo.commit("second", &identity(), &identity(), false).unwrap();
        let second = repo.head_id().unwrap();
        (repo, first, second)
    }

    #[test]
    fn checkout_switches_between_whole_trees() {
        let upstream = TempDir::new().unwrap();
        let (_, first, second) = seed_upstream(upstream.path());

        let manager = WorktreeManager::create(upstream.path(), None).unwrap();

        manager.checkout(&second).unwrap();
        assert_eq!(fs::read(manager.root().join("a.txt")).unwrap(), b"two\n");
        assert!(manager.root().join("b.txt").exists());

        manager.checkout(&first).unwrap();
        assert_eq!(fs::read(manager.root().join("a.txt")).unwrap(), b"one\n");
        assert!(!manager.root().join("b.txt").exists());
    }

    #[test]
    fn explicit_scratch_home_replaces_stale_worktree() {
        let upstream = TempDir::new().unwrap();
        seed_upstream(upstream.path());

        let home = TempDir::new().unwrap();
        let stale = WorktreeManager::worktree_path(home.path());
        fs::create_dir_all(stale.join("junk")).unwrap();
        fs::write(stale.join("junk/file"), b"stale").unwrap();

        let manager = WorktreeManager::create(upstream.path(), Some(home.path())).unwrap();
        assert!(!manager.root().join("junk").exists());
        assert!(manager.root().join(".git").exists());
    }
}
