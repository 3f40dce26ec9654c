use std::path::{Path, PathBuf};

use crate::{ChangeKind, CommandError, CommandRunner, CommitId, FileChange, ObjectId};

/// Unit separator used in `--format` strings so subjects containing any
/// printable character round-trip intact.
const FIELD_SEP: char = '\u{1f}';
/// Record separator between log entries.
const RECORD_SEP: char = '\u{1e}';

/// Author or committer identity attached to a created commit.
///
/// The date travels verbatim; git accepts the raw epoch-seconds form that
/// `%at` prints, so upstream timestamps survive the round trip unchanged.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommitIdentity {
    name: String,
    email: String,
    date: String,
}

impl CommitIdentity {
    /// Builds an identity from name, email, and a git-parsable date.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            date: date.into(),
        }
    }

    /// Identity name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity email.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Identity date, as supplied.
    #[must_use]
    pub fn date(&self) -> &str {
        &self.date
    }
}

/// Authorship metadata read from one upstream commit.
///
/// Immutable once observed; the engine only re-expresses these fields when
/// creating the mirrored commit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommitMetadata {
    id: CommitId,
    author_name: String,
    author_email: String,
    author_time: String,
    subject: String,
}

impl CommitMetadata {
    /// Commit this metadata belongs to.
    #[must_use]
    pub fn id(&self) -> &CommitId {
        &self.id
    }

    /// Author name.
    #[must_use]
    pub fn author_name(&self) -> &str {
        &self.author_name
    }

    /// Author email.
    #[must_use]
    pub fn author_email(&self) -> &str {
        &self.author_email
    }

    /// Author timestamp in epoch seconds, as printed by `%at`.
    #[must_use]
    pub fn author_time(&self) -> &str {
        &self.author_time
    }

    /// Subject line.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The author expressed as a [`CommitIdentity`].
    #[must_use]
    pub fn author_identity(&self) -> CommitIdentity {
        CommitIdentity::new(&self.author_name, &self.author_email, &self.author_time)
    }
}

/// Handle on one git repository, bare or with a work tree.
///
/// All operations shell out through [`CommandRunner`]; the handle itself
/// holds nothing but the root path.
#[derive(Clone, Debug)]
pub struct GitRepo {
    root: PathBuf,
    runner: CommandRunner,
}

impl GitRepo {
    /// Wraps an existing repository root. No validation is performed; the
    /// first command run against a non-repository fails with git's own
    /// diagnostic.
    #[must_use]
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            runner: CommandRunner::new(),
        }
    }

    /// Initializes a fresh repository at `root`.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self, CommandError> {
        let repo = Self::open(root);
        repo.runner.run(&repo.root, ["git", "init", "--quiet"])?;
        Ok(repo)
    }

    /// Clones `source` into `dest` and returns a handle on the clone.
    ///
    /// `--no-hardlinks` keeps the clone independent of the source object
    /// store, since the clone is a disposable scratch copy that outlives no
    /// run.
    pub fn clone_to(source: &Path, dest: &Path) -> Result<Self, CommandError> {
        let runner = CommandRunner::new();
        runner.run(
            Path::new("."),
            [
                Path::new("git").as_os_str(),
                "clone".as_ref(),
                "--quiet".as_ref(),
                "--no-hardlinks".as_ref(),
                source.as_os_str(),
                dest.as_os_str(),
            ],
        )?;
        Ok(Self {
            root: dest.to_path_buf(),
            runner,
        })
    }

    /// Repository root path.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lists commit ids reachable from `rev`, oldest first.
    ///
    /// The returned order is git's reverse rev-list order, i.e. causal
    /// (parent-before-child) order. The sequence is fixed at the moment this
    /// call returns; later mutations of the repository do not affect it.
    pub fn rev_list_oldest_first(&self, rev: &str) -> Result<Vec<CommitId>, CommandError> {
        let out = self
            .runner
            .output(&self.root, ["git", "rev-list", "--reverse", rev])?;
        Ok(out.lines().map(CommitId::from).collect())
    }

    /// Reads author name, email, timestamp, and subject for one commit.
    pub fn commit_metadata(&self, id: &CommitId) -> Result<CommitMetadata, CommandError> {
        let format = format!("--format=%an{FIELD_SEP}%ae{FIELD_SEP}%at{FIELD_SEP}%s");
        let out = self.runner.output(
            &self.root,
            ["git", "show", "-s", format.as_str(), id.as_str()],
        )?;
        let line = out.trim_end_matches('\n');
        let fields: Vec<&str> = line.split(FIELD_SEP).collect();
        if fields.len() != 4 {
            return Err(CommandError::UnexpectedOutput {
                command: format!("git show -s {id}"),
                detail: format!("expected 4 metadata fields, got {}", fields.len()),
            });
        }
        Ok(CommitMetadata {
            id: id.clone(),
            author_name: fields[0].to_owned(),
            author_email: fields[1].to_owned(),
            author_time: fields[2].to_owned(),
            subject: fields[3].to_owned(),
        })
    }

    /// Lists the file-level changes introduced by one commit.
    ///
    /// Rename and copy detection are disabled so every change is reported as
    /// plain add/modify/delete, matching the resolver's bookkeeping model.
    /// Merge commits report no changes; their trees introduce no new blobs
    /// that did not arrive through a parent.
    pub fn changed_files(&self, id: &CommitId) -> Result<Vec<FileChange>, CommandError> {
        let out = self.runner.output(
            &self.root,
            [
                "git",
                "diff-tree",
                "-r",
                "--root",
                "--no-renames",
                "--no-commit-id",
                "-z",
                id.as_str(),
            ],
        )?;
        parse_raw_changes(&out).map_err(|detail| CommandError::UnexpectedOutput {
            command: format!("git diff-tree {id}"),
            detail,
        })
    }

    /// Checks out `id` as a detached work tree, discarding local changes.
    pub fn checkout_detached(&self, id: &CommitId) -> Result<(), CommandError> {
        self.runner.run(
            &self.root,
            [
                "git",
                "-c",
                "advice.detachedHead=false",
                "checkout",
                "--force",
                "--quiet",
                id.as_str(),
            ],
        )
    }

    /// Stages every addition, modification, and deletion in the work tree.
    pub fn stage_all(&self) -> Result<(), CommandError> {
        self.runner.run(&self.root, ["git", "add", "-A"])
    }

    /// Creates a commit from the staged state.
    ///
    /// Identity travels through the environment, never through repository
    /// configuration. `allow_empty` preserves upstream commits whose entire
    /// change set was filtered away.
    pub fn commit(
        &self,
        message: &str,
        author: &CommitIdentity,
        committer: &CommitIdentity,
        allow_empty: bool,
    ) -> Result<(), CommandError> {
        let mut argv = vec!["git", "commit", "--quiet"];
        if allow_empty {
            argv.push("--allow-empty");
        }
        argv.extend(["-m", message]);
        self.runner.run_with_env(
            &self.root,
            argv,
            &[
                ("GIT_AUTHOR_NAME", author.name()),
                ("GIT_AUTHOR_EMAIL", author.email()),
                ("GIT_AUTHOR_DATE", author.date()),
                ("GIT_COMMITTER_NAME", committer.name()),
                ("GIT_COMMITTER_EMAIL", committer.email()),
                ("GIT_COMMITTER_DATE", committer.date()),
            ],
        )
    }

    /// Resolves `HEAD` to a commit id.
    pub fn head_id(&self) -> Result<CommitId, CommandError> {
        let out = self
            .runner
            .output(&self.root, ["git", "rev-parse", "HEAD"])?;
        Ok(CommitId::new(out.trim()))
    }

    /// Returns `true` when the root lies inside a git repository.
    pub fn is_repository(&self) -> Result<bool, CommandError> {
        self.runner
            .probe(&self.root, ["git", "rev-parse", "--git-dir"])
    }

    /// Returns `true` when the repository has at least one commit.
    pub fn has_commits(&self) -> Result<bool, CommandError> {
        self.runner.probe(
            &self.root,
            ["git", "rev-parse", "--verify", "--quiet", "HEAD"],
        )
    }

    /// Returns `true` when some reachable commit message contains `needle`
    /// as a fixed string.
    pub fn log_contains(&self, needle: &str) -> Result<bool, CommandError> {
        if !self.has_commits()? {
            return Ok(false);
        }
        let grep = format!("--grep={needle}");
        let out = self.runner.output(
            &self.root,
            [
                "git",
                "log",
                "--fixed-strings",
                grep.as_str(),
                "--format=%H",
            ],
        )?;
        Ok(!out.trim().is_empty())
    }

    /// Lists every reachable commit with its full message, newest first.
    ///
    /// Returns an empty list for a repository without commits, so callers
    /// can bootstrap a brand-new target without special cases.
    pub fn log_with_messages(&self) -> Result<Vec<(CommitId, String)>, CommandError> {
        if !self.has_commits()? {
            return Ok(Vec::new());
        }
        let format = format!("--format=%H{FIELD_SEP}%B{RECORD_SEP}");
        let out = self
            .runner
            .output(&self.root, ["git", "log", format.as_str()])?;
        let mut entries = Vec::new();
        for record in out.split(RECORD_SEP) {
            let record = record.trim_start_matches('\n');
            if record.is_empty() {
                continue;
            }
            let Some((id, message)) = record.split_once(FIELD_SEP) else {
                return Err(CommandError::UnexpectedOutput {
                    command: "git log".to_owned(),
                    detail: "log record without field separator".to_owned(),
                });
            };
            entries.push((CommitId::new(id), message.to_owned()));
        }
        Ok(entries)
    }
}

/// Parses `git diff-tree -z` raw output into change records.
fn parse_raw_changes(out: &str) -> Result<Vec<FileChange>, String> {
    const NULL_OBJECT: &str = "0000000000000000000000000000000000000000";

    let mut changes = Vec::new();
    let mut tokens = out.split('\0');
    while let Some(meta) = tokens.next() {
        if meta.is_empty() {
            continue;
        }
        let Some(meta) = meta.strip_prefix(':') else {
            return Err(format!("malformed raw record '{meta}'"));
        };
        let fields: Vec<&str> = meta.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(format!("expected 5 raw fields, got {}", fields.len()));
        }
        let path = tokens
            .next()
            .ok_or_else(|| "raw record without path".to_owned())?;
        let kind = match fields[4].chars().next() {
            Some('A') => ChangeKind::Added,
            Some('D') => ChangeKind::Deleted,
            Some('M' | 'T') => ChangeKind::Modified,
            other => return Err(format!("unexpected change status {other:?}")),
        };
        let blob = match kind {
            ChangeKind::Deleted => None,
            ChangeKind::Added | ChangeKind::Modified => {
                let dst = fields[3];
                (!dst.starts_with(NULL_OBJECT)).then(|| ObjectId::new(dst))
            }
        };
        changes.push(FileChange::new(path, kind, blob));
    }
    Ok(changes)
}
