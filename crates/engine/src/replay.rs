use std::path::PathBuf;

use filters::PathFilterSet;
use gitcmd::{CommitId, GitRepo};
use normalize::{LineEndingPolicy, normalize_tree};
use tracing::info;

use crate::{
    EngineError, EngineResult, MirrorOptions, ProvenanceIndex, WorktreeManager, commit_message,
    mirror_tree,
};

/// Configuration of one replay run.
///
/// Built from the two repository paths plus optional adjustments, in the
/// builder style used across the workspace:
///
/// ```no_run
/// use engine::{ReplayEngine, ReplayOptions};
/// use filters::PathFilterSet;
///
/// let options = ReplayOptions::new("/srv/upstream", "/srv/mirror")
///     .with_filters(PathFilterSet::from_prefixes(["tests/"]).unwrap())
///     .with_branch("main");
/// let summary = ReplayEngine::new(options).run().unwrap();
/// println!("replayed {}", summary.commits_replayed());
/// ```
#[derive(Clone, Debug)]
pub struct ReplayOptions {
    upstream: PathBuf,
    target: PathBuf,
    branch: String,
    stop_at: Option<CommitId>,
    scratch_home: Option<PathBuf>,
    filters: PathFilterSet,
    policy: LineEndingPolicy,
    mirror: MirrorOptions,
    dry_run: bool,
}

impl ReplayOptions {
    /// Creates options for mirroring `upstream` into `target`.
    #[must_use]
    pub fn new(upstream: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            upstream: upstream.into(),
            target: target.into(),
            branch: "HEAD".to_owned(),
            stop_at: None,
            scratch_home: None,
            filters: PathFilterSet::default(),
            policy: LineEndingPolicy::default(),
            mirror: MirrorOptions::default(),
            dry_run: false,
        }
    }

    /// Upstream ref whose history is enumerated. Defaults to `HEAD`.
    #[must_use]
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Stops after replaying (or skipping) the given commit.
    #[must_use]
    pub fn with_stop_at(mut self, stop_at: Option<CommitId>) -> Self {
        self.stop_at = stop_at;
        self
    }

    /// Uses a persistent scratch directory instead of a temp dir.
    #[must_use]
    pub fn with_scratch_home(mut self, home: Option<PathBuf>) -> Self {
        self.scratch_home = home;
        self
    }

    /// Path prefixes excluded from the mirror.
    #[must_use]
    pub fn with_filters(mut self, filters: PathFilterSet) -> Self {
        self.filters = filters;
        self
    }

    /// Line-ending policy applied after mirroring.
    #[must_use]
    pub fn with_policy(mut self, policy: LineEndingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Mirror behaviour (preserved control roots).
    #[must_use]
    pub fn with_mirror_options(mut self, mirror: MirrorOptions) -> Self {
        self.mirror = mirror;
        self
    }

    /// Logs every decision without touching the target.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Outcome counters for one replay run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RunSummary {
    replayed: usize,
    skipped: usize,
}

impl RunSummary {
    /// Commits newly created in the target (or, in a dry run, that would
    /// have been created).
    #[must_use]
    pub fn commits_replayed(&self) -> usize {
        self.replayed
    }

    /// Commits skipped because their marker already exists in the target.
    #[must_use]
    pub fn commits_skipped(&self) -> usize {
        self.skipped
    }
}

/// Sequential replay of upstream history into the target repository.
///
/// One run proceeds commit by commit through a sequence fixed at start:
/// enumerate, then per commit either skip (provenance marker already
/// present) or materialize, filter, normalize, stage, and commit.
/// Authorship is preserved verbatim: author and committer identity of the
/// mirrored commit are the upstream author's name, email, and timestamp,
/// and every mirrored commit ends with the `Upstream: <id>` marker line.
///
/// Any structural failure aborts the run immediately. Because each target
/// commit is complete before the next upstream commit is touched, an
/// aborted run leaves a consistent target and the next run resumes where it
/// stopped.
#[derive(Debug)]
pub struct ReplayEngine {
    options: ReplayOptions,
}

impl ReplayEngine {
    /// Creates an engine for the given options.
    #[must_use]
    pub fn new(options: ReplayOptions) -> Self {
        Self { options }
    }

    /// Runs the replay to completion.
    ///
    /// # Errors
    ///
    /// Structural failures ([`EngineError`]) abort the run: clone or
    /// checkout failures, mirror I/O, staging or commit failures, and a
    /// configured stop commit that never appears in the enumerated history.
    pub fn run(&self) -> EngineResult<RunSummary> {
        let options = &self.options;
        let target = GitRepo::open(&options.target);
        if !target.is_repository()? {
            return Err(EngineError::TargetNotARepository(options.target.clone()));
        }

        let worktree = WorktreeManager::create(&options.upstream, options.scratch_home.as_deref())?;
        let commits = enumerate(worktree.repo(), &options.branch, options.stop_at.as_ref())?;
        let index = ProvenanceIndex::load(&target)?;
        info!(
            commits = commits.len(),
            known = index.len(),
            "starting replay"
        );

        let mut summary = RunSummary::default();
        for id in &commits {
            let meta = worktree.repo().commit_metadata(id)?;
            if index.already_replayed(id) {
                info!(id = %id.short(), subject = %meta.subject(), "skipping already mirrored commit");
                summary.skipped += 1;
                continue;
            }

            info!(id = %id.short(), subject = %meta.subject(), "replaying commit");
            summary.replayed += 1;
            if options.dry_run {
                continue;
            }

            worktree.checkout(id)?;
            mirror_tree(
                worktree.root(),
                &options.target,
                &options.filters,
                &options.mirror,
            )?;
            normalize_tree(&options.target, &options.policy)?;
            target.stage_all()?;

            let author = meta.author_identity();
            target.commit(&commit_message(meta.subject(), id), &author, &author, true)?;
        }

        info!(
            replayed = summary.replayed,
            skipped = summary.skipped,
            "replay finished"
        );
        Ok(summary)
    }
}

/// Fixes the ordered commit sequence for the run, truncating after the
/// optional stop commit.
fn enumerate(
    upstream: &GitRepo,
    branch: &str,
    stop_at: Option<&CommitId>,
) -> EngineResult<Vec<CommitId>> {
    let mut commits = upstream.rev_list_oldest_first(branch)?;
    if let Some(stop) = stop_at {
        match commits.iter().position(|id| id == stop) {
            Some(position) => commits.truncate(position + 1),
            None => return Err(EngineError::StopCommitNotFound(stop.clone())),
        }
    }
    Ok(commits)
}
