//! Object-graph rewrite variant.
//!
//! The primary replay path recreates history commit by commit and can
//! resume after interruption. This module carries the alternative strategy:
//! rewriting every object of an existing repository in place through
//! commit/blob interception callbacks, the way history-rewriting tools
//! expose filtering hooks. The rewrite is a destructive one-shot with no
//! provenance markers and no partial-progress guarantee, which is why the
//! binary only wires up the replay path.
//!
//! The in-scope surface here is everything the callbacks need that the
//! replay path does not: blob callbacks receive content by identifier with
//! no filename attached, so the line-ending policy cannot be resolved
//! directly. [`BlobNameIndex`] supplies the missing association, built by a
//! first full pass over the commit sequence before any content is
//! transformed; [`RewriteContext`] bundles the index with the policy and
//! the bot identity used for tooling commits, and is passed explicitly into
//! both passes so concurrent runs and tests never share state. The rewrite
//! driver itself is an external collaborator behind [`HistoryRewriter`].

use std::borrow::Cow;
use std::path::Path;

use gitcmd::{ChangeKind, CommandError, CommitIdentity, FileChange, GitRepo, ObjectId};
use normalize::{LineEnding, LineEndingPolicy, normalize_bytes};
use rustc_hash::FxHashMap;
use tracing::debug;

/// Associates blob content identifiers with the filename that introduced
/// them.
///
/// Populated from every add/modify change of every commit, in the commits'
/// native parent-before-child order; when the same content appears under
/// several names the last writer wins. Deletions carry no content and are
/// ignored.
#[derive(Clone, Debug, Default)]
pub struct BlobNameIndex {
    names: FxHashMap<ObjectId, String>,
}

impl BlobNameIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one file-level change.
    pub fn record_change(&mut self, change: &FileChange) {
        match change.kind() {
            ChangeKind::Added | ChangeKind::Modified => {
                if let Some(blob) = change.blob() {
                    self.names.insert(blob.clone(), change.path().to_owned());
                }
            }
            ChangeKind::Deleted => {}
        }
    }

    /// Filename last observed introducing `id`, if any.
    #[must_use]
    pub fn resolve(&self, id: &ObjectId) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Number of known content identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Shared state of one rewrite run, passed explicitly into both passes.
#[derive(Clone, Debug)]
pub struct RewriteContext {
    names: BlobNameIndex,
    policy: LineEndingPolicy,
    bot: CommitIdentity,
}

impl RewriteContext {
    /// Pass one: scans the full commit sequence of `rev` and builds the
    /// blob-name association.
    ///
    /// Every commit is scanned before any content is transformed, because a
    /// blob's name may only become known through a commit later in the
    /// sequence than the first transform request for it.
    pub fn scan(
        upstream: &GitRepo,
        rev: &str,
        policy: LineEndingPolicy,
        bot: CommitIdentity,
    ) -> Result<Self, CommandError> {
        let mut names = BlobNameIndex::new();
        for id in upstream.rev_list_oldest_first(rev)? {
            for change in upstream.changed_files(&id)? {
                names.record_change(&change);
            }
        }
        debug!(blobs = names.len(), "blob-name scan complete");
        Ok(Self { names, policy, bot })
    }

    /// Builds a context from an already-populated index.
    #[must_use]
    pub fn with_index(names: BlobNameIndex, policy: LineEndingPolicy, bot: CommitIdentity) -> Self {
        Self { names, policy, bot }
    }

    /// Line ending the blob `id` should use.
    ///
    /// Unknown identifiers resolve to `LF`: content introduced through an
    /// untracked change kind must never be guessed into `CRLF`.
    #[must_use]
    pub fn resolve_ending(&self, id: &ObjectId) -> LineEnding {
        match self.names.resolve(id) {
            Some(name) => self.policy.resolve(Path::new(name)),
            None => LineEnding::Lf,
        }
    }

    /// Pass two: normalizes one blob's content by identifier.
    #[must_use]
    pub fn transform_blob<'a>(&self, id: &ObjectId, data: &'a [u8]) -> Cow<'a, [u8]> {
        normalize_bytes(data, self.resolve_ending(id))
    }

    /// Identity used for commits created by the rewrite tooling itself.
    #[must_use]
    pub fn bot_identity(&self) -> &CommitIdentity {
        &self.bot
    }

    /// The blob-name association built by pass one.
    #[must_use]
    pub fn names(&self) -> &BlobNameIndex {
        &self.names
    }
}

/// Blob interception callback handed to the rewrite driver.
pub trait BlobTransform {
    /// Returns replacement bytes for the blob, or `None` to keep it.
    fn transform(&mut self, id: &ObjectId, data: &[u8]) -> Option<Vec<u8>>;
}

impl BlobTransform for RewriteContext {
    fn transform(&mut self, id: &ObjectId, data: &[u8]) -> Option<Vec<u8>> {
        match self.transform_blob(id, data) {
            Cow::Borrowed(_) => None,
            Cow::Owned(changed) => Some(changed),
        }
    }
}

/// External driver rewriting a repository's whole object graph in place.
///
/// Implementations walk every commit and blob of `repo`, feed blob content
/// through the supplied [`BlobTransform`], and rewrite the graph with the
/// results. This is the interface of the third-party history-rewriting
/// machinery; no implementation ships in this workspace.
pub trait HistoryRewriter {
    /// Driver-specific failure type.
    type Error;

    /// Rewrites all of `repo` in place. Destructive; not resumable.
    fn rewrite_in_place(
        &mut self,
        repo: &GitRepo,
        transform: &mut dyn BlobTransform,
    ) -> Result<(), Self::Error>;
}
