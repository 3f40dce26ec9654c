use crate::ObjectId;

/// How a path changed within one commit.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChangeKind {
    /// The path did not exist in the parent tree.
    Added,
    /// The path existed and its content (or mode) changed.
    Modified,
    /// The path existed in the parent tree and was removed.
    Deleted,
}

/// One file-level change scoped to a single commit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileChange {
    path: String,
    kind: ChangeKind,
    blob: Option<ObjectId>,
}

impl FileChange {
    /// Builds a change record. `blob` is the post-change content identifier
    /// and is absent for deletions.
    #[must_use]
    pub fn new(path: impl Into<String>, kind: ChangeKind, blob: Option<ObjectId>) -> Self {
        Self {
            path: path.into(),
            kind,
            blob,
        }
    }

    /// Path relative to the repository root.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Change kind.
    #[must_use]
    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    /// Content identifier introduced by this change, absent for deletions.
    #[must_use]
    pub fn blob(&self) -> Option<&ObjectId> {
        self.blob.as_ref()
    }
}
