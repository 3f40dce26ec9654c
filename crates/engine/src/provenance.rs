use gitcmd::{CommandError, CommitId, GitRepo};
use rustc_hash::FxHashMap;

/// Prefix of the provenance marker embedded in every mirrored commit.
const MARKER_PREFIX: &str = "Upstream: ";

/// Renders the marker line recorded for `id`.
#[must_use]
pub fn marker_line(id: &CommitId) -> String {
    format!("{MARKER_PREFIX}{id}")
}

/// Builds the full message of a mirrored commit: the upstream subject, a
/// blank line, and the marker as the final line.
#[must_use]
pub fn commit_message(subject: &str, id: &CommitId) -> String {
    format!("{subject}\n\n{}", marker_line(id))
}

/// Extracts the upstream id from a mirrored commit message, if present.
///
/// The writer puts the marker on the final line; the parser accepts it on
/// the last non-empty line so messages that grew trailers or trailing
/// whitespace through other tooling still resolve.
#[must_use]
pub fn parse_marker(message: &str) -> Option<CommitId> {
    let line = message.lines().rev().find(|line| !line.trim().is_empty())?;
    let id = line.strip_prefix(MARKER_PREFIX)?.trim();
    if id.is_empty() {
        return None;
    }
    Some(CommitId::new(id))
}

/// Per-commit provenance lookup against the target history.
///
/// Each call greps the target log for the exact marker. Cost is linear in
/// the history length per lookup, which is why the engine prefers the
/// preloaded [`ProvenanceIndex`]; the two answer identically and this form
/// remains the reference for the idempotency contract.
#[derive(Clone, Copy, Debug)]
pub struct ProvenanceTracker<'a> {
    target: &'a GitRepo,
}

impl<'a> ProvenanceTracker<'a> {
    /// Creates a tracker over the target repository.
    #[must_use]
    pub fn new(target: &'a GitRepo) -> Self {
        Self { target }
    }

    /// Returns `true` when `upstream_id` was already mirrored into the
    /// target history.
    pub fn already_replayed(&self, upstream_id: &CommitId) -> Result<bool, CommandError> {
        self.target.log_contains(&marker_line(upstream_id))
    }
}

/// Upstream→target marker mapping, loaded in one pass at run start.
///
/// One `git log` over the target collects every marker; lookups are then a
/// hash probe per upstream commit. An empty target yields an empty index,
/// so bootstrapping a brand-new mirror needs no special case.
#[derive(Clone, Debug, Default)]
pub struct ProvenanceIndex {
    map: FxHashMap<CommitId, CommitId>,
}

impl ProvenanceIndex {
    /// Loads the index from the target's reachable history.
    ///
    /// When an upstream id somehow appears in several target commits, the
    /// oldest target commit wins; duplicates indicate a corrupted mirror
    /// but must not make lookups nondeterministic.
    pub fn load(target: &GitRepo) -> Result<Self, CommandError> {
        let mut map = FxHashMap::default();
        // `log` yields newest first; inserting in order and letting later
        // (older) entries overwrite implements oldest-wins.
        for (target_id, message) in target.log_with_messages()? {
            if let Some(upstream_id) = parse_marker(&message) {
                map.insert(upstream_id, target_id);
            }
        }
        Ok(Self { map })
    }

    /// Returns `true` when `upstream_id` was already mirrored.
    #[must_use]
    pub fn already_replayed(&self, upstream_id: &CommitId) -> bool {
        self.map.contains_key(upstream_id)
    }

    /// Target commit that mirrors `upstream_id`, if any.
    #[must_use]
    pub fn target_of(&self, upstream_id: &CommitId) -> Option<&CommitId> {
        self.map.get(upstream_id)
    }

    /// Number of mirrored upstream commits known to the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` when the target carries no markers yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
