#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `engine` replays upstream git history into a target repository. Commits
//! are walked oldest first; each one not yet present in the target is
//! materialized in a disposable worktree, mirrored into the target working
//! directory with exclusions applied, line-ending normalized, and committed
//! with the upstream authorship and an `Upstream: <id>` provenance marker.
//! The marker makes reruns idempotent: already-mirrored commits are skipped
//! after a cheap lookup, so an interrupted run resumes from the first
//! missing commit.
//!
//! # Design
//!
//! - [`WorktreeManager`] owns the single scratch clone of the upstream and
//!   guarantees exactly one commit's tree is live at a time.
//! - [`mirror_tree`] performs the full-replace copy into the target,
//!   honoring the [`filters::PathFilterSet`] on both the copy and the
//!   deletion sweep and never touching the target's control metadata.
//! - [`ProvenanceIndex`] loads the upstream→target marker mapping in one
//!   pass at run start; [`ProvenanceTracker`] is the equivalent per-commit
//!   lookup against the target log.
//! - [`ReplayEngine`] drives the per-commit sequence
//!   (enumerate → skip/materialize → filter → normalize → stage → commit)
//!   and fails fast on any structural error.
//! - [`rewrite`] carries the object-graph rewrite variant: the blob-name
//!   resolution context and the transform callback an external in-place
//!   rewriter would drive. It shares the normalization contract but offers
//!   no partial-progress guarantees, so the replay path is the one wired to
//!   the binary.
//!
//! # Errors
//!
//! Everything structural surfaces as [`EngineError`] and aborts the run.
//! Per-file normalization problems are logged and skipped inside
//! [`normalize::normalize_tree`]; they never fail a commit.

mod error;
mod mirror;
mod provenance;
mod replay;
pub mod rewrite;
mod worktree;

pub use error::{EngineError, EngineResult};
pub use mirror::{MirrorOptions, MirrorSummary, mirror_tree};
pub use provenance::{ProvenanceIndex, ProvenanceTracker, commit_message, marker_line, parse_marker};
pub use replay::{ReplayEngine, ReplayOptions, RunSummary};
pub use worktree::WorktreeManager;
