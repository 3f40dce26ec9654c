#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `gitcmd` is the process boundary of the mirror: it executes external git
//! commands, logs every invocation for operator auditability, and exposes
//! the small typed command set the replay engine needs. Nothing in this
//! crate interprets history; it shells out to the system `git` binary and
//! converts its output into owned values.
//!
//! # Design
//!
//! - [`CommandRunner`] spawns a command, waits for it, and maps a non-zero
//!   exit into [`CommandError`] carrying the rendered command line and the
//!   captured stderr. Each invocation is logged at debug level before it
//!   runs.
//! - [`GitRepo`] wraps a repository root and layers the typed operations on
//!   top of the runner: clone, checkout, enumeration, metadata reads, raw
//!   change listings, staging, and commit creation with caller-supplied
//!   author/committer identity.
//! - Commit identity is injected through the `GIT_AUTHOR_*` /
//!   `GIT_COMMITTER_*` environment rather than repository configuration, so
//!   runs leave no host-global state behind.
//!
//! # Errors
//!
//! Every operation returns [`CommandError`]. Callers decide what is fatal;
//! this crate never retries or swallows failures.

mod change;
mod error;
mod id;
mod repo;
mod runner;

pub use change::{ChangeKind, FileChange};
pub use error::CommandError;
pub use id::{CommitId, ObjectId};
pub use repo::{CommitIdentity, CommitMetadata, GitRepo};
pub use runner::CommandRunner;
