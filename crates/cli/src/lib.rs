#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cli` is the thin command-line front-end for `histmirror`. It recognises
//! the run parameters (upstream and target paths, exclusion prefixes, the
//! CRLF table extensions, branch, stop commit, scratch directory, dry-run,
//! verbosity), optionally merges a JSON run-configuration file underneath
//! the flags, installs the tracing subscriber, and delegates the actual
//! work to [`engine::ReplayEngine`].
//!
//! # Design
//!
//! [`run`] is the primary entry point. It accepts an iterator of arguments
//! together with handles for standard output and error, so the binary stays
//! a two-line `main` and tests can drive the full front-end in memory. The
//! function never panics; argument problems render clap's diagnostic with
//! exit code 1 and replay failures render the engine error with exit
//! code 2.
//!
//! # Errors
//!
//! All failures are rendered to the supplied stderr handle and folded into
//! the returned [`ExitCode`] value; callers only propagate the process exit
//! status.

mod config;
mod exit_code;
mod frontend;

pub use config::{ConfigError, RunConfig};
pub use exit_code::ExitCode;
pub use frontend::run;
