#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `filters` decides which paths of an upstream tree are excluded from the
//! mirror. The rules are deliberately simpler than a glob language: a
//! [`PathFilterSet`] holds an ordered list of path prefixes, and a relative
//! path is excluded exactly when it names one of the configured prefixes or
//! sits anywhere below one. Matching is byte-wise on `/`-separated relative
//! paths, so the result is independent of locale and platform path quirks.
//!
//! # Invariants
//!
//! - A prefix matches as a whole path component chain. `tests/` excludes
//!   `tests` itself and everything under it, but never `tests-extra/`.
//! - A prefix naming a file (`code/build/project.sdf`) excludes exactly that
//!   entry, plus anything below it should the path ever be a directory.
//! - Prefixes are relative to the tree root; absolute and empty prefixes are
//!   rejected at construction time.
//! - An empty set excludes nothing.
//!
//! # Errors
//!
//! [`PathFilterSet::from_prefixes`] reports [`FilterSetError`] for empty or
//! absolute prefixes. Matching itself is infallible.
//!
//! # Examples
//!
//! ```
//! use filters::PathFilterSet;
//! use std::path::Path;
//!
//! let set = PathFilterSet::from_prefixes(["tests/", "code/dep_codecs/lib/"])
//!     .expect("prefixes are valid");
//!
//! assert!(set.excluded(Path::new("tests/unit/api.c")));
//! assert!(set.excluded(Path::new("code/dep_codecs/lib")));
//! assert!(!set.excluded(Path::new("tests-extra/api.c")));
//! assert!(!set.excluded(Path::new("code/dep_codecs/include/x.h")));
//! ```

mod error;
mod set;

pub use error::FilterSetError;
pub use set::PathFilterSet;

#[cfg(test)]
mod tests;
