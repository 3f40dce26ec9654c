#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `normalize` rewrites line terminators to a deterministic form before a
//! tree is committed to the mirror. Text files are collapsed to bare `LF`
//! and then, when the [`LineEndingPolicy`] selects [`LineEnding::Crlf`] for
//! the filename, expanded to `CRLF`. Binary content is never touched: any
//! NUL byte within the first 8192 bytes marks a file as binary and the data
//! passes through unchanged.
//!
//! # Design
//!
//! - [`normalize_bytes`] is the pure byte transform; [`normalize_content`]
//!   adds policy resolution for a concrete path. Both return
//!   [`Cow`](std::borrow::Cow) so untouched input costs no allocation.
//! - [`LineEndingPolicy`] is static configuration: a basename list and a
//!   suffix list that select `CRLF`, everything else resolving to `LF`. The
//!   built-in table covers `CMakeLists.txt` and the MSVC project formats.
//! - [`normalize_tree`] applies the transform to every regular file below a
//!   root, skipping `.git` and binaries. Per-file I/O failures are logged
//!   and skipped; they never abort the pass.
//!
//! # Invariants
//!
//! - The transform is idempotent: normalizing already-normalized bytes
//!   returns them unchanged.
//! - `LF` output contains no `CR` byte; `CRLF` output contains no `LF` that
//!   is not preceded by `CR`.
//! - Binary input (NUL within the sniff window) is returned byte-identical.

mod content;
mod error;
mod policy;
mod tree;

pub use content::{is_binary, normalize_bytes, normalize_content};
pub use error::NormalizeError;
pub use policy::{LineEnding, LineEndingPolicy};
pub use tree::{NormalizeSummary, normalize_tree};
