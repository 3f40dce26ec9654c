use thiserror::Error;

/// Error produced when an exclusion prefix cannot be accepted.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FilterSetError {
    /// The prefix was empty (or collapsed to nothing after trimming `/`).
    #[error("exclusion prefix may not be empty")]
    EmptyPrefix,

    /// The prefix was absolute; prefixes are interpreted relative to the
    /// mirrored tree root.
    #[error("exclusion prefix '{0}' must be relative to the tree root")]
    AbsolutePrefix(String),
}
