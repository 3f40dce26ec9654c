/// Process exit codes of the `histmirror` binary.
///
/// A run where every upstream commit was skipped as already mirrored is
/// still [`Ok`](Self::Ok): the sequence completed.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(i32)]
pub enum ExitCode {
    /// The full commit sequence completed.
    Ok = 0,

    /// Command-line or configuration-file problem; nothing was executed.
    Usage = 1,

    /// The replay aborted on a structural failure. Already-created target
    /// commits remain valid; rerunning resumes from the first missing one.
    Replay = 2,
}

impl ExitCode {
    /// Numeric value handed to the operating system.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ExitCode::Ok.as_i32(), 0);
        assert_eq!(ExitCode::Usage.as_i32(), 1);
        assert_eq!(ExitCode::Replay.as_i32(), 2);
    }
}
