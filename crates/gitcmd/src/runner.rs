use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::CommandError;

/// Executes external commands and logs every invocation.
///
/// The runner is stateless; it exists so the command-execution policy
/// (captured stdio, logged argv, typed failures) lives in one place instead
/// of being repeated at each call site. All calls block until the child
/// exits.
#[derive(Clone, Copy, Debug, Default)]
pub struct CommandRunner;

impl CommandRunner {
    /// Creates a runner.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Runs a command to completion, discarding its stdout.
    ///
    /// # Errors
    ///
    /// [`CommandError::Spawn`] when the process cannot start and
    /// [`CommandError::Failed`] (carrying captured stderr) when it exits
    /// non-zero.
    pub fn run<I, S>(&self, cwd: &Path, argv: I) -> Result<(), CommandError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.run_with_env(cwd, argv, &[])
    }

    /// Runs a command with additional environment variables.
    ///
    /// Used for commit creation, where author and committer identity travel
    /// through `GIT_AUTHOR_*`/`GIT_COMMITTER_*` rather than repository
    /// configuration.
    pub fn run_with_env<I, S>(
        &self,
        cwd: &Path,
        argv: I,
        env: &[(&str, &str)],
    ) -> Result<(), CommandError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let (mut command, rendered) = self.prepare(cwd, argv);
        for (key, value) in env {
            command.env(key, value);
        }
        let output = command.output().map_err(|source| CommandError::Spawn {
            command: rendered.clone(),
            source,
        })?;
        if !output.status.success() {
            return Err(CommandError::Failed {
                command: rendered,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        Ok(())
    }

    /// Runs a command and returns its stdout as UTF-8 text.
    pub fn output<I, S>(&self, cwd: &Path, argv: I) -> Result<String, CommandError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let (mut command, rendered) = self.prepare(cwd, argv);
        let output = command.output().map_err(|source| CommandError::Spawn {
            command: rendered.clone(),
            source,
        })?;
        if !output.status.success() {
            return Err(CommandError::Failed {
                command: rendered,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        String::from_utf8(output.stdout)
            .map_err(|_| CommandError::NonUtf8Output { command: rendered })
    }

    /// Runs a command and returns its raw stdout bytes.
    pub fn output_bytes<I, S>(&self, cwd: &Path, argv: I) -> Result<Vec<u8>, CommandError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let (mut command, rendered) = self.prepare(cwd, argv);
        let output = command.output().map_err(|source| CommandError::Spawn {
            command: rendered.clone(),
            source,
        })?;
        if !output.status.success() {
            return Err(CommandError::Failed {
                command: rendered,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        Ok(output.stdout)
    }

    /// Runs a command and reports whether it exited successfully.
    ///
    /// Probe form for commands whose non-zero exit is an answer rather than
    /// a failure (`git rev-parse --verify`, `git merge-base
    /// --is-ancestor`, ...). Only a spawn failure is an error.
    pub fn probe<I, S>(&self, cwd: &Path, argv: I) -> Result<bool, CommandError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let (mut command, rendered) = self.prepare(cwd, argv);
        let output = command.output().map_err(|source| CommandError::Spawn {
            command: rendered,
            source,
        })?;
        Ok(output.status.success())
    }

    fn prepare<I, S>(&self, cwd: &Path, argv: I) -> (Command, String)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let argv: Vec<_> = argv
            .into_iter()
            .map(|arg| arg.as_ref().to_os_string())
            .collect();
        let rendered = render_command(&argv);
        debug!(cwd = %cwd.display(), command = %rendered, "running external command");

        let mut command = Command::new(&argv[0]);
        command
            .args(&argv[1..])
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        (command, rendered)
    }
}

fn render_command(argv: &[std::ffi::OsString]) -> String {
    argv.iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn output_captures_stdout() {
        let runner = CommandRunner::new();
        let out = runner
            .output(Path::new("."), ["git", "--version"])
            .expect("git is installed");
        assert!(out.starts_with("git version"));
    }

    #[test]
    fn failure_carries_command_and_stderr() {
        let runner = CommandRunner::new();
        let err = runner
            .run(Path::new("."), ["git", "not-a-real-subcommand"])
            .unwrap_err();
        match err {
            CommandError::Failed { command, .. } => {
                assert!(command.contains("not-a-real-subcommand"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn probe_reports_exit_status_without_error() {
        let runner = CommandRunner::new();
        assert!(runner.probe(Path::new("."), ["git", "--version"]).unwrap());
        assert!(
            !runner
                .probe(Path::new("."), ["git", "not-a-real-subcommand"])
                .unwrap()
        );
    }

    #[test]
    fn missing_binary_is_a_spawn_error() {
        let runner = CommandRunner::new();
        let err = runner
            .run(Path::new("."), ["histmirror-no-such-binary-xyz"])
            .unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
    }
}
