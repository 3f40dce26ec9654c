use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use engine::{ReplayEngine, ReplayOptions};
use filters::PathFilterSet;
use gitcmd::CommitId;
use normalize::LineEndingPolicy;
use tracing_subscriber::EnvFilter;

use crate::{ExitCode, RunConfig};

/// Builds the clap command definition.
fn command() -> Command {
    Command::new("histmirror")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Mirrors upstream git history into a normalized target repository")
        .arg(
            Arg::new("upstream")
                .value_name("UPSTREAM")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Upstream repository whose history is mirrored"),
        )
        .arg(
            Arg::new("target")
                .value_name("TARGET")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Target repository receiving the mirrored commits"),
        )
        .arg(
            Arg::new("branch")
                .long("branch")
                .value_name("REF")
                .help("Upstream ref to enumerate [default: HEAD]"),
        )
        .arg(
            Arg::new("stop-at")
                .long("stop-at")
                .value_name("COMMIT")
                .help("Stop after replaying or skipping this upstream commit"),
        )
        .arg(
            Arg::new("workdir")
                .long("workdir")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .help("Persistent scratch directory for the upstream worktree"),
        )
        .arg(
            Arg::new("exclude")
                .long("exclude")
                .value_name("PREFIX")
                .action(ArgAction::Append)
                .help("Path prefix excluded from the mirror (repeatable)"),
        )
        .arg(
            Arg::new("crlf-name")
                .long("crlf-name")
                .value_name("BASENAME")
                .action(ArgAction::Append)
                .help("Extra basename normalized to CRLF (repeatable)"),
        )
        .arg(
            Arg::new("crlf-suffix")
                .long("crlf-suffix")
                .value_name("SUFFIX")
                .action(ArgAction::Append)
                .help("Extra filename suffix normalized to CRLF (repeatable)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("JSON run-configuration file"),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .short('n')
                .action(ArgAction::SetTrue)
                .help("Log every skip/replay decision without touching the target"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::Count)
                .help("Increase log verbosity (repeatable)"),
        )
}

/// Parses `args`, runs the replay, and returns the process exit code.
///
/// Help and version requests render to `stdout` and exit 0. Argument and
/// configuration problems render to `stderr` and exit 1. Replay failures
/// render the engine diagnostic to `stderr` and exit 2.
pub fn run<I, T, O, E>(args: I, stdout: &mut O, stderr: &mut E) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    O: Write,
    E: Write,
{
    let matches = match command().try_get_matches_from(args) {
        Ok(matches) => matches,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = write!(stdout, "{err}");
                return ExitCode::Ok.as_i32();
            }
            _ => {
                let _ = write!(stderr, "{err}");
                return ExitCode::Usage.as_i32();
            }
        },
    };

    init_tracing(matches.get_count("verbose"));

    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => match RunConfig::load(path) {
            Ok(config) => config,
            Err(err) => {
                let _ = writeln!(stderr, "histmirror: {err}");
                return ExitCode::Usage.as_i32();
            }
        },
        None => RunConfig::default(),
    };

    let options = match build_options(&matches, config) {
        Ok(options) => options,
        Err(message) => {
            let _ = writeln!(stderr, "histmirror: {message}");
            return ExitCode::Usage.as_i32();
        }
    };

    match ReplayEngine::new(options).run() {
        Ok(summary) => {
            let _ = writeln!(
                stdout,
                "replayed {} commit(s), skipped {}",
                summary.commits_replayed(),
                summary.commits_skipped()
            );
            ExitCode::Ok.as_i32()
        }
        Err(err) => {
            let _ = writeln!(stderr, "histmirror: {err}");
            ExitCode::Replay.as_i32()
        }
    }
}

/// Merges the configuration file under the command-line flags and builds
/// the engine options.
fn build_options(matches: &ArgMatches, config: RunConfig) -> Result<ReplayOptions, String> {
    let Some(upstream) = matches.get_one::<PathBuf>("upstream") else {
        return Err("missing upstream operand".to_owned());
    };
    let Some(target) = matches.get_one::<PathBuf>("target") else {
        return Err("missing target operand".to_owned());
    };

    let mut prefixes = config.exclude;
    if let Some(values) = matches.get_many::<String>("exclude") {
        prefixes.extend(values.cloned());
    }
    let filters = PathFilterSet::from_prefixes(prefixes).map_err(|err| err.to_string())?;

    let mut policy = LineEndingPolicy::default()
        .with_crlf_basenames(config.crlf_basenames)
        .with_crlf_suffixes(config.crlf_suffixes);
    if let Some(values) = matches.get_many::<String>("crlf-name") {
        policy = policy.with_crlf_basenames(values.cloned());
    }
    if let Some(values) = matches.get_many::<String>("crlf-suffix") {
        policy = policy.with_crlf_suffixes(values.cloned());
    }

    let branch = matches
        .get_one::<String>("branch")
        .cloned()
        .or(config.branch)
        .unwrap_or_else(|| "HEAD".to_owned());
    let stop_at = matches
        .get_one::<String>("stop-at")
        .cloned()
        .or(config.stop_at)
        .map(CommitId::new);
    let workdir = matches
        .get_one::<PathBuf>("workdir")
        .cloned()
        .or(config.workdir);

    Ok(ReplayOptions::new(upstream, target)
        .with_branch(branch)
        .with_stop_at(stop_at)
        .with_scratch_home(workdir)
        .with_filters(filters)
        .with_policy(policy)
        .with_dry_run(matches.get_flag("dry-run")))
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise repeated `-v` flags raise the
/// level from `info` through `debug` to `trace`. Installation is attempted
/// once per process; later calls (tests driving `run` repeatedly) keep the
/// first subscriber.
fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use std::fs;

    use gitcmd::{CommitIdentity, GitRepo};
    use tempfile::TempDir;

    use super::*;

    fn run_to_strings(args: &[&str]) -> (i32, String, String) {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let code = run(args.iter().copied(), &mut stdout, &mut stderr);
        (
            code,
            String::from_utf8(stdout).unwrap(),
            String::from_utf8(stderr).unwrap(),
        )
    }

    #[test]
    fn version_prints_to_stdout() {
        let (code, stdout, stderr) = run_to_strings(&["histmirror", "--version"]);
        assert_eq!(code, 0);
        assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
        assert!(stderr.is_empty());
    }

    #[test]
    fn help_prints_to_stdout() {
        let (code, stdout, _) = run_to_strings(&["histmirror", "--help"]);
        assert_eq!(code, 0);
        assert!(stdout.contains("--exclude"));
        assert!(stdout.contains("--stop-at"));
    }

    #[test]
    fn missing_operands_are_a_usage_error() {
        let (code, stdout, stderr) = run_to_strings(&["histmirror"]);
        assert_eq!(code, 1);
        assert!(stdout.is_empty());
        assert!(!stderr.is_empty());
    }

    #[test]
    fn invalid_exclude_prefix_is_a_usage_error() {
        let (code, _, stderr) =
            run_to_strings(&["histmirror", "--exclude", "/abs", "up", "tgt"]);
        assert_eq!(code, 1);
        assert!(stderr.contains("relative"));
    }

    #[test]
    fn missing_config_file_is_a_usage_error() {
        let (code, _, stderr) = run_to_strings(&[
            "histmirror",
            "--config",
            "/nonexistent/histmirror.json",
            "up",
            "tgt",
        ]);
        assert_eq!(code, 1);
        assert!(stderr.contains("config"));
    }

    #[test]
    fn replay_failure_exits_two() {
        let missing = TempDir::new().unwrap();
        let upstream = missing.path().join("not-a-repo");
        let target = missing.path().join("also-absent");
        let (code, _, stderr) = run_to_strings(&[
            "histmirror",
            upstream.to_str().unwrap(),
            target.to_str().unwrap(),
        ]);
        assert_eq!(code, 2);
        assert!(stderr.contains("histmirror:"));
    }

    #[test]
    fn mirrors_a_small_history_end_to_end() {
        let identity = CommitIdentity::new("Author", "a@example.com", "1700000000");
        let dirs = TempDir::new().unwrap();
        let upstream_dir = dirs.path().join("upstream");
        let target_dir = dirs.path().join("target");
        fs::create_dir_all(&upstream_dir).unwrap();
        fs::create_dir_all(&target_dir).unwrap();

        let upstream = GitRepo::init(&upstream_dir).unwrap();
        fs::write(upstream_dir.join("a.txt"), b"a\r\n").unwrap();
        upstream.stage_all().unwrap();
        upstream.commit("add a", &identity, &identity, false).unwrap();

        let target = GitRepo::init(&target_dir).unwrap();

        let (code, stdout, _) = run_to_strings(&[
            "histmirror",
            upstream_dir.to_str().unwrap(),
            target_dir.to_str().unwrap(),
        ]);

        assert_eq!(code, 0);
        assert!(stdout.contains("replayed 1 commit(s), skipped 0"));
        assert!(target.has_commits().unwrap());
        assert_eq!(fs::read(target_dir.join("a.txt")).unwrap(), b"a\n");
    }
}
