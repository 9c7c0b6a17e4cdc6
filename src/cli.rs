use std::ffi::OsString;

use anyhow::Result;
use clap::{ArgAction, Parser, ValueHint};

use crate::formatter::DEFAULT_BATCH_SIZE;
use crate::vcs::CollectMode;

mod run_impl;

pub use run_impl::{NO_MATCHING_FILES, Outcome, run_with_options};

#[allow(clippy::struct_excessive_bools)]
#[derive(Parser, Debug, Clone)]
#[command(
    name = "git-clang-format",
    version,
    about = "Apply clang-format to the C-family files tracked by git",
    override_usage = "git-clang-format [-all] [-modified] [-staged] [-verbose] dirs...",
    long_about = None
)]
pub struct Args {
    /// Apply to all files in the repository (wins over -modified and -staged)
    #[arg(long = "all", action = ArgAction::SetTrue)]
    pub all: bool,

    /// Apply only to modified files (wins over -staged)
    #[arg(long = "modified", action = ArgAction::SetTrue)]
    pub modified: bool,

    /// Apply only to staged files
    #[arg(long = "staged", action = ArgAction::SetTrue)]
    pub staged: bool,

    /// Print every file before formatting it
    #[arg(long = "verbose", action = ArgAction::SetTrue)]
    pub verbose: bool,

    /// Show a progress bar over formatter batches
    #[arg(long = "progress", action = ArgAction::SetTrue)]
    pub progress: bool,

    /// git executable used to collect files
    #[arg(
        long = "git",
        value_name = "PROGRAM",
        env = "GIT_CLANG_FORMAT_GIT",
        default_value = "git",
        value_hint = ValueHint::CommandName
    )]
    pub git: OsString,

    /// clang-format executable
    #[arg(
        long = "clang-format",
        value_name = "PROGRAM",
        env = "GIT_CLANG_FORMAT_BINARY",
        default_value = "clang-format",
        value_hint = ValueHint::CommandName
    )]
    pub clang_format: OsString,

    /// Files passed to one clang-format invocation
    #[arg(
        long = "batch-size",
        value_name = "N",
        env = "GIT_CLANG_FORMAT_BATCH_SIZE",
        default_value_t = DEFAULT_BATCH_SIZE,
        value_parser = parse_batch_size
    )]
    pub batch_size: usize,

    /// Restrict collection to these paths
    #[arg(value_name = "PATHS", value_hint = ValueHint::AnyPath)]
    pub paths: Vec<OsString>,
}

fn parse_batch_size(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// Everything the pipeline needs, detached from clap.
#[derive(Debug, Clone)]
pub struct Options {
    pub mode: CollectMode,
    pub scopes: Vec<OsString>,
    pub verbose: bool,
    pub progress: bool,
    pub git: OsString,
    pub clang_format: OsString,
    pub batch_size: usize,
}

impl From<Args> for Options {
    fn from(args: Args) -> Self {
        let mode = if args.all {
            CollectMode::All
        } else if args.modified {
            CollectMode::Modified
        } else if args.staged {
            CollectMode::Staged
        } else {
            CollectMode::Default
        };
        Self {
            mode,
            scopes: args.paths,
            verbose: args.verbose,
            progress: args.progress,
            git: args.git,
            clang_format: args.clang_format,
            batch_size: args.batch_size,
        }
    }
}

const LONG_FLAGS: &[&str] = &[
    "all",
    "modified",
    "staged",
    "verbose",
    "help",
    "version",
    "progress",
    "git",
    "clang-format",
    "batch-size",
];

/// Flags that consume the next argument unless written as `--flag=value`.
const VALUE_FLAGS: &[&str] = &["git", "clang-format", "batch-size"];

/// Accepts Go-style `-flag` spellings by rewriting them to `--flag`.
///
/// Flag parsing ends at a bare `--` or at the first positional argument, which
/// gets a `--` inserted in front of it; everything after that is a path scope.
pub fn normalize_args<I, T>(argv: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut out = Vec::new();
    let mut passthrough = false;
    let mut value_pending = false;
    for (i, arg) in argv.into_iter().enumerate() {
        let arg: OsString = arg.into();
        if i == 0 || passthrough || value_pending {
            value_pending = false;
            out.push(arg);
            continue;
        }
        if arg.to_str() == Some("--") {
            passthrough = true;
            out.push(arg);
            continue;
        }
        let bytes = arg.as_encoded_bytes();
        if !bytes.starts_with(b"-") || bytes == b"-" {
            passthrough = true;
            out.push(OsString::from("--"));
            out.push(arg);
            continue;
        }
        let Some(s) = arg.to_str() else {
            out.push(arg);
            continue;
        };
        let rest = s.trim_start_matches('-');
        let (name, inline_value) = match rest.split_once('=') {
            Some((n, _)) => (n, true),
            None => (rest, false),
        };
        value_pending = !inline_value && VALUE_FLAGS.contains(&name);
        let rewritten = (!s.starts_with("--") && LONG_FLAGS.contains(&name))
            .then(|| OsString::from(format!("-{s}")));
        out.push(rewritten.unwrap_or(arg));
    }
    out
}

/// Parses the process arguments; prints help or usage errors and exits on its own.
pub fn parse() -> Args {
    Args::parse_from(normalize_args(std::env::args_os()))
}

/// Runs the CLI application.
///
/// # Errors
/// Returns an error if collecting files or formatting them fails.
pub fn run(args: Args) -> Result<Outcome> {
    run_with_options(&Options::from(args))
}
