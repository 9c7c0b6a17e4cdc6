use git2::Repository;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Error, Result};

/// Which set of files the collector asks git for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectMode {
    /// Every tracked file in the repository, whatever the cwd.
    All,
    /// Working-tree changes not yet staged.
    Modified,
    /// Changes staged in the index.
    Staged,
    /// Tracked files under the current directory.
    #[default]
    Default,
}

impl CollectMode {
    /// `diff` output is relative to the repository root, so the formatter
    /// has to run there for the paths to resolve.
    pub fn runs_at_root(self) -> bool {
        matches!(self, Self::Modified | Self::Staged)
    }
}

pub struct VcsContext {
    pub repo: Repository,
}

impl VcsContext {
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path)?;
        Ok(Self { repo })
    }

    /// Top-level directory of the working tree, without a trailing separator.
    pub fn workdir_root(&self) -> Result<PathBuf> {
        let workdir = self
            .repo
            .workdir()
            .ok_or_else(|| Error::external("git", "this operation must be run in a work tree"))?;
        Ok(strip_trailing_separator(workdir))
    }
}

/// Same answer as `git rev-parse --show-toplevel` run from `start`.
pub fn repository_root(start: &Path) -> Result<PathBuf> {
    let root = VcsContext::open(start)?.workdir_root()?;
    log::debug!("repository root: {}", root.display());
    Ok(root)
}

fn strip_trailing_separator(path: &Path) -> PathBuf {
    path.components().collect()
}

/// A program plus its argument list, ready to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectCommand {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl CollectCommand {
    /// Builds the query for `mode`; `root` is appended only for [`CollectMode::All`]
    /// and `scopes` always go last.
    pub fn new(git: &OsStr, mode: CollectMode, root: Option<&Path>, scopes: &[OsString]) -> Self {
        let mut args: Vec<OsString> = match mode {
            CollectMode::All => {
                let mut v = vec![OsString::from("ls-files")];
                if let Some(root) = root {
                    v.push(root.as_os_str().to_os_string());
                }
                v
            }
            CollectMode::Modified => vec!["diff".into(), "--name-only".into()],
            CollectMode::Staged => vec!["diff".into(), "--cached".into(), "--name-only".into()],
            CollectMode::Default => vec!["ls-files".into()],
        };
        args.extend(scopes.iter().cloned());
        Self {
            program: git.to_os_string(),
            args,
        }
    }

    pub fn display(&self) -> String {
        let mut s = self.program.to_string_lossy().into_owned();
        for a in &self.args {
            s.push(' ');
            s.push_str(&a.to_string_lossy());
        }
        s
    }
}

/// Runs `cmd` and returns what it printed, one entry per line.
///
/// # Errors
/// Returns [`Error::ExternalTool`] if the command cannot be started or exits
/// unsuccessfully; nothing is returned in that case.
pub fn collect_files(cmd: &CollectCommand) -> Result<Vec<String>> {
    log::debug!("collecting with: {}", cmd.display());
    let tool = cmd.program.to_string_lossy().into_owned();
    let output = Command::new(&cmd.program)
        .args(&cmd.args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| Error::external(&tool, e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        let message = if stderr.is_empty() {
            output.status.to_string()
        } else {
            stderr.to_string()
        };
        return Err(Error::external(tool, message));
    }

    Ok(split_lines(&output.stdout))
}

/// Splits captured output on `\n`, dropping one trailing `\r` per line. A final
/// unterminated line still counts; nothing follows the last terminator.
pub fn split_lines(bytes: &[u8]) -> Vec<String> {
    let mut out = Vec::new();
    let mut start = 0;
    for i in memchr::memchr_iter(b'\n', bytes) {
        out.push(String::from_utf8_lossy(trim_cr(&bytes[start..i])).into_owned());
        start = i + 1;
    }
    if start < bytes.len() {
        out.push(String::from_utf8_lossy(trim_cr(&bytes[start..])).into_owned());
    }
    out
}

fn trim_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}
