use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Error, Result};
use crate::vcs;

/// Paths per formatter invocation. Keeps argv well under platform limits for
/// ordinary path lengths.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Flag that makes clang-format rewrite files instead of printing them.
pub const IN_PLACE_FLAG: &str = "-i";

/// Splits `files` into consecutive batches of at most `batch_size` paths.
///
/// # Errors
/// Returns [`Error::InvalidBatchSize`] for a zero batch size.
pub fn batches<S>(files: &[S], batch_size: usize) -> Result<std::slice::Chunks<'_, S>> {
    if batch_size == 0 {
        return Err(Error::InvalidBatchSize(batch_size));
    }
    Ok(files.chunks(batch_size))
}

/// Full argument list for one batch: the in-place flag, then the paths in order.
pub fn batch_args<S: AsRef<OsStr>>(batch: &[S]) -> Vec<OsString> {
    std::iter::once(OsString::from(IN_PLACE_FLAG))
        .chain(batch.iter().map(|p| p.as_ref().to_os_string()))
        .collect()
}

pub struct ClangFormat {
    pub program: OsString,
    pub batch_size: usize,
    /// Working directory for every invocation; `None` inherits ours.
    pub workdir: Option<PathBuf>,
}

impl ClangFormat {
    pub fn new(program: impl Into<OsString>, batch_size: usize) -> Self {
        Self {
            program: program.into(),
            batch_size,
            workdir: None,
        }
    }

    /// Runs every invocation from the repository root containing the cwd.
    ///
    /// # Errors
    /// Returns [`Error::ExternalTool`] when the cwd is not inside a work tree.
    pub fn at_repository_root(mut self) -> Result<Self> {
        self.workdir = Some(vcs::repository_root(Path::new("."))?);
        Ok(self)
    }

    /// Formats `files` in place, one batch at a time, and returns how many
    /// batches ran. `on_batch` is called after each successful batch.
    ///
    /// # Errors
    /// Stops at the first batch that fails to start or exits unsuccessfully.
    /// Batches before it stay formatted; batches after it never run.
    pub fn apply<S, F>(&self, files: &[S], mut on_batch: F) -> Result<usize>
    where
        S: AsRef<OsStr>,
        F: FnMut(&[S]),
    {
        let mut count = 0;
        for (i, batch) in batches(files, self.batch_size)?.enumerate() {
            log::info!(
                "batch {}: {} file(s) in {}",
                i + 1,
                batch.len(),
                self.workdir
                    .as_deref()
                    .map_or_else(|| ".".to_string(), |d| d.display().to_string())
            );
            self.run_batch(batch)?;
            on_batch(batch);
            count += 1;
        }
        Ok(count)
    }

    fn run_batch<S: AsRef<OsStr>>(&self, batch: &[S]) -> Result<()> {
        let tool = self.program.to_string_lossy().into_owned();
        let mut cmd = Command::new(&self.program);
        cmd.args(batch_args(batch)).stdin(Stdio::null());
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }
        let output = cmd
            .output()
            .map_err(|e| Error::external(&tool, e.to_string()))?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        let message = if stderr.is_empty() {
            output.status.to_string()
        } else {
            stderr.to_string()
        };
        Err(Error::external(tool, message))
    }
}
