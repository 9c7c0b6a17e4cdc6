use thiserror::Error;

/// Failures surfaced by the library half of the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// git or the formatter could not be started, exited non-zero, or
    /// reported that there is no working tree. `message` is the tool's own text.
    #[error("{tool}: {message}")]
    ExternalTool { tool: String, message: String },

    #[error("batch size must be at least 1 (got {0})")]
    InvalidBatchSize(usize),
}

impl Error {
    pub fn external(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalTool {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

impl From<git2::Error> for Error {
    fn from(err: git2::Error) -> Self {
        Self::external("git", err.message())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
