//! Error types for the boundary between `stackpane` and the external
//! stacking tool.

use thiserror::Error;

/// Errors produced while invoking the external stacking tool.
///
/// The rendered message of any variant is what the panel displays verbatim
/// when a snapshot cannot be fetched.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The tool binary could not be launched.
    #[error("failed to launch `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    /// The tool did not respond within the allotted time.
    #[error("`{command}` timed out after {}s", timeout.as_secs())]
    Timeout {
        command: String,
        timeout: std::time::Duration,
    },
    /// The tool exited with a non-zero status. Carries the trimmed stderr,
    /// which is treated as an opaque message.
    #[error("{0}")]
    Failed(String),
}

pub type ToolResult<T> = Result<T, ToolError>;
