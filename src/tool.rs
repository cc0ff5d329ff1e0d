//! The client for the external branch-stacking tool.
//!
//! Every piece of branch data and every mutation goes through [StackTool].
//! The production implementation, [CliTool], shells out to the configured
//! binary; the panel session only sees parsed records or an opaque error
//! message.

use crate::{
    config::PanelConfig,
    constants::TOOL_TIMEOUT,
    errors::{ToolError, ToolResult},
    graph::BranchRecord,
};
use std::{process::Stdio, time::Duration};

/// Operations the panel needs from the stacking tool.
///
/// Each mutating call is keyed by branch name (or commit SHA) and returns
/// success or an error message; the session's only contract with them is to
/// request a fresh snapshot afterwards, regardless of the outcome.
#[allow(async_fn_in_trait)]
pub trait StackTool {
    /// Fetches the full set of tracked branch records.
    async fn snapshot(&self) -> ToolResult<Vec<BranchRecord>>;
    /// Moves a branch from one display position to another.
    async fn reorder(&self, branch: &str, old_index: usize, new_index: usize) -> ToolResult<()>;
    async fn checkout(&self, branch: &str) -> ToolResult<()>;
    async fn untrack(&self, branch: &str) -> ToolResult<()>;
    /// Folds a branch into its base.
    async fn fold(&self, branch: &str) -> ToolResult<()>;
    /// Squashes a branch's commits into one.
    async fn squash(&self, branch: &str) -> ToolResult<()>;
    async fn edit(&self, branch: &str) -> ToolResult<()>;
    async fn rename(&self, branch: &str, new_name: &str) -> ToolResult<()>;
    /// Re-applies a branch's commits onto its updated base.
    async fn restack(&self, branch: &str) -> ToolResult<()>;
    /// Creates or updates the code-review change for a branch.
    async fn submit(&self, branch: &str) -> ToolResult<()>;
    /// Amends staged changes into the given commit.
    async fn fixup(&self, sha: &str) -> ToolResult<()>;
    /// Splits a branch at the given commit.
    async fn split(&self, sha: &str, branch: &str) -> ToolResult<()>;
    /// Creates a new branch on top of the current one.
    async fn create(&self, name: &str) -> ToolResult<()>;
    /// Syncs the stack with the remote.
    async fn sync(&self) -> ToolResult<()>;
}

/// A [StackTool] that invokes the configured command-line tool.
#[derive(Debug, Clone)]
pub struct CliTool {
    program: String,
    leading_args: Vec<String>,
    timeout: Duration,
}

impl CliTool {
    /// Creates a client from the panel configuration.
    pub fn new(config: &PanelConfig) -> Self {
        Self {
            program: config.tool.clone(),
            leading_args: config.tool_args.clone(),
            timeout: TOOL_TIMEOUT,
        }
    }

    /// The full command line of an invocation, for logs and error messages.
    fn command_line(&self, args: &[&str]) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.leading_args.iter().map(String::as_str))
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Runs the tool with the given arguments and returns its stdout.
    ///
    /// A non-zero exit maps to [ToolError::Failed] carrying the trimmed
    /// stderr verbatim.
    async fn run(&self, args: &[&str]) -> ToolResult<String> {
        let command = self.command_line(args);
        tracing::debug!(%command, "invoking stacking tool");

        let mut invocation = tokio::process::Command::new(&self.program);
        invocation
            .args(&self.leading_args)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = tokio::time::timeout(self.timeout, invocation.output())
            .await
            .map_err(|_| ToolError::Timeout {
                command: command.clone(),
                timeout: self.timeout,
            })?
            .map_err(|source| ToolError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("`{command}` exited with {}", output.status)
            } else {
                stderr
            };
            return Err(ToolError::Failed(message));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl StackTool for CliTool {
    async fn snapshot(&self) -> ToolResult<Vec<BranchRecord>> {
        let raw = self.run(&["state", "--json"]).await?;
        Ok(parse_snapshot(&raw))
    }

    async fn reorder(&self, branch: &str, old_index: usize, new_index: usize) -> ToolResult<()> {
        self.run(&[
            "move",
            branch,
            "--from",
            &old_index.to_string(),
            "--to",
            &new_index.to_string(),
        ])
        .await
        .map(drop)
    }

    async fn checkout(&self, branch: &str) -> ToolResult<()> {
        self.run(&["checkout", branch]).await.map(drop)
    }

    async fn untrack(&self, branch: &str) -> ToolResult<()> {
        self.run(&["untrack", branch]).await.map(drop)
    }

    async fn fold(&self, branch: &str) -> ToolResult<()> {
        self.run(&["fold", branch]).await.map(drop)
    }

    async fn squash(&self, branch: &str) -> ToolResult<()> {
        self.run(&["squash", branch]).await.map(drop)
    }

    async fn edit(&self, branch: &str) -> ToolResult<()> {
        self.run(&["edit", branch]).await.map(drop)
    }

    async fn rename(&self, branch: &str, new_name: &str) -> ToolResult<()> {
        self.run(&["rename", branch, new_name]).await.map(drop)
    }

    async fn restack(&self, branch: &str) -> ToolResult<()> {
        self.run(&["restack", branch]).await.map(drop)
    }

    async fn submit(&self, branch: &str) -> ToolResult<()> {
        self.run(&["submit", branch]).await.map(drop)
    }

    async fn fixup(&self, sha: &str) -> ToolResult<()> {
        self.run(&["fixup", sha]).await.map(drop)
    }

    async fn split(&self, sha: &str, branch: &str) -> ToolResult<()> {
        self.run(&["split", branch, "--at", sha]).await.map(drop)
    }

    async fn create(&self, name: &str) -> ToolResult<()> {
        self.run(&["create", name]).await.map(drop)
    }

    async fn sync(&self) -> ToolResult<()> {
        self.run(&["sync"]).await.map(drop)
    }
}

/// Parses the tool's snapshot output: one JSON branch record per line.
///
/// Malformed lines are skipped individually; one bad record never
/// invalidates the rest of the snapshot.
pub fn parse_snapshot(raw: &str) -> Vec<BranchRecord> {
    raw.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str::<BranchRecord>(line) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(error = %err, line, "skipping malformed branch record");
                None
            }
        })
        .collect()
}
