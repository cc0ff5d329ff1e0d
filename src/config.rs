//! Panel configuration, stored alongside the repository's git metadata.

use crate::constants::{COMMIT_PAGE_SIZE, CONFIG_FILE_NAME};
use anyhow::Result;
use git2::Repository;
use serde::Deserialize;
use std::path::PathBuf;

/// Configuration for the panel and its tool client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PanelConfig {
    /// Command used to reach the stacking tool.
    pub tool: String,
    /// Leading arguments prepended to every tool invocation.
    pub tool_args: Vec<String>,
    /// Trailing debounce for filesystem-driven refreshes, in milliseconds.
    pub debounce_ms: u64,
    /// Commit rows revealed per "show more" step.
    pub commit_page_size: usize,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            tool: "stk".to_string(),
            tool_args: Vec::new(),
            debounce_ms: 500,
            commit_page_size: COMMIT_PAGE_SIZE,
        }
    }
}

impl PanelConfig {
    /// Loads the configuration for the given [Repository], falling back to
    /// the defaults when no config file exists.
    pub fn load(repository: &Repository) -> Result<Self> {
        let Some(path) = config_path(repository) else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }

        Ok(toml::from_str(&std::fs::read_to_string(path)?)?)
    }
}

/// Returns the path to the panel configuration for the given [Repository].
///
/// ## Returns
/// - `Some(PathBuf)` - The path to the configuration file.
/// - `None` - If the repository does not have a workdir.
pub fn config_path(repository: &Repository) -> Option<PathBuf> {
    repository
        .workdir()
        .map(|path| path.join(".git").join(CONFIG_FILE_NAME))
}
