//! Utilities for locating the `git` repository the panel is attached to.
//!
//! Branch data itself always comes from the stacking tool; the repository is
//! only needed to find the workdir for configuration and the `.git` metadata
//! to watch for changes.

use git2::Repository;
use std::env;

/// Returns the repository for the current working directory, and [None] if
/// the current working directory is not within a git repository or an error
/// occurs.
pub fn active_repository() -> Option<Repository> {
    Repository::discover(env::current_dir().ok()?).ok()
}
