//! Filesystem-driven refresh triggering.
//!
//! Watches the repository's `.git` metadata for branch and commit changes
//! and coalesces bursts of events into a single signal with a trailing
//! debounce, so a flurry of ref updates costs one tool invocation instead of
//! one per event.

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::{path::Path, time::Duration};
use tokio::sync::mpsc::{self, UnboundedReceiver};

/// Watches a repository's `.git` directory and yields a debounced signal
/// when the branch graph may have changed.
pub struct RepoWatcher {
    _watcher: RecommendedWatcher,
    rx: UnboundedReceiver<()>,
    debounce: Duration,
}

impl RepoWatcher {
    /// Creates a watcher over the given `.git` directory.
    pub fn new(git_dir: &Path, debounce: Duration) -> notify::Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |result: notify::Result<Event>| {
                if let Ok(event) = result {
                    if is_relevant(&event) {
                        let _ = tx.send(());
                    }
                }
            },
            notify::Config::default(),
        )?;

        // HEAD, index, and friends live at the top level; refs move
        // underneath their own directory.
        watcher.watch(git_dir, RecursiveMode::NonRecursive)?;
        let refs_dir = git_dir.join("refs");
        if refs_dir.exists() {
            watcher.watch(&refs_dir, RecursiveMode::Recursive)?;
        }

        Ok(Self {
            _watcher: watcher,
            rx,
            debounce,
        })
    }

    /// Waits for the next change, then for a quiet period, collapsing any
    /// burst of events into one signal.
    ///
    /// Returns [None] once the watcher channel closes.
    pub async fn changed(&mut self) -> Option<()> {
        self.rx.recv().await?;

        loop {
            match tokio::time::timeout(self.debounce, self.rx.recv()).await {
                // Still chattering: extend the quiet window.
                Ok(Some(())) => continue,
                Ok(None) => return None,
                Err(_) => return Some(()),
            }
        }
    }
}

/// Whether an event could change the branch graph. Filters out the noisy
/// internals of `.git` (objects, logs) that churn on every operation.
fn is_relevant(event: &Event) -> bool {
    match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
        _ => return false,
    }

    event.paths.iter().any(|path| {
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            return false;
        };
        name == "HEAD"
            || name == "index"
            || name == "MERGE_HEAD"
            || name == "REBASE_HEAD"
            || name == "CHERRY_PICK_HEAD"
            || path.iter().any(|component| component == "refs")
    })
}
