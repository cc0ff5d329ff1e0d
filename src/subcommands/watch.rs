//! `watch` subcommand.

use crate::{
    actions::Action, config::PanelConfig, constants::FLASH_ANIM, session::PanelSession,
    tool::CliTool, watch::RepoWatcher,
};
use anyhow::Result;
use clap::Args;
use git2::Repository;
use std::{
    io::Write,
    time::{Duration, Instant},
};

/// Clears the terminal and homes the cursor.
const CLEAR: &str = "\x1b[2J\x1b[1;1H";

/// CLI arguments for the `watch` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct WatchArgs;

impl WatchArgs {
    /// Run the `watch` subcommand: re-render the panel whenever the
    /// repository's branch graph may have changed.
    pub async fn run(
        self,
        mut session: PanelSession<CliTool>,
        repo: &Repository,
        config: &PanelConfig,
    ) -> Result<()> {
        let mut watcher =
            RepoWatcher::new(repo.path(), Duration::from_millis(config.debounce_ms))?;

        Action::Ready.dispatch(&mut session, Instant::now()).await;
        paint(&session)?;

        // After each refresh, one more paint once the flashes settle.
        let mut settle_at: Option<tokio::time::Instant> = None;
        loop {
            let settle = async move {
                match settle_at {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                changed = watcher.changed() => {
                    if changed.is_none() {
                        break;
                    }
                    Action::Refresh.dispatch(&mut session, Instant::now()).await;
                    paint(&session)?;
                    settle_at = Some(tokio::time::Instant::now() + FLASH_ANIM);
                }
                () = settle => {
                    session.tick(Instant::now());
                    paint(&session)?;
                    settle_at = None;
                }
            }
        }

        Ok(())
    }
}

fn paint(session: &PanelSession<CliTool>) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{CLEAR}{}", session.render_panel())?;
    stdout.flush()?;
    Ok(())
}
