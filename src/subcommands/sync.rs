//! `sync` subcommand.

use crate::{actions::Action, session::PanelSession, subcommands::surface, tool::CliTool};
use anyhow::Result;
use clap::Args;
use std::time::Instant;

/// CLI arguments for the `sync` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct SyncArgs;

impl SyncArgs {
    /// Run the `sync` subcommand.
    pub async fn run(self, mut session: PanelSession<CliTool>) -> Result<()> {
        let notice = Action::Sync.dispatch(&mut session, Instant::now()).await;
        surface(notice);

        print!("{}", session.render_panel());
        Ok(())
    }
}
