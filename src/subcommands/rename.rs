//! `rename` subcommand.

use crate::{actions::Action, session::PanelSession, subcommands::surface, tool::CliTool};
use anyhow::{anyhow, Result};
use clap::Args;
use std::time::Instant;

/// CLI arguments for the `rename` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct RenameArgs {
    /// Branch to rename. Defaults to the checked-out branch.
    #[arg(short, long)]
    pub branch: Option<String>,
}

impl RenameArgs {
    /// Run the `rename` subcommand.
    pub async fn run(self, mut session: PanelSession<CliTool>) -> Result<()> {
        session.refresh(Instant::now()).await;

        let branch = match self.branch {
            Some(branch) => branch,
            None => session
                .display_state()
                .branches
                .iter()
                .find(|vm| vm.current)
                .map(|vm| vm.name.clone())
                .ok_or_else(|| anyhow!("No branch is checked out within a tracked stack."))?,
        };

        let new_name = inquire::Text::new("New name:").prompt()?;

        let notice = Action::Rename { branch, new_name }
            .dispatch(&mut session, Instant::now())
            .await;
        surface(notice);

        print!("{}", session.render_panel());
        Ok(())
    }
}
