//! `restack` subcommand.

use crate::{actions::Action, session::PanelSession, subcommands::surface, tool::CliTool};
use anyhow::Result;
use clap::Args;
use std::time::Instant;

/// CLI arguments for the `restack` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct RestackArgs {
    /// Branch to restack. Prompts among out-of-date branches when omitted.
    #[arg(short, long)]
    pub branch: Option<String>,
}

impl RestackArgs {
    /// Run the `restack` subcommand.
    pub async fn run(self, mut session: PanelSession<CliTool>) -> Result<()> {
        session.refresh(Instant::now()).await;

        let branch = match self.branch {
            Some(branch) => branch,
            None => {
                let state = session.display_state();
                let flagged = state
                    .branches
                    .iter()
                    .filter(|vm| vm.restack)
                    .map(|vm| vm.name.clone())
                    .collect::<Vec<_>>();

                if flagged.is_empty() {
                    println!("Nothing needs a restack.");
                    return Ok(());
                }

                inquire::Select::new("Select a branch to restack", flagged).prompt()?
            }
        };

        let notice = Action::Restack { branch }
            .dispatch(&mut session, Instant::now())
            .await;
        surface(notice);

        print!("{}", session.render_panel());
        Ok(())
    }
}
