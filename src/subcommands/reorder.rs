//! `reorder` subcommand.

use crate::{actions::Action, session::PanelSession, subcommands::surface, tool::CliTool};
use anyhow::Result;
use clap::Args;
use std::time::Instant;

/// CLI arguments for the `reorder` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct ReorderArgs;

impl ReorderArgs {
    /// Run the `reorder` subcommand: preview an optimistic move of one
    /// branch card, then apply or discard it.
    pub async fn run(self, mut session: PanelSession<CliTool>) -> Result<()> {
        session.refresh(Instant::now()).await;

        let lines = session.branch_lines();
        if lines.len() < 2 {
            println!("Nothing to reorder.");
            return Ok(());
        }
        let names = lines
            .iter()
            .map(|line| line.branch_name.clone())
            .collect::<Vec<_>>();

        let choice = inquire::Select::new("Select a branch to move", lines)
            .with_formatter(&|f| f.value.branch_name.clone())
            .prompt()?;
        let old_index = names
            .iter()
            .position(|name| *name == choice.branch_name)
            .unwrap_or_default();

        let new_index = inquire::Text::new("New position (0 = top):")
            .prompt()?
            .trim()
            .parse::<usize>()?;

        let branch = choice.branch_name;
        Action::Reorder {
            branch: branch.clone(),
            old_index,
            new_index,
        }
        .dispatch(&mut session, Instant::now())
        .await;

        // Show the optimistic preview before anything touches the repo.
        print!("{}", session.render_panel());

        let apply = inquire::Confirm::new("Apply this move?")
            .with_default(true)
            .prompt()?;
        let action = if apply {
            Action::ConfirmReorder { branch }
        } else {
            Action::CancelReorder { branch }
        };
        let notice = action.dispatch(&mut session, Instant::now()).await;
        surface(notice);

        print!("{}", session.render_panel());
        Ok(())
    }
}
