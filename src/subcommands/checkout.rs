//! `checkout` subcommand.

use crate::{actions::Action, session::PanelSession, subcommands::surface, tool::CliTool};
use anyhow::{anyhow, Result};
use clap::Args;
use std::time::Instant;

/// CLI arguments for the `checkout` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct CheckoutArgs;

impl CheckoutArgs {
    /// Run the `checkout` subcommand.
    pub async fn run(self, mut session: PanelSession<CliTool>) -> Result<()> {
        session.refresh(Instant::now()).await;

        let lines = session.branch_lines();
        if lines.is_empty() {
            let state = session.display_state();
            return Err(anyhow!(state
                .error
                .unwrap_or_else(|| "No branches in the current stack.".to_string())));
        }

        let choice = inquire::Select::new("Select a branch to checkout", lines)
            .with_formatter(&|f| f.value.branch_name.clone())
            .prompt()?;

        let notice = Action::Checkout {
            branch: choice.branch_name,
        }
        .dispatch(&mut session, Instant::now())
        .await;
        surface(notice);

        print!("{}", session.render_panel());
        Ok(())
    }
}
