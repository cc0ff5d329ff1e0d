//! `create` subcommand.

use crate::{actions::Action, session::PanelSession, subcommands::surface, tool::CliTool};
use anyhow::Result;
use clap::Args;
use std::time::Instant;

/// CLI arguments for the `create` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct CreateArgs;

impl CreateArgs {
    /// Run the `create` subcommand.
    pub async fn run(self, mut session: PanelSession<CliTool>) -> Result<()> {
        let name = inquire::Text::new("Name of new branch:").prompt()?;

        let notice = Action::Create { name }
            .dispatch(&mut session, Instant::now())
            .await;
        surface(notice);

        print!("{}", session.render_panel());
        Ok(())
    }
}
