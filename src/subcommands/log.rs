//! `log` subcommand.

use crate::{session::PanelSession, tool::CliTool};
use anyhow::Result;
use clap::Args;
use std::time::Instant;

/// CLI arguments for the `log` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct LogArgs;

impl LogArgs {
    /// Run the `log` subcommand.
    pub async fn run(self, mut session: PanelSession<CliTool>) -> Result<()> {
        session.refresh(Instant::now()).await;
        print!("{}", session.render_panel());
        Ok(())
    }
}
