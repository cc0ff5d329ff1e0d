//! `commit` subcommand.

use crate::{
    actions::Action,
    session::PanelSession,
    subcommands::surface,
    tool::CliTool,
    ui::{render::render_commit_row, MenuCommand},
    view::CommitViewModel,
};
use anyhow::{anyhow, Result};
use clap::Args;
use std::fmt::{self, Display};
use std::time::Instant;

/// CLI arguments for the `commit` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct CommitArgs {
    /// Branch whose commits to act on. Defaults to the checked-out branch.
    #[arg(short, long)]
    pub branch: Option<String>,
}

impl CommitArgs {
    /// Run the `commit` subcommand: pick a commit row, then one of its
    /// context-menu actions.
    pub async fn run(self, mut session: PanelSession<CliTool>) -> Result<()> {
        session.refresh(Instant::now()).await;

        let state = session.display_state();
        let vm = match &self.branch {
            Some(name) => state.branches.iter().find(|vm| vm.name == *name),
            None => state.branches.iter().find(|vm| vm.current),
        }
        .ok_or_else(|| anyhow!("No branch is checked out within a tracked stack."))?;

        if vm.commits.is_empty() {
            println!("No commits on `{}`.", vm.name);
            return Ok(());
        }
        let branch = vm.name.clone();

        let rows = vm
            .commits
            .iter()
            .cloned()
            .map(CommitChoice)
            .collect::<Vec<_>>();
        let picked = inquire::Select::new("Select a commit", rows).prompt()?;
        let commit = picked.0;

        let entries = render_commit_row(&commit)
            .menu
            .into_iter()
            .filter(|item| item.enabled)
            .collect::<Vec<_>>();
        let labels = entries.iter().map(|item| item.label).collect::<Vec<_>>();
        let label = inquire::Select::new("Select an action", labels).prompt()?;
        let command = entries
            .iter()
            .find(|item| item.label == label)
            .map(|item| item.command)
            .ok_or_else(|| anyhow!("Unknown action `{label}`."))?;

        let sha = commit.sha.clone();
        let action = match command {
            MenuCommand::CopySha => Action::CopySha { sha },
            MenuCommand::OpenDiff => Action::OpenCommitDiff { sha },
            MenuCommand::Fixup => Action::Fixup { sha },
            MenuCommand::Split => Action::Split { sha, branch },
            _ => return Err(anyhow!("`{}` is not a commit action.", commit.short_sha)),
        };

        let notice = action.dispatch(&mut session, Instant::now()).await;
        surface(notice);
        Ok(())
    }
}

/// A selectable commit row, rendered as short SHA + subject.
struct CommitChoice(CommitViewModel);

impl Display for CommitChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0.short_sha, self.0.subject)
    }
}
