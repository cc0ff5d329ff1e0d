//! `menu` subcommand.

use crate::{
    actions::Action,
    session::PanelSession,
    subcommands::surface,
    tool::CliTool,
    ui::{MenuCommand, MenuItem},
};
use anyhow::{anyhow, Result};
use clap::Args;
use std::fmt::{self, Display};
use std::time::Instant;

/// CLI arguments for the `menu` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct MenuArgs;

impl MenuArgs {
    /// Run the `menu` subcommand: pick a branch card, then one of its
    /// context-menu actions.
    pub async fn run(self, mut session: PanelSession<CliTool>) -> Result<()> {
        session.refresh(Instant::now()).await;

        let lines = session.branch_lines();
        if lines.is_empty() {
            let state = session.display_state();
            return Err(anyhow!(state
                .error
                .unwrap_or_else(|| "No branches in the current stack.".to_string())));
        }

        let choice = inquire::Select::new("Select a branch", lines)
            .with_formatter(&|f| f.value.branch_name.clone())
            .prompt()?;
        let branch = choice.branch_name;

        let entries = session
            .panel()
            .child("stack")
            .and_then(|stack| stack.child(&branch))
            .map(|card| card.menu.clone())
            .unwrap_or_default()
            .into_iter()
            .filter(|item| item.enabled)
            .map(MenuChoice)
            .collect::<Vec<_>>();
        if entries.is_empty() {
            println!("No actions available for `{branch}`.");
            return Ok(());
        }

        let picked = inquire::Select::new("Select an action", entries).prompt()?;
        let action = match picked.0.command {
            MenuCommand::Checkout => Action::Checkout { branch },
            MenuCommand::Untrack => Action::Untrack { branch },
            MenuCommand::Fold => Action::Fold { branch },
            MenuCommand::Squash => Action::Squash { branch },
            MenuCommand::Edit => Action::Edit { branch },
            MenuCommand::Restack => Action::Restack { branch },
            MenuCommand::Submit => Action::Submit { branch },
            MenuCommand::Rename => {
                let new_name = inquire::Text::new("New name:").prompt()?;
                Action::Rename { branch, new_name }
            }
            MenuCommand::CopySha
            | MenuCommand::OpenDiff
            | MenuCommand::Fixup
            | MenuCommand::Split => {
                // Commit-level commands never appear on a branch card.
                return Err(anyhow!("`{branch}` has no such action."));
            }
        };

        let notice = action.dispatch(&mut session, Instant::now()).await;
        surface(notice);

        print!("{}", session.render_panel());
        Ok(())
    }
}

/// A selectable menu entry, rendered as glyph + label.
struct MenuChoice(MenuItem);

impl Display for MenuChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", icon_glyph(self.0.icon), self.0.label)
    }
}

/// Maps a menu item's icon name onto a terminal glyph.
fn icon_glyph(icon: &str) -> char {
    match icon {
        "arrow-swap" => '⇄',
        "edit" => '✎',
        "layers" => '≋',
        "sync" => '↻',
        "cloud-upload" => '↑',
        "tag" => '⌘',
        "fold-down" => '⤵',
        "combine" => '⊕',
        "eye-closed" => '−',
        "copy" => '⧉',
        "diff" => '±',
        "wrench" => '⚒',
        "split-horizontal" => '⑂',
        _ => '·',
    }
}
