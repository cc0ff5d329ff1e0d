//! The subcommands for the `stackpane` application.

use crate::{
    actions::HostRequest, config::PanelConfig, constants::ERROR_COLOR, session::PanelSession,
    tool::CliTool,
};
use anyhow::Result;
use checkout::CheckoutArgs;
use clap::Subcommand;
use commit::CommitArgs;
use create::CreateArgs;
use git2::Repository;
use log::LogArgs;
use menu::MenuArgs;
use rename::RenameArgs;
use reorder::ReorderArgs;
use restack::RestackArgs;
use sync::SyncArgs;
use watch::WatchArgs;

mod checkout;
mod commit;
mod create;
mod log;
mod menu;
mod rename;
mod reorder;
mod restack;
mod sync;
mod watch;

#[derive(Debug, Clone, Eq, PartialEq, Subcommand)]
pub enum Subcommands {
    /// Render the focused stack once.
    #[clap(aliases = ["l", "ls"])]
    Log(LogArgs),
    /// Keep re-rendering the stack as the repository changes.
    #[clap(alias = "w")]
    Watch(WatchArgs),
    /// Check out a branch picked from the rendered stack.
    #[clap(alias = "co")]
    Checkout(CheckoutArgs),
    /// Move a branch within the stack, with an optimistic preview.
    #[clap(alias = "mv")]
    Reorder(ReorderArgs),
    /// Pick a branch card and run one of its context-menu actions.
    #[clap(alias = "m")]
    Menu(MenuArgs),
    /// Pick a commit row and run one of its context-menu actions.
    Commit(CommitArgs),
    /// Restack a branch that has fallen behind its base.
    #[clap(alias = "r")]
    Restack(RestackArgs),
    /// Rename a branch within the stack.
    Rename(RenameArgs),
    /// Create a new branch on top of the current branch.
    #[clap(alias = "c")]
    Create(CreateArgs),
    /// Sync the stack with the remote.
    Sync(SyncArgs),
}

impl Default for Subcommands {
    fn default() -> Self {
        Self::Log(LogArgs)
    }
}

impl Subcommands {
    /// Run the subcommand with the given session.
    pub async fn run(
        self,
        session: PanelSession<CliTool>,
        repo: &Repository,
        config: &PanelConfig,
    ) -> Result<()> {
        match self {
            Self::Log(args) => args.run(session).await,
            Self::Watch(args) => args.run(session, repo, config).await,
            Self::Checkout(args) => args.run(session).await,
            Self::Reorder(args) => args.run(session).await,
            Self::Menu(args) => args.run(session).await,
            Self::Commit(args) => args.run(session).await,
            Self::Restack(args) => args.run(session).await,
            Self::Rename(args) => args.run(session).await,
            Self::Create(args) => args.run(session).await,
            Self::Sync(args) => args.run(session).await,
        }
    }
}

/// Performs the host side of a dispatched action's request, if any. In a
/// terminal that means printing: failures in red on stderr, everything else
/// (a URL to open, a SHA to copy) on stdout.
pub(crate) fn surface(notice: Option<HostRequest>) {
    match notice {
        Some(HostRequest::Notify(message)) => eprintln!("{}", ERROR_COLOR.paint(message)),
        Some(HostRequest::OpenUrl(url)) => println!("{url}"),
        Some(HostRequest::ShowCommit(sha)) => println!("git show {sha}"),
        Some(HostRequest::CopyText(text)) => println!("{text}"),
        None => {}
    }
}
