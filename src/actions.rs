//! User-facing actions that can be dispatched against the panel session.
//!
//! Every inbound intent the panel emits is a variant here, so handling is
//! exhaustively matched: adding a message kind is a compile-time-checked
//! change, not a stringly-typed dispatch.

use crate::{session::PanelSession, tool::StackTool};
use std::time::Instant;

/// An [Action] is a dispatchable operation performed by the user against the
/// rendered stack.
///
/// Branch-level actions carry the branch name; commit-level actions carry the
/// commit SHA. Indices on [Action::Reorder] are display positions (top card
/// is index 0).
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Action {
    /// The panel front end finished loading and wants a first snapshot.
    Ready,
    /// Explicit refresh request.
    Refresh,
    /// Expand or collapse a branch card's commit list. Panel-local.
    ToggleExpand { branch: String },
    /// Reveal one more page of commit rows. Panel-local.
    ExtendCommits { branch: String },
    /// Open the code-review page for a branch's change.
    OpenChange { url: String },
    /// Open the diff view for a commit.
    OpenCommitDiff { sha: String },
    /// Copy a commit SHA.
    CopySha { sha: String },
    /// A drag-move of one card, not yet confirmed.
    Reorder {
        branch: String,
        old_index: usize,
        new_index: usize,
    },
    /// Apply the pending drag-move through the stacking tool.
    ConfirmReorder { branch: String },
    /// Discard the pending drag-move.
    CancelReorder { branch: String },
    Checkout { branch: String },
    Untrack { branch: String },
    Fold { branch: String },
    Squash { branch: String },
    Edit { branch: String },
    Rename { branch: String, new_name: String },
    Restack { branch: String },
    Submit { branch: String },
    Fixup { sha: String },
    Split { sha: String, branch: String },
    Create { name: String },
    Sync,
}

/// A side effect the host shell performs on the panel's behalf.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum HostRequest {
    /// Open a URL in the user's browser.
    OpenUrl(String),
    /// Show the diff of a commit.
    ShowCommit(String),
    /// Put text on the clipboard.
    CopyText(String),
    /// Surface a transient notification.
    Notify(String),
}

impl Action {
    /// Dispatches the action against the session.
    ///
    /// Mutating actions follow one contract: invoke the tool once, then
    /// refresh the snapshot unconditionally; a failure surfaces as a
    /// [HostRequest::Notify] with the tool's message.
    pub async fn dispatch<T: StackTool>(
        self,
        session: &mut PanelSession<T>,
        now: Instant,
    ) -> Option<HostRequest> {
        match self {
            Action::Ready | Action::Refresh => {
                session.refresh(now).await;
                None
            }
            Action::ToggleExpand { branch } => {
                session.toggle_expand(&branch, now);
                None
            }
            Action::ExtendCommits { branch } => {
                session.extend_commits(&branch, now);
                None
            }
            Action::OpenChange { url } => Some(HostRequest::OpenUrl(url)),
            Action::OpenCommitDiff { sha } => Some(HostRequest::ShowCommit(sha)),
            Action::CopySha { sha } => Some(HostRequest::CopyText(sha)),
            Action::Reorder {
                branch,
                old_index,
                new_index,
            } => {
                session.begin_reorder(branch, old_index, new_index, now);
                None
            }
            Action::ConfirmReorder { branch } => session.confirm_reorder(&branch, now).await,
            Action::CancelReorder { branch } => {
                session.cancel_reorder(&branch, now);
                None
            }
            Action::Checkout { branch } => {
                let result = session.tool().checkout(&branch).await;
                session.finish_mutation(result, now).await
            }
            Action::Untrack { branch } => {
                let result = session.tool().untrack(&branch).await;
                session.finish_mutation(result, now).await
            }
            Action::Fold { branch } => {
                let result = session.tool().fold(&branch).await;
                session.finish_mutation(result, now).await
            }
            Action::Squash { branch } => {
                let result = session.tool().squash(&branch).await;
                session.finish_mutation(result, now).await
            }
            Action::Edit { branch } => {
                let result = session.tool().edit(&branch).await;
                session.finish_mutation(result, now).await
            }
            Action::Rename { branch, new_name } => {
                let result = session.tool().rename(&branch, &new_name).await;
                session.finish_mutation(result, now).await
            }
            Action::Restack { branch } => {
                let result = session.tool().restack(&branch).await;
                session.finish_mutation(result, now).await
            }
            Action::Submit { branch } => {
                let result = session.tool().submit(&branch).await;
                session.finish_mutation(result, now).await
            }
            Action::Fixup { sha } => {
                let result = session.tool().fixup(&sha).await;
                session.finish_mutation(result, now).await
            }
            Action::Split { sha, branch } => {
                let result = session.tool().split(&sha, &branch).await;
                session.finish_mutation(result, now).await
            }
            Action::Create { name } => {
                let result = session.tool().create(&name).await;
                session.finish_mutation(result, now).await
            }
            Action::Sync => {
                let result = session.tool().sync().await;
                session.finish_mutation(result, now).await
            }
        }
    }
}
