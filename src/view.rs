//! Display-ready projection of the resolved stack.
//!
//! [project] maps resolved [BranchRecord]s into [BranchViewModel]s and bundles
//! them with the last fetch error and the in-flight optimistic reorder into a
//! single immutable [DisplayState]. Everything here is a pure transform; the
//! panel tree is mutated elsewhere, by reconciliation.

use crate::{
    constants::SHORT_SHA_LEN,
    graph::{BranchRecord, ChangeRef},
};

/// A branch as displayed in the panel.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BranchViewModel {
    pub name: String,
    /// Whether this is the checked-out branch.
    pub current: bool,
    /// Whether any edge of this branch is out of date.
    pub restack: bool,
    /// Associated code-review reference, if any.
    pub change: Option<ChangeRef>,
    /// Commits unique to this branch, newest first.
    pub commits: Vec<CommitViewModel>,
}

/// A commit row within a branch card.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CommitViewModel {
    pub sha: String,
    /// Fixed-length prefix of `sha` for display.
    pub short_sha: String,
    pub subject: String,
}

/// An optimistic, unconfirmed drag-move of one branch card.
///
/// Indices are in reversed display coordinates: index 0 is the topmost
/// rendered card, which is the branch furthest from the trunk.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PendingReorder {
    pub branch_name: String,
    pub old_index: usize,
    pub new_index: usize,
}

/// The complete state of the panel at one instant.
///
/// `branches` is in bottom-of-stack-first order; the display layer reverses
/// it so the branch furthest from the trunk renders at the top.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct DisplayState {
    pub branches: Vec<BranchViewModel>,
    /// Last fetch error, verbatim. Shown in place of the stack.
    pub error: Option<String>,
    pub pending_reorder: Option<PendingReorder>,
}

/// Projects the resolved stack into a [DisplayState], applying the pending
/// reorder (when one exists) before mapping records to view-models.
pub fn project(
    ordered: &[BranchRecord],
    error: Option<String>,
    pending: Option<PendingReorder>,
) -> DisplayState {
    let overlaid;
    let records = match pending.as_ref() {
        Some(reorder) => {
            overlaid = apply_pending_reorder(ordered.to_vec(), reorder);
            overlaid.as_slice()
        }
        None => ordered,
    };

    DisplayState {
        branches: records.iter().map(project_branch).collect(),
        error,
        pending_reorder: pending,
    }
}

/// Reorders `ordered` to preview a pending drag-move, without touching the
/// underlying graph.
///
/// The pending indices are display positions (top-first); the array is
/// bottom-first, so the insertion point is the inverted index, clamped to the
/// array bounds. An unknown branch name leaves the input untouched.
pub fn apply_pending_reorder(
    mut ordered: Vec<BranchRecord>,
    pending: &PendingReorder,
) -> Vec<BranchRecord> {
    let Some(position) = ordered
        .iter()
        .position(|record| record.name == pending.branch_name)
    else {
        return ordered;
    };

    let moved = ordered.remove(position);
    let insert_pos = ordered.len().saturating_sub(pending.new_index);
    ordered.insert(insert_pos, moved);
    ordered
}

fn project_branch(record: &BranchRecord) -> BranchViewModel {
    let restack = record
        .down
        .as_ref()
        .is_some_and(|down| down.needs_restack)
        || record.ups.iter().any(|up| up.needs_restack);

    BranchViewModel {
        name: record.name.clone(),
        current: record.current,
        restack,
        change: record.change.clone(),
        commits: record
            .commits
            .iter()
            .map(|commit| CommitViewModel {
                sha: commit.sha.clone(),
                short_sha: short_sha(&commit.sha),
                subject: commit.subject.clone(),
            })
            .collect(),
    }
}

/// Shortens a commit SHA to its display prefix.
pub fn short_sha(sha: &str) -> String {
    sha.chars().take(SHORT_SHA_LEN).collect()
}
