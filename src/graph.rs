//! Structured representation of the branch records reported by the external
//! stacking tool.
//!
//! One [BranchRecord] per tracked branch, adjacency expressed by name. The
//! records are pure data: resolution and display logic live in
//! [resolve](crate::resolve) and [view](crate::view).

use serde::Deserialize;

/// A single tracked branch, as reported by the stacking tool.
#[derive(Default, Debug, Clone, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchRecord {
    /// The branch name. Unique within one snapshot; on duplicates the last
    /// record wins.
    pub name: String,
    /// Whether this is the checked-out branch. At most one record should set
    /// this; if several do, the first one found is honored.
    #[serde(default)]
    pub current: bool,
    /// The single parent/base link, if the branch has one.
    #[serde(default)]
    pub down: Option<BranchLink>,
    /// Child/dependent links. Order as supplied is irrelevant.
    #[serde(default)]
    pub ups: Vec<BranchLink>,
    /// Associated code-review reference, if one exists.
    #[serde(default)]
    pub change: Option<ChangeRef>,
    /// Commits unique to this branch, newest first.
    #[serde(default)]
    pub commits: Vec<CommitRecord>,
}

/// An adjacency link to another branch, annotated with whether the edge is
/// out of date.
#[derive(Default, Debug, Clone, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchLink {
    /// Name of the linked branch. May dangle; resolution treats a dangling
    /// name as a link to nothing.
    pub name: String,
    /// Whether the branch on this edge needs to be restacked.
    #[serde(default)]
    pub needs_restack: bool,
}

/// A code-review reference attached to a branch.
#[derive(Default, Debug, Clone, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRef {
    /// The review identifier, e.g. a PR number.
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A commit unique to a branch.
#[derive(Default, Debug, Clone, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRecord {
    pub sha: String,
    pub subject: String,
}
