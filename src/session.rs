//! The live panel session.
//!
//! A [PanelSession] owns everything with a lifetime: the latest branch
//! snapshot, the last fetch error, the single pending-reorder slot, the
//! expand/pagination state, and the retained panel tree with its two
//! reconciler call sites. Subcommands and hosts drive it exclusively through
//! [Action](crate::actions::Action) dispatch plus [refresh](Self::refresh).
//!
//! The snapshot is replaced wholesale on every refresh; the panel tree is the
//! only structure that persists, and only reconciliation mutates it.

use crate::{
    actions::HostRequest,
    errors::ToolResult,
    resolve::resolve,
    tool::StackTool,
    ui::{
        fmt::{display_lines, write_panel, DisplayLine},
        reconcile::{sweep, KeyedList},
        render::{card_changed, render_branch_card, render_commit_row, CardItem},
        NodeKind, UiNode,
    },
    view::{project, CommitViewModel, DisplayState, PendingReorder},
};
use crate::graph::BranchRecord;
use std::{
    collections::{HashMap, HashSet},
    time::Instant,
};

/// Message shown when the stack is empty and no fetch error explains why.
const NO_BRANCHES: &str = "No branches to display.";

/// The panel session. Generic over the stacking-tool client so tests can
/// substitute a scripted one.
pub struct PanelSession<T> {
    tool: T,
    /// Commit rows revealed per "show more" step.
    page_size: usize,
    /// Latest snapshot, replaced wholesale on every refresh.
    records: Vec<BranchRecord>,
    /// Last fetch error, verbatim from the tool.
    last_error: Option<String>,
    /// The single optimistic drag-move slot.
    pending: Option<PendingReorder>,
    /// Branches with their commit list expanded.
    expanded: HashSet<String>,
    /// Branch name to number of revealed commit pages.
    pages: HashMap<String, usize>,
    /// The retained panel tree.
    root: UiNode,
    /// Previous-items snapshot for the branch card list.
    cards: KeyedList<CardItem>,
    /// Previous-items snapshots for each expanded card's commit rows.
    commit_rows: HashMap<String, KeyedList<CommitViewModel>>,
}

impl<T: StackTool> PanelSession<T> {
    pub fn new(tool: T, page_size: usize) -> Self {
        let root = UiNode::new(NodeKind::Panel)
            .push(UiNode::new(NodeKind::Stack).with_key("stack"));

        Self {
            tool,
            page_size: page_size.max(1),
            records: Vec::new(),
            last_error: None,
            pending: None,
            expanded: HashSet::new(),
            pages: HashMap::new(),
            root,
            cards: KeyedList::new(),
            commit_rows: HashMap::new(),
        }
    }

    /// The stacking-tool client, for dispatching mutating operations.
    pub fn tool(&self) -> &T {
        &self.tool
    }

    /// The retained panel tree.
    pub fn panel(&self) -> &UiNode {
        &self.root
    }

    /// Replaces the snapshot from the tool and pushes the new state into the
    /// panel tree. Any refresh outcome clears the optimistic preview.
    pub async fn refresh(&mut self, now: Instant) {
        self.pending = None;
        match self.tool.snapshot().await {
            Ok(records) => {
                tracing::debug!(branches = records.len(), "snapshot replaced");
                self.records = records;
                self.last_error = None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "snapshot fetch failed");
                self.records.clear();
                self.last_error = Some(err.to_string());
            }
        }
        self.push_state(now);
    }

    /// Computes the immutable display state from the current snapshot,
    /// error, and pending reorder.
    pub fn display_state(&self) -> DisplayState {
        let ordered = resolve(&self.records);
        project(&ordered, self.last_error.clone(), self.pending.clone())
    }

    /// Reconciles the panel tree against the current display state.
    ///
    /// The resolved order is bottom-of-stack-first; rendering reverses it so
    /// the branch furthest from the trunk is the top card.
    pub fn push_state(&mut self, now: Instant) {
        let state = self.display_state();

        let display: Vec<CardItem> = state
            .branches
            .iter()
            .rev()
            .map(|vm| CardItem {
                vm: vm.clone(),
                expanded: self.expanded.contains(&vm.name),
                visible_commits: self.pages.get(&vm.name).copied().unwrap_or(1) * self.page_size,
                pending: state
                    .pending_reorder
                    .as_ref()
                    .is_some_and(|pending| pending.branch_name == vm.name),
            })
            .collect();

        if display.is_empty() {
            let message = state.error.clone().unwrap_or_else(|| NO_BRANCHES.to_string());
            match self.root.child_mut("empty") {
                Some(node) => node.text = Some(message),
                None => self.root.children.insert(
                    0,
                    UiNode::new(NodeKind::EmptyState)
                        .with_key("empty")
                        .with_text(message),
                ),
            }
        } else {
            self.root.children.retain(|child| child.key != "empty");
        }

        let root = &mut self.root;
        let cards = &mut self.cards;
        let commit_rows = &mut self.commit_rows;
        let stack = root
            .child_mut("stack")
            .expect("panel root always holds the stack container");

        let stats = cards.sync(
            stack,
            &display,
            now,
            |item| item.vm.name.as_str(),
            render_branch_card,
            card_changed,
        );
        tracing::trace!(
            entered = stats.entered,
            exited = stats.exited,
            moved = stats.moved,
            updated = stats.updated,
            revived = stats.revived,
            "branch list reconciled"
        );

        // Second nesting level: commit rows inside each expanded card.
        for item in &display {
            if !item.expanded || item.vm.commits.is_empty() {
                continue;
            }
            let Some(card) = stack.child_mut(&item.vm.name) else {
                continue;
            };
            let Some(list) = card.child_mut("commits") else {
                continue;
            };
            let rows = commit_rows.entry(item.vm.name.clone()).or_default();
            rows.sync(
                list,
                item.visible_slice(),
                now,
                |commit| commit.sha.as_str(),
                render_commit_row,
                |previous, next| previous != next,
            );
        }

        commit_rows
            .retain(|name, _| display.iter().any(|item| item.expanded && item.vm.name == *name));
    }

    /// Expands or collapses a card's commit list. Panel-local, no tool call.
    pub fn toggle_expand(&mut self, branch: &str, now: Instant) {
        if !self.expanded.remove(branch) {
            self.expanded.insert(branch.to_string());
        } else {
            self.pages.remove(branch);
        }
        self.push_state(now);
    }

    /// Reveals one more page of commit rows for a branch.
    pub fn extend_commits(&mut self, branch: &str, now: Instant) {
        *self.pages.entry(branch.to_string()).or_insert(1) += 1;
        self.push_state(now);
    }

    /// Stores an optimistic drag-move and previews it. A drop onto the same
    /// position is discarded; a drag that begins while another move is still
    /// pending replaces it.
    pub fn begin_reorder(
        &mut self,
        branch: String,
        old_index: usize,
        new_index: usize,
        now: Instant,
    ) {
        if old_index == new_index {
            return;
        }
        if self.pending.is_some() {
            tracing::debug!(%branch, "replacing pending reorder");
        }
        self.pending = Some(PendingReorder {
            branch_name: branch,
            old_index,
            new_index,
        });
        self.push_state(now);
    }

    /// Applies the pending drag-move through the tool.
    ///
    /// On failure the pending move is restored after the refresh cleared it,
    /// so the user can retry without re-dragging.
    pub async fn confirm_reorder(&mut self, branch: &str, now: Instant) -> Option<HostRequest> {
        let pending = match self.pending.take() {
            Some(pending) if pending.branch_name == branch => pending,
            other => {
                self.pending = other;
                return None;
            }
        };

        let result = self
            .tool
            .reorder(&pending.branch_name, pending.old_index, pending.new_index)
            .await;

        match result {
            Ok(()) => {
                self.refresh(now).await;
                None
            }
            Err(err) => {
                let notice = HostRequest::Notify(err.to_string());
                self.refresh(now).await;
                self.pending = Some(pending);
                self.push_state(now);
                Some(notice)
            }
        }
    }

    /// Discards the pending drag-move.
    pub fn cancel_reorder(&mut self, branch: &str, now: Instant) {
        if self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.branch_name == branch)
        {
            self.pending = None;
            self.push_state(now);
        }
    }

    /// Completes a mutating operation: surface a failure as a notification,
    /// then refresh unconditionally.
    pub async fn finish_mutation(
        &mut self,
        result: ToolResult<()>,
        now: Instant,
    ) -> Option<HostRequest> {
        let notice = result.err().map(|err| HostRequest::Notify(err.to_string()));
        self.refresh(now).await;
        notice
    }

    /// Detaches expired exiting nodes and clears expired animation marks.
    pub fn tick(&mut self, now: Instant) {
        let detached = sweep(&mut self.root, now);
        if detached > 0 {
            tracing::trace!(detached, "swept exited cards");
        }
    }

    /// Renders the panel tree to a colored terminal string.
    pub fn render_panel(&self) -> String {
        let mut buf = String::new();
        // Writing into a String cannot fail.
        let _ = write_panel(&mut buf, self.panel());
        buf
    }

    /// One selectable line per branch card, for interactive prompts.
    pub fn branch_lines(&self) -> Vec<DisplayLine> {
        display_lines(self.panel())
    }
}

#[cfg(test)]
mod test {
    use super::PanelSession;
    use crate::{
        actions::{Action, HostRequest},
        errors::{ToolError, ToolResult},
        graph::{BranchLink, BranchRecord, ChangeRef, CommitRecord},
        tool::StackTool,
    };
    use std::{
        collections::VecDeque,
        sync::Mutex,
        time::Instant,
    };

    #[derive(Default)]
    struct FakeTool {
        snapshots: Mutex<VecDeque<ToolResult<Vec<BranchRecord>>>>,
        reorders: Mutex<VecDeque<ToolResult<()>>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeTool {
        fn push_snapshot(&self, result: ToolResult<Vec<BranchRecord>>) {
            self.snapshots.lock().unwrap().push_back(result);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }
    }

    impl StackTool for FakeTool {
        async fn snapshot(&self) -> ToolResult<Vec<BranchRecord>> {
            self.record("snapshot");
            self.snapshots
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }

        async fn reorder(
            &self,
            branch: &str,
            old_index: usize,
            new_index: usize,
        ) -> ToolResult<()> {
            self.record(format!("reorder {branch} {old_index} {new_index}"));
            self.reorders.lock().unwrap().pop_front().unwrap_or(Ok(()))
        }

        async fn checkout(&self, branch: &str) -> ToolResult<()> {
            self.record(format!("checkout {branch}"));
            Ok(())
        }

        async fn untrack(&self, branch: &str) -> ToolResult<()> {
            self.record(format!("untrack {branch}"));
            Ok(())
        }

        async fn fold(&self, branch: &str) -> ToolResult<()> {
            self.record(format!("fold {branch}"));
            Ok(())
        }

        async fn squash(&self, branch: &str) -> ToolResult<()> {
            self.record(format!("squash {branch}"));
            Ok(())
        }

        async fn edit(&self, branch: &str) -> ToolResult<()> {
            self.record(format!("edit {branch}"));
            Ok(())
        }

        async fn rename(&self, branch: &str, new_name: &str) -> ToolResult<()> {
            self.record(format!("rename {branch} {new_name}"));
            Ok(())
        }

        async fn restack(&self, branch: &str) -> ToolResult<()> {
            self.record(format!("restack {branch}"));
            Ok(())
        }

        async fn submit(&self, branch: &str) -> ToolResult<()> {
            self.record(format!("submit {branch}"));
            Ok(())
        }

        async fn fixup(&self, sha: &str) -> ToolResult<()> {
            self.record(format!("fixup {sha}"));
            Ok(())
        }

        async fn split(&self, sha: &str, branch: &str) -> ToolResult<()> {
            self.record(format!("split {sha} {branch}"));
            Ok(())
        }

        async fn create(&self, name: &str) -> ToolResult<()> {
            self.record(format!("create {name}"));
            Ok(())
        }

        async fn sync(&self) -> ToolResult<()> {
            self.record("sync");
            Ok(())
        }
    }

    fn stack_records() -> Vec<BranchRecord> {
        vec![
            BranchRecord {
                name: "main".to_string(),
                ups: vec![BranchLink {
                    name: "feature".to_string(),
                    needs_restack: false,
                }],
                ..Default::default()
            },
            BranchRecord {
                name: "feature".to_string(),
                current: true,
                down: Some(BranchLink {
                    name: "main".to_string(),
                    needs_restack: false,
                }),
                commits: (0..12)
                    .map(|i| CommitRecord {
                        sha: format!("{i:040}"),
                        subject: format!("commit {i}"),
                    })
                    .collect(),
                ..Default::default()
            },
        ]
    }

    fn records_with_change(status: &str) -> Vec<BranchRecord> {
        let mut records = stack_records();
        records[1].change = Some(ChangeRef {
            id: "42".to_string(),
            url: None,
            status: Some(status.to_string()),
        });
        records
    }

    fn card_keys(session: &PanelSession<FakeTool>) -> Vec<String> {
        session
            .panel()
            .child("stack")
            .unwrap()
            .live_children()
            .map(|card| card.key.clone())
            .collect()
    }

    fn session_with(records: Vec<BranchRecord>) -> PanelSession<FakeTool> {
        let tool = FakeTool::default();
        tool.push_snapshot(Ok(records));
        PanelSession::new(tool, 10)
    }

    #[tokio::test]
    async fn refresh_renders_cards_top_of_stack_first() {
        let mut session = session_with(stack_records());
        session.refresh(Instant::now()).await;

        assert_eq!(card_keys(&session), vec!["feature", "main"]);
    }

    #[tokio::test]
    async fn failed_refresh_shows_the_error_as_empty_state() {
        let mut session = session_with(stack_records());
        let now = Instant::now();
        session.refresh(now).await;

        session
            .tool()
            .push_snapshot(Err(ToolError::Failed("tool exploded".to_string())));
        session.refresh(now).await;

        let state = session.display_state();
        assert!(state.branches.is_empty());
        assert_eq!(state.error.as_deref(), Some("tool exploded"));
        assert_eq!(
            session.panel().child("empty").unwrap().text.as_deref(),
            Some("tool exploded")
        );
    }

    #[tokio::test]
    async fn reorder_previews_then_confirms_through_the_tool() {
        let mut session = session_with(stack_records());
        let now = Instant::now();
        session.refresh(now).await;

        // Drag `feature` (top card, display index 0) below `main`.
        Action::Reorder {
            branch: "feature".to_string(),
            old_index: 0,
            new_index: 1,
        }
        .dispatch(&mut session, now)
        .await;

        assert_eq!(card_keys(&session), vec!["main", "feature"]);
        assert!(session.display_state().pending_reorder.is_some());

        session.tool().push_snapshot(Ok(stack_records()));
        let notice = Action::ConfirmReorder {
            branch: "feature".to_string(),
        }
        .dispatch(&mut session, now)
        .await;

        assert!(notice.is_none());
        assert!(session.display_state().pending_reorder.is_none());
        assert!(session
            .tool()
            .calls()
            .contains(&"reorder feature 0 1".to_string()));
    }

    #[tokio::test]
    async fn failed_reorder_restores_the_pending_preview() {
        let mut session = session_with(stack_records());
        let now = Instant::now();
        session.refresh(now).await;

        session.begin_reorder("feature".to_string(), 0, 1, now);
        session
            .tool()
            .reorders
            .lock()
            .unwrap()
            .push_back(Err(ToolError::Failed("reorder rejected".to_string())));
        session.tool().push_snapshot(Ok(stack_records()));

        let notice = session.confirm_reorder("feature", now).await;

        assert_eq!(
            notice,
            Some(HostRequest::Notify("reorder rejected".to_string()))
        );
        // Restored after the refresh cleared it, preview still visible.
        assert!(session.display_state().pending_reorder.is_some());
        assert_eq!(card_keys(&session), vec!["main", "feature"]);
    }

    #[tokio::test]
    async fn cancel_discards_the_preview() {
        let mut session = session_with(stack_records());
        let now = Instant::now();
        session.refresh(now).await;

        session.begin_reorder("feature".to_string(), 0, 1, now);
        session.cancel_reorder("feature", now);

        assert!(session.display_state().pending_reorder.is_none());
        assert_eq!(card_keys(&session), vec!["feature", "main"]);
    }

    #[tokio::test]
    async fn second_drag_replaces_the_pending_move() {
        let mut session = session_with(stack_records());
        let now = Instant::now();
        session.refresh(now).await;

        session.begin_reorder("feature".to_string(), 0, 1, now);
        session.begin_reorder("main".to_string(), 1, 0, now);

        let pending = session.display_state().pending_reorder.unwrap();
        assert_eq!(pending.branch_name, "main");
    }

    #[tokio::test]
    async fn same_position_drop_is_ignored() {
        let mut session = session_with(stack_records());
        let now = Instant::now();
        session.refresh(now).await;

        session.begin_reorder("feature".to_string(), 1, 1, now);
        assert!(session.display_state().pending_reorder.is_none());
    }

    #[tokio::test]
    async fn any_refresh_clears_the_pending_move() {
        let mut session = session_with(stack_records());
        let now = Instant::now();
        session.refresh(now).await;

        session.begin_reorder("feature".to_string(), 0, 1, now);
        session.tool().push_snapshot(Ok(stack_records()));
        session.refresh(now).await;

        assert!(session.display_state().pending_reorder.is_none());
    }

    #[tokio::test]
    async fn expanded_card_paginates_commit_rows() {
        let mut session = session_with(stack_records());
        let now = Instant::now();
        session.refresh(now).await;

        session.toggle_expand("feature", now);

        let stack = session.panel().child("stack").unwrap();
        let card = stack.child("feature").unwrap();
        assert_eq!(card.child("commits").unwrap().children.len(), 10);
        assert_eq!(
            card.child("more").unwrap().text.as_deref(),
            Some("show 2 more")
        );

        session.extend_commits("feature", now);
        let stack = session.panel().child("stack").unwrap();
        let card = stack.child("feature").unwrap();
        assert_eq!(card.child("commits").unwrap().children.len(), 12);
        assert!(card.child("more").is_none());
    }

    #[tokio::test]
    async fn change_status_update_flashes_only_the_chip() {
        let mut session = session_with(records_with_change("open"));
        let now = Instant::now();
        session.refresh(now).await;

        session
            .tool()
            .push_snapshot(Ok(records_with_change("merged")));
        session.refresh(now).await;

        let stack = session.panel().child("stack").unwrap();
        let header = stack.child("feature").unwrap().child("header").unwrap();
        assert_eq!(
            header.child("change").unwrap().text.as_deref(),
            Some("#42 (merged)")
        );
        assert!(header.child("change").unwrap().is_flashing());
        assert!(
            !header.child("name").unwrap().is_flashing(),
            "unchanged fields must not flash"
        );
    }

    #[tokio::test]
    async fn mutation_failure_notifies_and_still_refreshes() {
        let mut session = session_with(stack_records());
        let now = Instant::now();
        session.refresh(now).await;

        let notice = session
            .finish_mutation(Err(ToolError::Failed("boom".to_string())), now)
            .await;

        assert_eq!(notice, Some(HostRequest::Notify("boom".to_string())));
        // The unconditional refresh consumed another snapshot.
        assert_eq!(
            session
                .tool()
                .calls()
                .iter()
                .filter(|call| *call == "snapshot")
                .count(),
            2
        );
    }

    #[tokio::test]
    async fn dispatch_routes_branch_actions_to_the_tool() {
        let mut session = session_with(stack_records());
        let now = Instant::now();
        session.refresh(now).await;

        Action::Restack {
            branch: "feature".to_string(),
        }
        .dispatch(&mut session, now)
        .await;

        assert!(session
            .tool()
            .calls()
            .contains(&"restack feature".to_string()));
    }

    #[tokio::test]
    async fn open_change_surfaces_a_host_request() {
        let mut session = session_with(stack_records());
        let now = Instant::now();

        let request = Action::OpenChange {
            url: "https://example.com/42".to_string(),
        }
        .dispatch(&mut session, now)
        .await;

        assert_eq!(
            request,
            Some(HostRequest::OpenUrl("https://example.com/42".to_string()))
        );
    }
}
