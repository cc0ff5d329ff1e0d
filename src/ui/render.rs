//! Builders for the branch card and commit row subtrees.
//!
//! Renderers are pure: view-model in, subtree out. Gestures are wired as
//! data (activation intents, context-menu items, drag specs) which the host
//! front end translates into dispatched [Action]s.

use crate::{
    actions::Action,
    constants::{EMPTY_CIRCLE, FILLED_CIRCLE},
    ui::{DragSpec, MenuCommand, MenuItem, NodeKind, UiNode},
    view::{BranchViewModel, CommitViewModel},
};

/// One branch card's worth of display input: the view-model plus the
/// panel-local state that shapes the card.
#[derive(Debug, Clone, PartialEq)]
pub struct CardItem {
    pub vm: BranchViewModel,
    /// Whether the commit list is expanded.
    pub expanded: bool,
    /// How many commit rows are currently revealed.
    pub visible_commits: usize,
    /// Whether this card is the subject of an unconfirmed drag-move.
    pub pending: bool,
}

impl CardItem {
    /// Whether commits beyond the revealed prefix remain.
    pub fn has_more(&self) -> bool {
        self.vm.commits.len() > self.visible_commits
    }

    /// The commit rows currently revealed.
    pub fn visible_slice(&self) -> &[CommitViewModel] {
        let end = self.visible_commits.min(self.vm.commits.len());
        &self.vm.commits[..end]
    }
}

/// Change predicate for the branch card list. Commit row contents are
/// deliberately ignored: those are reconciled separately, inside the card.
pub fn card_changed(previous: &CardItem, next: &CardItem) -> bool {
    previous.vm.name != next.vm.name
        || previous.vm.current != next.vm.current
        || previous.vm.restack != next.vm.restack
        || previous.vm.change != next.vm.change
        || previous.vm.commits.len() != next.vm.commits.len()
        || previous.expanded != next.expanded
        || previous.visible_commits != next.visible_commits
        || previous.pending != next.pending
}

/// Builds the card subtree for one branch.
///
/// The commit list child is reconciler-managed: this renderer only puts the
/// (empty) container in place, the session fills it row by row.
pub fn render_branch_card(item: &CardItem) -> UiNode {
    let vm = &item.vm;
    let glyph = if vm.current { FILLED_CIRCLE } else { EMPTY_CIRCLE };

    let mut header = UiNode::new(NodeKind::Row)
        .with_key("header")
        .with_intent(Action::ToggleExpand {
            branch: vm.name.clone(),
        })
        .push(
            UiNode::new(NodeKind::Label)
                .with_key("status")
                .with_text(glyph.to_string()),
        )
        .push(
            UiNode::new(NodeKind::Label)
                .with_key("name")
                .with_text(vm.name.clone()),
        );

    if vm.restack {
        header = header.push(
            UiNode::new(NodeKind::Badge)
                .with_key("restack")
                .with_text("needs restack"),
        );
    }

    if let Some(change) = &vm.change {
        let text = match change.status.as_deref() {
            Some(status) => format!("#{} ({})", change.id, status),
            None => format!("#{}", change.id),
        };
        let mut chip = UiNode::new(NodeKind::ChangeChip)
            .with_key("change")
            .with_text(text);
        if let Some(url) = &change.url {
            chip = chip.with_intent(Action::OpenChange { url: url.clone() });
        }
        header = header.push(chip);
    }

    let mut card = UiNode::new(NodeKind::Card)
        .with_key(vm.name.clone())
        .with_drag(DragSpec {
            branch: vm.name.clone(),
        })
        .with_menu(branch_menu(vm))
        .push(header);

    if item.pending {
        card = card.push(
            UiNode::new(NodeKind::PendingBar)
                .with_key("pending")
                .push(
                    UiNode::new(NodeKind::Label)
                        .with_key("confirm")
                        .with_text("apply move")
                        .with_intent(Action::ConfirmReorder {
                            branch: vm.name.clone(),
                        }),
                )
                .push(
                    UiNode::new(NodeKind::Label)
                        .with_key("cancel")
                        .with_text("cancel")
                        .with_intent(Action::CancelReorder {
                            branch: vm.name.clone(),
                        }),
                ),
        );
    }

    if item.expanded && !vm.commits.is_empty() {
        card = card.push(UiNode::new(NodeKind::CommitList).with_key("commits").managed());

        if item.has_more() {
            let hidden = vm.commits.len() - item.visible_commits;
            card = card.push(
                UiNode::new(NodeKind::ShowMore)
                    .with_key("more")
                    .with_text(format!("show {hidden} more"))
                    .with_intent(Action::ExtendCommits {
                        branch: vm.name.clone(),
                    }),
            );
        }
    }

    card
}

/// Builds the row subtree for one commit.
pub fn render_commit_row(commit: &CommitViewModel) -> UiNode {
    UiNode::new(NodeKind::CommitRow)
        .with_key(commit.sha.clone())
        .with_intent(Action::OpenCommitDiff {
            sha: commit.sha.clone(),
        })
        .with_menu(commit_menu())
        .push(
            UiNode::new(NodeKind::Label)
                .with_key("sha")
                .with_text(commit.short_sha.clone())
                .with_intent(Action::CopySha {
                    sha: commit.sha.clone(),
                }),
        )
        .push(
            UiNode::new(NodeKind::Label)
                .with_key("subject")
                .with_text(commit.subject.clone()),
        )
}

/// The context menu of a branch card. Enablement is state-dependent:
/// `edit` only works on the checked-out branch, `restack` only when the
/// branch is out of date, and `submit` turns into a resubmit once a change
/// reference exists.
fn branch_menu(vm: &BranchViewModel) -> Vec<MenuItem> {
    let submit = if vm.change.is_some() {
        MenuItem {
            label: "Resubmit",
            icon: "sync",
            enabled: true,
            command: MenuCommand::Submit,
        }
    } else {
        MenuItem {
            label: "Submit",
            icon: "cloud-upload",
            enabled: true,
            command: MenuCommand::Submit,
        }
    };

    vec![
        MenuItem {
            label: "Checkout",
            icon: "arrow-swap",
            enabled: !vm.current,
            command: MenuCommand::Checkout,
        },
        MenuItem {
            label: "Edit",
            icon: "edit",
            enabled: vm.current,
            command: MenuCommand::Edit,
        },
        MenuItem {
            label: "Restack",
            icon: "layers",
            enabled: vm.restack,
            command: MenuCommand::Restack,
        },
        submit,
        MenuItem {
            label: "Rename",
            icon: "tag",
            enabled: true,
            command: MenuCommand::Rename,
        },
        MenuItem {
            label: "Fold into parent",
            icon: "fold-down",
            enabled: true,
            command: MenuCommand::Fold,
        },
        MenuItem {
            label: "Squash commits",
            icon: "combine",
            enabled: true,
            command: MenuCommand::Squash,
        },
        MenuItem {
            label: "Untrack",
            icon: "eye-closed",
            enabled: true,
            command: MenuCommand::Untrack,
        },
    ]
}

fn commit_menu() -> Vec<MenuItem> {
    vec![
        MenuItem {
            label: "Copy SHA",
            icon: "copy",
            enabled: true,
            command: MenuCommand::CopySha,
        },
        MenuItem {
            label: "Open diff",
            icon: "diff",
            enabled: true,
            command: MenuCommand::OpenDiff,
        },
        MenuItem {
            label: "Fixup into commit",
            icon: "wrench",
            enabled: true,
            command: MenuCommand::Fixup,
        },
        MenuItem {
            label: "Split at commit",
            icon: "split-horizontal",
            enabled: true,
            command: MenuCommand::Split,
        },
    ]
}

#[cfg(test)]
mod test {
    use super::{card_changed, render_branch_card, render_commit_row, CardItem};
    use crate::{
        graph::ChangeRef,
        ui::MenuCommand,
        view::{BranchViewModel, CommitViewModel},
    };

    fn vm(name: &str) -> BranchViewModel {
        BranchViewModel {
            name: name.to_string(),
            current: false,
            restack: false,
            change: None,
            commits: Vec::new(),
        }
    }

    fn card(vm: BranchViewModel) -> CardItem {
        CardItem {
            vm,
            expanded: false,
            visible_commits: 10,
            pending: false,
        }
    }

    fn commit(sha: &str, subject: &str) -> CommitViewModel {
        CommitViewModel {
            sha: sha.to_string(),
            short_sha: sha.chars().take(8).collect(),
            subject: subject.to_string(),
        }
    }

    fn menu_item<'a>(
        node: &'a crate::ui::UiNode,
        command: MenuCommand,
    ) -> &'a crate::ui::MenuItem {
        node.menu
            .iter()
            .find(|item| item.command == command)
            .expect("menu item missing")
    }

    #[test]
    fn edit_is_enabled_only_on_the_current_branch() {
        let mut model = vm("feature");
        assert!(!menu_item(&render_branch_card(&card(model.clone())), MenuCommand::Edit).enabled);

        model.current = true;
        assert!(menu_item(&render_branch_card(&card(model)), MenuCommand::Edit).enabled);
    }

    #[test]
    fn restack_is_enabled_only_when_out_of_date() {
        let mut model = vm("feature");
        assert!(
            !menu_item(&render_branch_card(&card(model.clone())), MenuCommand::Restack).enabled
        );

        model.restack = true;
        assert!(menu_item(&render_branch_card(&card(model)), MenuCommand::Restack).enabled);
    }

    #[test]
    fn submit_swaps_to_resubmit_once_a_change_exists() {
        let mut model = vm("feature");
        let node = render_branch_card(&card(model.clone()));
        assert_eq!(menu_item(&node, MenuCommand::Submit).label, "Submit");

        model.change = Some(ChangeRef {
            id: "7".to_string(),
            url: None,
            status: None,
        });
        let node = render_branch_card(&card(model));
        let item = menu_item(&node, MenuCommand::Submit);
        assert_eq!(item.label, "Resubmit");
        assert_eq!(item.icon, "sync");
    }

    #[test]
    fn restack_badge_appears_only_when_needed() {
        let mut model = vm("feature");
        let node = render_branch_card(&card(model.clone()));
        assert!(node.child("header").unwrap().child("restack").is_none());

        model.restack = true;
        let node = render_branch_card(&card(model));
        assert!(node.child("header").unwrap().child("restack").is_some());
    }

    #[test]
    fn collapsed_card_has_no_commit_list() {
        let mut model = vm("feature");
        model.commits = vec![commit("abcd1234deadbeef", "Add x")];

        let mut item = card(model);
        assert!(render_branch_card(&item).child("commits").is_none());

        item.expanded = true;
        let node = render_branch_card(&item);
        let commits = node.child("commits").unwrap();
        assert!(commits.managed);
        assert!(commits.children.is_empty(), "rows belong to the session");
    }

    #[test]
    fn show_more_appears_while_commits_remain_hidden() {
        let mut model = vm("feature");
        model.commits = (0..13)
            .map(|i| commit(&format!("{i:040}"), "c"))
            .collect();

        let mut item = card(model);
        item.expanded = true;
        item.visible_commits = 10;
        let node = render_branch_card(&item);
        assert_eq!(
            node.child("more").unwrap().text.as_deref(),
            Some("show 3 more")
        );

        item.visible_commits = 20;
        assert!(render_branch_card(&item).child("more").is_none());
    }

    #[test]
    fn pending_card_offers_confirm_and_cancel() {
        let mut item = card(vm("feature"));
        item.pending = true;

        let node = render_branch_card(&item);
        let bar = node.child("pending").unwrap();
        assert!(bar.child("confirm").unwrap().intent.is_some());
        assert!(bar.child("cancel").unwrap().intent.is_some());
    }

    #[test]
    fn commit_row_shows_the_short_sha() {
        let node = render_commit_row(&commit("abcd1234deadbeef", "Add x"));
        assert_eq!(node.key, "abcd1234deadbeef");
        assert_eq!(
            node.child("sha").unwrap().text.as_deref(),
            Some("abcd1234")
        );
    }

    #[test]
    fn commit_count_change_marks_the_card_changed() {
        let mut model = vm("feature");
        let a = card(model.clone());
        model.commits = vec![commit("abcd1234deadbeef", "Add x")];
        let b = card(model);

        assert!(card_changed(&a, &b));
        assert!(!card_changed(&a, &a.clone()));
    }
}
