//! Keyed reconciliation of the retained panel tree.
//!
//! [reconcile] mutates one container's children to match a new array of keyed
//! items with minimal movement: stale children are marked exiting and swept
//! later, new keys enter in place, and changed items are patched field by
//! field so only the leaf texts that actually differ flash. The engine is
//! generic over the item type and is used at two nesting levels: the branch
//! card list and, inside each expanded card, its commit rows.
//!
//! Removal timing is explicit rather than timer-driven: an exiting node keeps
//! its deadline on the [Anim] mark, and [sweep] detaches it once the deadline
//! passes. A newer reconciliation pass that brings the key back simply clears
//! the mark, which cancels the pending removal deterministically.

use crate::{
    constants::{ENTER_ANIM, EXIT_ANIM, FLASH_ANIM},
    ui::{Anim, AnimKind, UiNode},
};
use std::{
    collections::{HashMap, HashSet},
    time::Instant,
};

/// Counts of the mutations one [reconcile] pass performed. Useful for tests
/// and trace logging; the panel itself ignores them.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct ReconcileStats {
    /// Nodes rendered and inserted for new keys.
    pub entered: usize,
    /// Live nodes marked exiting because their key left the data.
    pub exited: usize,
    /// Existing nodes repositioned.
    pub moved: usize,
    /// Existing nodes patched because their item changed.
    pub updated: usize,
    /// Exiting nodes brought back because their key returned.
    pub revived: usize,
}

/// Reconciles `container`'s children against `new`.
///
/// ## Takes
/// - `container` - The node whose children mirror the item list.
/// - `old` - The items the container was last reconciled against.
/// - `new` - The items the container should reflect.
/// - `now` - Timestamp used to stamp animation deadlines.
/// - `key_of` - Extracts the stable key of an item.
/// - `render` - Builds the subtree for one item. Only invoked for new keys
///   and for items `needs_update` reported changed.
/// - `needs_update` - Whether an item changed since the previous pass.
///
/// ## Guarantees
/// After the call, the container's live (non-exiting) children are exactly
/// the keys of `new`, in order. Exiting children linger in place until
/// [sweep]ed and are revived if their key returns first.
pub fn reconcile<T, K, R, N>(
    container: &mut UiNode,
    old: &[T],
    new: &[T],
    now: Instant,
    key_of: K,
    mut render: R,
    needs_update: N,
) -> ReconcileStats
where
    K: Fn(&T) -> &str,
    R: FnMut(&T) -> UiNode,
    N: Fn(&T, &T) -> bool,
{
    let mut stats = ReconcileStats::default();

    let old_by_key: HashMap<&str, &T> = old.iter().map(|item| (key_of(item), item)).collect();
    let new_keys: HashSet<&str> = new.iter().map(|item| key_of(item)).collect();

    // Mark children whose key left the data as exiting. They stay in the
    // tree, untouched, until the sweep detaches them.
    for child in container.children.iter_mut() {
        if !child.is_exiting() && !new_keys.contains(child.key.as_str()) {
            child.anim = Some(Anim {
                kind: AnimKind::Exit,
                until: now + EXIT_ANIM,
            });
            stats.exited += 1;
        }
    }

    // Walk the new items, keeping a cursor over the just-placed child.
    let mut last_placed: Option<usize> = None;
    for item in new {
        let key = key_of(item);

        match container.children.iter().position(|child| child.key == key) {
            Some(index) => {
                let child = &mut container.children[index];
                if child.is_exiting() {
                    // The key came back before the exit deadline: cancel the
                    // removal and refresh the subtree in place.
                    child.anim = None;
                    let fresh = render(item);
                    patch_in_place(child, fresh, now);
                    stats.revived += 1;
                } else if let Some(previous) = old_by_key.get(key).copied() {
                    if needs_update(previous, item) {
                        let fresh = render(item);
                        if patch_in_place(child, fresh, now) {
                            stats.updated += 1;
                        }
                    }
                } else {
                    // In the tree but unknown to the caller's snapshot
                    // (e.g. revived on an earlier pass): refresh in place.
                    let fresh = render(item);
                    if patch_in_place(child, fresh, now) {
                        stats.updated += 1;
                    }
                }

                if is_next_live(&container.children, last_placed, index) {
                    last_placed = Some(index);
                } else {
                    let node = container.children.remove(index);
                    let mut target = last_placed.map_or(0, |placed| placed + 1);
                    if index < target {
                        target -= 1;
                    }
                    container.children.insert(target, node);
                    stats.moved += 1;
                    last_placed = Some(target);
                }
            }
            None => {
                let mut node = render(item);
                debug_assert_eq!(node.key, key, "renderer must key the node by its item");
                node.anim = Some(Anim {
                    kind: AnimKind::Enter,
                    until: now + ENTER_ANIM,
                });
                let target = last_placed.map_or(0, |placed| placed + 1);
                container.children.insert(target, node);
                stats.entered += 1;
                last_placed = Some(target);
            }
        }
    }

    stats
}

/// Whether `children[index]` is the first non-exiting child after the cursor.
fn is_next_live(children: &[UiNode], last_placed: Option<usize>, index: usize) -> bool {
    let start = last_placed.map_or(0, |placed| placed + 1);
    if index < start {
        return false;
    }
    children[start..index].iter().all(UiNode::is_exiting)
}

/// Patches `existing` in place to match `fresh`, flashing only the leaf
/// texts that actually changed. Returns whether anything changed.
///
/// Structural mismatches (different kind or key) replace the subtree
/// wholesale. Children marked [managed](UiNode::managed) keep their children
/// untouched: those belong to a nested reconciler.
pub fn patch_in_place(existing: &mut UiNode, fresh: UiNode, now: Instant) -> bool {
    if existing.kind != fresh.kind || existing.key != fresh.key {
        *existing = fresh;
        return true;
    }

    let mut changed = false;

    // Behavioral payloads update silently; they have no visual footprint.
    existing.intent = fresh.intent;
    existing.menu = fresh.menu;
    existing.drag = fresh.drag;
    existing.managed = fresh.managed;

    if existing.text != fresh.text {
        existing.text = fresh.text;
        existing.anim = Some(Anim {
            kind: AnimKind::Flash,
            until: now + FLASH_ANIM,
        });
        changed = true;
    }

    if existing.managed {
        return changed;
    }

    // Keyed merge of the children: match by key and kind, patch recursively,
    // drop sub-elements that disappeared, flash ones that appeared.
    let previous: Vec<UiNode> = std::mem::take(&mut existing.children);
    let mut remaining: Vec<Option<UiNode>> = previous.into_iter().map(Some).collect();
    let mut next = Vec::with_capacity(remaining.len());

    for fresh_child in fresh.children {
        let mut matched = None;
        for slot in remaining.iter_mut() {
            if slot
                .as_ref()
                .is_some_and(|old| old.key == fresh_child.key && old.kind == fresh_child.kind)
            {
                matched = slot.take();
                break;
            }
        }

        match matched {
            Some(mut old_child) => {
                changed |= patch_in_place(&mut old_child, fresh_child, now);
                next.push(old_child);
            }
            None => {
                let mut added = fresh_child;
                added.anim = Some(Anim {
                    kind: AnimKind::Flash,
                    until: now + FLASH_ANIM,
                });
                next.push(added);
                changed = true;
            }
        }
    }

    if remaining.iter().any(Option::is_some) {
        changed = true;
    }

    existing.children = next;
    changed
}

/// Detaches exiting nodes whose deadline passed and clears expired enter and
/// flash marks, recursively. Returns the number of nodes detached.
///
/// Idempotent: calling it twice, or after a reconciliation pass revived a
/// node, never removes anything that is still live.
pub fn sweep(node: &mut UiNode, now: Instant) -> usize {
    if let Some(anim) = node.anim {
        if anim.kind != AnimKind::Exit && anim.until <= now {
            node.anim = None;
        }
    }

    let before = node.children.len();
    node.children
        .retain(|child| !(child.is_exiting() && child.anim.is_some_and(|anim| anim.until <= now)));
    let mut detached = before - node.children.len();

    for child in node.children.iter_mut() {
        detached += sweep(child, now);
    }

    detached
}

/// Owns the previous item snapshot for one reconciled container, keyed in
/// parallel to the tree rather than stashed on the nodes themselves.
#[derive(Debug, Clone)]
pub struct KeyedList<T> {
    last: Vec<T>,
}

impl<T> Default for KeyedList<T> {
    fn default() -> Self {
        Self { last: Vec::new() }
    }
}

impl<T: Clone> KeyedList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconciles `container` against `new` and records `new` as the next
    /// pass's previous snapshot.
    pub fn sync<K, R, N>(
        &mut self,
        container: &mut UiNode,
        new: &[T],
        now: Instant,
        key_of: K,
        render: R,
        needs_update: N,
    ) -> ReconcileStats
    where
        K: Fn(&T) -> &str,
        R: FnMut(&T) -> UiNode,
        N: Fn(&T, &T) -> bool,
    {
        let stats = reconcile(container, &self.last, new, now, key_of, render, needs_update);
        self.last = new.to_vec();
        stats
    }
}
