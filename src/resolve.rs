//! Reconstruction of the focused stack from a flat set of branch records.
//!
//! The stacking tool reports every tracked branch; the panel only shows the
//! stack the checked-out branch belongs to. [resolve] finds that subgraph and
//! flattens it into a deterministic bottom-of-stack-first order. The function
//! is total: missing current branch, dangling links, duplicate names, and
//! cycles all degrade to a best-effort (possibly empty) result.

use crate::graph::BranchRecord;
use itertools::Itertools;
use std::collections::{HashMap, HashSet, VecDeque};

/// Resolves the focused stack: the branches reachable from the checked-out
/// branch, ordered trunk-first.
///
/// ## Takes
/// - `records` - The full snapshot of tracked branches.
///
/// ## Returns
/// - The ordered records of the focused stack, bottom-of-stack first. Empty
///   when no record is marked current.
pub fn resolve(records: &[BranchRecord]) -> Vec<BranchRecord> {
    let mut by_name: HashMap<&str, &BranchRecord> = HashMap::with_capacity(records.len());
    for record in records {
        // Duplicate names: last record wins.
        by_name.insert(record.name.as_str(), record);
    }

    let Some(current) = records.iter().find(|record| record.current) else {
        return Vec::new();
    };

    let (focus_order, focus) = focus_set(current, &by_name);

    // Roots are focus members whose base link is absent or points outside the
    // focus set. Sorted for a reproducible traversal order.
    let roots = focus_order
        .iter()
        .copied()
        .filter(|name| {
            by_name[name]
                .down
                .as_ref()
                .map_or(true, |down| !focus.contains(down.name.as_str()))
        })
        .sorted()
        .collect::<Vec<_>>();

    let mut ordered = Vec::with_capacity(focus.len());
    let mut visited = HashSet::with_capacity(focus.len());
    if roots.is_empty() {
        // A cycle touches every focus member. Seed the traversal from the
        // focus set in encounter order instead.
        for name in &focus_order {
            push_subtree(name, &by_name, &focus, &mut visited, &mut ordered);
        }
    } else {
        for name in roots {
            push_subtree(name, &by_name, &focus, &mut visited, &mut ordered);
        }
    }

    // Focus members the dependent links never reached (a base link without
    // the mirroring dependent edge) still belong to the stack; append them in
    // encounter order rather than dropping them.
    for name in &focus_order {
        push_subtree(name, &by_name, &focus, &mut visited, &mut ordered);
    }

    ordered
}

/// Computes the focus set: the transitive base-link closure of the current
/// branch, plus every dependent reachable from it breadth-first.
///
/// Returns both the encounter order (for the cycle fallback) and the set.
fn focus_set<'a>(
    current: &'a BranchRecord,
    by_name: &HashMap<&'a str, &'a BranchRecord>,
) -> (Vec<&'a str>, HashSet<&'a str>) {
    let mut order = Vec::new();
    let mut seen = HashSet::new();

    // Walk down to the trunk. Dangling base names are links to nothing.
    let mut cursor = Some(current.name.as_str());
    while let Some(name) = cursor {
        if !seen.insert(name) {
            break;
        }
        order.push(name);
        cursor = by_name
            .get(name)
            .and_then(|record| record.down.as_ref())
            .map(|down| down.name.as_str())
            .filter(|down_name| by_name.contains_key(down_name));
    }

    // Walk up through all dependents of the current branch.
    let mut queue = VecDeque::from([current.name.as_str()]);
    while let Some(name) = queue.pop_front() {
        let Some(record) = by_name.get(name) else {
            continue;
        };
        for up in &record.ups {
            let up_name = up.name.as_str();
            if by_name.contains_key(up_name) && seen.insert(up_name) {
                order.push(up_name);
                queue.push_back(up_name);
            }
        }
    }

    (order, seen)
}

/// Depth-first appends `name` and its in-focus dependents to `ordered`,
/// children sorted lexicographically at each level, skipping names already
/// visited.
fn push_subtree<'a>(
    name: &'a str,
    by_name: &HashMap<&'a str, &'a BranchRecord>,
    focus: &HashSet<&'a str>,
    visited: &mut HashSet<&'a str>,
    ordered: &mut Vec<BranchRecord>,
) {
    if !visited.insert(name) {
        return;
    }
    let Some(record) = by_name.get(name) else {
        return;
    };
    ordered.push((*record).clone());

    let children = record
        .ups
        .iter()
        .map(|up| up.name.as_str())
        .filter(|up_name| focus.contains(up_name))
        .sorted();
    for child in children {
        push_subtree(child, by_name, focus, visited, ordered);
    }
}

#[cfg(test)]
mod test {
    use super::resolve;
    use crate::graph::{BranchLink, BranchRecord};

    fn record(name: &str, current: bool, down: Option<&str>, ups: &[&str]) -> BranchRecord {
        BranchRecord {
            name: name.to_string(),
            current,
            down: down.map(|down_name| BranchLink {
                name: down_name.to_string(),
                needs_restack: false,
            }),
            ups: ups
                .iter()
                .map(|up_name| BranchLink {
                    name: up_name.to_string(),
                    needs_restack: false,
                })
                .collect(),
            ..Default::default()
        }
    }

    fn names(records: &[BranchRecord]) -> Vec<&str> {
        records.iter().map(|record| record.name.as_str()).collect()
    }

    #[test]
    fn orders_chain_trunk_first() {
        let records = vec![
            record("main", false, None, &["feature"]),
            record("feature", true, Some("main"), &["feature-docs"]),
            record("feature-docs", false, Some("feature"), &[]),
        ];

        assert_eq!(
            names(&resolve(&records)),
            vec!["main", "feature", "feature-docs"]
        );
    }

    #[test]
    fn focus_excludes_unrelated_branches() {
        let records = vec![
            record("main", false, None, &["feature", "other"]),
            record("feature", true, Some("main"), &["feature-docs"]),
            record("feature-docs", false, Some("feature"), &[]),
            record("other", false, Some("main"), &[]),
            record("island", false, None, &[]),
        ];

        let resolved = resolve(&records);
        assert_eq!(names(&resolved), vec!["main", "feature", "feature-docs"]);
    }

    #[test]
    fn no_current_branch_yields_empty_stack() {
        let records = vec![
            record("main", false, None, &["feature"]),
            record("feature", false, Some("main"), &[]),
        ];

        assert!(resolve(&records).is_empty());
    }

    #[test]
    fn self_referential_base_link_terminates() {
        let records = vec![record("a", true, Some("a"), &[])];

        let resolved = resolve(&records);
        assert_eq!(names(&resolved), vec!["a"]);
    }

    #[test]
    fn two_branch_cycle_terminates_and_keeps_both() {
        let records = vec![
            record("a", true, Some("b"), &["b"]),
            record("b", false, Some("a"), &["a"]),
        ];

        let resolved_records = resolve(&records);
        let mut resolved = names(&resolved_records);
        resolved.sort_unstable();
        assert_eq!(resolved, vec!["a", "b"]);
    }

    #[test]
    fn dangling_links_are_dropped_silently() {
        let records = vec![
            record("main", false, None, &["feature", "ghost"]),
            record("feature", true, Some("missing"), &["gone"]),
        ];

        // `feature`'s base dangles, so it is its own root; `main` is only
        // reachable through a real base link and stays out of focus.
        assert_eq!(names(&resolve(&records)), vec!["feature"]);
    }

    #[test]
    fn base_link_without_mirroring_dependent_edge_keeps_the_branch() {
        // `feature` points down at `main`, but `main` never lists it as a
        // dependent. The branch must still appear in the stack.
        let records = vec![
            record("main", false, None, &[]),
            record("feature", true, Some("main"), &[]),
        ];

        assert_eq!(names(&resolve(&records)), vec!["main", "feature"]);
    }

    #[test]
    fn duplicate_names_last_record_wins() {
        let records = vec![
            record("main", false, None, &[]),
            record("feature", true, Some("main"), &[]),
            record("main", false, None, &["feature"]),
        ];

        let resolved = resolve(&records);
        assert_eq!(names(&resolved), vec!["main", "feature"]);
        assert_eq!(resolved[0].ups.len(), 1);
    }

    #[test]
    fn sibling_children_order_is_deterministic() {
        let records = vec![
            record("main", true, None, &["zeta", "alpha", "mid"]),
            record("zeta", false, Some("main"), &[]),
            record("alpha", false, Some("main"), &[]),
            record("mid", false, Some("main"), &[]),
        ];

        let first_records = resolve(&records);
        let first = names(&first_records);
        let second_records = resolve(&records);
        let second = names(&second_records);
        assert_eq!(first, vec!["main", "alpha", "mid", "zeta"]);
        assert_eq!(first, second);
    }
}
