//! Pure state transitions of a filter tree.
//!
//! [`reduce`] never mutates its input: every action yields a new tree.
//! Nested `not`/`or` trees are opaque state blobs to the outer level; an
//! action aimed inside one is reduced at the child level and bubbled up as
//! a single `UPDATE_FILTER` on the container (see [`dispatch_at_path`]).

use std::collections::BTreeSet;

use incident_map_filter_models::{
    FilterAction, FilterNode, FilterNodeSnapshot, FilterPatch, FilterTree, FilterTreeSnapshot,
    NewFilter,
};
use serde::Deserialize;
use serde_json::Value;

use crate::defaults::initial_filter_state;

/// Applies `action` to `state` and returns the resulting tree.
///
/// Removing or updating an id that is not present is a no-op. So is adding
/// to a tree whose counter is exhausted, or replacing it with a snapshot
/// whose ids cannot be reconciled (both logged).
#[must_use]
pub fn reduce(state: &FilterTree, action: &FilterAction) -> FilterTree {
    match action {
        FilterAction::AddFilter(NewFilter { kind, state: initial }) => {
            let Some(index) = state.index.checked_add(1) else {
                log::warn!("Ignoring new {kind} filter: filter ids are exhausted");
                return state.clone();
            };
            let mut filters = state.filters.clone();
            filters.push(FilterNode {
                id: state.index,
                kind: kind.clone(),
                state: initial.clone(),
            });
            FilterTree { index, filters }
        }
        FilterAction::RemoveFilter { id } => FilterTree {
            index: state.index,
            filters: state
                .filters
                .iter()
                .filter(|node| node.id != *id)
                .cloned()
                .collect(),
        },
        FilterAction::UpdateFilter(patch) => FilterTree {
            index: state.index,
            filters: state
                .filters
                .iter()
                .map(|node| {
                    if node.id == patch.id {
                        merge(node, patch)
                    } else {
                        node.clone()
                    }
                })
                .collect(),
        },
        FilterAction::ResetFilters => initial_filter_state(state.index),
        FilterAction::ReplaceState(snapshot) => {
            reconcile(snapshot, state.index).unwrap_or_else(|| {
                log::warn!("Ignoring replacement tree: its filter ids overflow the counter");
                state.clone()
            })
        }
    }
}

fn merge(node: &FilterNode, patch: &FilterPatch) -> FilterNode {
    FilterNode {
        id: node.id,
        kind: patch.kind.clone().unwrap_or_else(|| node.kind.clone()),
        state: patch.state.clone().or_else(|| node.state.clone()),
    }
}

/// Adopts a stored tree into a level whose counter is at `counter`.
///
/// Ids present in the snapshot are kept unless they repeat a sibling's id.
/// Nodes without an id (or with a repeated one) are numbered upward from
/// `max(counter, max stored id + 1)`, so new ids never collide with kept
/// ones. The resulting counter never moves backwards.
///
/// Returns `None` when an id would leave no room for the counter above it
/// (a stored id of `u32::MAX`, or renumbering past it).
pub(crate) fn reconcile(snapshot: &FilterTreeSnapshot, counter: u32) -> Option<FilterTree> {
    let max_stored = snapshot.filters.iter().filter_map(|n| n.id).max();
    let mut next = match max_stored {
        Some(max) => counter.max(max.checked_add(1)?),
        None => counter,
    };
    let mut seen = BTreeSet::new();
    let mut filters = Vec::with_capacity(snapshot.filters.len());

    for node in &snapshot.filters {
        let id = match node.id {
            Some(id) if seen.insert(id) => id,
            stored => {
                if let Some(dup) = stored {
                    log::debug!("Renumbering duplicate filter id {dup} to {next}");
                }
                let id = next;
                next = next.checked_add(1)?;
                seen.insert(id);
                id
            }
        };
        filters.push(FilterNode {
            id,
            kind: node.kind.clone(),
            state: reconcile_state(node),
        });
    }

    let index = filters
        .iter()
        .map(|n| n.id.checked_add(1))
        .try_fold(counter, |acc, next| next.map(|next| acc.max(next)))?;

    Some(FilterTree { index, filters })
}

fn reconcile_state(node: &FilterNodeSnapshot) -> Option<Value> {
    let state = node.state.as_ref()?;
    if !node.kind.is_container() {
        return Some(state.clone());
    }
    match FilterTreeSnapshot::deserialize(state) {
        Ok(nested) => match reconcile(&nested, nested.index.unwrap_or(0)) {
            Some(tree) => Some(tree.to_state()),
            None => {
                log::warn!("Keeping {} state as-is: its filter ids overflow", node.kind);
                Some(state.clone())
            }
        },
        Err(e) => {
            log::warn!("Keeping undecodable {} state as-is: {e}", node.kind);
            Some(state.clone())
        }
    }
}

/// Decodes the child tree of a `not`/`or` node.
///
/// An absent or undecodable state yields an empty tree; nodes inside a
/// stored child tree that lack ids are numbered as on `REPLACE_STATE`.
#[must_use]
pub fn nested_tree(node: &FilterNode) -> FilterTree {
    match node.decode_state::<FilterTreeSnapshot>() {
        Ok(Some(snapshot)) => reconcile(&snapshot, snapshot.index.unwrap_or(0))
            .unwrap_or_else(|| {
                log::warn!(
                    "Filter {} ({}) has child ids that overflow, treating it as empty",
                    node.id,
                    node.kind
                );
                FilterTree::default()
            }),
        Ok(None) => FilterTree::default(),
        Err(e) => {
            log::warn!(
                "Filter {} ({}) has an undecodable child tree, treating it as empty: {e}",
                node.id,
                node.kind
            );
            FilterTree::default()
        }
    }
}

/// Applies `action` to the tree reached by following `path` (a list of
/// container ids, outermost first) and bubbles the result up as
/// `UPDATE_FILTER`s on each container.
///
/// An empty path applies the action to `tree` itself. If any id on the path
/// is missing, or names a node that is not a container, the tree is
/// returned unchanged.
#[must_use]
pub fn dispatch_at_path(tree: &FilterTree, path: &[u32], action: &FilterAction) -> FilterTree {
    let Some((&parent_id, rest)) = path.split_first() else {
        return reduce(tree, action);
    };

    let Some(parent) = tree.get(parent_id) else {
        log::debug!("Ignoring nested action for missing filter {parent_id}");
        return tree.clone();
    };
    if !parent.kind.is_container() {
        log::warn!(
            "Ignoring nested action for filter {parent_id}: {} does not hold child filters",
            parent.kind
        );
        return tree.clone();
    }

    let children = dispatch_at_path(&nested_tree(parent), rest, action);
    reduce(tree, &FilterAction::update_state(parent_id, children.to_state()))
}

/// Applies `action` inside the `not`/`or` node `parent_id`.
#[must_use]
pub fn dispatch_nested(tree: &FilterTree, parent_id: u32, action: &FilterAction) -> FilterTree {
    dispatch_at_path(tree, &[parent_id], action)
}

/// Folds `actions` over `initial`.
#[must_use]
pub fn replay<'a>(
    initial: &FilterTree,
    actions: impl IntoIterator<Item = &'a FilterAction>,
) -> FilterTree {
    actions
        .into_iter()
        .fold(initial.clone(), |tree, action| reduce(&tree, action))
}

#[cfg(test)]
mod tests {
    use super::*;
    use incident_map_filter_models::{
        CountryState, DateComparison, DateState, DescState, FilterKind,
    };
    use serde_json::json;

    fn ids(tree: &FilterTree) -> Vec<u32> {
        tree.filters.iter().map(|n| n.id).collect()
    }

    #[test]
    fn add_assigns_counter_and_appends() {
        let tree = reduce(&FilterTree::empty(3), &FilterAction::add(FilterKind::Desc));
        assert_eq!(tree.index, 4);
        assert_eq!(ids(&tree), vec![3]);
        assert_eq!(tree.filters[0].state, None);
    }

    #[test]
    fn reduce_leaves_input_untouched() {
        let before = initial_filter_state(0);
        let snapshot = before.clone();
        let _ = reduce(&before, &FilterAction::remove(0));
        let _ = reduce(&before, &FilterAction::add(FilterKind::Or));
        assert_eq!(before, snapshot);
    }

    #[test]
    fn removing_a_missing_id_is_idempotent() {
        let tree = initial_filter_state(0);
        let once = reduce(&tree, &FilterAction::remove(42));
        let twice = reduce(&once, &FilterAction::remove(42));
        assert_eq!(once, twice);
        assert_eq!(once, tree);
    }

    #[test]
    fn updating_a_missing_id_is_a_no_op() {
        let tree = initial_filter_state(0);
        let updated = reduce(
            &tree,
            &FilterAction::update_with(
                99,
                &DescState {
                    search: "x".to_string(),
                },
            ),
        );
        assert_eq!(updated, tree);
    }

    #[test]
    fn update_replaces_state_and_keeps_position() {
        let tree = initial_filter_state(0);
        let updated = reduce(
            &tree,
            &FilterAction::update_with(
                4,
                &DescState {
                    search: "fire".to_string(),
                },
            ),
        );
        assert_eq!(ids(&updated), ids(&tree));
        assert_eq!(updated.filters[4].state, Some(json!({"search": "fire"})));
        assert_eq!(updated.filters[4].kind, FilterKind::Desc);
        assert_eq!(updated.index, tree.index);
    }

    #[test]
    fn update_without_fields_keeps_the_node() {
        let tree = initial_filter_state(0);
        let updated = reduce(
            &tree,
            &FilterAction::UpdateFilter(FilterPatch {
                id: 1,
                kind: None,
                state: None,
            }),
        );
        assert_eq!(updated, tree);
    }

    #[test]
    fn ids_increase_across_interleaved_actions() {
        let mut tree = FilterTree::default();
        let mut issued = Vec::new();
        for round in 0..5u32 {
            tree = reduce(&tree, &FilterAction::add(FilterKind::Desc));
            issued.push(tree.filters.last().map(|n| n.id).unwrap());
            tree = reduce(&tree, &FilterAction::add(FilterKind::Date));
            issued.push(tree.filters.last().map(|n| n.id).unwrap());
            tree = reduce(&tree, &FilterAction::remove(issued[round as usize]));
            tree = reduce(
                &tree,
                &FilterAction::update_state(issued[issued.len() - 1], json!({"date1": ""})),
            );
        }
        assert!(issued.windows(2).all(|w| w[0] < w[1]), "{issued:?}");
    }

    #[test]
    fn reset_keeps_counter_moving() {
        let mut tree = initial_filter_state(0);
        tree = reduce(&tree, &FilterAction::add(FilterKind::Or));
        let max_before = tree.index - 1;

        let reset = reduce(&tree, &FilterAction::ResetFilters);
        assert_eq!(ids(&reset), vec![6, 7, 8, 9, 10]);

        let after = reduce(&reset, &FilterAction::add(FilterKind::Desc));
        assert!(after.filters.last().unwrap().id > max_before);
    }

    #[test]
    fn replace_keeps_stored_ids_and_numbers_the_rest() {
        let tree = FilterTree::empty(10);
        let snapshot: FilterTreeSnapshot = serde_json::from_value(json!({
            "index": 3,
            "filters": [
                {"id": 2, "type": "desc", "state": {"search": "a"}},
                {"type": "date"},
                {"id": 12, "type": "country"},
                {"type": "latlong"},
            ],
        }))
        .unwrap();

        let replaced = reduce(&tree, &FilterAction::ReplaceState(snapshot));
        assert_eq!(ids(&replaced), vec![2, 13, 12, 14]);
        assert_eq!(replaced.index, 15);
    }

    #[test]
    fn replace_renumbers_duplicate_ids() {
        let snapshot: FilterTreeSnapshot = serde_json::from_value(json!({
            "filters": [
                {"id": 1, "type": "desc"},
                {"id": 1, "type": "date"},
            ],
        }))
        .unwrap();
        let replaced = reduce(&FilterTree::empty(0), &FilterAction::ReplaceState(snapshot));
        assert_eq!(ids(&replaced), vec![1, 2]);
        assert_eq!(replaced.index, 3);
    }

    #[test]
    fn replace_never_moves_counter_backwards() {
        let tree = FilterTree::empty(40);
        let incoming = initial_filter_state(0);
        let replaced = reduce(&tree, &FilterAction::replace(&incoming));
        assert_eq!(ids(&replaced), vec![0, 1, 2, 3, 4]);
        assert_eq!(replaced.index, 40);

        let empty = reduce(&tree, &FilterAction::ReplaceState(FilterTreeSnapshot::default()));
        assert!(empty.filters.is_empty());
        assert_eq!(empty.index, 40);
    }

    #[test]
    fn replace_reconciles_nested_trees_with_their_own_counter() {
        let snapshot: FilterTreeSnapshot = serde_json::from_value(json!({
            "filters": [{
                "id": 0,
                "type": "or",
                "state": {"filters": [{"type": "desc"}, {"id": 5, "type": "date"}]},
            }],
        }))
        .unwrap();
        let replaced = reduce(&FilterTree::empty(0), &FilterAction::ReplaceState(snapshot));
        let children = nested_tree(&replaced.filters[0]);
        assert_eq!(ids(&children), vec![6, 5]);
        assert_eq!(children.index, 7);
    }

    #[test]
    fn add_on_exhausted_counter_is_a_no_op() {
        let tree = FilterTree::empty(u32::MAX);
        let added = reduce(&tree, &FilterAction::add(FilterKind::Desc));
        assert_eq!(added, tree);
    }

    #[test]
    fn replace_with_maximal_id_is_rejected() {
        let snapshot: FilterTreeSnapshot = serde_json::from_value(json!({
            "filters": [{"id": u32::MAX, "type": "desc"}],
        }))
        .unwrap();
        assert_eq!(reconcile(&snapshot, 0), None);

        let tree = initial_filter_state(0);
        assert_eq!(reduce(&tree, &FilterAction::ReplaceState(snapshot)), tree);
    }

    #[test]
    fn replace_renumbering_past_the_counter_is_rejected() {
        let snapshot: FilterTreeSnapshot = serde_json::from_value(json!({
            "filters": [{"id": u32::MAX - 1, "type": "desc"}, {"type": "date"}],
        }))
        .unwrap();
        assert_eq!(reconcile(&snapshot, 0), None);

        let fits: FilterTreeSnapshot = serde_json::from_value(json!({
            "filters": [{"id": u32::MAX - 1, "type": "desc"}],
        }))
        .unwrap();
        assert_eq!(reconcile(&fits, 0).map(|t| t.index), Some(u32::MAX));
    }

    #[test]
    fn nested_dispatch_bubbles_up_as_an_update() {
        let mut tree = reduce(&FilterTree::default(), &FilterAction::add(FilterKind::Or));
        let or_id = tree.filters[0].id;

        tree = dispatch_nested(
            &tree,
            or_id,
            &FilterAction::add_with(&DateState::new(DateComparison::Equals, "2020-01-01", "")),
        );
        tree = dispatch_nested(
            &tree,
            or_id,
            &FilterAction::add_with(&DateState::new(DateComparison::Equals, "2021-06-15", "")),
        );

        assert_eq!(tree.index, 1);
        let children = nested_tree(&tree.filters[0]);
        assert_eq!(ids(&children), vec![0, 1]);
        assert_eq!(children.index, 2);

        tree = dispatch_nested(&tree, or_id, &FilterAction::remove(0));
        assert_eq!(ids(&nested_tree(&tree.filters[0])), vec![1]);
    }

    #[test]
    fn dispatch_reaches_arbitrary_depth() {
        let mut tree = reduce(&FilterTree::default(), &FilterAction::add(FilterKind::Not));
        tree = dispatch_nested(&tree, 0, &FilterAction::add(FilterKind::Or));
        tree = dispatch_at_path(
            &tree,
            &[0, 0],
            &FilterAction::add_with(&CountryState {
                hidden_countries: vec!["Y".to_string()],
                ..CountryState::default()
            }),
        );

        let not_children = nested_tree(&tree.filters[0]);
        let or_children = nested_tree(&not_children.filters[0]);
        assert_eq!(or_children.filters.len(), 1);
        assert_eq!(or_children.filters[0].kind, FilterKind::Country);
    }

    #[test]
    fn nested_dispatch_ignores_missing_or_leaf_parents() {
        let tree = initial_filter_state(0);
        let action = FilterAction::add(FilterKind::Desc);
        assert_eq!(dispatch_nested(&tree, 77, &action), tree);
        assert_eq!(dispatch_nested(&tree, 4, &action), tree);
    }

    #[test]
    fn replay_is_deterministic() {
        let actions = vec![
            FilterAction::ResetFilters,
            FilterAction::add(FilterKind::Or),
            FilterAction::remove(1),
            FilterAction::update_state(0, json!({"hiddenCategories": ["c1"], "hiddenTypes": []})),
        ];
        let a = replay(&FilterTree::default(), &actions);
        let b = replay(&FilterTree::default(), &actions);
        assert_eq!(a, b);
        assert_eq!(ids(&a), vec![0, 2, 3, 4, 5]);
        assert_eq!(a.index, 6);
    }
}
