//! The canonical default filter tree.

use incident_map_filter_models::{
    CategoryState, CountryState, DateState, DescState, FilterNode, FilterTree, KindState,
    LatLongState,
};

const MAX_SEED: u32 = u32::MAX - 5;

fn node<S: KindState>(id: u32, state: &S) -> FilterNode {
    FilterNode {
        id,
        kind: S::KIND,
        state: Some(state.to_value()),
    }
}

/// Builds the starting tree: one neutral node each of category, date,
/// latlong, country and desc, numbered `seed..seed + 4`, with the counter
/// at `seed + 5`.
///
/// Reset passes the current counter as `seed` so ids keep increasing.
/// Seeds above `u32::MAX - 5` are clamped so the counter still fits.
#[must_use]
pub fn initial_filter_state(seed: u32) -> FilterTree {
    let seed = seed.min(MAX_SEED);
    FilterTree {
        index: seed + 5,
        filters: vec![
            node(seed, &CategoryState::default()),
            node(seed + 1, &DateState::default()),
            node(seed + 2, &LatLongState::default()),
            node(seed + 3, &CountryState::default()),
            node(seed + 4, &DescState::default()),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use incident_map_filter_models::FilterKind;
    use serde_json::json;

    #[test]
    fn default_tree_layout() {
        let tree = initial_filter_state(0);
        assert_eq!(tree.index, 5);
        let kinds: Vec<_> = tree.filters.iter().map(|n| n.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                FilterKind::Category,
                FilterKind::Date,
                FilterKind::LatLong,
                FilterKind::Country,
                FilterKind::Desc,
            ]
        );
        let ids: Vec<_> = tree.filters.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn seed_shifts_ids_and_counter() {
        let tree = initial_filter_state(12);
        assert_eq!(tree.index, 17);
        assert_eq!(tree.filters.first().map(|n| n.id), Some(12));
        assert_eq!(tree.filters.last().map(|n| n.id), Some(16));
    }

    #[test]
    fn oversized_seed_is_clamped() {
        let tree = initial_filter_state(u32::MAX);
        assert_eq!(tree.index, u32::MAX);
        assert_eq!(tree.filters.last().map(|n| n.id), Some(u32::MAX - 1));
    }

    #[test]
    fn default_states_are_neutral() {
        let tree = initial_filter_state(0);
        assert_eq!(
            tree.filters[1].state,
            Some(json!({"date1": "", "date2": "", "selectedDateFilter": "es entre"}))
        );
        assert_eq!(
            tree.filters[2].state,
            Some(json!({"latitude": "", "longitude": "", "radius": ""}))
        );
        assert!(
            tree.filters
                .iter()
                .all(|n| !n.kind.is_container() && n.state.is_some())
        );
    }
}
