//! Reducer actions.
//!
//! Actions serialize as `{"type": "ADD_FILTER", "payload": {...}}`, the
//! same envelope the frontend dispatches, so a recorded action log can be
//! replayed against a stored tree.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{FilterKind, FilterTree, FilterTreeSnapshot, KindState};

/// Payload of [`FilterAction::AddFilter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFilter {
    /// Kind of the node to create.
    #[serde(rename = "type")]
    pub kind: FilterKind,
    /// Initial state; `None` leaves the node unconfigured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
}

/// Payload of [`FilterAction::UpdateFilter`].
///
/// Present fields replace the node's fields; absent ones are left alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterPatch {
    /// Target node id.
    pub id: u32,
    /// Replacement kind.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<FilterKind>,
    /// Replacement state blob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
}

/// A state transition of a [`FilterTree`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterAction {
    /// Append a node numbered from the tree's counter.
    AddFilter(NewFilter),
    /// Drop the node with this id, if present.
    RemoveFilter {
        /// Target node id.
        id: u32,
    },
    /// Shallow-merge into the node with this id, if present.
    UpdateFilter(FilterPatch),
    /// Go back to the canonical default tree, keeping the counter moving.
    ResetFilters,
    /// Adopt a tree from elsewhere, numbering nodes that lack ids.
    ReplaceState(FilterTreeSnapshot),
}

impl FilterAction {
    /// Adds an unconfigured node of `kind`.
    #[must_use]
    pub const fn add(kind: FilterKind) -> Self {
        Self::AddFilter(NewFilter { kind, state: None })
    }

    /// Adds a node configured with `state`.
    #[must_use]
    pub fn add_with<S: KindState>(state: &S) -> Self {
        Self::AddFilter(NewFilter {
            kind: S::KIND,
            state: Some(state.to_value()),
        })
    }

    /// Adds a container node (`not`/`or`) holding `children`.
    #[must_use]
    pub fn add_container(kind: FilterKind, children: &FilterTree) -> Self {
        Self::AddFilter(NewFilter {
            kind,
            state: Some(children.to_state()),
        })
    }

    /// Removes node `id`.
    #[must_use]
    pub const fn remove(id: u32) -> Self {
        Self::RemoveFilter { id }
    }

    /// Replaces the state of node `id` with `state`.
    #[must_use]
    pub fn update_with<S: KindState>(id: u32, state: &S) -> Self {
        Self::update_state(id, state.to_value())
    }

    /// Replaces the state of node `id` with a raw blob.
    #[must_use]
    pub const fn update_state(id: u32, state: Value) -> Self {
        Self::UpdateFilter(FilterPatch {
            id,
            kind: None,
            state: Some(state),
        })
    }

    /// Replaces the whole tree with `tree`.
    #[must_use]
    pub fn replace(tree: &FilterTree) -> Self {
        Self::ReplaceState(FilterTreeSnapshot::from(tree))
    }
}
