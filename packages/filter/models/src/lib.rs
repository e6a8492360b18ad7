#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter tree types shared by the reducer, the evaluators and the
//! persistence layer.
//!
//! A filter tree is an ordered list of [`FilterNode`]s plus the counter used
//! to number the next node. Each node carries a [`FilterKind`] tag and an
//! opaque JSON state blob whose shape belongs to that kind (see [`state`]).
//! The `not` and `or` kinds store a nested [`FilterTree`] as their state.
//!
//! Serialized field names (`index`, `filters`, `id`, `type`, `state`) match
//! what the browser frontend keeps in local storage, so trees can be moved
//! between the two without conversion.

pub mod action;
pub mod state;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use action::{FilterAction, FilterPatch, NewFilter};
pub use state::{
    CategoryState, CountryState, DateComparison, DateState, DescState, KindState, LatLongState,
};

/// The closed set of filter kinds.
///
/// Kinds this build does not know are kept verbatim in
/// [`FilterKind::Unsupported`] so a persisted tree written by a newer client
/// survives a round trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterKind {
    /// Hide categories and types.
    Category,
    /// Hide countries, departments and municipalities.
    Country,
    /// Compare the incident date against one or two bounds.
    Date,
    /// Case-insensitive description search.
    Desc,
    /// Radius around a point.
    LatLong,
    /// Negation container.
    Not,
    /// Disjunction container.
    Or,
    /// A kind with no registered evaluator.
    Unsupported(String),
}

impl FilterKind {
    /// Every supported kind, in the order the "add filter" menu lists them.
    pub const SUPPORTED: &[Self] = &[
        Self::Category,
        Self::Date,
        Self::LatLong,
        Self::Country,
        Self::Desc,
        Self::Not,
        Self::Or,
    ];

    /// The persisted tag for this kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Category => "category",
            Self::Country => "country",
            Self::Date => "date",
            Self::Desc => "desc",
            Self::LatLong => "latlong",
            Self::Not => "not",
            Self::Or => "or",
            Self::Unsupported(name) => name,
        }
    }

    /// Returns `true` for kinds whose state is a nested [`FilterTree`].
    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(self, Self::Not | Self::Or)
    }
}

impl From<&str> for FilterKind {
    fn from(value: &str) -> Self {
        match value {
            "category" => Self::Category,
            "country" => Self::Country,
            "date" => Self::Date,
            "desc" => Self::Desc,
            "latlong" => Self::LatLong,
            "not" => Self::Not,
            "or" => Self::Or,
            other => Self::Unsupported(other.to_string()),
        }
    }
}

impl From<String> for FilterKind {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<FilterKind> for String {
    fn from(value: FilterKind) -> Self {
        match value {
            FilterKind::Unsupported(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configured predicate or combinator in a filter tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterNode {
    /// Unique among its siblings while the node is live.
    pub id: u32,
    /// Which evaluator handles this node.
    #[serde(rename = "type")]
    pub kind: FilterKind,
    /// Kind-specific state; `None` means "not yet configured".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
}

impl FilterNode {
    /// Decodes the state blob into the shape owned by this node's kind.
    ///
    /// Returns `Ok(None)` when the node has no state yet.
    ///
    /// # Errors
    ///
    /// Returns the decode error if the blob does not fit `T`.
    pub fn decode_state<T: serde::de::DeserializeOwned>(
        &self,
    ) -> Result<Option<T>, serde_json::Error> {
        self.state
            .as_ref()
            .map(|value| T::deserialize(value))
            .transpose()
    }
}

/// The root (or nested) reducer state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterTree {
    /// Id the next added node receives.
    pub index: u32,
    /// Nodes in user-visible left-to-right order.
    pub filters: Vec<FilterNode>,
}

impl FilterTree {
    /// An empty tree whose counter starts at `index`.
    #[must_use]
    pub const fn empty(index: u32) -> Self {
        Self {
            index,
            filters: Vec::new(),
        }
    }

    /// Looks up a direct child by id.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&FilterNode> {
        self.filters.iter().find(|node| node.id == id)
    }

    /// Largest id among the direct children.
    #[must_use]
    pub fn max_id(&self) -> Option<u32> {
        self.filters.iter().map(|node| node.id).max()
    }

    /// Encodes this tree as the state blob of a `not`/`or` node.
    #[must_use]
    pub fn to_state(&self) -> Value {
        serde_json::json!({
            "index": self.index,
            "filters": self.filters,
        })
    }
}

/// A filter tree as read from storage, before id reconciliation.
///
/// Nodes may lack ids and the counter may be missing; the reducer's
/// `REPLACE_STATE` path fills both in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterTreeSnapshot {
    /// Stored counter, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    /// Stored nodes.
    #[serde(default)]
    pub filters: Vec<FilterNodeSnapshot>,
}

/// A stored node that may lack an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterNodeSnapshot {
    /// Stored id, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    /// Kind tag.
    #[serde(rename = "type")]
    pub kind: FilterKind,
    /// Kind-specific state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
}

impl From<&FilterTree> for FilterTreeSnapshot {
    fn from(tree: &FilterTree) -> Self {
        Self {
            index: Some(tree.index),
            filters: tree
                .filters
                .iter()
                .map(|node| FilterNodeSnapshot {
                    id: Some(node.id),
                    kind: node.kind.clone(),
                    state: node.state.clone(),
                })
                .collect(),
        }
    }
}

/// Tri-state result of evaluating one node against one incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// The incident satisfies the node.
    Pass,
    /// The node actively excludes the incident.
    Fail,
    /// The node is not configured; callers treat it as pass-through.
    Indeterminate,
}

impl Verdict {
    /// Anything but [`Verdict::Fail`]; the conjunctive pass rule.
    #[must_use]
    pub const fn lets_through(self) -> bool {
        !matches!(self, Self::Fail)
    }

    /// Only [`Verdict::Pass`]; an outright acceptance.
    #[must_use]
    pub const fn accepts(self) -> bool {
        matches!(self, Self::Pass)
    }
}

impl From<bool> for Verdict {
    fn from(value: bool) -> Self {
        if value { Self::Pass } else { Self::Fail }
    }
}
