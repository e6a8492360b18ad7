#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Composable incident filter engine.
//!
//! Users build a filter tree out of predicates (category, country, date,
//! description, radius) and the `not`/`or` combinators. This crate owns
//! everything that happens to that tree:
//!
//! * [`reducer`]: pure state transitions driven by [`FilterAction`]s,
//!   including delegation into nested `not`/`or` trees.
//! * [`evaluate`]: tri-state evaluation of a tree against incidents.
//! * [`persistence`]: serialization, tolerant restore and cross-view copy
//!   of trees kept in a [`incident_map_storage::SlotStore`].
//! * [`publish`]: applying a tree to a full snapshot to produce the public
//!   export.

pub mod defaults;
pub mod evaluate;
pub mod persistence;
pub mod publish;
pub mod reducer;

pub use defaults::initial_filter_state;
pub use evaluate::{CompiledFilter, CompiledFilters, EvalContext};
pub use incident_map_filter_models::{
    FilterAction, FilterKind, FilterNode, FilterTree, FilterTreeSnapshot, Verdict,
};
pub use reducer::{dispatch_at_path, dispatch_nested, reduce, replay};
