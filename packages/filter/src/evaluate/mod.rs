//! Tri-state evaluation of filter trees.
//!
//! Each leaf kind has a pure evaluator `(incident, state, context) -> Verdict`
//! in its own module; [`CompiledFilter::compile`] is the kind -> evaluator
//! table. A tree is compiled once (state blobs decoded into their typed
//! shapes) and then evaluated against any number of incidents.
//!
//! [`Verdict::Indeterminate`] means "not configured". The conjunctive top
//! level and the `or` combinator let it through; the `not` combinator only
//! vetoes on an outright [`Verdict::Pass`].

pub mod category;
pub mod composite;
pub mod country;
pub mod date;
pub mod desc;
pub mod latlong;

use std::collections::BTreeMap;

use incident_map_filter_models::{
    CategoryState, CountryState, DateState, DescState, FilterKind, FilterNode, KindState,
    LatLongState, Verdict,
};
use incident_map_incident_models::{Category, Incident, IncidentDb, IncidentType};

use crate::reducer::nested_tree;

/// Lookups the evaluators may consult, passed explicitly.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    /// Category id -> category.
    pub categories: &'a BTreeMap<String, Category>,
    /// Type id -> type.
    pub types: &'a BTreeMap<String, IncidentType>,
}

impl<'a> EvalContext<'a> {
    /// Borrows the lookups of a snapshot.
    #[must_use]
    pub const fn new(db: &'a IncidentDb) -> Self {
        Self {
            categories: &db.categories,
            types: &db.types,
        }
    }

    /// Category id owning `type_id`.
    #[must_use]
    pub fn category_of(&self, type_id: &str) -> Option<&'a str> {
        self.types.get(type_id).map(|t| t.category_id.as_str())
    }
}

/// A node with its state decoded for evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledFilter {
    /// See [`category::evaluate`].
    Category(Option<CategoryState>),
    /// See [`country::evaluate`].
    Country(Option<CountryState>),
    /// See [`date::evaluate`].
    Date(Option<DateState>),
    /// See [`desc::evaluate`].
    Desc(Option<DescState>),
    /// See [`latlong::evaluate`].
    LatLong(Option<LatLongState>),
    /// See [`composite::evaluate_not`].
    Not(Vec<CompiledFilter>),
    /// See [`composite::evaluate_or`].
    Or(Vec<CompiledFilter>),
    /// A kind with no evaluator; always indeterminate.
    Unsupported(String),
}

fn decode<S: KindState>(node: &FilterNode) -> Option<S> {
    match node.decode_state::<S>() {
        Ok(state) => state,
        Err(e) => {
            log::warn!(
                "Filter {} ({}) has malformed state, treating it as unconfigured: {e}",
                node.id,
                node.kind
            );
            None
        }
    }
}

fn compile_children(node: &FilterNode) -> Vec<CompiledFilter> {
    nested_tree(node)
        .filters
        .iter()
        .map(CompiledFilter::compile)
        .collect()
}

impl CompiledFilter {
    /// Decodes `node` (and its children, for containers).
    ///
    /// Unsupported kinds and malformed states are logged here, once per
    /// compile, rather than on every evaluation.
    #[must_use]
    pub fn compile(node: &FilterNode) -> Self {
        match &node.kind {
            FilterKind::Category => Self::Category(decode(node)),
            FilterKind::Country => Self::Country(decode(node)),
            FilterKind::Date => Self::Date(decode(node)),
            FilterKind::Desc => Self::Desc(decode(node)),
            FilterKind::LatLong => Self::LatLong(decode(node)),
            FilterKind::Not => Self::Not(compile_children(node)),
            FilterKind::Or => Self::Or(compile_children(node)),
            FilterKind::Unsupported(name) => {
                log::warn!(
                    "No evaluator registered for filter kind '{name}' (filter {}); \
                     letting every incident through",
                    node.id
                );
                Self::Unsupported(name.clone())
            }
        }
    }

    /// Evaluates this node against one incident.
    #[must_use]
    pub fn evaluate(&self, incident: &Incident, ctx: &EvalContext<'_>) -> Verdict {
        match self {
            Self::Category(state) => category::evaluate(incident, state.as_ref(), ctx),
            Self::Country(state) => country::evaluate(incident, state.as_ref(), ctx),
            Self::Date(state) => date::evaluate(incident, state.as_ref(), ctx),
            Self::Desc(state) => desc::evaluate(incident, state.as_ref(), ctx),
            Self::LatLong(state) => latlong::evaluate(incident, state.as_ref(), ctx),
            Self::Not(children) => composite::evaluate_not(children, incident, ctx),
            Self::Or(children) => composite::evaluate_or(children, incident, ctx),
            Self::Unsupported(_) => Verdict::Indeterminate,
        }
    }

    fn collect_unsupported<'s>(&'s self, out: &mut Vec<&'s str>) {
        match self {
            Self::Unsupported(name) => out.push(name),
            Self::Not(children) | Self::Or(children) => {
                for child in children {
                    child.collect_unsupported(out);
                }
            }
            _ => {}
        }
    }
}

/// A compiled list of root-level filters, combined conjunctively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledFilters {
    roots: Vec<CompiledFilter>,
}

impl CompiledFilters {
    /// Compiles every root-level node.
    #[must_use]
    pub fn compile(filters: &[FilterNode]) -> Self {
        Self {
            roots: filters.iter().map(CompiledFilter::compile).collect(),
        }
    }

    /// Per-root verdicts for one incident, in tree order.
    pub fn verdicts<'s>(
        &'s self,
        incident: &'s Incident,
        ctx: &'s EvalContext<'_>,
    ) -> impl Iterator<Item = Verdict> + 's {
        self.roots.iter().map(move |f| f.evaluate(incident, ctx))
    }

    /// `true` if no root filter actively excludes the incident.
    #[must_use]
    pub fn passes(&self, incident: &Incident, ctx: &EvalContext<'_>) -> bool {
        self.roots
            .iter()
            .all(|f| f.evaluate(incident, ctx).lets_through())
    }

    /// The incidents of `incidents` that pass, keyed as in the input.
    #[must_use]
    pub fn apply<'i>(
        &self,
        incidents: &'i BTreeMap<String, Incident>,
        ctx: &EvalContext<'_>,
    ) -> Vec<(&'i String, &'i Incident)> {
        incidents
            .iter()
            .filter(|(_, incident)| self.passes(incident, ctx))
            .collect()
    }

    /// Names of kinds anywhere in the tree that have no evaluator.
    #[must_use]
    pub fn unsupported_kinds(&self) -> Vec<&str> {
        let mut out = Vec::new();
        for root in &self.roots {
            root.collect_unsupported(&mut out);
        }
        out
    }

    /// Number of root-level filters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// `true` when there are no root-level filters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Evaluates a single node without keeping the compiled form.
#[must_use]
pub fn evaluate_node(node: &FilterNode, incident: &Incident, ctx: &EvalContext<'_>) -> Verdict {
    CompiledFilter::compile(node).evaluate(incident, ctx)
}
