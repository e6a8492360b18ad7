//! The `not` and `or` combinators.
//!
//! Both treat an empty child list as indeterminate so an empty container
//! neither hides nor pins anything.

use incident_map_filter_models::Verdict;
use incident_map_incident_models::Incident;

use super::{CompiledFilter, EvalContext};

/// Passes iff any child lets the incident through (indeterminate counts).
#[must_use]
pub fn evaluate_or(
    children: &[CompiledFilter],
    incident: &Incident,
    ctx: &EvalContext<'_>,
) -> Verdict {
    if children.is_empty() {
        return Verdict::Indeterminate;
    }
    Verdict::from(
        children
            .iter()
            .any(|child| child.evaluate(incident, ctx).lets_through()),
    )
}

/// Passes iff no child outright accepts the incident.
///
/// Indeterminate children do not veto.
#[must_use]
pub fn evaluate_not(
    children: &[CompiledFilter],
    incident: &Incident,
    ctx: &EvalContext<'_>,
) -> Verdict {
    if children.is_empty() {
        return Verdict::Indeterminate;
    }
    Verdict::from(
        !children
            .iter()
            .any(|child| child.evaluate(incident, ctx).accepts()),
    )
}
