//! Free-text search over descriptions.

use incident_map_filter_models::{DescState, Verdict};
use incident_map_incident_models::Incident;

use super::EvalContext;

/// Case-insensitive substring match. An empty search matches everything.
#[must_use]
pub fn evaluate(
    incident: &Incident,
    state: Option<&DescState>,
    _ctx: &EvalContext<'_>,
) -> Verdict {
    let Some(state) = state else {
        return Verdict::Indeterminate;
    };
    let needle = state.search.to_lowercase();
    Verdict::from(incident.description.to_lowercase().contains(&needle))
}
