//! Hierarchical exclusion by country, department and municipality.

use incident_map_filter_models::{CountryState, Verdict};
use incident_map_incident_models::Incident;

use super::EvalContext;

/// Fails if the incident's country, department composite key or
/// municipality composite key is hidden.
#[must_use]
pub fn evaluate(
    incident: &Incident,
    state: Option<&CountryState>,
    _ctx: &EvalContext<'_>,
) -> Verdict {
    let Some(state) = state else {
        return Verdict::Indeterminate;
    };

    let department = incident.department_key();
    let municipality = incident.municipality_key();

    Verdict::from(
        !state.hidden_countries.contains(&incident.country)
            && !state.hidden_departments.contains(&department)
            && !state.hidden_municipalities.contains(&municipality),
    )
}
