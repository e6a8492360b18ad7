//! Option lists for the filter editors.

use std::collections::BTreeMap;

use chrono::Datelike as _;
use incident_map_analytics_models::{FilterBounds, TypeSummary};
use incident_map_incident_models::{Incident, IncidentDb};

use crate::parse_date;

/// Year range and country/department/municipality hierarchy of
/// `incidents`.
///
/// Municipalities are sorted and deduplicated within each department.
#[must_use]
pub fn calculate_bounds<'a>(incidents: impl IntoIterator<Item = &'a Incident>) -> FilterBounds {
    let mut bounds = FilterBounds::default();

    for incident in incidents {
        bounds.total_count += 1;

        if let Some(year) = parse_date(&incident.date_string).map(|d| d.year()) {
            bounds.min_year = Some(bounds.min_year.map_or(year, |y| y.min(year)));
            bounds.max_year = Some(bounds.max_year.map_or(year, |y| y.max(year)));
        }

        let municipalities = bounds
            .locations
            .entry(incident.country.clone())
            .or_default()
            .entry(incident.department.clone())
            .or_default();
        if let Err(pos) = municipalities.binary_search(&incident.municipality) {
            municipalities.insert(pos, incident.municipality.clone());
        }
    }

    bounds
}

/// Live types grouped by category id, sorted by name within each group.
#[must_use]
pub fn types_by_category(db: &IncidentDb) -> BTreeMap<String, Vec<TypeSummary>> {
    let mut grouped: BTreeMap<String, Vec<TypeSummary>> = BTreeMap::new();
    for (type_id, ty) in db.types.iter().filter(|(_, t)| !t.deleted) {
        grouped
            .entry(ty.category_id.clone())
            .or_default()
            .push(TypeSummary {
                type_id: type_id.clone(),
                name: ty.name.clone(),
            });
    }
    for types in grouped.values_mut() {
        types.sort_by(|a, b| a.name.cmp(&b.name));
    }
    grouped
}
