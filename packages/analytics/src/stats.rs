//! Counts and time series.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use incident_map_analytics_models::{CategoryCount, IncidentStats, TimeSeriesPoint};
use incident_map_incident_models::{Incident, IncidentDb, IncidentType};

use crate::{is_maritime, parse_date};

/// Headline numbers for `incidents`.
///
/// Maritime zones count as countries but contribute no departments or
/// municipalities. Categories are reached through `types`; type ids missing
/// from it count as types but reach no category.
#[must_use]
pub fn incident_stats<'a>(
    types: &BTreeMap<String, IncidentType>,
    incidents: impl IntoIterator<Item = &'a Incident>,
) -> IncidentStats {
    let mut total = 0;
    let mut countries = BTreeSet::new();
    let mut departments = BTreeSet::new();
    let mut municipalities = BTreeSet::new();
    let mut type_ids = BTreeSet::new();
    let mut earliest: Option<NaiveDate> = None;
    let mut latest: Option<NaiveDate> = None;

    for incident in incidents {
        total += 1;
        countries.insert(incident.country.as_str());
        type_ids.extend(incident.type_id.iter());

        if let Some(date) = parse_date(&incident.date_string) {
            earliest = Some(earliest.map_or(date, |d| d.min(date)));
            latest = Some(latest.map_or(date, |d| d.max(date)));
        }

        if !is_maritime(&incident.country) {
            departments.insert(incident.department.as_str());
            municipalities.insert(incident.municipality.as_str());
        }
    }

    let categories = type_ids
        .iter()
        .filter_map(|id| types.get(*id).map(|t| t.category_id.as_str()))
        .collect::<BTreeSet<_>>();

    IncidentStats {
        total_incidents: total,
        countries_count: countries.len(),
        departments_count: departments.len(),
        municipalities_count: municipalities.len(),
        earliest_date: earliest,
        latest_date: latest,
        categories_count: categories.len(),
        types_count: type_ids.len(),
    }
}

/// Incidents per category, most frequent first (ties by category id).
///
/// An incident whose types span several categories counts once in each;
/// several types of the same category count once. Categories with no
/// incidents are omitted.
#[must_use]
pub fn category_counts<'a>(
    db: &IncidentDb,
    incidents: impl IntoIterator<Item = &'a Incident>,
) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();

    for incident in incidents {
        let categories = incident
            .type_id
            .iter()
            .filter_map(|id| db.category_of(id))
            .collect::<BTreeSet<_>>();
        for category in categories {
            *counts.entry(category).or_default() += 1;
        }
    }

    let mut result = counts
        .into_iter()
        .map(|(id, count)| {
            let category = db.categories.get(id);
            CategoryCount {
                category_id: id.to_string(),
                name: category.map_or_else(|| id.to_string(), |c| c.name.clone()),
                color: category.map(|c| c.color.clone()).unwrap_or_default(),
                count,
            }
        })
        .collect::<Vec<_>>();
    result.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.category_id.cmp(&b.category_id))
    });
    result
}

/// Incidents per `YYYY-MM`, oldest first. Months with no incidents are
/// omitted.
#[must_use]
pub fn monthly_counts<'a>(
    incidents: impl IntoIterator<Item = &'a Incident>,
) -> Vec<TimeSeriesPoint> {
    let mut months: BTreeMap<String, u64> = BTreeMap::new();
    for date in incidents
        .into_iter()
        .filter_map(|i| parse_date(&i.date_string))
    {
        *months.entry(date.format("%Y-%m").to_string()).or_default() += 1;
    }
    months
        .into_iter()
        .map(|(period, count)| TimeSeriesPoint { period, count })
        .collect()
}
