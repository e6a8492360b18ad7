#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result types for incident statistics.
//!
//! These feed the statistics view and the option lists of the filter
//! editors (selectable years, countries, departments, municipalities).

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Country -> department -> sorted, unique municipalities.
pub type LocationTree = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Year range and location hierarchy covered by a set of incidents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterBounds {
    /// Earliest incident year, `None` when there are no dated incidents.
    pub min_year: Option<i32>,
    /// Latest incident year.
    pub max_year: Option<i32>,
    /// Every location that appears in the set.
    pub locations: LocationTree,
    /// Number of incidents considered.
    pub total_count: usize,
}

/// Headline numbers for a set of incidents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentStats {
    /// Number of incidents.
    pub total_incidents: usize,
    /// Distinct countries (maritime zones included).
    pub countries_count: usize,
    /// Distinct departments, excluding maritime zones.
    pub departments_count: usize,
    /// Distinct municipalities, excluding maritime zones.
    pub municipalities_count: usize,
    /// Earliest parseable incident date.
    pub earliest_date: Option<NaiveDate>,
    /// Latest parseable incident date.
    pub latest_date: Option<NaiveDate>,
    /// Distinct categories reached through the incidents' types.
    pub categories_count: usize,
    /// Distinct type ids.
    pub types_count: usize,
}

/// Incident count for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    /// Category id.
    pub category_id: String,
    /// Display name.
    pub name: String,
    /// Marker color.
    pub color: String,
    /// Number of incidents.
    pub count: u64,
}

/// A time-series data point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPoint {
    /// Period label (`YYYY-MM`).
    pub period: String,
    /// Incident count in this period.
    pub count: u64,
}

/// A type listed under its category, for the category filter editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeSummary {
    /// Type id.
    #[serde(rename = "typeID")]
    pub type_id: String,
    /// Display name.
    pub name: String,
}
