#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Statistics over incident collections.
//!
//! Every function takes the incidents to summarize explicitly, usually the
//! output of a filter pass, so the numbers always agree with what the map
//! shows. Incidents whose `dateString` is not a valid `YYYY-MM-DD` date are
//! counted but left out of date-based results.

pub mod bounds;
pub mod stats;

pub use bounds::{calculate_bounds, types_by_category};
pub use stats::{category_counts, incident_stats, monthly_counts};

use chrono::NaiveDate;

/// Country values that name a body of water rather than a country.
///
/// Incidents there carry no meaningful department or municipality.
pub const MARITIME_ZONES: &[&str] = &["Mar Caribe", "Océano Pacífico"];

/// Returns `true` if `country` is one of the [`MARITIME_ZONES`].
#[must_use]
pub fn is_maritime(country: &str) -> bool {
    MARITIME_ZONES.contains(&country)
}

fn parse_date(date: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => Some(d),
        Err(e) => {
            log::debug!("Skipping unparseable incident date '{date}': {e}");
            None
        }
    }
}
