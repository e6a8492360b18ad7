//! Date comparisons on canonical `YYYY-MM-DD` strings.
//!
//! Canonical dates order lexicographically the same as chronologically, so
//! comparisons are plain string comparisons.

use incident_map_filter_models::{DateComparison, DateState, Verdict};
use incident_map_incident_models::Incident;

use super::EvalContext;

/// Compares the incident date against the configured bound(s).
///
/// An empty `date1` passes everything, as does `between` with an empty
/// `date2` and any unrecognized comparator tag.
#[must_use]
pub fn evaluate(
    incident: &Incident,
    state: Option<&DateState>,
    _ctx: &EvalContext<'_>,
) -> Verdict {
    let Some(state) = state else {
        return Verdict::Indeterminate;
    };
    if state.date1.is_empty() {
        return Verdict::Pass;
    }

    let date = incident.date_string.as_str();
    let date1 = state.date1.as_str();

    let pass = match state.comparison() {
        Some(DateComparison::Equals) => date == date1,
        Some(DateComparison::Before) => date < date1,
        Some(DateComparison::After) => date > date1,
        Some(DateComparison::Between) => {
            state.date2.is_empty() || (date1 <= date && date <= state.date2.as_str())
        }
        None => {
            log::debug!(
                "Unknown date comparator '{}', passing",
                state.selected_date_filter
            );
            true
        }
    };

    Verdict::from(pass)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn check(comparison: DateComparison, date1: &str, date2: &str, date: &str) -> Verdict {
        let db = fixtures::db();
        let ctx = EvalContext::new(&db);
        let incident = fixtures::incident(date, "X");
        evaluate(
            &incident,
            Some(&DateState::new(comparison, date1, date2)),
            &ctx,
        )
    }

    #[test]
    fn empty_primary_bound_passes() {
        for comparison in [
            DateComparison::Equals,
            DateComparison::Before,
            DateComparison::After,
            DateComparison::Between,
        ] {
            assert_eq!(check(comparison, "", "", "2020-01-01"), Verdict::Pass);
        }
    }

    #[test]
    fn before_and_after_are_strict() {
        assert_eq!(
            check(DateComparison::Before, "2020-01-01", "", "2020-01-01"),
            Verdict::Fail
        );
        assert_eq!(
            check(DateComparison::Before, "2020-01-02", "", "2020-01-01"),
            Verdict::Pass
        );
        assert_eq!(
            check(DateComparison::After, "2020-01-01", "", "2020-01-01"),
            Verdict::Fail
        );
        assert_eq!(
            check(DateComparison::After, "2019-12-31", "", "2020-01-01"),
            Verdict::Pass
        );
    }

    #[test]
    fn equals_matches_exact_day() {
        assert_eq!(
            check(DateComparison::Equals, "2020-01-01", "", "2020-01-01"),
            Verdict::Pass
        );
        assert_eq!(
            check(DateComparison::Equals, "2020-01-01", "", "2020-01-02"),
            Verdict::Fail
        );
    }

    #[test]
    fn between_is_inclusive_and_needs_both_bounds() {
        let range = |date| check(DateComparison::Between, "2020-01-01", "2020-12-31", date);
        assert_eq!(range("2020-01-01"), Verdict::Pass);
        assert_eq!(range("2020-12-31"), Verdict::Pass);
        assert_eq!(range("2021-01-01"), Verdict::Fail);
        assert_eq!(range("2019-12-31"), Verdict::Fail);

        assert_eq!(
            check(DateComparison::Between, "2020-01-01", "", "1999-01-01"),
            Verdict::Pass
        );
    }

    #[test]
    fn unknown_comparator_passes() {
        let db = fixtures::db();
        let ctx = EvalContext::new(&db);
        let state = DateState {
            date1: "2030-01-01".to_string(),
            date2: String::new(),
            selected_date_filter: "sometime".to_string(),
        };
        assert_eq!(
            evaluate(&db.incidents["A"], Some(&state), &ctx),
            Verdict::Pass
        );
    }
}
