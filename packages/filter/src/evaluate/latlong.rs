//! Radius search around a point.

use incident_map_filter_models::{LatLongState, Verdict};
use incident_map_incident_models::Incident;
use incident_map_spatial::within_radius;

use super::EvalContext;

/// Passes incidents within `radius` km of the configured center.
///
/// Until latitude, longitude and radius all parse the filter is
/// indeterminate. Once configured, an incident without a location fails.
#[must_use]
pub fn evaluate(
    incident: &Incident,
    state: Option<&LatLongState>,
    _ctx: &EvalContext<'_>,
) -> Verdict {
    let Some((lat, lng, radius_km)) = state.and_then(LatLongState::parsed) else {
        return Verdict::Indeterminate;
    };
    let Some(location) = incident.location else {
        return Verdict::Fail;
    };
    Verdict::from(within_radius(lat, lng, location.lat, location.lng, radius_km))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn state(lat: &str, lng: &str, radius: &str) -> LatLongState {
        LatLongState {
            latitude: lat.to_string(),
            longitude: lng.to_string(),
            radius: radius.to_string(),
        }
    }

    #[test]
    fn radius_around_bogota() {
        let db = fixtures::db();
        let ctx = EvalContext::new(&db);
        let bogota = fixtures::located(fixtures::incident("2020-01-01", "X"), 4.711, -74.0721);
        let medellin = fixtures::located(fixtures::incident("2020-01-01", "X"), 6.2442, -75.5812);
        let center = state("4.711", "-74.0721", "50");

        assert_eq!(evaluate(&bogota, Some(&center), &ctx), Verdict::Pass);
        assert_eq!(evaluate(&medellin, Some(&center), &ctx), Verdict::Fail);

        let with_unit = state("4.711", "-74.0721", "50 km");
        assert_eq!(evaluate(&bogota, Some(&with_unit), &ctx), Verdict::Pass);
    }

    #[test]
    fn invalid_input_is_unconfigured() {
        let db = fixtures::db();
        let ctx = EvalContext::new(&db);
        let incident = fixtures::incident("2020-01-01", "X");

        assert_eq!(evaluate(&incident, None, &ctx), Verdict::Indeterminate);
        assert_eq!(
            evaluate(&incident, Some(&LatLongState::default()), &ctx),
            Verdict::Indeterminate
        );
        assert_eq!(
            evaluate(&incident, Some(&state("north", "-74", "10")), &ctx),
            Verdict::Indeterminate
        );
    }

    #[test]
    fn configured_filter_rejects_incident_without_location() {
        let db = fixtures::db();
        let ctx = EvalContext::new(&db);
        let incident = fixtures::incident("2020-01-01", "X");
        assert!(incident.location.is_none());

        assert_eq!(
            evaluate(&incident, Some(&state("4.6", "-74.1", "10000")), &ctx),
            Verdict::Fail
        );
    }
}
