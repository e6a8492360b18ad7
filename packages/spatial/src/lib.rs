#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Great-circle distance primitives.
//!
//! The radius filter compares incidents against a user-entered center
//! point using the haversine formula on a spherical Earth. The radius is
//! fixed at 6371 km so distances agree with what the map frontend shows.

/// Mean Earth radius in kilometers used by [`haversine_km`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers between two points given in
/// decimal degrees.
///
/// `a = sin²(Δlat/2) + cos(lat1)·cos(lat2)·sin²(Δlon/2)`,
/// `d = 2·R·atan2(√a, √(1−a))`.
#[must_use]
#[allow(clippy::suboptimal_flops)]
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin() * (d_lat / 2.0).sin()
        + lat1.to_radians().cos()
            * lat2.to_radians().cos()
            * (d_lon / 2.0).sin()
            * (d_lon / 2.0).sin();
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Returns `true` if `(lat2, lon2)` lies within `radius_km` of
/// `(lat1, lon1)`, boundary inclusive.
#[must_use]
pub fn within_radius(lat1: f64, lon1: f64, lat2: f64, lon2: f64, radius_km: f64) -> bool {
    haversine_km(lat1, lon1, lat2, lon2) <= radius_km
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_degree_of_longitude_at_equator() {
        let d = haversine_km(0.0, 0.0, 0.0, 1.0);
        assert!((d - 111.19).abs() < 0.5, "got {d}");
    }

    #[test]
    fn same_point_is_zero() {
        assert!(haversine_km(4.711, -74.072, 4.711, -74.072).abs() < f64::EPSILON);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = haversine_km(4.711, -74.072, 6.244, -75.581);
        let b = haversine_km(6.244, -75.581, 4.711, -74.072);
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn bogota_to_medellin() {
        let d = haversine_km(4.711, -74.072, 6.244, -75.581);
        assert!((d - 239.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn radius_boundary_is_inclusive() {
        let d = haversine_km(0.0, 0.0, 0.0, 1.0);
        assert!(within_radius(0.0, 0.0, 0.0, 1.0, d));
        assert!(!within_radius(0.0, 0.0, 0.0, 1.0, d - 0.001));
    }
}
