//! Great-circle distance between two coordinates. Pure and deterministic;
//! the accepted clock-in/out radius lives in the configuration, not here.

use crate::models::point::GeoPoint;

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance in meters.
pub fn distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

pub fn is_within_range(a: GeoPoint, b: GeoPoint, max_meters: f64) -> bool {
    distance_meters(a, b) <= max_meters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint { lat, lon }
    }

    #[test]
    fn identical_points_have_zero_distance() {
        let a = p(48.8566, 2.3522);
        assert_eq!(distance_meters(a, a), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = p(48.8566, 2.3522);
        let b = p(48.8606, 2.3376);
        assert!((distance_meters(a, b) - distance_meters(b, a)).abs() < 1e-9);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = distance_meters(p(45.0, 7.0), p(46.0, 7.0));
        assert!((d - 111_195.0).abs() < 200.0, "got {}", d);
    }

    #[test]
    fn range_check_honors_the_boundary() {
        // ~0.00450 degrees of latitude ≈ 500 m
        let site = p(48.8566, 2.3522);
        let just_inside = p(48.8566 + 0.00448, 2.3522);
        let just_outside = p(48.8566 + 0.00452, 2.3522);
        assert!(is_within_range(site, just_inside, 500.0));
        assert!(!is_within_range(site, just_outside, 500.0));
    }
}
