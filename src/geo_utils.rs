//! Geographic utilities: great-circle distance, bearings, midpoints.
//!
//! All functions operate on WGS84 decimal degrees and are safe
//! across the antimeridian; nothing here mutates its inputs.

use crate::GpsPoint;

/// Earth radius in meters (mean radius).
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Meters per degree of latitude (approximately constant).
pub const METERS_PER_DEG_LAT: f64 = 111_320.0;

/// Calculate the haversine (great-circle) distance between two points in meters.
pub fn haversine_distance(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let dlat = (p2.latitude - p1.latitude).to_radians();
    let dlng = (p2.longitude - p1.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Calculate the initial compass bearing from `p1` to `p2` in degrees [0, 360).
///
/// At the poles the bearing degenerates; the returned value is whatever
/// `atan2` yields for the formula and callers must not rely on it there.
pub fn initial_bearing(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let dlng = (p2.longitude - p1.longitude).to_radians();

    let x = dlng.sin() * lat2.cos();
    let y = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlng.cos();

    (x.atan2(y).to_degrees() + 360.0) % 360.0
}

/// Unsigned change in direction at `cur` in degrees [0, 180].
///
/// Computed from the bearings of the two legs `prev -> cur` and
/// `cur -> next` as `180 - |180 - |b2 - b1||`: a straight continuation
/// yields 0, a full reversal yields 180.
pub fn change_in_direction(prev: &GpsPoint, cur: &GpsPoint, next: &GpsPoint) -> f64 {
    let b1 = initial_bearing(prev, cur);
    let b2 = initial_bearing(cur, next);
    let delta = (b2 - b1).abs();
    180.0 - (180.0 - delta).abs()
}

/// Geographic midpoint of the great-circle arc between `p1` and `p2`.
///
/// Uses the standard vector formula, so the result is correct across
/// the antimeridian. Longitude is normalised to [-180, 180].
pub fn spherical_midpoint(p1: &GpsPoint, p2: &GpsPoint) -> GpsPoint {
    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let lng1 = p1.longitude.to_radians();
    let dlng = (p2.longitude - p1.longitude).to_radians();

    let bx = lat2.cos() * dlng.cos();
    let by = lat2.cos() * dlng.sin();

    let mid_lat = (lat1.sin() + lat2.sin()).atan2(((lat1.cos() + bx).powi(2) + by * by).sqrt());
    let mid_lng = lng1 + by.atan2(lat1.cos() + bx);

    let mut lng_deg = mid_lng.to_degrees();
    if lng_deg > 180.0 {
        lng_deg -= 360.0;
    } else if lng_deg < -180.0 {
        lng_deg += 360.0;
    }

    GpsPoint::new(mid_lat.to_degrees(), lng_deg)
}

/// Calculate the total path length of a point sequence in meters.
pub fn trace_distance(points: &[GpsPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

/// Convert a distance in meters to degrees at a given latitude.
pub fn meters_to_degrees(meters: f64, latitude: f64) -> f64 {
    let lat_rad = latitude.to_radians();
    let meters_per_degree = METERS_PER_DEG_LAT * lat_rad.cos().max(0.01);
    meters / meters_per_degree
}
