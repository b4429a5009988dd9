//! Great-circle distance and the location-change gate

use crate::types::Coordinate;

/// Mean Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance below which a new fix is not worth adopting
pub const DEFAULT_CHANGE_THRESHOLD_KM: f64 = 5.0;

/// Haversine great-circle distance between two coordinates, in kilometers
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos()
            * b.latitude.to_radians().cos()
            * (d_lon / 2.0).sin().powi(2);

    // Rounding can push h a hair outside [0,1] for antipodal points,
    // which would take the square roots out of domain
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// True when the candidate fix moved at least `threshold_km` from the
/// previous one. Distance exactly at the threshold counts as changed.
pub fn changed_enough(previous: Coordinate, candidate: Coordinate, threshold_km: f64) -> bool {
    distance_km(previous, candidate) >= threshold_km
}
