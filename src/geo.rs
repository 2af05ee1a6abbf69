// src/geo.rs

//! Great-circle geometry on WGS84 latitude/longitude pairs.
//!
//! Everything here is pure: no state, no I/O. Angles are in degrees at the API
//! surface and converted to radians internally.

use serde::{Deserialize, Serialize};

use crate::error::WayfindError;

/// Mean Earth radius used by the Haversine formula, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Represents a geographical point.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a new `GeoPoint`.
    ///
    /// Rejects NaN and values outside [-90, 90] / [-180, 180]. Note that `(0, 0)`
    /// is accepted here; whether it counts as a usable location is decided by
    /// [`is_valid_point`].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, WayfindError> {
        if !in_range(latitude, longitude) {
            return Err(WayfindError::invalid_coordinates(latitude, longitude));
        }
        Ok(GeoPoint {
            latitude,
            longitude,
        })
    }
}

fn in_range(latitude: f64, longitude: f64) -> bool {
    (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude)
}

/// Returns true when the point can be used as a real location.
///
/// NaN or out-of-range components fail, and so does exactly `(0, 0)`, which
/// upstream data uses as an "unset" sentinel.
pub fn is_valid_point(p: &GeoPoint) -> bool {
    if !in_range(p.latitude, p.longitude) {
        // NaN fails the range check too
        return false;
    }
    !(p.latitude == 0.0 && p.longitude == 0.0)
}

/// Great-circle distance between two points in meters (Haversine).
///
/// Returns exactly `0.0` for identical points and is symmetric in its arguments.
pub fn distance_meters(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = phi2 - phi1;
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Rounding can push h a hair outside [0, 1] near antipodes.
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Initial bearing (forward azimuth) from `from` toward `to`, in `[0, 360)`.
///
/// Fails with `DegenerateInput` when both points coincide, since a direction
/// has no meaning at zero distance.
pub fn initial_bearing_degrees(from: &GeoPoint, to: &GeoPoint) -> Result<f64, WayfindError> {
    if from == to {
        return Err(WayfindError::DegenerateInput(format!(
            "bearing requested between coincident points ({}, {})",
            from.latitude, from.longitude
        )));
    }

    let phi1 = from.latitude.to_radians();
    let phi2 = to.latitude.to_radians();
    let d_lambda = (to.longitude - from.longitude).to_radians();

    let y = d_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lambda.cos();
    if y == 0.0 && x == 0.0 {
        return Err(WayfindError::DegenerateInput(
            "bearing undefined between the given points".to_string(),
        ));
    }

    Ok(wrap_360(y.atan2(x).to_degrees()))
}

/// Normalizes an angle into `[0, 360)`.
pub fn wrap_360(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid of a tiny negative number rounds up to exactly 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Normalizes an angle into `(-180, 180]`.
pub fn wrap_180(angle: f64) -> f64 {
    let wrapped = wrap_360(angle);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}
