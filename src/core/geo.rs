use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A geographic coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Interpolate latitude and longitude independently
    pub fn lerp(from: LatLng, to: LatLng, t: f64) -> LatLng {
        LatLng {
            lat: lerp(from.lat, to.lat, t),
            lng: lerp(from.lng, to.lng, t),
        }
    }
}

/// Linear interpolation, exact at both endpoints
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    if t == 1.0 {
        return b;
    }
    a + (b - a) * t
}

/// Clamp `value` into `[min, max]`; yields `min` when the bounds are inverted
pub fn clamp(min: f64, value: f64, max: f64) -> f64 {
    min.max(max.min(value))
}

/// Haversine distance in meters
pub fn distance(a: LatLng, b: LatLng) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}
