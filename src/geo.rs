//! Geo math: distances, bearings, and rate gates over GPS fixes.
//!
//! Everything here is pure. Inputs that are not finite degrade to a
//! finite, neutral result instead of propagating `NaN`.

use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch.
pub type Millis = i64;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A single geographic fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,

    /// When the fix was taken, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<Millis>,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon, ts: None }
    }

    #[must_use]
    pub const fn at(self, ts: Millis) -> Self {
        Self { ts: Some(ts), ..self }
    }

    /// Whether both coordinates are finite numbers.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

/// Great-circle distance in meters between two points.
pub fn distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat * 0.5).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);
    let c = 2.0 * h.clamp(0.0, 1.0).sqrt().atan2((1.0 - h).clamp(0.0, 1.0).sqrt());
    let meters = EARTH_RADIUS_M * c;

    if meters.is_finite() { meters } else { 0.0 }
}

/// Initial compass bearing from `a` to `b`, in `[0, 360)`.
///
/// Coincident points yield `0`.
pub fn bearing(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
    let deg = y.atan2(x).to_degrees();

    if deg.is_finite() {
        normalize_deg(deg)
    } else {
        0.0
    }
}

/// Signed smallest rotation taking `b` onto `a`, in `(-180, 180]`.
pub fn short_arc_diff(a: f64, b: f64) -> f64 {
    let diff = (a - b + 540.0).rem_euclid(360.0) - 180.0;
    if !diff.is_finite() {
        return 0.0;
    }
    if diff <= -180.0 { diff + 360.0 } else { diff }
}

/// Wrap any finite angle into `[0, 360)`.
pub fn normalize_deg(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Ground speed in m/s between the last two samples of a trace.
///
/// Returns `0` with fewer than two samples, missing or non-increasing
/// timestamps, or a non-finite result.
pub fn speed_from_trace(samples: &[GeoPoint]) -> f64 {
    let [.., prev, last] = samples else {
        return 0.0;
    };
    let (Some(t0), Some(t1)) = (prev.ts, last.ts) else {
        return 0.0;
    };
    if t1 <= t0 || !prev.is_valid() || !last.is_valid() {
        return 0.0;
    }

    let speed = distance(prev, last) / ((t1 - t0) as f64 / 1000.0);
    if speed.is_finite() { speed.max(0.0) } else { 0.0 }
}

/// Rate-limiting gate for feeding samples at `freq_hz`.
///
/// Always admits when the frequency is not positive or nothing has been
/// admitted yet. Allows 1 ms of slack so a steady 1 Hz source is not
/// rejected by timer jitter.
pub fn should_update(freq_hz: f64, last_update_ts: Option<Millis>, now: Millis) -> bool {
    if !freq_hz.is_finite() || freq_hz <= 0.0 {
        return true;
    }
    let Some(last) = last_update_ts else {
        return true;
    };
    let min_interval_ms = 1000.0 / freq_hz - 1.0;
    (now - last) as f64 >= min_interval_ms
}
