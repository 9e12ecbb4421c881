//! Types for the v2 dwell-and-tee-lock engine.

use serde::{Deserialize, Serialize};

use crate::geo::{GeoPoint, Millis};

/// A green: its middle point and nominal radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Green {
    pub mid: GeoPoint,
    pub radius_m: f64,
}

/// The hole currently being played.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutoHole {
    pub id: i64,
    pub par: u8,
    pub green: Green,
    pub tee: Option<GeoPoint>,
}

/// The next or previous hole, as far as tee-lock needs to know.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NeighborHole {
    pub id: i64,
    pub tee: Option<GeoPoint>,
    pub green: Option<Green>,
}

/// One GPS sample with the motion data v2 needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoSample {
    pub lat: f64,
    pub lon: f64,
    pub ts: Millis,
    pub speed_mps: f64,
    pub heading_deg: Option<f64>,
}

impl AutoSample {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon).at(self.ts)
    }
}

/// Everything one v2 step looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoInput {
    pub pos: AutoSample,
    pub hole: AutoHole,
    pub next: Option<NeighborHole>,
    pub prev: Option<NeighborHole>,
}

/// A confirmed arrival at a tee box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeeLock {
    pub hole_id: i64,
    pub ts: Millis,
}

/// Decision state carried by the caller between v2 steps.
///
/// `at_tee_box` always serializes, as `null` when no lock is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reached_green_at: Option<Millis>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_green_at: Option<Millis>,

    #[serde(default)]
    pub at_tee_box: Option<TeeLock>,

    pub stable_hole_id: i64,
}

impl AutoState {
    /// A fresh state that trusts `hole_id`.
    pub fn seeded(hole_id: i64) -> Self {
        Self {
            reached_green_at: None,
            left_green_at: None,
            at_tee_box: None,
            stable_hole_id: hole_id,
        }
    }
}

/// Thresholds for the v2 engine. Radii in meters, durations in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AutoOptions {
    pub green_enter_r: f64,
    pub green_leave_r: f64,
    pub tee_r: f64,
    pub min_leave_s: f64,
    pub min_enter_s: f64,
    pub heading_agree_deg: f64,
}

impl Default for AutoOptions {
    fn default() -> Self {
        Self {
            green_enter_r: 25.0,
            green_leave_r: 40.0,
            tee_r: 20.0,
            min_leave_s: 12.0,
            min_enter_s: 3.0,
            heading_agree_deg: 35.0,
        }
    }
}

impl AutoOptions {
    /// Replace every non-positive or non-finite threshold with its default.
    #[must_use]
    pub fn sanitized(self) -> Self {
        fn positive_or(value: f64, fallback: f64) -> f64 {
            if value.is_finite() && value > 0.0 { value } else { fallback }
        }

        let d = Self::default();
        Self {
            green_enter_r: positive_or(self.green_enter_r, d.green_enter_r),
            green_leave_r: positive_or(self.green_leave_r, d.green_leave_r),
            tee_r: positive_or(self.tee_r, d.tee_r),
            min_leave_s: positive_or(self.min_leave_s, d.min_leave_s),
            min_enter_s: positive_or(self.min_enter_s, d.min_enter_s),
            heading_agree_deg: positive_or(self.heading_agree_deg, d.heading_agree_deg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitized_replaces_bad_thresholds() {
        let opts = AutoOptions {
            green_enter_r: -1.0,
            tee_r: f64::NAN,
            min_leave_s: 0.0,
            ..AutoOptions::default()
        }
        .sanitized();

        assert_eq!(opts, AutoOptions::default());
    }

    #[test]
    fn partial_options_fill_from_defaults() {
        let opts: AutoOptions = toml::from_str("tee-r = 15.0").unwrap();
        assert_eq!(opts.tee_r, 15.0);
        assert_eq!(opts.green_leave_r, 40.0);
    }

    #[test]
    fn unlocked_state_serializes_null_tee_box() {
        let json = serde_json::to_value(AutoState::seeded(3)).unwrap();
        assert_eq!(json["atTeeBox"], serde_json::Value::Null);
        assert_eq!(json["stableHoleId"], 3);
        assert!(json.get("reachedGreenAt").is_none());
    }
}
