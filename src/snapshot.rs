//! Distance snapshot shown to the player for the committed hole.

use serde::{Deserialize, Serialize};

use crate::geo::{self, GeoPoint, Millis};
use crate::model::HoleRef;

/// Front/middle/back distances from the player to a hole's green.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoleSnapshot {
    pub hole_id: String,
    pub hole_number: u32,
    pub front_m: f64,
    pub middle_m: f64,
    pub back_m: f64,
    pub heading_deg: Option<f64>,
    pub ts: Millis,
}

impl HoleSnapshot {
    pub fn build(
        hole: &HoleRef,
        position: &GeoPoint,
        heading_deg: Option<f64>,
        ts: Millis,
    ) -> Self {
        Self {
            hole_id: hole.id.clone(),
            hole_number: hole.number,
            front_m: geo::distance(position, &hole.front),
            middle_m: geo::distance(position, &hole.middle),
            back_m: geo::distance(position, &hole.back),
            heading_deg: heading_deg.filter(|h| h.is_finite()).map(geo::normalize_deg),
            ts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::geo::EARTH_RADIUS_M;

    #[test]
    fn distances_increase_front_to_back() {
        let m = |meters: f64| (meters / EARTH_RADIUS_M).to_degrees();
        let hole = HoleRef {
            id: "h1".into(),
            number: 1,
            front: GeoPoint::new(m(140.0), 0.0),
            middle: GeoPoint::new(m(150.0), 0.0),
            back: GeoPoint::new(m(162.0), 0.0),
            par: None,
            tee: None,
            green_radius_m: None,
        };

        let snap = HoleSnapshot::build(&hole, &GeoPoint::new(0.0, 0.0), Some(-90.0), 7);

        assert!((snap.front_m - 140.0).abs() < 1e-6);
        assert!((snap.middle_m - 150.0).abs() < 1e-6);
        assert!((snap.back_m - 162.0).abs() < 1e-6);
        assert_eq!(snap.heading_deg, Some(270.0));
        assert_eq!(snap.ts, 7);
    }
}
