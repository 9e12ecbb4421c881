//! Hole catalogue entries.

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

use super::auto::{AutoHole, Green, NeighborHole};

/// Green radius assumed when the catalogue does not carry one.
pub const DEFAULT_GREEN_RADIUS_M: f64 = 12.0;

/// One hole of a course, as supplied by the caller for the whole round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HoleRef {
    /// Stable identifier; persisted to resume a round.
    pub id: String,

    /// Hole number as printed on the card. Also the v2 engine's hole id.
    pub number: u32,

    pub front: GeoPoint,
    pub middle: GeoPoint,
    pub back: GeoPoint,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub par: Option<u8>,

    /// Tee box position, used for v2 tee-lock confirmation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tee: Option<GeoPoint>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub green_radius_m: Option<f64>,
}

impl HoleRef {
    /// The green as seen by the v2 engine: the middle point plus radius.
    pub fn green(&self) -> Green {
        Green {
            mid: self.middle,
            radius_m: self.green_radius_m.unwrap_or(DEFAULT_GREEN_RADIUS_M),
        }
    }

    /// This hole in the shape the v2 engine expects for the current hole.
    pub fn to_auto_hole(&self) -> AutoHole {
        AutoHole {
            id: i64::from(self.number),
            par: self.par.unwrap_or(4),
            green: self.green(),
            tee: self.tee,
        }
    }

    /// This hole in the shape the v2 engine expects for a neighbor.
    pub fn to_neighbor(&self) -> NeighborHole {
        NeighborHole {
            id: i64::from(self.number),
            tee: self.tee,
            green: Some(self.green()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_minimal_catalogue_entry() {
        let json = r#"{
            "id": "h1",
            "number": 1,
            "front": { "lat": 0.0, "lon": 0.0 },
            "middle": { "lat": 0.0001, "lon": 0.0 },
            "back": { "lat": 0.0002, "lon": 0.0 }
        }"#;
        let hole: HoleRef = serde_json::from_str(json).unwrap();

        assert_eq!(hole.id, "h1");
        assert!(hole.tee.is_none());
        assert_eq!(hole.green().radius_m, DEFAULT_GREEN_RADIUS_M);
    }

    #[test]
    fn auto_shapes_use_number_as_id() {
        let hole = HoleRef {
            id: "h7".into(),
            number: 7,
            front: GeoPoint::new(0.0, 0.0),
            middle: GeoPoint::new(0.0001, 0.0),
            back: GeoPoint::new(0.0002, 0.0),
            par: Some(3),
            tee: Some(GeoPoint::new(-0.001, 0.0)),
            green_radius_m: Some(15.0),
        };

        let auto = hole.to_auto_hole();
        assert_eq!(auto.id, 7);
        assert_eq!(auto.par, 3);
        assert_eq!(auto.green.radius_m, 15.0);

        let neighbor = hole.to_neighbor();
        assert_eq!(neighbor.id, 7);
        assert_eq!(neighbor.tee, hole.tee);
    }
}
