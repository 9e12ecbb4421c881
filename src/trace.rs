//! Course and GPS trace files.
//!
//! A course is a JSON array of [`HoleRef`]s. A trace is JSON lines, one fix
//! per line:
//!
//! ```text
//! {"lat": 47.61, "lon": -122.33, "ts": 1700000000000, "heading": 12.5, "speed": 1.1}
//! ```
//!
//! `heading` and `speed` are optional. A missing speed is estimated from the
//! previous fix.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::geo::{self, GeoPoint, Millis};
use crate::model::HoleRef;

/// Errors from reading course and trace files.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("line {line}: {source}")]
    Line {
        line: usize,
        source: serde_json::Error,
    },

    #[error("course has no holes")]
    EmptyCourse,
}

pub type Result<T> = core::result::Result<T, TraceError>;

/// One recorded fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceSample {
    pub position: GeoPoint,
    pub heading_deg: Option<f64>,
    pub speed_mps: f64,
    pub ts: Millis,
}

#[derive(Deserialize)]
struct RawFix {
    lat: f64,
    lon: f64,
    ts: Millis,
    #[serde(default)]
    heading: Option<f64>,
    #[serde(default)]
    speed: Option<f64>,
}

/// Reads a course file. Holes are kept in file order.
pub fn load_course(path: &Path) -> Result<Vec<HoleRef>> {
    let contents = fs::read_to_string(path)?;
    let holes: Vec<HoleRef> = serde_json::from_str(&contents)?;
    if holes.is_empty() {
        return Err(TraceError::EmptyCourse);
    }
    Ok(holes)
}

/// Reads a trace file.
pub fn load_trace(path: &Path) -> Result<Vec<TraceSample>> {
    parse_trace(&fs::read_to_string(path)?)
}

fn parse_trace(contents: &str) -> Result<Vec<TraceSample>> {
    let mut samples: Vec<TraceSample> = Vec::new();

    for (i, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let raw: RawFix =
            serde_json::from_str(line).map_err(|source| TraceError::Line { line: i + 1, source })?;

        let position = GeoPoint::new(raw.lat, raw.lon).at(raw.ts);
        let speed_mps = raw.speed.filter(|s| s.is_finite()).unwrap_or_else(|| {
            samples
                .last()
                .map_or(0.0, |prev| geo::speed_from_trace(&[prev.position, position]))
        });

        samples.push(TraceSample {
            position,
            heading_deg: raw.heading,
            speed_mps,
            ts: raw.ts,
        });
    }

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    use crate::geo::EARTH_RADIUS_M;

    #[test]
    fn parses_fixes_and_skips_blank_lines() {
        let samples = parse_trace(
            r#"{"lat": 1.0, "lon": 2.0, "ts": 1000, "heading": 90.0, "speed": 1.5}

{"lat": 1.0, "lon": 2.0, "ts": 2000}
"#,
        )
        .unwrap();

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].heading_deg, Some(90.0));
        assert!((samples[0].speed_mps - 1.5).abs() < f64::EPSILON);
        assert_eq!(samples[1].position.ts, Some(2000));
        assert_eq!(samples[1].heading_deg, None);
    }

    #[test]
    fn estimates_missing_speed() {
        let lat = (10.0 / EARTH_RADIUS_M).to_degrees();
        let samples = parse_trace(&format!(
            "{{\"lat\": 0.0, \"lon\": 0.0, \"ts\": 0}}\n\
             {{\"lat\": {lat}, \"lon\": 0.0, \"ts\": 5000}}\n"
        ))
        .unwrap();

        assert!(samples[0].speed_mps.abs() < f64::EPSILON);
        assert!((samples[1].speed_mps - 2.0).abs() < 1e-6);
    }

    #[test]
    fn bad_line_reports_its_number() {
        let err = parse_trace("{\"lat\": 0.0, \"lon\": 0.0, \"ts\": 0}\n\nnot json\n").unwrap_err();
        assert!(matches!(err, TraceError::Line { line: 3, .. }));
    }

    #[test]
    fn loads_course_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("course.json");
        fs::write(
            &path,
            r#"[
                {"id": "h1", "number": 1,
                 "front": {"lat": 0.0, "lon": 0.0},
                 "middle": {"lat": 0.0001, "lon": 0.0},
                 "back": {"lat": 0.0002, "lon": 0.0},
                 "tee": {"lat": -0.003, "lon": 0.0},
                 "green-radius-m": 14.0}
            ]"#,
        )
        .unwrap();

        let holes = load_course(&path).unwrap();
        assert_eq!(holes.len(), 1);
        assert_eq!(holes[0].id, "h1");
        assert_eq!(holes[0].green_radius_m, Some(14.0));
    }

    #[test]
    fn empty_course_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("course.json");
        fs::write(&path, "[]").unwrap();

        assert!(matches!(load_course(&path), Err(TraceError::EmptyCourse)));
    }

    #[test]
    fn missing_trace_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = load_trace(&dir.path().join("missing.jsonl")).unwrap_err();
        assert!(matches!(err, TraceError::Io(_)));
    }
}
