//! Output formatting for CLI display.

use jiff::Timestamp;

use fairway::engine::EngineKind;
use fairway::geo::Millis;
use fairway::model::{HoleRef, HoleTransition, TransitionReason};
use fairway::snapshot::HoleSnapshot;

/// Render an epoch-millisecond time as RFC 3339, or the raw number if it is
/// out of range.
pub(super) fn format_time(ms: Millis) -> String {
    Timestamp::from_millisecond(ms).map_or_else(|_| format!("{ms}ms"), |ts| ts.to_string())
}

pub(super) fn format_engine(kind: EngineKind) -> &'static str {
    match kind {
        EngineKind::V1 => "v1",
        EngineKind::V2 => "v2",
    }
}

pub(super) fn format_reason(reason: TransitionReason) -> &'static str {
    match reason {
        TransitionReason::Locate => "located",
        TransitionReason::Manual => "manual",
        TransitionReason::TeeLock => "tee lock",
        TransitionReason::LeaveGreen => "left green",
    }
}

/// Format a hole change for human-readable display.
pub(super) fn format_transition(t: &HoleTransition) -> String {
    let from = t
        .from_index
        .map_or_else(|| "-".to_string(), |i| format!("#{}", i + 1));
    format!(
        "{}  {from} -> #{} ({})  {}",
        format_time(t.at),
        t.to_index + 1,
        t.hole_id,
        format_reason(t.reason)
    )
}

pub(super) fn format_hole(hole: &HoleRef) -> String {
    match hole.par {
        Some(par) => format!("hole {} ({}, par {par})", hole.number, hole.id),
        None => format!("hole {} ({})", hole.number, hole.id),
    }
}

/// Distances rounded to whole meters.
pub(super) fn format_snapshot(snapshot: &HoleSnapshot) -> String {
    format!(
        "front {:.0} m / middle {:.0} m / back {:.0} m",
        snapshot.front_m, snapshot.middle_m, snapshot.back_m
    )
}
