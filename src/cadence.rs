//! Sampling cadence: how often GPS fixes are fed to an engine.
//!
//! A player who is walking or turning is sampled at 1 Hz; a player standing
//! still (lining up a putt, waiting on the tee) at 0.3 Hz.

use crate::geo::{self, Millis};

const ACTIVE_HZ: f64 = 1.0;
const IDLE_HZ: f64 = 0.3;
const MOVING_MPS: f64 = 0.7;
const TURNING_DEG: f64 = 8.0;
const TURN_WINDOW_MS: Millis = 1_000;

#[derive(Debug, Clone, Copy)]
struct HeadingSample {
    value: f64,
    ts: Millis,
}

/// Admission gate for incoming fixes.
#[derive(Debug, Clone, Default)]
pub struct Cadence {
    last_update_ts: Option<Millis>,
    heading: Option<HeadingSample>,
}

impl Cadence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decides whether the fix arriving at `now` should be processed.
    ///
    /// Returns the frequency it was admitted at, or `None` when it arrives
    /// too soon after the last admitted fix. The heading is tracked on
    /// every call, admitted or not; a missing heading repeats the last one.
    pub fn admit(
        &mut self,
        heading_deg: Option<f64>,
        speed_mps: Option<f64>,
        now: Millis,
    ) -> Option<f64> {
        let heading = heading_deg
            .filter(|h| h.is_finite())
            .or(self.heading.map(|h| h.value))
            .unwrap_or(0.0);
        let previous = self.heading.replace(HeadingSample {
            value: heading,
            ts: now,
        });

        let turning = previous.is_some_and(|p| {
            now - p.ts <= TURN_WINDOW_MS
                && geo::short_arc_diff(heading, p.value).abs() >= TURNING_DEG
        });
        let speed = speed_mps.filter(|s| s.is_finite()).unwrap_or(0.0).max(0.0);
        let freq = if speed >= MOVING_MPS || turning {
            ACTIVE_HZ
        } else {
            IDLE_HZ
        };

        if !geo::should_update(freq, self.last_update_ts, now) {
            return None;
        }
        self.last_update_ts = Some(now);
        Some(freq)
    }

    /// Forgets the heading history, e.g. after the player recenters the view.
    pub fn reset_heading(&mut self) {
        self.heading = None;
    }
}
