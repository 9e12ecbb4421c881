//! Observing engine output without touching engine internals.
//!
//! Every hole change is handed to a [`TransitionSink`]; per-tick health is
//! summarized in a [`TickReport`]. Nothing here is sent anywhere by the
//! engines themselves.

use serde::Serialize;
use tracing::{debug, info};

use crate::geo::Millis;
use crate::model::HoleTransition;

/// How long after a manual override a tick still counts as overridden.
const OVERRIDE_WINDOW_MS: Millis = 10_000;

/// Receives every hole transition.
pub trait TransitionSink {
    fn record(&mut self, transition: &HoleTransition);
}

impl TransitionSink for Vec<HoleTransition> {
    fn record(&mut self, transition: &HoleTransition) {
        self.push(transition.clone());
    }
}

impl<F: FnMut(&HoleTransition)> TransitionSink for F {
    fn record(&mut self, transition: &HoleTransition) {
        self(transition);
    }
}

/// Logs transitions through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TransitionSink for TracingSink {
    fn record(&mut self, t: &HoleTransition) {
        info!(
            from = ?t.from_index,
            to = t.to_index,
            hole_id = %t.hole_id,
            reason = ?t.reason,
            at = t.at,
            "hole changed"
        );
    }
}

/// Health of one processed fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickReport {
    /// Time from the fix being taken to it being processed.
    pub latency_ms: Millis,
    pub freq_hz: f64,
    pub auto_advance_fired: bool,
    pub override_used: bool,
}

impl TickReport {
    pub fn new(
        fix_ts: Option<Millis>,
        now: Millis,
        freq_hz: f64,
        auto_advance_fired: bool,
        override_ts: Option<Millis>,
    ) -> Self {
        Self::with_latency(
            now - fix_ts.unwrap_or(now),
            now,
            freq_hz,
            auto_advance_fired,
            override_ts,
        )
    }

    /// A report whose latency was measured by the caller, e.g. replaying
    /// historical fixes where fix time and processing time are unrelated.
    /// `now` and `override_ts` share the fix clock.
    pub fn with_latency(
        latency_ms: Millis,
        now: Millis,
        freq_hz: f64,
        auto_advance_fired: bool,
        override_ts: Option<Millis>,
    ) -> Self {
        Self {
            latency_ms: latency_ms.max(0),
            freq_hz,
            auto_advance_fired,
            override_used: override_ts.is_some_and(|ts| now - ts < OVERRIDE_WINDOW_MS),
        }
    }

    pub fn emit(&self) {
        debug!(
            latency_ms = self.latency_ms,
            freq_hz = self.freq_hz,
            auto_advance_fired = self.auto_advance_fired,
            override_used = self.override_used,
            "follow tick"
        );
    }
}
