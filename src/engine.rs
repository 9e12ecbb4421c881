//! Hole progression: one interface over the two auto-advance engines.
//!
//! The caller picks an engine once per session. Both variants take the
//! same samples and report the same [`HoleTransition`]s, but their
//! internals stay separate: v1 is the [`FollowStateMachine`], v2 is the
//! pure [`step_auto_v2`] function driven by an [`AutoSession`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auto::step_auto_v2;
use crate::follow::{FollowStateMachine, MachineOptions, nearest_hole};
use crate::geo::{self, GeoPoint, Millis};
use crate::model::{
    AutoInput, AutoOptions, AutoSample, AutoState, FollowPhase, HoleRef, HoleTransition,
    TickInput, TransitionReason,
};
use crate::snapshot::HoleSnapshot;
use crate::storage::{HoleStore, round};
use crate::telemetry::TransitionSink;

/// Which algorithm drives the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Phase state machine keyed on green proximity.
    #[default]
    V1,

    /// Green dwell plus tee-box heading lock; can move backwards.
    V2,
}

/// One fix, with whatever motion data came with it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sample {
    pub position: Option<GeoPoint>,
    pub heading_deg: Option<f64>,
    pub speed_mps: Option<f64>,
    pub now: Millis,
}

/// What a step produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub hole_index: Option<usize>,
    pub transition: Option<HoleTransition>,
    pub auto_advanced: bool,
}

/// The active engine for a session.
pub enum Progression<S> {
    Follow(FollowStateMachine<S>),
    Auto(AutoSession<S>),
}

impl<S: HoleStore> Progression<S> {
    /// Starts a session for `kind`, resuming any saved hole.
    pub fn start(
        kind: EngineKind,
        options: MachineOptions,
        auto_options: AutoOptions,
        store: S,
    ) -> Self {
        match kind {
            EngineKind::V1 => Self::Follow(FollowStateMachine::new(options, store)),
            EngineKind::V2 => Self::Auto(AutoSession::new(options, auto_options, store)),
        }
    }

    pub fn kind(&self) -> EngineKind {
        match self {
            Self::Follow(_) => EngineKind::V1,
            Self::Auto(_) => EngineKind::V2,
        }
    }

    pub fn hole_index(&self) -> Option<usize> {
        match self {
            Self::Follow(m) => m.current().hole_index,
            Self::Auto(s) => s.index,
        }
    }

    pub fn hole(&self) -> Option<&HoleRef> {
        let holes = match self {
            Self::Follow(m) => m.holes(),
            Self::Auto(s) => s.holes.as_slice(),
        };
        self.hole_index().and_then(|i| holes.get(i))
    }

    /// v1 phase; v2 has no phases of its own.
    pub fn phase(&self) -> Option<FollowPhase> {
        match self {
            Self::Follow(m) => Some(m.current().phase),
            Self::Auto(_) => None,
        }
    }

    /// The single "auto-advance enabled" flag exposed to callers.
    pub fn auto_advance_enabled(&self) -> bool {
        match self {
            Self::Follow(m) => m.current().auto_advance_enabled,
            Self::Auto(s) => s.auto_advance_enabled,
        }
    }

    pub fn set_auto_advance(&mut self, enabled: bool) {
        match self {
            Self::Follow(m) => {
                m.set_auto_advance(enabled);
            }
            Self::Auto(s) => s.auto_advance_enabled = enabled,
        }
    }

    /// Last manual navigation time, if any.
    pub fn override_ts(&self) -> Option<Millis> {
        match self {
            Self::Follow(m) => m.current().override_ts,
            Self::Auto(s) => s.override_ts,
        }
    }

    /// Processes one fix. Emits at most one transition.
    pub fn step(&mut self, sample: &Sample, sink: &mut dyn TransitionSink) -> Progress {
        let from = self.hole_index();
        let (auto_advanced, reason) = match self {
            Self::Follow(m) => {
                let result = m.tick(TickInput {
                    position: sample.position,
                    heading_deg: sample.heading_deg,
                    speed_mps: sample.speed_mps,
                    now: sample.now,
                });
                let reason = if from.is_none() {
                    TransitionReason::Locate
                } else {
                    TransitionReason::LeaveGreen
                };
                (result.auto_advanced, reason)
            }
            Self::Auto(s) => match s.step(sample) {
                Some(TransitionReason::Locate) | None => (false, TransitionReason::Locate),
                Some(reason) => (true, reason),
            },
        };
        self.finish(from, reason, sample.now, auto_advanced, sink)
    }

    /// Moves to the next hole by hand.
    pub fn manual_next(&mut self, now: Millis, sink: &mut dyn TransitionSink) -> Progress {
        let from = self.hole_index();
        match self {
            Self::Follow(m) => {
                m.manual_next(now);
            }
            Self::Auto(s) => s.manual(from.map_or(Some(0), |i| i.checked_add(1)), now),
        }
        self.finish(from, TransitionReason::Manual, now, false, sink)
    }

    /// Moves to the previous hole by hand.
    pub fn manual_prev(&mut self, now: Millis, sink: &mut dyn TransitionSink) -> Progress {
        let from = self.hole_index();
        match self {
            Self::Follow(m) => {
                m.manual_prev(now);
            }
            Self::Auto(s) => s.manual(from.map_or(Some(0), |i| i.checked_sub(1)), now),
        }
        self.finish(from, TransitionReason::Manual, now, false, sink)
    }

    /// Distances to the active hole.
    pub fn snapshot(
        &mut self,
        position: &GeoPoint,
        heading_deg: Option<f64>,
        now: Millis,
    ) -> Option<HoleSnapshot> {
        match self {
            Self::Follow(m) => m.snapshot(position, heading_deg, now),
            Self::Auto(s) => {
                let hole = s.index.and_then(|i| s.holes.get(i))?;
                Some(HoleSnapshot::build(hole, position, heading_deg, now))
            }
        }
    }

    fn finish(
        &self,
        from: Option<usize>,
        reason: TransitionReason,
        now: Millis,
        auto_advanced: bool,
        sink: &mut dyn TransitionSink,
    ) -> Progress {
        let to = self.hole_index();
        let transition = match (to, self.hole()) {
            (Some(to_index), Some(hole)) if to != from => Some(HoleTransition {
                from_index: from,
                to_index,
                hole_id: hole.id.clone(),
                reason,
                at: now,
            }),
            _ => None,
        };
        if let Some(t) = &transition {
            sink.record(t);
        }
        Progress {
            hole_index: to,
            transition,
            auto_advanced,
        }
    }
}

/// Session state for the v2 engine: the catalogue position plus the
/// decision state carried between steps.
///
/// v2 hole ids are the holes' numbers.
pub struct AutoSession<S> {
    holes: Vec<HoleRef>,
    store: S,
    round_id: String,
    tolerance_m: f64,
    options: AutoOptions,
    index: Option<usize>,
    state: Option<AutoState>,
    auto_advance_enabled: bool,
    override_ts: Option<Millis>,
    last_fix: Option<GeoPoint>,
}

impl<S: HoleStore> AutoSession<S> {
    pub fn new(options: MachineOptions, auto_options: AutoOptions, store: S) -> Self {
        let tolerance_m = options.tolerance_m();
        let saved = round::load_hole_id(&store, &options.round_id)
            .and_then(|id| options.holes.iter().position(|h| h.id == id));

        let mut session = Self {
            holes: options.holes,
            store,
            round_id: options.round_id,
            tolerance_m,
            options: auto_options,
            index: None,
            state: None,
            auto_advance_enabled: options.auto_advance_enabled,
            override_ts: None,
            last_fix: None,
        };
        if let Some(index) = saved {
            debug!(round_id = %session.round_id, index, "resuming saved hole");
            session.reseed(index);
        }
        session
    }

    /// The decision state, once a hole is known.
    pub fn state(&self) -> Option<&AutoState> {
        self.state.as_ref()
    }

    /// Steps the engine and moves the index to the stable hole.
    /// Returns why the hole changed, if it did.
    fn step(&mut self, sample: &Sample) -> Option<TransitionReason> {
        let position = sample.position.filter(GeoPoint::is_valid)?;
        let fix = position.at(position.ts.unwrap_or(sample.now));
        let speed = sample
            .speed_mps
            .filter(|s| s.is_finite())
            .or_else(|| self.last_fix.map(|prev| geo::speed_from_trace(&[prev, fix])))
            .unwrap_or(0.0);
        self.last_fix = Some(fix);

        let Some(index) = self.index else {
            let index = nearest_hole(&self.holes, &position, self.tolerance_m)?;
            debug!(round_id = %self.round_id, index, "located hole");
            self.reseed(index);
            self.persist();
            return Some(TransitionReason::Locate);
        };
        if !self.auto_advance_enabled {
            return None;
        }
        let state = self.state?;

        let input = AutoInput {
            pos: AutoSample {
                lat: position.lat,
                lon: position.lon,
                ts: sample.now,
                speed_mps: speed,
                heading_deg: sample.heading_deg,
            },
            hole: self.holes[index].to_auto_hole(),
            next: self.holes.get(index + 1).map(HoleRef::to_neighbor),
            prev: index
                .checked_sub(1)
                .and_then(|i| self.holes.get(i))
                .map(HoleRef::to_neighbor),
        };
        let mut next = step_auto_v2(&state, &input, &self.options);
        self.state = Some(next);

        if next.stable_hole_id == input.hole.id {
            return None;
        }
        let target = self
            .holes
            .iter()
            .position(|h| i64::from(h.number) == next.stable_hole_id)?;
        debug!(round_id = %self.round_id, from = index, to = target, "stable hole changed");
        // Green timers belong to the hole being left.
        next.reached_green_at = None;
        next.left_green_at = None;
        self.state = Some(next);
        self.index = Some(target);
        self.persist();

        Some(if next.at_tee_box.is_some() {
            TransitionReason::TeeLock
        } else {
            TransitionReason::LeaveGreen
        })
    }

    fn manual(&mut self, target: Option<usize>, now: Millis) {
        let Some(target) = target.filter(|t| *t < self.holes.len()) else {
            return;
        };
        if self.index == Some(target) {
            return;
        }
        self.reseed(target);
        self.override_ts = Some(now);
        self.persist();
    }

    fn reseed(&mut self, index: usize) {
        self.index = Some(index);
        self.state = Some(AutoState::seeded(i64::from(self.holes[index].number)));
    }

    fn persist(&self) {
        if let Some(hole) = self.index.and_then(|i| self.holes.get(i)) {
            round::save_hole_id(&self.store, &self.round_id, &hole.id);
        }
    }
}
