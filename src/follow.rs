//! Follow state machine: which hole the player is on, advanced by green
//! proximity.
//!
//! ```text
//! Locate ──nearest hole within tolerance──▶ Follow
//! Follow ──entered green, then left it (≥ 40 m, ≥ 0.7 m/s, ≥ 15 s)──▶ Advance
//! Advance ──auto-advance on──▶ Follow (next hole)
//! Advance ──back near the green──▶ Follow (same hole)
//! ```
//!
//! Time only moves through the `now` passed to each call, so a recorded
//! sequence of ticks always replays to the same states.

use tracing::debug;

use crate::geo::{self, GeoPoint, Millis};
use crate::model::{FollowPhase, FollowState, HoleRef, TickInput, TickResult};
use crate::snapshot::HoleSnapshot;
use crate::storage::{HoleStore, round};

/// Default radius around a hole's middle for the first hole to be trusted.
pub const LOCATE_TOLERANCE_M: f64 = 120.0;

const ENTER_GREEN_M: f64 = 25.0;
const LEAVE_GREEN_M: f64 = 40.0;
const LEAVE_DELAY_MS: Millis = 15_000;
const LEAVE_MIN_SPEED_MPS: f64 = 0.7;

/// Construction parameters for a [`FollowStateMachine`].
#[derive(Debug, Clone)]
pub struct MachineOptions {
    pub round_id: String,
    pub holes: Vec<HoleRef>,
    pub auto_advance_enabled: bool,
    pub locate_tolerance_m: f64,
}

impl MachineOptions {
    pub fn new(round_id: impl Into<String>, holes: Vec<HoleRef>) -> Self {
        Self {
            round_id: round_id.into(),
            holes,
            auto_advance_enabled: true,
            locate_tolerance_m: LOCATE_TOLERANCE_M,
        }
    }

    /// The locate tolerance, or the default when it is not a positive number.
    pub fn tolerance_m(&self) -> f64 {
        Some(self.locate_tolerance_m)
            .filter(|t| t.is_finite() && *t > 0.0)
            .unwrap_or(LOCATE_TOLERANCE_M)
    }
}

/// Index of the hole whose middle is closest to `position`, if within
/// `tolerance_m`.
pub(crate) fn nearest_hole(
    holes: &[HoleRef],
    position: &GeoPoint,
    tolerance_m: f64,
) -> Option<usize> {
    let (index, distance) = holes
        .iter()
        .map(|h| geo::distance(position, &h.middle))
        .enumerate()
        .min_by(|(_, a), (_, b)| a.total_cmp(b))?;
    (distance <= tolerance_m).then_some(index)
}

/// Tracks the hole being played for one round.
///
/// Owns its [`FollowState`] exclusively; callers see copies.
pub struct FollowStateMachine<S> {
    holes: Vec<HoleRef>,
    store: S,
    tolerance_m: f64,
    state: FollowState,
}

impl<S: HoleStore> FollowStateMachine<S> {
    /// Creates a machine, resuming from the hole saved for the round.
    ///
    /// Starts in `Follow` on the saved hole when it is still part of the
    /// catalogue, otherwise in `Locate`.
    pub fn new(options: MachineOptions, store: S) -> Self {
        let tolerance_m = options.tolerance_m();
        let mut state = FollowState::new(options.round_id);
        state.auto_advance_enabled = options.auto_advance_enabled;

        let saved = round::load_hole_id(&store, &state.round_id)
            .and_then(|id| options.holes.iter().position(|h| h.id == id));
        if let Some(index) = saved {
            debug!(round_id = %state.round_id, index, "resuming saved hole");
            state.hole_index = Some(index);
            state.hole = Some(options.holes[index].clone());
            state.phase = FollowPhase::Follow;
        }

        Self {
            holes: options.holes,
            store,
            tolerance_m,
            state,
        }
    }

    /// A copy of the current state.
    pub fn state(&self) -> FollowState {
        self.state.clone()
    }

    /// The current state, borrowed.
    pub fn current(&self) -> &FollowState {
        &self.state
    }

    pub fn holes(&self) -> &[HoleRef] {
        &self.holes
    }

    /// Feeds one sample through the machine.
    pub fn tick(&mut self, input: TickInput) -> TickResult {
        let now = input.now;
        let speed = input.speed_mps.filter(|s| s.is_finite()).unwrap_or(0.0);
        if let Some(heading) = input.heading_deg.filter(|h| h.is_finite()) {
            self.state.last_heading_deg = Some(heading);
        }
        self.state.last_update_ts = now;

        if let Some(position) = input.position.filter(GeoPoint::is_valid) {
            if self.state.phase == FollowPhase::Locate || self.state.hole_index.is_none() {
                self.locate(&position, now);
            }
            if let Some(hole) = &self.state.hole {
                let middle_m = geo::distance(&position, &hole.middle);
                self.track_green(middle_m, speed, now);
            }
        }

        let mut auto_advanced = false;
        if self.state.phase == FollowPhase::Advance && self.state.auto_advance_enabled {
            auto_advanced = self.advance(now);
        }

        TickResult {
            state: self.state(),
            auto_advanced,
        }
    }

    /// Moves to the next hole by hand. No-op at the last hole.
    pub fn manual_next(&mut self, now: Millis) -> FollowState {
        let target = self.state.hole_index.map_or(0, |i| i + 1);
        self.apply_manual(target, now)
    }

    /// Moves to the previous hole by hand. No-op at the first hole.
    pub fn manual_prev(&mut self, now: Millis) -> FollowState {
        match self.state.hole_index {
            Some(i) if i > 0 => self.apply_manual(i - 1, now),
            Some(_) => self.state(),
            None => self.apply_manual(0, now),
        }
    }

    /// Turns automatic advancing on or off. Never moves the hole by itself.
    pub fn set_auto_advance(&mut self, enabled: bool) -> FollowState {
        self.state.auto_advance_enabled = enabled;
        self.state()
    }

    /// Distances from `position` to the committed hole, recording when the
    /// snapshot was taken. `None` until a hole is committed.
    pub fn snapshot(
        &mut self,
        position: &GeoPoint,
        heading_deg: Option<f64>,
        now: Millis,
    ) -> Option<HoleSnapshot> {
        let hole = self.state.hole.as_ref()?;
        let snapshot = HoleSnapshot::build(hole, position, heading_deg, now);
        self.state.last_snapshot_ts = Some(now);
        Some(snapshot)
    }

    fn locate(&mut self, position: &GeoPoint, now: Millis) {
        let Some(index) = nearest_hole(&self.holes, position, self.tolerance_m) else {
            return;
        };
        if self.state.hole_index == Some(index) {
            self.state.phase = FollowPhase::Follow;
            self.state.hole = Some(self.holes[index].clone());
            return;
        }
        debug!(round_id = %self.state.round_id, index, "located hole");
        self.apply_hole_index(index, now, false);
        self.persist();
    }

    fn track_green(&mut self, middle_m: f64, speed: f64, now: Millis) {
        let state = &mut self.state;
        if middle_m <= ENTER_GREEN_M {
            state.enter_green_at.get_or_insert(now);
            state.leave_candidate_at = None;
            if state.phase == FollowPhase::Advance {
                debug!("back on the green, cancelling advance");
                state.phase = FollowPhase::Follow;
            }
        } else if middle_m >= LEAVE_GREEN_M && speed >= LEAVE_MIN_SPEED_MPS {
            let leaving_since = *state.leave_candidate_at.get_or_insert(now);
            let sustained = state
                .enter_green_at
                .is_some_and(|entered| now - leaving_since >= LEAVE_DELAY_MS && now >= entered);
            if sustained && state.phase != FollowPhase::Advance {
                debug!(hole_index = ?state.hole_index, "left the green");
                state.phase = FollowPhase::Advance;
            }
        } else {
            state.leave_candidate_at = None;
            if state.phase == FollowPhase::Advance {
                state.phase = FollowPhase::Follow;
            }
        }
    }

    /// Moves to the next hole. Returns `false`, changing nothing, when
    /// already on the last hole.
    fn advance(&mut self, now: Millis) -> bool {
        let Some(target) = self.state.hole_index.map(|i| i + 1) else {
            return false;
        };
        if target >= self.holes.len() {
            return false;
        }
        debug!(round_id = %self.state.round_id, target, "auto-advancing");
        self.apply_hole_index(target, now, false);
        self.persist();
        true
    }

    fn apply_manual(&mut self, target: usize, now: Millis) -> FollowState {
        if target >= self.holes.len() || self.state.hole_index == Some(target) {
            return self.state();
        }
        debug!(round_id = %self.state.round_id, target, "manual navigation");
        self.apply_hole_index(target, now, true);
        self.persist();
        self.state()
    }

    fn apply_hole_index(&mut self, index: usize, now: Millis, manual: bool) {
        let state = &mut self.state;
        state.hole_index = Some(index);
        state.hole = Some(self.holes[index].clone());
        state.phase = FollowPhase::Follow;
        state.enter_green_at = None;
        state.leave_candidate_at = None;
        state.last_update_ts = now;
        state.override_ts = manual.then_some(now);
    }

    fn persist(&self) {
        if let Some(hole) = &self.state.hole {
            round::save_hole_id(&self.store, &self.state.round_id, &hole.id);
        }
    }
}
