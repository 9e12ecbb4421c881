//! Auto-advance v2: green dwell plus tee-box lock.
//!
//! [`step_auto_v2`] is a pure transition from one [`AutoState`] to the next.
//! Dwelling on the green and then leaving it signals forward progress;
//! standing on a neighbor's tee while facing its green confirms the move
//! and, for the previous hole, is the only way to go backwards.

use tracing::debug;

use crate::geo::{self, GeoPoint, Millis};
use crate::model::{AutoInput, AutoOptions, AutoState, NeighborHole, TeeLock};

const MIN_LEAVE_SPEED_MPS: f64 = 0.7;
const TEE_RELEASE_FACTOR: f64 = 1.6;
/// Falling back inside this share of the leave radius drops a leave candidate.
const LEAVE_RESET_FACTOR: f64 = 0.8;

/// A neighbor hole that has a tee to lock onto.
struct TeeCandidate {
    hole_id: i64,
    tee: GeoPoint,
    green_mid: Option<GeoPoint>,
}

impl TeeCandidate {
    fn from_neighbor(neighbor: Option<&NeighborHole>) -> Option<Self> {
        let neighbor = neighbor?;
        Some(Self {
            hole_id: neighbor.id,
            tee: neighbor.tee?,
            green_mid: neighbor.green.map(|g| g.mid),
        })
    }

    /// Whether a player at `position` facing `heading` is on this tee and
    /// looking down the hole.
    fn qualifies(&self, position: &GeoPoint, heading: Option<f64>, opts: &AutoOptions) -> bool {
        if geo::distance(position, &self.tee) > opts.tee_r {
            return false;
        }
        let (Some(heading), Some(green)) = (heading, self.green_mid) else {
            return false;
        };
        let tee_to_green = geo::bearing(&self.tee, &green);
        geo::short_arc_diff(heading, tee_to_green).abs() <= opts.heading_agree_deg
    }
}

fn ms_from_secs(seconds: f64) -> Millis {
    // Thresholds are sanitized to small positive values before this.
    #[allow(clippy::cast_possible_truncation)]
    let ms = (seconds * 1000.0).floor() as Millis;
    ms.max(0)
}

/// Advances the v2 decision state by one sample.
///
/// Invalid thresholds in `opts` fall back to their defaults. A sample
/// whose coordinates are not finite leaves the state untouched.
pub fn step_auto_v2(state: &AutoState, input: &AutoInput, opts: &AutoOptions) -> AutoState {
    let opts = opts.sanitized();
    let position = input.pos.point();
    if !position.is_valid() {
        return *state;
    }

    let now = input.pos.ts;
    let speed = if input.pos.speed_mps.is_finite() {
        input.pos.speed_mps.max(0.0)
    } else {
        0.0
    };
    let heading = input
        .pos
        .heading_deg
        .filter(|h| h.is_finite())
        .map(geo::normalize_deg);
    let current_id = input.hole.id;

    let mut next = *state;
    let green_m = geo::distance(&position, &input.hole.green.mid);
    let min_enter_ms = ms_from_secs(opts.min_enter_s);
    let min_leave_ms = ms_from_secs(opts.min_leave_s);

    // Green dwell, latched to the earliest entry.
    if green_m <= opts.green_enter_r {
        if next.reached_green_at.is_none_or(|t| now < t) {
            next.reached_green_at = Some(now);
        }
        next.left_green_at = None;
    } else if next.reached_green_at.is_some_and(|t| now - t < min_enter_ms) {
        next.reached_green_at = None;
    }

    let entered = next.reached_green_at.is_some_and(|t| now - t >= min_enter_ms);

    // Leave candidate, only once the green was really entered.
    if entered && speed >= MIN_LEAVE_SPEED_MPS && green_m >= opts.green_leave_r {
        if next.left_green_at.is_none_or(|t| now < t) {
            next.left_green_at = Some(now);
        }
    } else if !entered || green_m <= opts.green_leave_r * LEAVE_RESET_FACTOR {
        next.left_green_at = None;
    }

    let left_confirmed = entered && next.left_green_at.is_some_and(|t| now - t >= min_leave_ms);

    // Tee lock: next hole first, then previous.
    let candidates: Vec<TeeCandidate> = [input.next.as_ref(), input.prev.as_ref()]
        .into_iter()
        .filter_map(TeeCandidate::from_neighbor)
        .collect();
    let lock = candidates
        .iter()
        .find(|c| c.qualifies(&position, heading, &opts));

    if let Some(lock) = lock {
        if state.at_tee_box.is_none_or(|held| held.hole_id != lock.hole_id) {
            debug!(hole_id = lock.hole_id, "tee lock");
        }
        next.stable_hole_id = lock.hole_id;
        next.at_tee_box = Some(TeeLock {
            hole_id: lock.hole_id,
            ts: now,
        });
    } else if let Some(held) = next.at_tee_box {
        let release_r = opts.tee_r * TEE_RELEASE_FACTOR;
        match candidates.iter().find(|c| c.hole_id == held.hole_id) {
            Some(locked) if geo::distance(&position, &locked.tee) <= release_r => {
                next.stable_hole_id = locked.hole_id;
            }
            _ => {
                debug!(hole_id = held.hole_id, "tee lock released");
                next.at_tee_box = None;
            }
        }
    }

    let previous_stable = state.stable_hole_id;
    let next_id = input.next.map(|n| n.id);
    let prev_id = input.prev.map(|p| p.id);
    let tee_locked = next
        .at_tee_box
        .is_some_and(|held| held.hole_id == next.stable_hole_id);

    if !tee_locked {
        if let Some(next_id) = next_id.filter(|_| left_confirmed && previous_stable == current_id) {
            debug!(from = current_id, to = next_id, "left the green");
            next.stable_hole_id = next_id;
            next.reached_green_at = None;
            next.left_green_at = None;
        } else if ![Some(current_id), next_id, prev_id].contains(&Some(next.stable_hole_id)) {
            // Neighbors no longer include the held hole: trust the caller.
            next.stable_hole_id = current_id;
        }
    }

    if next.stable_hole_id != previous_stable && !tee_locked {
        next.at_tee_box = None;
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::geo::EARTH_RADIUS_M;
    use crate::model::{AutoHole, AutoSample, Green};

    fn opts() -> AutoOptions {
        AutoOptions {
            min_leave_s: 10.0,
            heading_agree_deg: 25.0,
            ..AutoOptions::default()
        }
    }

    fn green(lat: f64, lon: f64) -> Green {
        Green {
            mid: GeoPoint::new(lat, lon),
            radius_m: 12.0,
        }
    }

    fn hole1() -> AutoHole {
        AutoHole {
            id: 1,
            par: 3,
            green: green(0.0, 0.0),
            tee: Some(GeoPoint::new(-0.0009, 0.0)),
        }
    }

    fn hole2() -> NeighborHole {
        NeighborHole {
            id: 2,
            tee: Some(GeoPoint::new(0.0008, 0.0)),
            green: Some(green(0.001, 0.0)),
        }
    }

    fn hole18() -> NeighborHole {
        NeighborHole {
            id: 18,
            tee: Some(GeoPoint::new(-0.001, 0.0004)),
            green: Some(green(-0.0012, 0.0006)),
        }
    }

    fn sample(lat: f64, lon: f64, ts: Millis, speed_mps: f64, heading_deg: Option<f64>) -> AutoSample {
        AutoSample {
            lat,
            lon,
            ts,
            speed_mps,
            heading_deg,
        }
    }

    fn input(pos: AutoSample) -> AutoInput {
        AutoInput {
            pos,
            hole: hole1(),
            next: Some(hole2()),
            prev: None,
        }
    }

    fn tee_heading(neighbor: &NeighborHole) -> f64 {
        geo::bearing(&neighbor.tee.unwrap(), &neighbor.green.unwrap().mid)
    }

    #[test]
    fn advances_after_sustained_dwell_and_exit() {
        let mut state = AutoState::seeded(1);

        state = step_auto_v2(&state, &input(sample(0.00001, 0.00001, 1_000, 0.2, None)), &opts());
        assert_eq!(state.reached_green_at, Some(1_000));
        assert_eq!(state.stable_hole_id, 1);

        state = step_auto_v2(&state, &input(sample(0.00001, 0.00001, 3_000, 0.2, None)), &opts());
        state = step_auto_v2(&state, &input(sample(0.00001, 0.00001, 4_500, 0.2, None)), &opts());
        assert_eq!(state.reached_green_at, Some(1_000));

        state = step_auto_v2(&state, &input(sample(0.0006, 0.0002, 12_000, 1.3, None)), &opts());
        assert_eq!(state.left_green_at, Some(12_000));
        assert_eq!(state.stable_hole_id, 1);

        state = step_auto_v2(&state, &input(sample(0.0006, 0.0002, 23_000, 1.3, None)), &opts());
        assert_eq!(state.stable_hole_id, 2);
        assert_eq!(state.reached_green_at, None);
        assert_eq!(state.left_green_at, None);
        assert_eq!(state.at_tee_box, None);
    }

    #[test]
    fn ignores_brief_walk_by() {
        let mut state = AutoState::seeded(1);

        state = step_auto_v2(&state, &input(sample(0.00002, 0.00002, 1_000, 1.1, None)), &opts());
        assert_eq!(state.reached_green_at, Some(1_000));

        state = step_auto_v2(&state, &input(sample(0.00002, 0.00002, 2_500, 1.1, None)), &opts());
        assert_eq!(state.reached_green_at, Some(1_000));

        state = step_auto_v2(&state, &input(sample(0.0005, -0.0002, 2_800, 1.1, None)), &opts());
        assert_eq!(state.reached_green_at, None);

        state = step_auto_v2(&state, &input(sample(0.0006, -0.0003, 12_000, 1.2, None)), &opts());
        state = step_auto_v2(&state, &input(sample(0.0006, -0.0003, 22_000, 1.2, None)), &opts());
        assert_eq!(state.stable_hole_id, 1);
        assert_eq!(state.left_green_at, None);
    }

    #[test]
    fn leave_candidate_drops_when_back_near_green() {
        let mut state = AutoState::seeded(1);
        state = step_auto_v2(&state, &input(sample(0.0, 0.0, 0, 0.0, None)), &opts());
        state = step_auto_v2(&state, &input(sample(0.0, 0.0, 5_000, 0.0, None)), &opts());
        state = step_auto_v2(&state, &input(sample(0.0005, 0.0, 6_000, 1.0, None)), &opts());
        assert_eq!(state.left_green_at, Some(6_000));

        // ~30 m: inside 80% of the leave radius, outside the enter radius.
        let back = (30.0 / EARTH_RADIUS_M).to_degrees();
        state = step_auto_v2(&state, &input(sample(back, 0.0, 8_000, 1.0, None)), &opts());
        assert_eq!(state.left_green_at, None);
        assert_eq!(state.reached_green_at, Some(0));
    }

    #[test]
    fn locks_to_next_tee_when_facing_its_green() {
        let next = hole2();
        let tee = next.tee.unwrap();
        let heading = tee_heading(&next);

        let state = step_auto_v2(
            &AutoState::seeded(1),
            &input(sample(tee.lat + 0.00005, tee.lon, 60_000, 0.4, Some(heading))),
            &opts(),
        );

        assert_eq!(state.stable_hole_id, 2);
        assert_eq!(state.at_tee_box, Some(TeeLock { hole_id: 2, ts: 60_000 }));
    }

    #[test]
    fn does_not_lock_when_facing_away() {
        let next = hole2();
        let tee = next.tee.unwrap();
        let heading = geo::normalize_deg(tee_heading(&next) + 180.0);

        let state = step_auto_v2(
            &AutoState::seeded(1),
            &input(sample(tee.lat + 0.00005, tee.lon, 60_000, 0.4, Some(heading))),
            &opts(),
        );

        assert_eq!(state.stable_hole_id, 1);
        assert_eq!(state.at_tee_box, None);
    }

    #[test]
    fn does_not_lock_without_heading() {
        let tee = hole2().tee.unwrap();
        let state = step_auto_v2(
            &AutoState::seeded(1),
            &input(sample(tee.lat, tee.lon, 60_000, 0.4, None)),
            &opts(),
        );
        assert_eq!(state.at_tee_box, None);
        assert_eq!(state.stable_hole_id, 1);
    }

    #[test]
    fn heading_tolerance_wraps_across_north() {
        // hole2's tee faces due north; 350° is 10° off.
        let tee = hole2().tee.unwrap();
        let state = step_auto_v2(
            &AutoState::seeded(1),
            &input(sample(tee.lat, tee.lon, 1_000, 0.0, Some(350.0))),
            &opts(),
        );
        assert_eq!(state.stable_hole_id, 2);
    }

    #[test]
    fn locks_to_previous_tee_when_backtracking() {
        let prev = hole18();
        let tee = prev.tee.unwrap();
        let heading = tee_heading(&prev);

        let state = step_auto_v2(
            &AutoState::seeded(2),
            &AutoInput {
                pos: sample(tee.lat + 0.00005, tee.lon + 0.00002, 90_000, 0.5, Some(heading)),
                hole: hole1(),
                next: Some(hole2()),
                prev: Some(prev),
            },
            &opts(),
        );

        assert_eq!(state.stable_hole_id, 18);
        assert_eq!(state.at_tee_box, Some(TeeLock { hole_id: 18, ts: 90_000 }));
    }

    #[test]
    fn holds_tee_lock_until_release_radius() {
        let next = hole2();
        let tee = next.tee.unwrap();
        let heading = tee_heading(&next);
        let north = |meters: f64| tee.lat + (meters / EARTH_RADIUS_M).to_degrees();

        let mut state = step_auto_v2(
            &AutoState::seeded(1),
            &input(sample(tee.lat, tee.lon, 100_000, 0.4, Some(heading))),
            &opts(),
        );
        assert_eq!(state.at_tee_box, Some(TeeLock { hole_id: 2, ts: 100_000 }));

        // Outside the tee radius but inside 1.6x: lock is held as it was.
        state = step_auto_v2(
            &state,
            &input(sample(north(30.0), tee.lon, 102_000, 0.3, Some(heading))),
            &opts(),
        );
        assert_eq!(state.stable_hole_id, 2);
        assert_eq!(state.at_tee_box, Some(TeeLock { hole_id: 2, ts: 100_000 }));

        // Just past 1.6x the tee radius: released, stable hole kept.
        state = step_auto_v2(
            &state,
            &input(sample(north(20.0 * 1.6 + 0.5), tee.lon, 104_000, 1.1, Some(heading))),
            &opts(),
        );
        assert_eq!(state.at_tee_box, None);
        assert_eq!(state.stable_hole_id, 2);
    }

    #[test]
    fn releases_lock_when_neighbor_disappears() {
        let locked = AutoState {
            at_tee_box: Some(TeeLock { hole_id: 2, ts: 0 }),
            ..AutoState::seeded(2)
        };
        let state = step_auto_v2(
            &locked,
            &AutoInput {
                pos: sample(0.0008, 0.0, 1_000, 0.0, None),
                hole: hole1(),
                next: None,
                prev: None,
            },
            &opts(),
        );

        assert_eq!(state.at_tee_box, None);
        assert_eq!(state.stable_hole_id, 1);
    }

    #[test]
    fn snaps_back_when_stable_hole_not_offered() {
        let state = step_auto_v2(
            &AutoState::seeded(7),
            &input(sample(0.0003, 0.0, 1_000, 0.0, None)),
            &opts(),
        );
        assert_eq!(state.stable_hole_id, 1);
    }

    #[test]
    fn no_advance_from_stale_stable_hole() {
        // Already advanced to 2, but the caller still reports hole 1.
        let mut state = AutoState::seeded(2);
        state = step_auto_v2(&state, &input(sample(0.0, 0.0, 0, 0.0, None)), &opts());
        state = step_auto_v2(&state, &input(sample(0.0, 0.0, 5_000, 0.0, None)), &opts());
        state = step_auto_v2(&state, &input(sample(0.0006, 0.0002, 6_000, 1.0, None)), &opts());
        state = step_auto_v2(&state, &input(sample(0.0006, 0.0002, 20_000, 1.0, None)), &opts());

        assert_eq!(state.stable_hole_id, 2);
        assert_eq!(state.left_green_at, Some(6_000));
    }

    #[test]
    fn invalid_position_leaves_state_untouched() {
        let start = AutoState {
            reached_green_at: Some(10),
            ..AutoState::seeded(1)
        };
        let state = step_auto_v2(&start, &input(sample(f64::NAN, 0.0, 1_000, 1.0, None)), &opts());
        assert_eq!(state, start);
    }

    #[test]
    fn bad_options_fall_back_to_defaults() {
        let bad = AutoOptions {
            tee_r: -5.0,
            heading_agree_deg: f64::NAN,
            ..AutoOptions::default()
        };
        let tee = hole2().tee.unwrap();
        let state = step_auto_v2(
            &AutoState::seeded(1),
            &input(sample(tee.lat, tee.lon, 1_000, 0.0, Some(10.0))),
            &bad,
        );
        assert_eq!(state.stable_hole_id, 2);
    }
}
