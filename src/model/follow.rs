//! Follow state: what the v1 state machine knows about the round.

use serde::{Deserialize, Serialize};

use crate::geo::{GeoPoint, Millis};

use super::HoleRef;

/// Where the player is in the cycle of playing a hole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FollowPhase {
    /// No hole committed yet.
    Locate,

    /// Playing the committed hole.
    Follow,

    /// The green was entered and then left for a sustained period.
    Advance,
}

/// Mutable state owned by one `FollowStateMachine`.
///
/// `enter_green_at` and `leave_candidate_at` describe the current approach
/// to the green and are cleared whenever the hole changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowState {
    pub phase: FollowPhase,
    pub hole: Option<HoleRef>,
    pub round_id: String,

    /// Index into the hole catalogue; `None` while unresolved.
    pub hole_index: Option<usize>,

    pub auto_advance_enabled: bool,
    pub enter_green_at: Option<Millis>,
    pub leave_candidate_at: Option<Millis>,

    /// Set only by manual navigation.
    pub override_ts: Option<Millis>,

    pub last_update_ts: Millis,
    pub last_heading_deg: Option<f64>,
    pub last_snapshot_ts: Option<Millis>,
}

impl FollowState {
    pub(crate) fn new(round_id: impl Into<String>) -> Self {
        Self {
            phase: FollowPhase::Locate,
            hole: None,
            round_id: round_id.into(),
            hole_index: None,
            auto_advance_enabled: true,
            enter_green_at: None,
            leave_candidate_at: None,
            override_ts: None,
            last_update_ts: 0,
            last_heading_deg: None,
            last_snapshot_ts: None,
        }
    }
}

/// One sample fed to `FollowStateMachine::tick`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub position: Option<GeoPoint>,
    pub heading_deg: Option<f64>,
    pub speed_mps: Option<f64>,
    pub now: Millis,
}

/// Outcome of a tick: a snapshot of the state and whether it auto-advanced.
#[derive(Debug, Clone, PartialEq)]
pub struct TickResult {
    pub state: FollowState,
    pub auto_advanced: bool,
}
