//! Hole transitions: the observable output of either engine.

use serde::{Deserialize, Serialize};

use crate::geo::Millis;

/// Why the active hole changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransitionReason {
    /// First confident hole of the session, picked by proximity.
    Locate,

    /// The player navigated by hand.
    Manual,

    /// Standing at, and facing down, another hole's tee.
    TeeLock,

    /// Sustained exit from the green after dwelling on it.
    LeaveGreen,
}

/// A single change of the active hole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoleTransition {
    pub from_index: Option<usize>,
    pub to_index: usize,
    pub hole_id: String,
    pub reason: TransitionReason,
    pub at: Millis,
}
