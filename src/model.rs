//! Core data model for Fairway.
//!
//! These types describe a round in progress: the hole catalogue, the
//! follow state owned by the v1 state machine, the decision state passed
//! through the v2 engine, and the hole transitions both of them produce.

mod auto;
mod follow;
mod hole;
mod transition;

pub use auto::{AutoHole, AutoInput, AutoOptions, AutoSample, AutoState, Green, NeighborHole, TeeLock};
pub use follow::{FollowPhase, FollowState, TickInput, TickResult};
pub use hole::{DEFAULT_GREEN_RADIUS_M, HoleRef};
pub use transition::{HoleTransition, TransitionReason};
