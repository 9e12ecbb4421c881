//! Fairway: follow the hole a golfer is playing from GPS fixes.
//!
//! Two engines decide when the active hole changes. The v1
//! [`follow::FollowStateMachine`] advances after a sustained exit from the
//! green; the v2 [`auto::step_auto_v2`] adds tee-box heading locks that can
//! also move backwards. [`engine::Progression`] wraps either behind one
//! interface.

pub mod auto;
pub mod cadence;
pub mod config;
pub mod engine;
pub mod follow;
pub mod geo;
pub mod model;
pub mod snapshot;
pub mod storage;
pub mod telemetry;
pub mod trace;
