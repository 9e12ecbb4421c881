//! Per-round persistence of the committed hole.
//!
//! Failures here never reach the caller: a round that cannot read its
//! saved hole simply starts unresolved, and a failed write only costs
//! cross-session resume.

use serde::{Deserialize, Serialize};

use super::{HoleStore, StorageError};

/// Prefix of every round key.
pub const ROUND_KEY_PREFIX: &str = "@follow/round:";

/// The key under which a round's hole is stored.
pub fn round_key(round_id: &str) -> String {
    format!("{ROUND_KEY_PREFIX}{round_id}")
}

#[derive(Serialize)]
struct SavedHole<'a> {
    id: &'a str,
}

/// Stored shapes accepted on read. Older writers stored a bare string.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredHole {
    Object { id: Option<String> },
    Bare(String),
}

/// Reads the hole id saved for `round_id`.
///
/// Returns `None` for an empty round id, a missing or malformed value, or
/// any store failure.
pub fn load_hole_id(store: &impl HoleStore, round_id: &str) -> Option<String> {
    if round_id.is_empty() {
        return None;
    }

    let raw = match store.get(&round_key(round_id)) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::debug!(round_id, error = %e, "could not read saved hole");
            return None;
        }
    };

    let id = match serde_json::from_str::<StoredHole>(&raw) {
        Ok(StoredHole::Object { id }) => id,
        Ok(StoredHole::Bare(id)) => Some(id),
        Err(e) => {
            tracing::debug!(round_id, error = %e, "ignoring malformed saved hole");
            None
        }
    };
    id.filter(|id| !id.is_empty())
}

/// Saves `hole_id` as the current hole of `round_id`. Best effort.
pub fn save_hole_id(store: &impl HoleStore, round_id: &str, hole_id: &str) {
    if round_id.is_empty() {
        return;
    }

    let result = serde_json::to_string(&SavedHole { id: hole_id })
        .map_err(StorageError::from)
        .and_then(|value| store.set(&round_key(round_id), &value));

    if let Err(e) = result {
        tracing::warn!(round_id, hole_id, error = %e, "could not save hole");
    }
}
