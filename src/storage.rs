//! Key-value persistence for resuming rounds across sessions.
//!
//! The engines only ever need `get` and `set` on string keys. Two stores
//! are provided:
//!
//! ```text
//! MemoryStore   # in-process, optionally failing; for tests and dry runs
//! SqliteStore   # <root>/follow.sqlite with a single `kv` table
//! ```
//!
//! Round-level helpers in [`round`] encode the hole id under
//! `@follow/round:<round id>` and swallow every store failure.

mod memory;
pub mod round;
mod sqlite;

use std::{io, path::PathBuf};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// A durable string key-value store.
pub trait HoleStore {
    /// Reads the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

impl<T: HoleStore + ?Sized> HoleStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// Returns the default database path: `~/.fairway/follow.sqlite`.
pub fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".fairway").join("follow.sqlite"))
}
