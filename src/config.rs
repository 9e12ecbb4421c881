//! Fairway configuration.
//!
//! Loaded from `~/.fairway/config.toml`. Every key is optional; a missing
//! file means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::engine::EngineKind;
use crate::follow::LOCATE_TOLERANCE_M;
use crate::model::AutoOptions;
use crate::storage;

/// Fairway configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Which engine drives hole progression.
    pub engine: EngineKind,

    pub auto_advance: bool,

    /// Radius around a hole's middle within which it can be located.
    pub locate_tolerance_m: f64,

    /// Round state database. Defaults to `~/.fairway/follow.sqlite`.
    pub database: Option<PathBuf>,

    /// v2 engine thresholds.
    pub auto: AutoOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: EngineKind::default(),
            auto_advance: true,
            locate_tolerance_m: LOCATE_TOLERANCE_M,
            database: None,
            auto: AutoOptions::default(),
        }
    }
}

impl Config {
    /// Load config from `~/.fairway/config.toml`.
    /// Returns defaults if the file is missing, an error if it is invalid.
    pub fn load() -> Result<Self, String> {
        let path = Self::path().ok_or("could not determine home directory")?;
        Self::load_from(&path)
    }

    /// Load config from `path`, falling back to defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;

        toml::from_str(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// The config file path: `~/.fairway/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".fairway").join("config.toml"))
    }

    /// The database to open: the configured one, else the default location.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.database.clone().or_else(storage::default_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.engine, EngineKind::V1);
        assert!(config.auto_advance);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "engine = \"v2\"\n\
             auto-advance = false\n\
             database = \"/tmp/rounds.sqlite\"\n\
             \n\
             [auto]\n\
             tee-r = 15.0\n\
             heading-agree-deg = 20.0\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.engine, EngineKind::V2);
        assert!(!config.auto_advance);
        assert!((config.locate_tolerance_m - LOCATE_TOLERANCE_M).abs() < f64::EPSILON);
        assert_eq!(
            config.database_path(),
            Some(PathBuf::from("/tmp/rounds.sqlite"))
        );
        assert!((config.auto.tee_r - 15.0).abs() < f64::EPSILON);
        assert!((config.auto.heading_agree_deg - 20.0).abs() < f64::EPSILON);
        assert!((config.auto.min_leave_s - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_file_names_the_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "engine = \"v9\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.contains("invalid config at"));
        assert!(err.contains("config.toml"));
    }
}
