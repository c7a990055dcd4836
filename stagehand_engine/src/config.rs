//! Engine configuration loaded from `stagehand.toml`.
//!
//! Every field has a default, so a partial file only overrides what it names
//! and a missing or unreadable file falls back to the defaults entirely.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::verb::RetriggerPolicy;

pub const CONFIG_FILE: &str = "stagehand.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Seconds each character keeps a text on screen.
    pub time_per_char: f32,
    /// Shortest time any text stays on screen.
    pub min_duration: f32,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            time_per_char: 0.05,
            min_duration: 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// World definition file, relative to the data directory.
    pub world_file: String,
    /// Directory save slots are written to.
    pub save_dir: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            world_file: "world.ron".to_string(),
            save_dir: "saved_games".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub retrigger: RetriggerPolicy,
    /// Frame length used by the console's `tick` command.
    pub frame_dt: f32,
    pub text: TextConfig,
    pub data: DataConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retrigger: RetriggerPolicy::default(),
            frame_dt: 1.0 / 30.0,
            text: TextConfig::default(),
            data: DataConfig::default(),
        }
    }
}

/// Load the engine configuration, falling back to defaults when the file is
/// missing or malformed.
pub fn load_config(toml_path: &Path) -> EngineConfig {
    if !toml_path.exists() {
        info!("no config at '{}'; using defaults", toml_path.display());
        return EngineConfig::default();
    }
    match try_load_config(toml_path) {
        Ok(config) => {
            info!(
                "engine config loaded from '{}' (retrigger: {:?})",
                toml_path.display(),
                config.retrigger
            );
            config
        },
        Err(e) => {
            warn!(
                "Could not load engine config from '{}': {e:#}. Using defaults.",
                toml_path.display()
            );
            EngineConfig::default()
        },
    }
}

/// # Errors
/// Returns an error if the file cannot be read or parsed.
fn try_load_config(toml_path: &Path) -> Result<EngineConfig> {
    let raw =
        fs::read_to_string(toml_path).with_context(|| format!("reading engine config '{}'", toml_path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing engine config '{}'", toml_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().expect("tempdir");
        assert_eq!(load_config(&dir.path().join("nope.toml")), EngineConfig::default());
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "retrigger = [this is not toml").expect("write");
        assert_eq!(load_config(&path), EngineConfig::default());
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "retrigger = \"queue\"\n\n[text]\nmin_duration = 3.0\n").expect("write");
        let config = load_config(&path);
        assert_eq!(config.retrigger, RetriggerPolicy::Queue);
        assert!((config.text.min_duration - 3.0).abs() < f32::EPSILON);
        assert!((config.text.time_per_char - 0.05).abs() < f32::EPSILON);
        assert_eq!(config.data, DataConfig::default());
    }
}
