//! Configuration file support for PaceKit.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/pacekit/config.toml`.

use crate::compute::{PaceRange, ValidationMode, DEFAULT_MAX_PACE_SECONDS, DEFAULT_MIN_PACE_SECONDS};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub pace: PaceConfig,

    #[serde(default)]
    pub builder: BuilderConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Selectable pace range, in seconds per mile
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaceConfig {
    #[serde(default = "default_min_pace")]
    pub min_seconds: u32,

    #[serde(default = "default_max_pace")]
    pub max_seconds: u32,
}

impl Default for PaceConfig {
    fn default() -> Self {
        Self {
            min_seconds: default_min_pace(),
            max_seconds: default_max_pace(),
        }
    }
}

impl PaceConfig {
    pub fn range(&self) -> Result<PaceRange> {
        PaceRange::new(self.min_seconds, self.max_seconds)
    }
}

/// Builder session defaults and limits
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuilderConfig {
    #[serde(default)]
    pub validation_mode: ValidationMode,

    #[serde(default = "default_min_repeats")]
    pub min_repeats: u32,

    #[serde(default = "default_max_repeats")]
    pub max_repeats: u32,

    #[serde(default = "default_distance_miles")]
    pub default_distance_miles: f64,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            validation_mode: ValidationMode::default(),
            min_repeats: default_min_repeats(),
            max_repeats: default_max_repeats(),
            default_distance_miles: default_distance_miles(),
        }
    }
}

impl BuilderConfig {
    /// Clamp a requested repeat count into the configured range
    pub fn clamp_repeats(&self, repeats: u32) -> u32 {
        repeats.clamp(self.min_repeats, self.max_repeats)
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("pacekit")
}

fn default_min_pace() -> u32 {
    DEFAULT_MIN_PACE_SECONDS
}

fn default_max_pace() -> u32 {
    DEFAULT_MAX_PACE_SECONDS
}

fn default_min_repeats() -> u32 {
    1
}

fn default_max_repeats() -> u32 {
    10
}

fn default_distance_miles() -> f64 {
    1.0
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        self.pace
            .range()
            .map_err(|e| Error::Config(format!("[pace] {}", e)))?;
        if self.builder.min_repeats == 0 || self.builder.min_repeats > self.builder.max_repeats {
            return Err(Error::Config(format!(
                "[builder] repeat range {}..{} is invalid",
                self.builder.min_repeats, self.builder.max_repeats
            )));
        }
        let distance = self.builder.default_distance_miles;
        if !distance.is_finite() || distance < 0.0 {
            return Err(Error::Config(
                "[builder] default_distance_miles must be non-negative".into(),
            ));
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("pacekit").join("config.toml")
    }

    /// Path of the saved workout collection
    pub fn workouts_path(&self) -> PathBuf {
        self.data.data_dir.join("workouts.json")
    }

    /// Path of the scheduled plan log
    pub fn schedule_path(&self) -> PathBuf {
        self.data.data_dir.join("scheduled_plans.jsonl")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
