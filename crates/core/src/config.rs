//! Application configuration.
//!
//! Layered with the `config` crate: built-in defaults, then
//! `<config_dir>/arcade/config.toml`, then `ARCADE__SECTION__KEY`
//! environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::economy::EconomyTimings;

/// Directory under the user's config root.
pub const CONFIG_DIR: &str = "arcade";
/// File name of the user configuration.
pub const CONFIG_FILE: &str = "config.toml";

const DEFAULT_CONFIG: &str = r#"# Arcade catalogue configuration.

# Path or http(s) URL of the games document.
catalogue = "games.json"

[timings]
selection_cooldown_ms = 100
coin_nudge_delay_ms = 500
resize_debounce_ms = 150
button_pulse_ms = 150
credits_glow_ms = 300
frame_ms = 16

[economy]
starting_credits = 3
starts_powered = true

[layout]
visible_window = 5
min_card_stride = 12
"#;

/// Fixed durations of the cool-downs, debounces and pulses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimingConfig {
    pub selection_cooldown_ms: u64,
    pub coin_nudge_delay_ms: u64,
    pub resize_debounce_ms: u64,
    pub button_pulse_ms: u64,
    pub credits_glow_ms: u64,
    /// One display refresh; deferred work waits at least this long.
    pub frame_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            selection_cooldown_ms: 100,
            coin_nudge_delay_ms: 500,
            resize_debounce_ms: 150,
            button_pulse_ms: 150,
            credits_glow_ms: 300,
            frame_ms: 16,
        }
    }
}

impl TimingConfig {
    pub fn selection_cooldown(&self) -> Duration {
        Duration::from_millis(self.selection_cooldown_ms)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    pub fn button_pulse(&self) -> Duration {
        Duration::from_millis(self.button_pulse_ms)
    }

    pub fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }

    pub fn economy(&self) -> EconomyTimings {
        EconomyTimings {
            nudge_delay: Duration::from_millis(self.coin_nudge_delay_ms),
            credits_glow: Duration::from_millis(self.credits_glow_ms),
        }
    }
}

/// Initial cabinet state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EconomyConfig {
    pub starting_credits: u32,
    pub starts_powered: bool,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_credits: 3,
            starts_powered: true,
        }
    }
}

/// Renderer-facing layout parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LayoutConfig {
    /// Rows shown around the selection in the scroll view.
    pub visible_window: usize,
    /// Narrowest carousel stride, in cells.
    pub min_card_stride: u16,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            visible_window: 5,
            min_card_stride: 12,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Path or URL of the games document.
    pub catalogue: String,
    pub timings: TimingConfig,
    pub economy: EconomyConfig,
    pub layout: LayoutConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalogue: "games.json".to_string(),
            timings: TimingConfig::default(),
            economy: EconomyConfig::default(),
            layout: LayoutConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from the default location plus environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load from `path` (optional) plus environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("ARCADE").separator("__"))
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;
        let config: AppConfig = settings
            .try_deserialize()
            .context("failed to deserialize configuration")?;
        Ok(config)
    }
}

/// Default configuration file location.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(CONFIG_FILE)
}

/// Write the commented default configuration if none exists yet.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = config_path();
    write_default_config(&path)?;
    Ok(path)
}

fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config {}", path.display()))?;
    info!(path = %path.display(), "wrote default configuration");
    Ok(())
}
