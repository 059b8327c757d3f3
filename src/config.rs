//! Tunables loaded from `~/.config/etho/config.toml`.
//!
//! Every section is optional; anything left out keeps its built-in default.
//!
//! ```toml
//! [fusion]
//! behavioral_window = 1.5
//!
//! [waveform]
//! total_bars = 200
//!
//! [sync]
//! narration_enabled = false
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::analyze::FusionConfig;
use crate::annotate::{ChartConfig, SyncConfig, WaveformConfig};

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EthoConfig {
    pub fusion: FusionConfig,
    pub chart: ChartConfig,
    pub waveform: WaveformConfig,
    pub sync: SyncConfig,
}

impl EthoConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid configuration TOML")
    }
}

/// Load configuration from `path`, or from the default location.
///
/// Returns defaults if the file doesn't exist (configuration is optional).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load(path: Option<&Path>) -> Result<EthoConfig> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(EthoConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let config: EthoConfig =
        toml::from_str(&content).with_context(|| format!("invalid TOML in {}", path.display()))?;

    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Return the path to the default config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("etho")
        .join("config.toml")
}
