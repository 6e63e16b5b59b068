// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration handling for gitxray

use crate::error::Result;
use gitxray_shared_context::ReportFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Main configuration structure. Command-line flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Show verbose-tier results
    #[serde(default)]
    pub verbose: bool,

    /// Show debug-tier results
    #[serde(default)]
    pub debug: bool,

    /// Report format
    #[serde(default)]
    pub format: ReportFormat,

    /// Keep only result lines containing one of these keywords
    #[serde(default)]
    pub filters: Vec<String>,

    /// Additional key IDs to treat as shared platform keys
    #[serde(default)]
    pub extra_platform_keys: Vec<String>,

    /// Append reports to this file instead of printing them
    #[serde(default)]
    pub output: Option<PathBuf>,
}

/// Load configuration from a TOML file, or defaults when it does not exist
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        debug!("Config file not found at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;

    debug!(?config, "Loaded configuration");
    Ok(config)
}

/// Get the default config path, relative to the working directory
pub fn default_config_path() -> PathBuf {
    PathBuf::from(".gitxray/config.toml")
}
