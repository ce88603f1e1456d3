// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Config file persistence: pretty-printed JSON, `config.json` in the data dir.

use std::path::{Path, PathBuf};

use qrsweep_core::AppConfig;
use qrsweep_core::error::Result;
use tracing::{debug, info, warn};

use super::data_dir;

const CONFIG_FILE: &str = "config.json";

pub fn default_config_path() -> PathBuf {
    data_dir::data_dir().join(CONFIG_FILE)
}

/// Load the configuration at `path`; a missing or malformed file yields defaults.
pub fn load_config(path: &Path) -> AppConfig {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "No config file, using defaults");
            return AppConfig::default();
        }
    };
    match serde_json::from_str(&data) {
        Ok(config) => config,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Ignoring malformed config file");
            AppConfig::default()
        }
    }
}

/// Write `config` to `path`, creating parent directories as needed.
pub fn persist_config(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    info!(path = %path.display(), "Configuration saved");
    Ok(())
}
