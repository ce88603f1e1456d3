// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{QrsweepError, Result};

/// Persistent decode settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Resolution (DPI) of the first rasterization attempt.
    pub default_resolution: u32,
    /// Resolution (DPI) of the filtered retry. Must exceed `default_resolution`.
    pub retry_resolution: u32,
    /// Blur footprint area calibrated for a 72 DPI raster (3x3 = 9.0).
    pub blur_base_area: f64,
    /// Ask the symbol decoder to try additional strategies before giving up.
    pub try_harder: bool,
    /// Location of the poppler `pdftoppm` binary.
    pub pdftoppm_path: PathBuf,
    /// When set, rasters of unreadable pages are written here for inspection.
    pub debug_dump_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_resolution: 72,
            retry_resolution: 200,
            blur_base_area: 9.0,
            try_harder: true,
            pdftoppm_path: PathBuf::from("pdftoppm"),
            debug_dump_dir: None,
        }
    }
}

impl AppConfig {
    /// Reject settings the page decoder cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.default_resolution == 0 {
            return Err(QrsweepError::InvalidConfig(
                "default resolution must be positive".into(),
            ));
        }
        if self.retry_resolution <= self.default_resolution {
            return Err(QrsweepError::InvalidConfig(format!(
                "retry resolution ({}) must be greater than default resolution ({})",
                self.retry_resolution, self.default_resolution
            )));
        }
        if self.blur_base_area.is_nan() || self.blur_base_area <= 0.0 {
            return Err(QrsweepError::InvalidConfig(format!(
                "blur base area must be positive, got {}",
                self.blur_base_area
            )));
        }
        Ok(())
    }
}
