// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page rasterization through poppler's `pdftoppm`.
//
// Each call renders exactly one page, in grayscale, at the requested DPI into
// a private temporary directory, then loads the PNG back as 8-bit luma.

use std::path::{Path, PathBuf};
use std::process::Command;

use image::GrayImage;
use qrsweep_core::error::{QrsweepError, Result};
use qrsweep_core::types::PageRef;
use tempfile::TempDir;
use tracing::{debug, instrument};

use super::capabilities::PageRasterizer;

const PDFTOPPM: &str = "pdftoppm";
const OUTPUT_STEM: &str = "page";

/// [`PageRasterizer`] backed by the `pdftoppm` command-line tool.
#[derive(Debug, Clone)]
pub struct PopplerRasterizer {
    binary: PathBuf,
}

impl Default for PopplerRasterizer {
    fn default() -> Self {
        Self::new(PDFTOPPM)
    }
}

impl PopplerRasterizer {
    /// Use the `pdftoppm` binary at `binary` (a bare name is looked up on `PATH`).
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Whether the configured binary can be started at all.
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("-v")
            .output()
            .is_ok()
    }
}

impl PageRasterizer for PopplerRasterizer {
    #[instrument(skip(self, page), fields(page = page.number))]
    fn render(&self, page: &PageRef, resolution: u32) -> Result<GrayImage> {
        let temp_dir = TempDir::new()?;
        let output_prefix = temp_dir.path().join(OUTPUT_STEM);
        let page_str = page.number.to_string();
        let resolution_str = resolution.to_string();

        let output = Command::new(&self.binary)
            .args(["-gray", "-png", "-singlefile"])
            .args(["-r", &resolution_str])
            .args(["-f", &page_str, "-l", &page_str])
            .arg(page.document.as_ref())
            .arg(&output_prefix)
            .output();

        match output {
            Ok(out) if out.status.success() => {}
            Ok(out) => {
                let stderr = String::from_utf8_lossy(&out.stderr);
                return Err(QrsweepError::RasterizationFailed {
                    page: page.number,
                    reason: format!("{} exited with {}: {}", PDFTOPPM, out.status, stderr.trim()),
                });
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(QrsweepError::ToolNotFound(format!(
                    "{} (install poppler-utils)",
                    self.binary.display()
                )));
            }
            Err(err) => return Err(QrsweepError::Io(err)),
        }

        let image_path = output_prefix.with_extension("png");
        let raster = image::open(&image_path)
            .map_err(|err| QrsweepError::RasterizationFailed {
                page: page.number,
                reason: format!("cannot load {}: {}", image_path.display(), err),
            })?
            .into_luma8();

        debug!(
            width = raster.width(),
            height = raster.height(),
            "Page rasterized"
        );
        Ok(raster)
    }
}
