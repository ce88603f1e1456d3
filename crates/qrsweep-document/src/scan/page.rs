// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-page decoding with one adaptive retry.
//
// 1. Rasterize at the default resolution and decode (try-harder).
// 2. On a miss, rasterize again at the retry resolution, box-blur with a
//    kernel scaled to the resolution ratio, and decode again.
// 3. If that misses too, the page is unreadable.
//
// Rasterization failures and decoder errors are logged and count as misses;
// nothing here aborts a document run.

use std::path::{Path, PathBuf};

use image::GrayImage;
use qrsweep_core::AppConfig;
use qrsweep_core::error::Result;
use qrsweep_core::types::{DecodeHints, DecodeOutcome, PageRef};
use tracing::{debug, instrument, warn};

use super::capabilities::{PageRasterizer, SymbolDecoder};
use crate::image::filter::BoxKernel;

/// Decodes single pages through a rasterizer and a symbol decoder.
pub struct PageDecoder<R, D> {
    rasterizer: R,
    decoder: D,
    default_resolution: u32,
    retry_resolution: u32,
    /// Blur kernel for the retry raster, fixed for this decoder's resolutions.
    kernel: BoxKernel,
    hints: DecodeHints,
    /// Where rasters of unreadable pages are written, if anywhere.
    dump_dir: Option<PathBuf>,
}

impl<R: PageRasterizer, D: SymbolDecoder> PageDecoder<R, D> {
    /// Build a decoder from validated configuration.
    pub fn new(rasterizer: R, decoder: D, config: &AppConfig) -> Result<Self> {
        config.validate()?;
        let kernel = BoxKernel::for_resolutions(
            config.default_resolution,
            config.retry_resolution,
            config.blur_base_area,
        );
        debug!(
            default_resolution = config.default_resolution,
            retry_resolution = config.retry_resolution,
            kernel = kernel.dimension(),
            "Page decoder configured"
        );
        Ok(Self {
            rasterizer,
            decoder,
            default_resolution: config.default_resolution,
            retry_resolution: config.retry_resolution,
            kernel,
            hints: DecodeHints {
                try_harder: config.try_harder,
            },
            dump_dir: config.debug_dump_dir.clone(),
        })
    }

    /// Decoder with the stock 72/200 DPI settings.
    pub fn with_defaults(rasterizer: R, decoder: D) -> Self {
        let config = AppConfig::default();
        Self {
            rasterizer,
            decoder,
            default_resolution: config.default_resolution,
            retry_resolution: config.retry_resolution,
            kernel: BoxKernel::for_resolutions(
                config.default_resolution,
                config.retry_resolution,
                config.blur_base_area,
            ),
            hints: DecodeHints {
                try_harder: config.try_harder,
            },
            dump_dir: None,
        }
    }

    pub fn kernel(&self) -> BoxKernel {
        self.kernel
    }

    pub fn resolutions(&self) -> (u32, u32) {
        (self.default_resolution, self.retry_resolution)
    }

    /// Decode one page. Rasters never outlive this call.
    #[instrument(skip(self), fields(page = page.number))]
    pub fn decode_page(&self, page: &PageRef) -> DecodeOutcome {
        let first = self.render(page, self.default_resolution);
        if let Some(text) = first.as_ref().and_then(|raster| self.attempt(page, raster)) {
            debug!(attempt = "default", "Page decoded");
            return DecodeOutcome::Decoded(text);
        }
        // Dumped now so the first raster is gone before the retry renders.
        let first_dump = match (&self.dump_dir, first) {
            (Some(dir), Some(raster)) => dump_raster(dir, &format!("page{}.png", page.number), &raster),
            _ => None,
        };

        let filtered = self
            .render(page, self.retry_resolution)
            .map(|raster| self.kernel.apply(&raster));
        if let Some(text) = filtered.as_ref().and_then(|raster| self.attempt(page, raster)) {
            debug!(attempt = "retry", kernel = self.kernel.dimension(), "Page decoded");
            if let Some(path) = first_dump {
                discard_dump(&path);
            }
            return DecodeOutcome::Decoded(text);
        }

        debug!("Page unreadable after retry");
        if let (Some(dir), Some(raster)) = (&self.dump_dir, &filtered) {
            dump_raster(dir, &format!("page{}_filter.png", page.number), raster);
        }
        DecodeOutcome::Unreadable
    }

    fn render(&self, page: &PageRef, resolution: u32) -> Option<GrayImage> {
        match self.rasterizer.render(page, resolution) {
            Ok(raster) => Some(raster),
            Err(err) => {
                warn!(page = page.number, resolution, error = %err, "Rasterization failed");
                None
            }
        }
    }

    fn attempt(&self, page: &PageRef, raster: &GrayImage) -> Option<String> {
        match self.decoder.decode(raster, self.hints) {
            Ok(found) => found,
            Err(err) => {
                warn!(page = page.number, error = %err, "Decoder error, treating as miss");
                None
            }
        }
    }
}

/// Write one raster into `dir` for later inspection; returns where it went.
fn dump_raster(dir: &Path, name: &str, raster: &GrayImage) -> Option<PathBuf> {
    if let Err(err) = std::fs::create_dir_all(dir) {
        warn!(dir = %dir.display(), error = %err, "Cannot create dump directory");
        return None;
    }
    let path = dir.join(name);
    match raster.save(&path) {
        Ok(()) => Some(path),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Cannot dump page raster");
            None
        }
    }
}

/// Remove the first-attempt dump of a page the retry decoded after all.
fn discard_dump(path: &Path) {
    if let Err(err) = std::fs::remove_file(path) {
        warn!(path = %path.display(), error = %err, "Cannot remove page dump");
    }
}
