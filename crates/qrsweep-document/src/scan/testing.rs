// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory rasterizer and decoder fakes for the scan tests.

use std::path::Path;
use std::sync::{Arc, Mutex};

use image::{GrayImage, Luma};
use qrsweep_core::error::{QrsweepError, Result};
use qrsweep_core::types::{DecodeHints, PageRef};

use super::capabilities::{PageRasterizer, PageSource, SymbolDecoder};

type RenderFn = dyn Fn(u32, u32) -> Result<GrayImage> + Send + Sync;
type DecodeFn = dyn Fn(&GrayImage) -> Result<Option<String>> + Send + Sync;

pub(crate) fn page_ref(number: u32) -> PageRef {
    PageRef::new(Arc::from(Path::new("fixture.pdf")), number)
}

/// Quiet-zone width around a generated symbol, in modules.
const QUIET_ZONE: u32 = 4;

/// Render `text` as a QR symbol, `module` pixels per module, black on white
/// (or white on black when `inverted`).
pub(crate) fn qr_raster(text: &str, module: u32, inverted: bool) -> GrayImage {
    let code = qrcode::QrCode::new(text.as_bytes()).unwrap();
    let modules = code.width() as u32;
    let side = (modules + 2 * QUIET_ZONE) * module;
    let (dark, light) = if inverted { (255u8, 0u8) } else { (0u8, 255u8) };

    GrayImage::from_fn(side, side, |x, y| {
        let (mx, my) = (x / module, y / module);
        let inside = (QUIET_ZONE..QUIET_ZONE + modules).contains(&mx)
            && (QUIET_ZONE..QUIET_ZONE + modules).contains(&my);
        let is_dark = inside
            && code[((mx - QUIET_ZONE) as usize, (my - QUIET_ZONE) as usize)] == qrcode::Color::Dark;
        Luma([if is_dark { dark } else { light }])
    })
}

/// Page number stamped into a raster by [`FakeRasterizer::uniform`].
pub(crate) fn page_value(raster: &GrayImage) -> u32 {
    u32::from(raster.get_pixel(0, 0).0[0])
}

/// Rasterizer driven by a closure of `(page, resolution)`; records every call.
pub(crate) struct FakeRasterizer {
    render: Box<RenderFn>,
    calls: Mutex<Vec<(u32, u32)>>,
}

impl FakeRasterizer {
    pub(crate) fn new(render: impl Fn(u32, u32) -> Result<GrayImage> + Send + Sync + 'static) -> Self {
        Self {
            render: Box::new(render),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Uniform rasters `resolution / 8` pixels square whose every sample is
    /// the page number, so the page survives filtering.
    pub(crate) fn uniform() -> Self {
        Self::new(|page, resolution| {
            let side = (resolution / 8).max(1);
            Ok(GrayImage::from_pixel(side, side, Luma([page as u8])))
        })
    }

    pub(crate) fn calls(&self) -> Vec<(u32, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

impl PageRasterizer for FakeRasterizer {
    fn render(&self, page: &PageRef, resolution: u32) -> Result<GrayImage> {
        self.calls.lock().unwrap().push((page.number, resolution));
        (self.render)(page.number, resolution)
    }
}

/// Decoder driven by a closure over the raster; records the hints it saw.
pub(crate) struct FakeDecoder {
    decode: Box<DecodeFn>,
    hints: Mutex<Vec<DecodeHints>>,
}

impl FakeDecoder {
    /// Decide from `(page, raster width)` of a [`FakeRasterizer::uniform`] raster.
    pub(crate) fn new(rule: impl Fn(u32, u32) -> Result<Option<String>> + Send + Sync + 'static) -> Self {
        Self::from_raster(move |raster| rule(page_value(raster), raster.width()))
    }

    pub(crate) fn from_raster(
        decode: impl Fn(&GrayImage) -> Result<Option<String>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            decode: Box::new(decode),
            hints: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn hints_seen(&self) -> Vec<DecodeHints> {
        self.hints.lock().unwrap().clone()
    }
}

impl SymbolDecoder for FakeDecoder {
    fn decode(&self, raster: &GrayImage, hints: DecodeHints) -> Result<Option<String>> {
        self.hints.lock().unwrap().push(hints);
        (self.decode)(raster)
    }
}

/// Document of `pages` pages that never touches the filesystem.
pub(crate) struct FakeSource {
    pub(crate) pages: u32,
    pub(crate) open: bool,
}

impl FakeSource {
    pub(crate) fn open(pages: u32) -> Self {
        Self { pages, open: true }
    }

    pub(crate) fn closed() -> Self {
        Self { pages: 0, open: false }
    }
}

impl PageSource for FakeSource {
    fn is_open(&self) -> bool {
        self.open
    }

    fn page_count(&self) -> u32 {
        if self.open { self.pages } else { 0 }
    }

    fn page(&self, number: u32) -> Result<PageRef> {
        if !self.open {
            return Err(QrsweepError::DocumentNotOpen);
        }
        if number == 0 || number > self.pages {
            return Err(QrsweepError::PdfError(format!("page {number} out of range")));
        }
        Ok(page_ref(number))
    }
}
