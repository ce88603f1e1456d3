// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capability traits the decode pipeline is built on.
//
// Rasterization and symbol decoding are external capabilities: the pipeline
// only needs "page + resolution -> grayscale raster" and "raster -> text or
// not-found". Shipped implementations live in `poppler` and `qr`; tests swap
// in fakes.

use std::sync::Arc;

use image::GrayImage;
use qrsweep_core::error::Result;
use qrsweep_core::types::{DecodeHints, PageRef};

/// An opened paginated document.
pub trait PageSource {
    /// Whether the document is still open. A closed source must not be run.
    fn is_open(&self) -> bool;

    /// Number of pages; 0 once closed.
    fn page_count(&self) -> u32;

    /// Handle for the 1-based page `number`.
    fn page(&self, number: u32) -> Result<PageRef>;
}

/// Renders a page to an 8-bit grayscale raster.
pub trait PageRasterizer: Send + Sync {
    /// Render `page` at `resolution` samples per inch.
    ///
    /// Failures are recoverable: the page decoder treats them as a decode miss.
    fn render(&self, page: &PageRef, resolution: u32) -> Result<GrayImage>;
}

/// Extracts the text of a machine-readable code from a raster.
pub trait SymbolDecoder: Send + Sync {
    /// `Ok(Some(text))` on success, `Ok(None)` when no code was found, and
    /// `Err` for a recoverable decoder failure.
    fn decode(&self, raster: &GrayImage, hints: DecodeHints) -> Result<Option<String>>;
}

impl<T: PageRasterizer + ?Sized> PageRasterizer for Arc<T> {
    fn render(&self, page: &PageRef, resolution: u32) -> Result<GrayImage> {
        (**self).render(page, resolution)
    }
}

impl<T: SymbolDecoder + ?Sized> SymbolDecoder for Arc<T> {
    fn decode(&self, raster: &GrayImage, hints: DecodeHints) -> Result<Option<String>> {
        (**self).decode(raster, hints)
    }
}

impl<T: PageRasterizer + ?Sized> PageRasterizer for &T {
    fn render(&self, page: &PageRef, resolution: u32) -> Result<GrayImage> {
        (**self).render(page, resolution)
    }
}

impl<T: SymbolDecoder + ?Sized> SymbolDecoder for &T {
    fn decode(&self, raster: &GrayImage, hints: DecodeHints) -> Result<Option<String>> {
        (**self).decode(raster, hints)
    }
}

impl<T: PageRasterizer + ?Sized> PageRasterizer for Box<T> {
    fn render(&self, page: &PageRef, resolution: u32) -> Result<GrayImage> {
        (**self).render(page, resolution)
    }
}

impl<T: SymbolDecoder + ?Sized> SymbolDecoder for Box<T> {
    fn decode(&self, raster: &GrayImage, hints: DecodeHints) -> Result<Option<String>> {
        (**self).decode(raster, hints)
    }
}
