// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline: rasterize pages, decode QR codes, accumulate results.

pub mod capabilities;
pub mod page;
pub mod pipeline;
pub mod poppler;
pub mod qr;

#[cfg(test)]
mod testing;

pub use capabilities::{PageRasterizer, PageSource, SymbolDecoder};
pub use page::PageDecoder;
pub use pipeline::{DocumentPipeline, RunObserver};
pub use poppler::PopplerRasterizer;
pub use qr::QrDecoder;
