// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// qrsweep-document: PDF pages in, QR code contents out.
//
// Provides PDF page access (`pdf`), the retry-raster box filter (`image`), the
// per-page and per-document decode pipeline with its rasterizer and decoder
// capabilities (`scan`), and line-oriented results export (`export`).

pub mod export;
pub mod image;
pub mod pdf;
pub mod scan;

// Re-export the primary types so callers can use `qrsweep_document::DocumentPipeline` etc.
pub use export::sink::ResultsSink;
pub use crate::image::filter::{BoxKernel, kernel_dimension, smooth};
pub use pdf::reader::PdfDocument;
pub use scan::capabilities::{PageRasterizer, PageSource, SymbolDecoder};
pub use scan::page::PageDecoder;
pub use scan::pipeline::{DocumentPipeline, RunObserver};
pub use scan::poppler::PopplerRasterizer;
pub use scan::qr::QrDecoder;
