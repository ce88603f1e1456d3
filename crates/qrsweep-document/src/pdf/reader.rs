// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF document source: open a PDF with `lopdf`, report its page count, and
// hand out page references for rasterization.

use std::path::Path;
use std::sync::Arc;

use lopdf::Document;
use qrsweep_core::error::{QrsweepError, Result};
use qrsweep_core::types::PageRef;
use tracing::{debug, info, instrument};

use crate::scan::capabilities::PageSource;

/// An opened PDF file.
///
/// Wraps `lopdf::Document` for structural access (page tree, page count).
/// Pixels are produced separately by a [`PageRasterizer`], which receives the
/// file path through each [`PageRef`].
///
/// [`PageRasterizer`]: crate::scan::capabilities::PageRasterizer
pub struct PdfDocument {
    /// The parsed document; `None` after [`PdfDocument::close`].
    document: Option<Document>,
    /// Source path, shared with every page reference.
    source_path: Arc<Path>,
    /// Page count captured at open time.
    page_count: u32,
}

impl PdfDocument {
    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            QrsweepError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        let page_count = u32::try_from(document.get_pages().len()).map_err(|_| {
            QrsweepError::PdfError(format!("{} has too many pages", path_ref.display()))
        })?;
        debug!(pages = page_count, "PDF loaded");

        Ok(Self {
            document: Some(document),
            source_path: Arc::from(path_ref),
            page_count,
        })
    }

    /// Path the document was opened from.
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// File name for display, falling back to the full path.
    pub fn display_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source_path.display().to_string())
    }

    /// Release the parsed document. Calling this twice is harmless.
    pub fn close(&mut self) {
        if self.document.take().is_some() {
            info!(path = %self.source_path.display(), "PDF closed");
        }
    }
}

impl PageSource for PdfDocument {
    fn is_open(&self) -> bool {
        self.document.is_some()
    }

    fn page_count(&self) -> u32 {
        if self.is_open() { self.page_count } else { 0 }
    }

    fn page(&self, number: u32) -> Result<PageRef> {
        if !self.is_open() {
            return Err(QrsweepError::DocumentNotOpen);
        }
        if number == 0 || number > self.page_count {
            return Err(QrsweepError::PdfError(format!(
                "page {} out of range (document has {} pages)",
                number, self.page_count
            )));
        }
        Ok(PageRef::new(Arc::clone(&self.source_path), number))
    }
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("source_path", &self.source_path)
            .field("page_count", &self.page_count)
            .field("open", &self.is_open())
            .finish()
    }
}
