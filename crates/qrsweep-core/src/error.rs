// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for qrsweep.
//
// Two tiers: per-page failures (rasterization, decoder errors) are recoverable
// and folded into the run's unreadable-page list; everything else is surfaced
// to the caller of the failing operation.

use thiserror::Error;

/// Top-level error type for all qrsweep operations.
#[derive(Debug, Error)]
pub enum QrsweepError {
    // -- Run preconditions --
    #[error("no document open")]
    DocumentNotOpen,

    #[error("a decode run is already in progress")]
    RunInProgress,

    // -- Per-page (recoverable) --
    #[error("page {page} could not be rasterized: {reason}")]
    RasterizationFailed { page: u32, reason: String },

    #[error("symbol decoding failed: {0}")]
    DecodeFailed(String),

    // -- Export --
    #[error("no results to export")]
    NoResultsToExport,

    #[error("unsupported export format: {0} (supported: .txt, .csv)")]
    UnsupportedExportFormat(String),

    #[error("failed to write results to {path}: {source}")]
    SinkWriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // -- Document / tools --
    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("external tool not found: {0}")]
    ToolNotFound(String),

    // -- Setup --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("decode worker failed: {0}")]
    Worker(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl QrsweepError {
    /// Whether this error only spoils a single decode attempt.
    ///
    /// Recoverable errors are downgraded to a decode miss by the page decoder;
    /// they never abort a document run.
    pub fn is_page_local(&self) -> bool {
        matches!(
            self,
            QrsweepError::RasterizationFailed { .. }
                | QrsweepError::DecodeFailed(_)
                | QrsweepError::ToolNotFound(_)
        )
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, QrsweepError>;
