// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for qrsweep.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{QrsweepError, Result};

/// Handle to one page of an open document.
///
/// Cheap to clone: the document path is shared. Page numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRef {
    /// File the page belongs to.
    pub document: Arc<Path>,
    /// 1-based page number.
    pub number: u32,
}

impl PageRef {
    pub fn new(document: Arc<Path>, number: u32) -> Self {
        Self { document, number }
    }
}

impl std::fmt::Display for PageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} p.{}", self.document.display(), self.number)
    }
}

/// Result of decoding a single page after all attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// The page's code was read.
    Decoded(String),
    /// Both the default and the filtered retry attempt failed.
    Unreadable,
}

/// Hints passed to the symbol decoder on every attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeHints {
    /// Spend more effort (additional internal strategies) before reporting
    /// not-found.
    pub try_harder: bool,
}

impl Default for DecodeHints {
    fn default() -> Self {
        Self { try_harder: true }
    }
}

/// Line-oriented formats accepted by the results sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Txt,
    Csv,
}

impl ExportFormat {
    /// Determine the format from a destination path's extension
    /// (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();

        if extension.eq_ignore_ascii_case("txt") {
            Ok(ExportFormat::Txt)
        } else if extension.eq_ignore_ascii_case("csv") {
            Ok(ExportFormat::Csv)
        } else if extension.is_empty() {
            Err(QrsweepError::UnsupportedExportFormat(format!(
                "no extension on {}",
                path.display()
            )))
        } else {
            Err(QrsweepError::UnsupportedExportFormat(format!(".{extension}")))
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Csv => "csv",
        }
    }
}

/// Snapshot of a finished (or cancelled) decode run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Pages in the document.
    pub page_count: u32,
    /// Pages fully processed before the run ended.
    pub pages_processed: u32,
    /// Number of decoded entries produced by the run (manual entries excluded).
    pub decoded: usize,
    /// 1-based numbers of pages that stayed unreadable, ascending.
    pub unreadable_pages: Vec<u32>,
    /// Whether the run stopped early on request.
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    /// Comma-separated unreadable page numbers, or `none`.
    pub fn unreadable_list(&self) -> String {
        if self.unreadable_pages.is_empty() {
            return "none".to_string();
        }
        self.unreadable_pages
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.pages_processed == self.page_count
    }
}
