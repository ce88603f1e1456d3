// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Line-oriented results sink: one decoded string per line, `\n`-terminated,
// UTF-8. Files must end in `.txt` or `.csv`; the extension is checked before
// anything is created on disk.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use qrsweep_core::error::{QrsweepError, Result};
use qrsweep_core::types::ExportFormat;
use tracing::{debug, info, instrument};

/// Destination for exported results.
pub struct ResultsSink<W: Write> {
    writer: BufWriter<W>,
    /// Identifies the destination in errors and logs.
    label: String,
    lines_written: usize,
}

impl ResultsSink<File> {
    /// Create (or truncate) the file at `path`.
    ///
    /// Fails with `UnsupportedExportFormat` before touching the filesystem if
    /// the extension is not `.txt`/`.csv` (any case).
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = ExportFormat::from_path(path)?;
        let label = path.display().to_string();

        let file = File::create(path).map_err(|source| QrsweepError::SinkWriteFailed {
            path: label.clone(),
            source,
        })?;
        debug!(format = format.extension(), "Results file created");
        Ok(Self::from_writer(file, label))
    }
}

impl<W: Write> ResultsSink<W> {
    /// Wrap any writer; `label` names it in errors.
    pub fn from_writer(writer: W, label: impl Into<String>) -> Self {
        Self {
            writer: BufWriter::new(writer),
            label: label.into(),
            lines_written: 0,
        }
    }

    /// Append one entry followed by a newline.
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        self.writer
            .write_all(line.as_bytes())
            .and_then(|()| self.writer.write_all(b"\n"))
            .map_err(|source| self.write_failed(source))?;
        self.lines_written += 1;
        Ok(())
    }

    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    /// Flush buffered output and return the writer and the line count.
    pub fn finish(self) -> Result<(W, usize)> {
        let lines = self.lines_written;
        let label = self.label;
        let writer = self.writer.into_inner().map_err(|err| QrsweepError::SinkWriteFailed {
            path: label.clone(),
            source: err.into_error(),
        })?;
        info!(destination = %label, lines, "Results exported");
        Ok((writer, lines))
    }

    fn write_failed(&self, source: std::io::Error) -> QrsweepError {
        QrsweepError::SinkWriteFailed {
            path: self.label.clone(),
            source,
        }
    }
}

/// Write every entry of `lines` to `sink`, in order.
pub fn write_lines<W: Write>(sink: &mut ResultsSink<W>, lines: &[String]) -> Result<usize> {
    for line in lines {
        sink.write_line(line)?;
    }
    Ok(lines.len())
}
