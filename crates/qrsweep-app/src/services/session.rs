// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// One decoding session: at most one open PDF and the pipeline that runs over it.
//
// The pipeline worker is a plain thread; this layer watches it from the tokio
// runtime, reporting progress on a fixed tick and turning Ctrl-C into a
// cancellation request.

use std::path::Path;
use std::time::Duration;

use qrsweep_core::AppConfig;
use qrsweep_core::error::{QrsweepError, Result};
use qrsweep_core::types::RunSummary;
use qrsweep_document::{
    DocumentPipeline, PageDecoder, PageSource, PdfDocument, PopplerRasterizer, QrDecoder,
    RunObserver,
};
use tracing::{info, instrument, warn};

const PROGRESS_TICK: Duration = Duration::from_millis(250);

pub struct Session {
    config: AppConfig,
    pipeline: DocumentPipeline<PopplerRasterizer, QrDecoder>,
    document: Option<PdfDocument>,
}

impl Session {
    /// Build a session around the shipped rasterizer and QR decoder.
    pub fn new(config: AppConfig) -> Result<Self> {
        let rasterizer = PopplerRasterizer::new(config.pdftoppm_path.clone());
        let page_decoder = PageDecoder::new(rasterizer, QrDecoder::new(), &config)?;
        Ok(Self {
            config,
            pipeline: DocumentPipeline::new(page_decoder),
            document: None,
        })
    }

    /// Fail early when the configured `pdftoppm` cannot be run.
    pub fn check_tools(&self) -> Result<()> {
        let rasterizer = PopplerRasterizer::new(self.config.pdftoppm_path.clone());
        if rasterizer.is_available() {
            Ok(())
        } else {
            Err(QrsweepError::ToolNotFound(rasterizer.binary().display().to_string()))
        }
    }

    /// Open `path`, closing whatever document was open before.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<&PdfDocument> {
        self.close();
        let document = PdfDocument::open(path)?;
        info!(pages = document.page_count(), "Document ready");
        Ok(&*self.document.insert(document))
    }

    pub fn close(&mut self) {
        if let Some(mut document) = self.document.take() {
            document.close();
        }
    }

    pub fn document(&self) -> Option<&PdfDocument> {
        self.document.as_ref()
    }

    /// Decode every page of the open document.
    ///
    /// `on_progress` is called on every tick while the worker runs and once
    /// more after it finishes. Ctrl-C stops the run after the current page.
    pub async fn decode(&mut self, mut on_progress: impl FnMut(&RunObserver)) -> Result<RunSummary> {
        let document = self.document.as_ref().ok_or(QrsweepError::DocumentNotOpen)?;
        let observer = self.pipeline.start(document)?;

        let mut ticker = tokio::time::interval(PROGRESS_TICK);
        let interrupt = tokio::signal::ctrl_c();
        tokio::pin!(interrupt);
        let mut interrupt_armed = true;

        while self.pipeline.is_running() {
            tokio::select! {
                _ = ticker.tick() => on_progress(&observer),
                signal = &mut interrupt, if interrupt_armed => {
                    interrupt_armed = false;
                    match signal {
                        Ok(()) => {
                            warn!("Interrupted, stopping after the current page");
                            observer.cancel();
                        }
                        Err(err) => warn!(error = %err, "Cannot listen for Ctrl-C"),
                    }
                }
            }
        }

        on_progress(&observer);
        self.pipeline.wait()
    }

    pub fn add_manual_result(&mut self, text: impl Into<String>) -> Result<()> {
        self.pipeline.add_manual_result(text)
    }

    pub fn decoded_texts(&self) -> &[String] {
        self.pipeline.decoded_texts()
    }

    pub fn export_to_path(&self, path: impl AsRef<Path>) -> Result<usize> {
        self.pipeline.export_to_path(path)
    }

    pub fn export_results(&self, writer: &mut impl std::io::Write) -> Result<usize> {
        self.pipeline.export_results(writer)
    }
}
