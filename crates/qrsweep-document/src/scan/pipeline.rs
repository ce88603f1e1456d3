// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document run: every page of an open document through the page decoder.
//
// A run executes on a dedicated named thread. The worker owns the result
// lists until it finishes; observers only see the atomic progress counters
// through a `RunObserver`. Cancellation is checked once per page, before the
// page is started, so a cancelled run keeps the results of every page it did
// process.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};

use chrono::Utc;
use qrsweep_core::error::{QrsweepError, Result};
use qrsweep_core::types::{DecodeOutcome, PageRef, RunSummary};
use tracing::{debug, info, instrument, warn};

use super::capabilities::{PageRasterizer, PageSource, SymbolDecoder};
use super::page::PageDecoder;
use crate::export::sink::{ResultsSink, write_lines};

/// Counters shared between the decode worker and its observers.
#[derive(Debug, Default)]
struct RunProgress {
    /// Pages started so far; bumped before each page is decoded.
    current_page: AtomicUsize,
    page_count: AtomicUsize,
    cancel_requested: AtomicBool,
    running: AtomicBool,
}

impl RunProgress {
    fn reset(&self, page_count: usize) {
        self.current_page.store(0, Ordering::Release);
        self.page_count.store(page_count, Ordering::Release);
        self.cancel_requested.store(false, Ordering::Release);
        self.running.store(true, Ordering::Release);
    }
}

/// Read-only view of a pipeline's progress that can also request cancellation.
///
/// Cheap to clone and safe to poll from any thread while a run is active.
#[derive(Debug, Clone)]
pub struct RunObserver {
    progress: Arc<RunProgress>,
}

impl RunObserver {
    pub fn current_page(&self) -> usize {
        self.progress.current_page.load(Ordering::Acquire)
    }

    pub fn page_count(&self) -> usize {
        self.progress.page_count.load(Ordering::Acquire)
    }

    /// `min(100, floor(current / count * 100))`, or 0 for an empty document.
    pub fn percent_complete(&self) -> u8 {
        let count = self.page_count();
        if count == 0 {
            return 0;
        }
        let percent = self.current_page().saturating_mul(100) / count;
        percent.min(100) as u8
    }

    /// Ask the worker to stop before its next page.
    pub fn cancel(&self) {
        self.progress.cancel_requested.store(true, Ordering::Release);
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.progress.cancel_requested.load(Ordering::Acquire)
    }

    pub fn is_running(&self) -> bool {
        self.progress.running.load(Ordering::Acquire)
    }
}

/// Results accumulated by one run.
#[derive(Debug, Default, Clone)]
struct RunState {
    /// Page order, then manual entries in the order they were added.
    decoded_texts: Vec<String>,
    /// 1-based, ascending.
    unreadable_pages: Vec<u32>,
}

/// Drives a [`PageDecoder`] over whole documents and keeps the results.
///
/// One pipeline can be reused for any number of documents; each run starts by
/// clearing the previous results.
pub struct DocumentPipeline<R, D> {
    page_decoder: Arc<PageDecoder<R, D>>,
    state: RunState,
    progress: Arc<RunProgress>,
    worker: Option<JoinHandle<(RunState, RunSummary)>>,
    last_summary: Option<RunSummary>,
}

impl<R, D> DocumentPipeline<R, D>
where
    R: PageRasterizer + 'static,
    D: SymbolDecoder + 'static,
{
    pub fn new(page_decoder: PageDecoder<R, D>) -> Self {
        Self {
            page_decoder: Arc::new(page_decoder),
            state: RunState::default(),
            progress: Arc::new(RunProgress::default()),
            worker: None,
            last_summary: None,
        }
    }

    /// Handle for polling progress; valid across runs.
    pub fn observer(&self) -> RunObserver {
        RunObserver {
            progress: Arc::clone(&self.progress),
        }
    }

    /// Whether a run has been started and its worker has not finished yet.
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|worker| !worker.is_finished())
    }

    /// Start a background run over every page of `source`.
    ///
    /// Fails with `RunInProgress` while another run is active and with
    /// `DocumentNotOpen` for a closed source; neither failure touches the
    /// results of the previous run.
    #[instrument(skip(self, source), fields(pages = source.page_count()))]
    pub fn start<S: PageSource + ?Sized>(&mut self, source: &S) -> Result<RunObserver> {
        if self.is_running() {
            return Err(QrsweepError::RunInProgress);
        }
        if !source.is_open() {
            return Err(QrsweepError::DocumentNotOpen);
        }
        // Collect a finished but unclaimed run before it is overwritten.
        self.settle()?;

        let pages = (1..=source.page_count())
            .map(|number| source.page(number))
            .collect::<Result<Vec<PageRef>>>()?;

        self.state = RunState::default();
        self.last_summary = None;
        self.progress.reset(pages.len());

        let decoder = Arc::clone(&self.page_decoder);
        let progress = Arc::clone(&self.progress);
        let worker = thread::Builder::new()
            .name("qrsweep-decode".into())
            .spawn(move || process_pages(&*decoder, &pages, &progress))
            .map_err(|err| {
                self.progress.running.store(false, Ordering::Release);
                QrsweepError::Worker(format!("cannot spawn decode worker: {err}"))
            })?;

        self.worker = Some(worker);
        info!("Decode run started");
        Ok(self.observer())
    }

    /// Block until the active run finishes and take over its results.
    pub fn wait(&mut self) -> Result<RunSummary> {
        let worker = self
            .worker
            .take()
            .ok_or_else(|| QrsweepError::Worker("no decode run has been started".into()))?;

        let (state, summary) = worker.join().map_err(|_| {
            self.progress.running.store(false, Ordering::Release);
            QrsweepError::Worker("decode worker panicked".into())
        })?;
        self.state = state;
        self.last_summary = Some(summary.clone());
        Ok(summary)
    }

    /// Run over `source` on the worker and block until it is done.
    pub fn run<S: PageSource + ?Sized>(&mut self, source: &S) -> Result<RunSummary> {
        self.start(source)?;
        self.wait()
    }

    /// Request that the active run stop before its next page.
    pub fn cancel(&self) {
        self.observer().cancel();
    }

    pub fn current_page_index(&self) -> usize {
        self.observer().current_page()
    }

    pub fn page_count(&self) -> usize {
        self.observer().page_count()
    }

    /// Decoded entries of the last collected run plus manual entries.
    ///
    /// Empty while a run is active; results move back with [`wait`](Self::wait).
    pub fn decoded_texts(&self) -> &[String] {
        &self.state.decoded_texts
    }

    pub fn unreadable_pages(&self) -> &[u32] {
        &self.state.unreadable_pages
    }

    pub fn last_summary(&self) -> Option<&RunSummary> {
        self.last_summary.as_ref()
    }

    /// Append an operator-supplied entry after the decoded ones.
    pub fn add_manual_result(&mut self, text: impl Into<String>) -> Result<()> {
        if self.is_running() {
            return Err(QrsweepError::RunInProgress);
        }
        self.settle()?;
        let text = text.into();
        debug!(chars = text.len(), "Manual result added");
        self.state.decoded_texts.push(text);
        Ok(())
    }

    /// Write every entry, one per line, to `writer`. Results are kept.
    pub fn export_results(&self, writer: &mut impl Write) -> Result<usize> {
        let mut sink = ResultsSink::from_writer(writer, "writer");
        self.export_to_sink(&mut sink)?;
        let (_, lines) = sink.finish()?;
        Ok(lines)
    }

    /// Export to a `.txt`/`.csv` file.
    ///
    /// Checks run in order: results present, extension supported, file
    /// creatable. Nothing is created unless the first two pass.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn export_to_path(&self, path: impl AsRef<Path>) -> Result<usize> {
        self.ensure_results()?;
        let mut sink = ResultsSink::create(path)?;
        self.export_to_sink(&mut sink)?;
        let (_, lines) = sink.finish()?;
        Ok(lines)
    }

    /// Write every entry into an existing sink without finishing it.
    pub fn export_to_sink<W: Write>(&self, sink: &mut ResultsSink<W>) -> Result<usize> {
        self.ensure_results()?;
        write_lines(sink, &self.state.decoded_texts)
    }

    fn ensure_results(&self) -> Result<()> {
        if self.state.decoded_texts.is_empty() {
            return Err(QrsweepError::NoResultsToExport);
        }
        Ok(())
    }

    /// Claim the results of a worker that has already finished.
    fn settle(&mut self) -> Result<()> {
        if self.worker.as_ref().is_some_and(JoinHandle::is_finished) {
            self.wait()?;
        }
        Ok(())
    }
}

impl<R, D> Drop for DocumentPipeline<R, D> {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.progress.cancel_requested.store(true, Ordering::Release);
            if worker.join().is_err() {
                warn!("Decode worker panicked during shutdown");
            }
        }
    }
}

/// Worker body: decode `pages` in order, honouring cancellation between pages.
fn process_pages<R, D>(
    decoder: &PageDecoder<R, D>,
    pages: &[PageRef],
    progress: &RunProgress,
) -> (RunState, RunSummary)
where
    R: PageRasterizer,
    D: SymbolDecoder,
{
    let started_at = Utc::now();
    let mut state = RunState::default();
    let mut processed = 0u32;
    let mut cancelled = false;

    for page in pages {
        if progress.cancel_requested.load(Ordering::Acquire) {
            info!(page = page.number, "Decode run cancelled");
            cancelled = true;
            break;
        }
        progress.current_page.fetch_add(1, Ordering::AcqRel);

        match decoder.decode_page(page) {
            DecodeOutcome::Decoded(text) => state.decoded_texts.push(text),
            DecodeOutcome::Unreadable => state.unreadable_pages.push(page.number),
        }
        processed += 1;
    }

    let summary = RunSummary {
        page_count: pages.len() as u32,
        pages_processed: processed,
        decoded: state.decoded_texts.len(),
        unreadable_pages: state.unreadable_pages.clone(),
        cancelled,
        started_at,
        finished_at: Utc::now(),
    };
    info!(
        processed,
        decoded = summary.decoded,
        unreadable = summary.unreadable_pages.len(),
        cancelled,
        "Decode run finished"
    );
    progress.running.store(false, Ordering::Release);
    (state, summary)
}
