// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line interface.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use qrsweep_core::AppConfig;
use qrsweep_core::error::{QrsweepError, Result};
use qrsweep_document::{PageSource, RunObserver};
use tracing::{debug, info};

use crate::report::{self, Report};
use crate::services::config_store;
use crate::services::session::Session;

/// Exit status of a run stopped with Ctrl-C.
const EXIT_CANCELLED: u8 = 130;

#[derive(Debug, Parser)]
#[command(name = "qrsweep")]
#[command(about = "Decode the QR code on every page of a PDF")]
#[command(version)]
pub struct Cli {
    /// PDF document to scan
    pub pdf: PathBuf,

    /// Write decoded entries to this .txt or .csv file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Append an entry by hand after the run (repeatable)
    #[arg(long = "add", value_name = "TEXT")]
    pub manual: Vec<String>,

    /// Resolution (DPI) of the first attempt
    #[arg(long, value_name = "DPI")]
    pub default_dpi: Option<u32>,

    /// Resolution (DPI) of the filtered retry
    #[arg(long, value_name = "DPI")]
    pub retry_dpi: Option<u32>,

    /// Path to the pdftoppm binary
    #[arg(long, value_name = "PATH")]
    pub pdftoppm: Option<PathBuf>,

    /// Save rasters of unreadable pages into this directory
    #[arg(long, value_name = "DIR")]
    pub dump_dir: Option<PathBuf>,

    /// Configuration file (defaults to config.json in the data directory)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Persist the effective configuration before running
    #[arg(long)]
    pub save_config: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

impl Cli {
    /// Apply flag overrides on top of the loaded configuration.
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(dpi) = self.default_dpi {
            config.default_resolution = dpi;
        }
        if let Some(dpi) = self.retry_dpi {
            config.retry_resolution = dpi;
        }
        if let Some(path) = &self.pdftoppm {
            config.pdftoppm_path = path.clone();
        }
        if let Some(dir) = &self.dump_dir {
            config.debug_dump_dir = Some(dir.clone());
        }
    }

    fn effective_config(&self) -> Result<AppConfig> {
        let path = self.config.clone().unwrap_or_else(config_store::default_config_path);
        let mut config = config_store::load_config(&path);
        self.apply_overrides(&mut config);
        config.validate()?;
        debug!(?config, "Effective configuration");

        if self.save_config {
            config_store::persist_config(&path, &config)?;
        }
        Ok(config)
    }
}

pub async fn run(cli: Cli) -> Result<ExitCode> {
    let config = cli.effective_config()?;
    let mut session = Session::new(config)?;
    session.check_tools()?;

    let document = session.open(&cli.pdf)?;
    let name = document.display_name();
    info!(document = %name, pages = document.page_count(), "Decoding");

    let mut progress = ProgressLine::default();
    let summary = session.decode(|observer| progress.update(observer)).await?;
    progress.finish();

    for text in &cli.manual {
        session.add_manual_result(text.as_str())?;
    }

    let report = Report {
        document: &name,
        summary: &summary,
        entries: session.decoded_texts(),
    };
    if cli.json {
        println!("{}", report::render_json(&report)?);
    } else {
        eprintln!("{}", report::render_text(&report));
    }

    match &cli.output {
        Some(path) => {
            let lines = session.export_to_path(path)?;
            eprintln!("Saved {lines} entries to {}", path.display());
        }
        None if !cli.json => match session.export_results(&mut std::io::stdout().lock()) {
            Ok(_) | Err(QrsweepError::NoResultsToExport) => {}
            Err(err) => return Err(err),
        },
        None => {}
    }

    Ok(if summary.cancelled {
        ExitCode::from(EXIT_CANCELLED)
    } else {
        ExitCode::SUCCESS
    })
}

/// Single self-overwriting progress line on stderr.
#[derive(Default)]
struct ProgressLine {
    last: Option<(usize, usize, bool)>,
}

impl ProgressLine {
    fn update(&mut self, observer: &RunObserver) {
        let current = (
            observer.current_page(),
            observer.page_count(),
            observer.is_cancel_requested(),
        );
        if self.last == Some(current) {
            return;
        }
        self.last = Some(current);
        let (page, count, stopping) = current;
        let mut stderr = std::io::stderr().lock();
        // Progress output is best-effort.
        let _ = write!(
            stderr,
            "\r{}",
            progress_text(page, count, observer.percent_complete(), stopping)
        );
        let _ = stderr.flush();
    }

    fn finish(&self) {
        if self.last.is_some() {
            eprintln!();
        }
    }
}

fn progress_text(page: usize, count: usize, percent: u8, stopping: bool) -> String {
    let mut text = format!("Decoding page {page}/{count} ({percent}%)");
    if stopping {
        text.push_str(", stopping after this page");
    }
    text
}
