// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// qrsweep: decode the QR code on every page of a PDF.
//
// Entry point. Initialises logging, parses the command line, and reports
// failures in plain language.

mod cli;
mod report;
mod services;

use std::process::ExitCode;

use clap::Parser;
use qrsweep_core::human_errors::{Severity, humanize_error};

/// sysexits `EX_TEMPFAIL`: the same command may succeed later.
const EXIT_TEMPFAIL: u8 = 75;

#[tokio::main]
async fn main() -> ExitCode {
    let default_filter = if cli::is_verbose() { "debug" } else { "info" };
    // Logs go to stderr; stdout carries results.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("qrsweep starting");

    let args = cli::Cli::parse();
    match cli::run(args).await {
        Ok(code) => code,
        Err(err) => {
            let human = humanize_error(&err);
            match human.severity {
                Severity::Transient => tracing::warn!(error = %err, "qrsweep stopped"),
                Severity::ActionRequired | Severity::Permanent => {
                    tracing::error!(error = %err, "qrsweep failed")
                }
            }
            eprintln!("Error: {human}");
            if human.retriable {
                ExitCode::from(EXIT_TEMPFAIL)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
