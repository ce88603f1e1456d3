// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the operator running a batch.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The severity drives how the command-line front end reports it.

use crate::error::QrsweepError;

/// Severity of an error from the operator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Worth simply trying again.
    Transient,
    /// The operator must do something first (open a file, pick a name).
    ActionRequired,
    /// Cannot be fixed by retrying: damaged input, missing tooling.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the operator should try.
    pub suggestion: String,
    /// Whether repeating the same action may succeed.
    pub retriable: bool,
    pub severity: Severity,
}

impl std::fmt::Display for HumanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.message, self.suggestion)
    }
}

/// Convert a `QrsweepError` into a `HumanError`.
pub fn humanize_error(err: &QrsweepError) -> HumanError {
    match err {
        QrsweepError::DocumentNotOpen => HumanError {
            message: "No PDF file is open.".into(),
            suggestion: "Choose a PDF file to process, then start decoding.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        QrsweepError::RunInProgress => HumanError {
            message: "Decoding is still running.".into(),
            suggestion: "Wait for the current run to finish or cancel it first.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        QrsweepError::RasterizationFailed { page, .. } => HumanError {
            message: format!("Page {page} could not be turned into an image."),
            suggestion: "The page may be damaged. Its code can be entered manually.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        QrsweepError::DecodeFailed(_) => HumanError {
            message: "A code was found but could not be read.".into(),
            suggestion: "Rescan the page at a higher quality, or enter its data manually.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        QrsweepError::NoResultsToExport => HumanError {
            message: "No results to save.".into(),
            suggestion: "Decode a document or add entries manually before saving.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        QrsweepError::UnsupportedExportFormat(detail) => HumanError {
            message: "Results can only be saved as .csv or .txt.".into(),
            suggestion: format!("Pick a file name ending in .csv or .txt. (Got: {detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        QrsweepError::SinkWriteFailed { path, .. } => HumanError {
            message: format!("Saving results to {path} failed."),
            suggestion: "Check the folder exists and is writable, then save again. Some lines may already have been written.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        QrsweepError::PdfError(_) => HumanError {
            message: "There's a problem with this PDF file.".into(),
            suggestion: "The file may be damaged. Try opening it in a PDF viewer first, or try a different file.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        QrsweepError::ToolNotFound(tool) => HumanError {
            message: format!("The helper program {tool} is missing."),
            suggestion: "Install poppler-utils (it provides pdftoppm) or set pdftoppm_path in the configuration.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        QrsweepError::InvalidConfig(detail) => HumanError {
            message: "The decoder settings are not valid.".into(),
            suggestion: format!("Fix the configuration and try again. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        QrsweepError::Worker(_) => HumanError {
            message: "The decoding job stopped unexpectedly.".into(),
            suggestion: "Start decoding again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        QrsweepError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Check the path and try again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "Permission to read or write that file was denied.".into(),
                    suggestion: "Check the file permissions, or use a different location.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, the disk may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        QrsweepError::Serialization(_) => HumanError {
            message: "The configuration file could not be read.".into(),
            suggestion: "Check that it is valid JSON, or delete it to go back to the defaults.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_document_is_action_required() {
        let human = humanize_error(&QrsweepError::DocumentNotOpen);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(!human.retriable);
    }

    #[test]
    fn unsupported_format_mentions_supported_extensions() {
        let human = humanize_error(&QrsweepError::UnsupportedExportFormat(".docx".into()));
        assert!(human.message.contains(".csv"));
        assert!(human.suggestion.contains(".docx"));
    }

    #[test]
    fn sink_failure_is_retriable() {
        let err = QrsweepError::SinkWriteFailed {
            path: "/read-only/out.txt".into(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        let human = humanize_error(&err);
        assert!(human.retriable);
        assert!(human.message.contains("/read-only/out.txt"));
    }

    #[test]
    fn missing_tool_is_permanent() {
        let human = humanize_error(&QrsweepError::ToolNotFound("pdftoppm".into()));
        assert_eq!(human.severity, Severity::Permanent);
    }

    #[test]
    fn missing_file_is_action_required() {
        let err = QrsweepError::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(humanize_error(&err).severity, Severity::ActionRequired);
    }

    #[test]
    fn display_joins_message_and_suggestion() {
        let human = humanize_error(&QrsweepError::DocumentNotOpen);
        assert_eq!(
            human.to_string(),
            "No PDF file is open. Choose a PDF file to process, then start decoding."
        );
    }
}
