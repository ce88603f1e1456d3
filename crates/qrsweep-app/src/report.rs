// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Run summary rendering for the terminal (plain text) and for scripts (JSON).

use qrsweep_core::error::Result;
use qrsweep_core::types::RunSummary;
use serde::Serialize;

/// JSON document printed with `--json`.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub document: &'a str,
    #[serde(flatten)]
    pub summary: &'a RunSummary,
    /// Decoded and manually added entries, in export order.
    pub entries: &'a [String],
}

pub fn render_json(report: &Report<'_>) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn render_text(report: &Report<'_>) -> String {
    let summary = report.summary;
    let elapsed = summary.finished_at - summary.started_at;
    let mut lines = vec![
        format!("Document: {}", report.document),
        format!(
            "Pages processed: {} of {}{}",
            summary.pages_processed,
            summary.page_count,
            if summary.cancelled { " (cancelled)" } else { "" }
        ),
        format!("Decoded entries: {}", summary.decoded),
        format!("Unreadable pages: {}", summary.unreadable_list()),
    ];
    let manual = report.entries.len().saturating_sub(summary.decoded);
    if manual > 0 {
        lines.push(format!("Manual entries: {manual}"));
    }
    lines.push(format!("Elapsed: {:.1}s", elapsed.num_milliseconds() as f64 / 1000.0));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn summary(unreadable: Vec<u32>, cancelled: bool) -> RunSummary {
        let started_at = Utc::now();
        RunSummary {
            page_count: 4,
            pages_processed: if cancelled { 2 } else { 4 },
            decoded: 2,
            unreadable_pages: unreadable,
            cancelled,
            started_at,
            finished_at: started_at + Duration::milliseconds(1500),
        }
    }

    #[test]
    fn text_lists_unreadable_pages() {
        let summary = summary(vec![2, 4], false);
        let entries = ["a".to_string(), "b".to_string()];
        let text = render_text(&Report {
            document: "batch.pdf",
            summary: &summary,
            entries: &entries,
        });

        assert!(text.contains("Pages processed: 4 of 4\n"));
        assert!(text.contains("Unreadable pages: 2, 4"));
        assert!(text.contains("Elapsed: 1.5s"));
        assert!(!text.contains("Manual entries"));
    }

    #[test]
    fn text_handles_no_unreadable_pages() {
        let summary = summary(Vec::new(), true);
        let entries = ["a".to_string(), "b".to_string(), "typed".to_string()];
        let text = render_text(&Report {
            document: "batch.pdf",
            summary: &summary,
            entries: &entries,
        });

        assert!(text.contains("Unreadable pages: none"));
        assert!(text.contains("2 of 4 (cancelled)"));
        assert!(text.contains("Manual entries: 1"));
    }

    #[test]
    fn json_flattens_summary() {
        let summary = summary(vec![3], false);
        let entries = ["x".to_string()];
        let json = render_json(&Report {
            document: "batch.pdf",
            summary: &summary,
            entries: &entries,
        })
        .unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["document"], "batch.pdf");
        assert_eq!(value["page_count"], 4);
        assert_eq!(value["unreadable_pages"], serde_json::json!([3]));
        assert_eq!(value["entries"], serde_json::json!(["x"]));
    }
}
