//! Standard-output report sink.

use sqrtbench_core::report::{BenchReport, ReportSink};
use tracing::error;

/// Prints reports on stdout, as console lines or as one JSON document.
#[derive(Debug)]
pub struct Console {
    json: bool,
}

impl Console {
    /// Console printing JSON when `json` is set, text lines otherwise.
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Render `report` the way [`emit`](ReportSink::emit) prints it.
    pub fn render(&self, report: &BenchReport) -> Option<String> {
        if !self.json {
            return Some(report.lines().join("\n"));
        }
        match serde_json::to_string_pretty(report) {
            Ok(json) => Some(json),
            Err(e) => {
                error!(error = %e, "Failed to serialize report");
                None
            }
        }
    }
}

impl ReportSink for Console {
    fn emit(&mut self, report: &BenchReport) {
        if let Some(text) = self.render(report) {
            println!("{text}");
        }
    }
}
