//! Benchmark results and the console collaborator.
//!
//! The core never prints. It hands a [`BenchReport`] to a [`ReportSink`], which
//! decides how the lines reach the console.

use crate::vector::Mismatch;
use serde::Serialize;
use sqrtbench_common::ticks::{TickCount, TimerPeriod};
use std::fmt;

/// Timestamps taken around the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Measurement {
    /// Snapshot before the first computation.
    pub before: TickCount,
    /// Snapshot after the last computation.
    pub after: TickCount,
    /// Wraparound-corrected interval.
    pub elapsed: TickCount,
    /// Cost of two back-to-back snapshot reads, when calibration ran.
    pub timer_overhead: Option<TickCount>,
}

/// Everything a benchmark run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchReport {
    /// Engine that was timed.
    pub engine: &'static str,
    /// Passes over the vector between the snapshots.
    pub repeats: u32,
    /// Samples per pass.
    pub samples: usize,
    /// Timer period in effect.
    pub period: TimerPeriod,
    /// Timing.
    pub measurement: Measurement,
    /// `elapsed` converted with the configured clock, in nanoseconds.
    pub elapsed_ns: Option<u64>,
    /// Sum of the computed roots.
    pub checksum: u64,
    /// Mismatches found, or `None` when validation was disabled.
    pub mismatches: Option<Vec<Mismatch>>,
}

impl BenchReport {
    /// Number of mismatches (zero when validation was disabled).
    #[must_use]
    pub fn mismatch_count(&self) -> usize {
        self.mismatches.as_ref().map_or(0, Vec::len)
    }

    /// Whether validation ran and found nothing wrong.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.mismatches.as_ref().is_some_and(Vec::is_empty)
    }

    /// Console lines in output order.
    ///
    /// One `Error in computation of <index>` per mismatch, then the timing line,
    /// then the checksum.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .mismatches
            .iter()
            .flatten()
            .map(|m| format!("Error in computation of {}", m.index))
            .collect();
        lines.push(self.to_string());
        lines.push(format!("restot: {}", self.checksum));
        lines
    }
}

impl fmt::Display for BenchReport {
    /// The timing line: `t1: <before>, t2: <after>, computation duration: <elapsed>`,
    /// with `, errors: <count>` appended when validation ran.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.measurement;
        write!(
            f,
            "t1: {}, t2: {}, computation duration: {}",
            m.before, m.after, m.elapsed
        )?;
        if let Some(mismatches) = &self.mismatches {
            write!(f, ", errors: {}", mismatches.len())?;
        }
        Ok(())
    }
}

/// The console collaborator.
pub trait ReportSink {
    /// Present a finished report.
    fn emit(&mut self, report: &BenchReport);
}

/// Collects the report lines, for tests and for callers that print later.
impl ReportSink for Vec<String> {
    fn emit(&mut self, report: &BenchReport) {
        self.extend(report.lines());
    }
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn emit(&mut self, report: &BenchReport) {
        (**self).emit(report);
    }
}
