//! The Fetcher contract (spec §6): a fetcher for source `S` writes only to
//! `raw/<S>/` and reports its own run stats; it never touches another
//! layer or another source's directory.

use chrono::{DateTime, Utc};
use culturemech_core::RunReport;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FetchStats {
    pub fetch_date: DateTime<Utc>,
    pub total_records: usize,
    pub success_rate: f64,
}

impl FetchStats {
    pub fn new(fetch_date: DateTime<Utc>, total_records: usize, succeeded: usize) -> Self {
        let success_rate = if total_records == 0 {
            0.0
        } else {
            succeeded as f64 / total_records as f64
        };
        Self { fetch_date, total_records, success_rate }
    }

    /// Summarize a full `RunReport` (spec §9 "Batch error aggregation") into
    /// the lightweight stats a fetcher persists alongside its raw output.
    pub fn from_report(fetch_date: DateTime<Utc>, report: &RunReport) -> Self {
        Self::new(fetch_date, report.outcomes.len(), report.succeeded())
    }
}

/// Implemented by each source-specific fetcher. `fetch_all` writes raw
/// payloads to the Layer-1 store itself (not returned here, since Layer 1
/// may be very large) and returns only the run's statistics.
pub trait Fetcher {
    fn source(&self) -> &'static str;
    fn fetch_all(&self) -> FetchStats;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_rate_is_zero_for_empty_run() {
        let stats = FetchStats::new(Utc::now(), 0, 0);
        assert_eq!(stats.success_rate, 0.0);
    }

    #[test]
    fn success_rate_divides_correctly() {
        let stats = FetchStats::new(Utc::now(), 4, 3);
        assert_eq!(stats.success_rate, 0.75);
    }

    #[test]
    fn derives_from_a_run_report() {
        use culturemech_core::RunOutcome;
        let mut report = RunReport::new();
        report.record(RunOutcome::success("DSMZ_1_medium"));
        report.record(RunOutcome::failure("DSMZ_2_medium", "timeout"));
        let stats = FetchStats::from_report(Utc::now(), &report);
        assert_eq!(stats.total_records, 2);
        assert_eq!(stats.success_rate, 0.5);
    }
}
