//! Batch-run aggregation (spec §9 design notes, "Batch error aggregation"):
//! every fetcher, importer, or batch pass over a `LayerStore` wraps its
//! per-record result in a [`RunOutcome`] and folds the whole batch into one
//! [`RunReport`] at the boundary, instead of threading ad hoc counters
//! through stage code.

use serde::{Deserialize, Serialize};

/// One record's outcome within a batch pass. `error` carries the failure's
/// display text rather than a typed error, since a single report aggregates
/// outcomes from heterogeneous error types across stages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub record_id: String,
    pub error: Option<String>,
}

impl RunOutcome {
    pub fn success(record_id: impl Into<String>) -> Self {
        Self { record_id: record_id.into(), error: None }
    }

    pub fn failure(record_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self { record_id: record_id.into(), error: Some(error.into()) }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Rolled-up outcome of one batch pass (a fetch run, an import run, a
/// validation sweep) over many records.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub outcomes: Vec<RunOutcome>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: RunOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &RunOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn success_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            0.0
        } else {
            self.succeeded() as f64 / self.outcomes.len() as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_success_and_failure_counts() {
        let mut report = RunReport::new();
        report.record(RunOutcome::success("DSMZ_1_medium"));
        report.record(RunOutcome::failure("DSMZ_2_medium", "malformed YAML"));
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn success_rate_is_zero_for_an_empty_run() {
        assert_eq!(RunReport::new().success_rate(), 0.0);
    }
}
