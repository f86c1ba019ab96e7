//! Aggregated outcome of a run.

use chrono::{DateTime, Utc};
use nucleus_shared::{AppError, EntityKind};
use serde::Serialize;

use super::MigrationOutcome;

/// A stage that could not run at all (unreachable source or destination).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageFailure {
    /// Stage name (`source`, `destination`, `report`).
    pub stage: String,
    /// Legacy source involved, if any.
    pub source: Option<String>,
    /// Stable error code (`SOURCE_UNAVAILABLE`, `DATABASE_ERROR`, ...).
    pub code: String,
    /// Error message.
    pub message: String,
}

/// Everything the run did, written to the run report.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: Option<DateTime<Utc>>,
    /// Whether rows were staged in memory only.
    pub dry_run: bool,
    /// Stages that could not run.
    pub failures: Vec<StageFailure>,
    /// One entry per entity migrator invocation.
    pub outcomes: Vec<MigrationOutcome>,
    /// True when nothing failed.
    pub success: bool,
}

impl RunSummary {
    /// Starts a summary.
    #[must_use]
    pub fn start(dry_run: bool) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            dry_run,
            failures: Vec::new(),
            outcomes: Vec::new(),
            success: true,
        }
    }

    /// Records a migrator outcome.
    pub fn record_outcome(&mut self, outcome: MigrationOutcome) {
        if outcome.is_failure() {
            self.success = false;
        }
        self.outcomes.push(outcome);
    }

    /// Records a stage that could not run.
    pub fn record_failure(
        &mut self,
        stage: impl Into<String>,
        source: Option<&str>,
        error: &AppError,
    ) {
        self.success = false;
        self.failures.push(StageFailure {
            stage: stage.into(),
            source: source.map(str::to_string),
            code: error.error_code().to_string(),
            message: error.to_string(),
        });
    }

    /// Returns true when any stage or batch failed.
    #[must_use]
    pub const fn has_failures(&self) -> bool {
        !self.success
    }

    /// Marks the run finished.
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Rows written for one entity across all sources.
    #[must_use]
    pub fn migrated(&self, entity: EntityKind) -> u64 {
        self.outcomes
            .iter()
            .filter(|o| o.entity == entity)
            .map(|o| o.rows_migrated)
            .sum()
    }

    /// Process exit status: 0 on success, 1 on any failure.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        if self.success { 0 } else { 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(entity: EntityKind, migrated: u64, error: Option<&str>) -> MigrationOutcome {
        MigrationOutcome {
            source: "main".into(),
            entity,
            matched_table: Some("Firme".into()),
            rows_read: migrated,
            rows_migrated: migrated,
            rows_skipped: 0,
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn test_clean_run_succeeds() {
        let mut summary = RunSummary::start(false);
        summary.record_outcome(outcome(EntityKind::Company, 3, None));
        summary.record_outcome(outcome(EntityKind::Company, 2, None));
        summary.finish();

        assert!(!summary.has_failures());
        assert_eq!(summary.exit_code(), 0);
        assert_eq!(summary.migrated(EntityKind::Company), 5);
        assert_eq!(summary.migrated(EntityKind::Invoice), 0);
        assert!(summary.finished_at.is_some());
    }

    #[test]
    fn test_failed_batch_fails_run() {
        let mut summary = RunSummary::start(false);
        summary.record_outcome(outcome(EntityKind::Product, 0, Some("boom")));
        assert!(summary.has_failures());
        assert_eq!(summary.exit_code(), 1);
    }

    #[test]
    fn test_stage_failure_fails_run() {
        let mut summary = RunSummary::start(true);
        summary.record_failure(
            "destination",
            None,
            &AppError::Database("connection refused".into()),
        );

        assert_eq!(summary.exit_code(), 1);
        assert_eq!(summary.failures[0].stage, "destination");
        assert_eq!(summary.failures[0].source, None);
        assert_eq!(summary.failures[0].code, "DATABASE_ERROR");
        assert_eq!(summary.failures[0].message, "Database error: connection refused");
    }

    #[test]
    fn test_serializes_outcomes() {
        let mut summary = RunSummary::start(false);
        summary.record_outcome(outcome(EntityKind::Invoice, 1, None));
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["outcomes"][0]["entity"], "invoice");
        assert_eq!(json["outcomes"][0]["matched_table"], "Firme");
    }
}
