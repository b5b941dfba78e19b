//! Types for test and suite result records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::recovery::TestOutcome;

/// Structured record of a single test's result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRecord {
    /// Test identifier
    pub name: String,

    /// Final outcome, after any health-check adjustment
    pub outcome: TestOutcome,

    /// App memory usage sampled after the test (MB), when available
    pub memory_used_mb: Option<u64>,

    /// Platform diagnostics attached by the orchestrator
    pub diagnostics: Vec<String>,

    /// When the record was emitted
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
}

impl TestRecord {
    /// Create a record for a finished test
    pub fn new(name: String, outcome: TestOutcome) -> Self {
        Self {
            name,
            outcome,
            memory_used_mb: None,
            diagnostics: Vec::new(),
            timestamp: Utc::now(),
        }
    }
}

/// Aggregate result of a complete suite run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Per-test records in execution order
    pub records: Vec<TestRecord>,

    /// Maximum app memory usage observed across the suite (MB)
    pub max_memory_observed_mb: u64,

    /// Number of passing tests
    pub passed: usize,

    /// Number of failing tests
    pub failed: usize,

    /// Number of skipped tests
    pub skipped: usize,
}

impl SuiteReport {
    /// Build a report from accumulated records.
    pub fn from_records(records: Vec<TestRecord>, max_memory_observed_mb: u64) -> Self {
        let passed = records
            .iter()
            .filter(|r| r.outcome == TestOutcome::Success)
            .count();
        let failed = records
            .iter()
            .filter(|r| r.outcome == TestOutcome::Failure)
            .count();
        let skipped = records
            .iter()
            .filter(|r| r.outcome == TestOutcome::Skipped)
            .count();

        Self {
            records,
            max_memory_observed_mb,
            passed,
            failed,
            skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_report_counts_outcomes() {
        let records = vec![
            TestRecord::new("a".to_string(), TestOutcome::Success),
            TestRecord::new("b".to_string(), TestOutcome::Failure),
            TestRecord::new("c".to_string(), TestOutcome::Success),
            TestRecord::new("d".to_string(), TestOutcome::Skipped),
        ];

        let report = SuiteReport::from_records(records, 180);

        assert_eq!(report.passed, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.max_memory_observed_mb, 180);
    }

    #[test]
    fn test_record_serializes_to_json() {
        let mut record = TestRecord::new("login_test".to_string(), TestOutcome::Failure);
        record.memory_used_mb = Some(200);
        record.diagnostics.push("memory over limit".to_string());

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["name"], "login_test");
        assert_eq!(value["outcome"], "Failure");
        assert_eq!(value["memory_used_mb"], 200);
    }
}
