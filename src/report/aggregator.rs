//! Report aggregation
//!
//! Derives summary counts and a detached snapshot from test case records.

use chrono::Utc;

use crate::models::{Report, ReportSummary, TestCase, TestStatus};

/// Builds reports from the current record list
pub struct ReportAggregator;

impl ReportAggregator {
    /// Count statuses in a single pass; running records land in `pending`
    pub fn summarize(records: &[TestCase]) -> ReportSummary {
        let mut summary = ReportSummary {
            total: records.len(),
            ..Default::default()
        };

        for record in records {
            match record.status {
                TestStatus::Passed => summary.passed += 1,
                TestStatus::Failed => summary.failed += 1,
                TestStatus::Pending | TestStatus::Running => summary.pending += 1,
            }
        }

        summary
    }

    /// Snapshot `records` into a report that owns its own copy
    pub fn generate(records: &[TestCase]) -> Report {
        Report {
            summary: Self::summarize(records),
            details: records.to_vec(),
            generated_at: Utc::now(),
        }
    }
}
