//! Report models
//!
//! Immutable snapshots of test case state.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{TestCase, TestCaseId, TestStatus};

/// Aggregate counts of a report
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Records still pending or running when the report was taken
    pub pending: usize,
}

impl ReportSummary {
    /// Number of records with a terminal status
    pub fn executed(&self) -> usize {
        self.passed + self.failed
    }

    /// Pass rate over executed records, in percent
    pub fn pass_rate(&self) -> f64 {
        let executed = self.executed();
        if executed == 0 {
            0.0
        } else {
            (self.passed as f64 / executed as f64) * 100.0
        }
    }

    pub fn is_all_passed(&self) -> bool {
        self.total > 0 && self.passed == self.total
    }
}

/// Per-case row of a report
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReportEntry<'a> {
    pub id: &'a TestCaseId,
    pub title: &'a str,
    pub status: TestStatus,
}

/// Point-in-time report over all test cases
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub summary: ReportSummary,
    pub details: Vec<TestCase>,
    pub generated_at: DateTime<Utc>,
}

impl Report {
    pub fn pass_rate(&self) -> f64 {
        self.summary.pass_rate()
    }

    /// Rows sufficient to render a per-case view
    pub fn entries(&self) -> impl Iterator<Item = ReportEntry<'_>> {
        self.details.iter().map(|tc| ReportEntry {
            id: &tc.id,
            title: &tc.title,
            status: tc.status,
        })
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Test Execution Report")?;
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        for case in &self.details {
            writeln!(f, "  {case}")?;
        }
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(
            f,
            "Total: {} | Passed: {} | Failed: {} | Pending: {}",
            self.summary.total, self.summary.passed, self.summary.failed, self.summary.pending
        )?;
        writeln!(f, "Pass Rate: {:.0}%", self.pass_rate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_rate_over_executed_only() {
        let summary = ReportSummary {
            total: 4,
            passed: 1,
            failed: 1,
            pending: 2,
        };
        assert_eq!(summary.executed(), 2);
        assert_eq!(summary.pass_rate(), 50.0);
    }

    #[test]
    fn test_pass_rate_nothing_executed() {
        let summary = ReportSummary {
            total: 3,
            pending: 3,
            ..Default::default()
        };
        assert_eq!(summary.pass_rate(), 0.0);
        assert!(!summary.is_all_passed());
    }
}
