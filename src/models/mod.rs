//! Data models for test case management
//!
//! This module contains all data structures used throughout the application.

mod report;
mod test_case;

pub use report::{Report, ReportEntry, ReportSummary};
pub use test_case::{TestCase, TestCaseContent, TestCaseId, TestCasePatch, TestStatus};
