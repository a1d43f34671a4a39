//! Output formatting module
//!
//! Provides various output formats for test cases and reports.

mod formatter;

pub use formatter::{OutputFormat, ReportFormatter};
