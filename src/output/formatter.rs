//! Output formatters for test cases and reports
//!
//! Provides Table, JSON, CSV and summary output formats.

#![allow(dead_code)]

use anyhow::Result;
use std::str::FromStr;

use crate::events::Progress;
use crate::models::{Report, ReportEntry, TestCase, TestStatus};

/// Output format options
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    JsonPretty,
    Csv,
    Summary,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Ok(OutputFormat::JsonPretty),
            "csv" => Ok(OutputFormat::Csv),
            "summary" => Ok(OutputFormat::Summary),
            other => Err(format!("Unknown output format: {other}")),
        }
    }
}

/// Report and test case formatter
pub struct ReportFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ReportFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    /// Format a report
    pub fn format_report(&self, report: &Report) -> String {
        match self.format {
            OutputFormat::Table => self.format_report_table(report),
            OutputFormat::Json => serde_json::to_string(report).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Csv => report_csv(report).unwrap_or_else(|e| format!("CSV error: {e}")),
            OutputFormat::Summary => self.format_report_brief(report),
        }
    }

    /// Format the generated test cases for review
    pub fn format_cases(&self, cases: &[TestCase]) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string(cases).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(cases).unwrap_or_default(),
            OutputFormat::Csv => cases_csv(cases).unwrap_or_else(|e| format!("CSV error: {e}")),
            OutputFormat::Summary => cases
                .iter()
                .map(|tc| format!("{} {}", tc.id, tc.title))
                .collect::<Vec<_>>()
                .join("\n"),
            OutputFormat::Table => self.format_cases_table(cases),
        }
    }

    /// One-line progress indicator for a running batch
    pub fn format_progress(&self, progress: &Progress) -> String {
        format!(
            "[{}/{}] {:3.0}%",
            progress.completed,
            progress.total,
            progress.percent()
        )
    }

    fn status_label(&self, status: TestStatus) -> String {
        let label = format!("{} {}", status.symbol(), status);
        if !self.colorize {
            return label;
        }
        match status {
            TestStatus::Passed => format!("\x1b[32m{label}\x1b[0m"),
            TestStatus::Failed => format!("\x1b[31m{label}\x1b[0m"),
            TestStatus::Running => format!("\x1b[36m{label}\x1b[0m"),
            TestStatus::Pending => label,
        }
    }

    fn format_report_table(&self, report: &Report) -> String {
        let summary = &report.summary;
        let mut output = String::new();

        output.push_str("\n╔══════════════════════════════════════════════════════════════╗\n");
        output.push_str("║  Test Execution Report                                       ║\n");
        output.push_str(&format!(
            "║  Generated: {:48} ║\n",
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        output.push_str("╠══════════════════════════════════════════════════════════════╣\n");

        for entry in report.entries() {
            output.push_str(&self.entry_row(&entry));
        }

        output.push_str("╠══════════════════════════════════════════════════════════════╣\n");
        output.push_str(&format!(
            "║  Total: {:3} | Passed: {:3} | Failed: {:3} | Pending: {:3}       ║\n",
            summary.total, summary.passed, summary.failed, summary.pending
        ));
        output.push_str(&format!(
            "║  Pass Rate: {:5.1}%                                            ║\n",
            summary.pass_rate()
        ));
        output.push_str("╚══════════════════════════════════════════════════════════════╝\n");

        output
    }

    fn entry_row(&self, entry: &ReportEntry<'_>) -> String {
        format!(
            "║  {:8} {:40} {}\n",
            entry.id.as_str(),
            truncate(entry.title, 40),
            self.status_label(entry.status)
        )
    }

    fn format_report_brief(&self, report: &Report) -> String {
        let summary = &report.summary;
        format!(
            "{}/{} passed, {} failed, {} pending ({:.0}% pass rate)",
            summary.passed,
            summary.total,
            summary.failed,
            summary.pending,
            summary.pass_rate()
        )
    }

    fn format_cases_table(&self, cases: &[TestCase]) -> String {
        let mut output = String::new();

        for (number, case) in cases.iter().enumerate() {
            output.push_str(&format!(
                "\n{:2}. {} [{}]\n",
                number + 1,
                case.title,
                case.id
            ));
            if !case.description.is_empty() {
                output.push_str(&format!("    {}\n", case.description));
            }
            for (i, step) in case.steps.iter().enumerate() {
                output.push_str(&format!("      {}. {}\n", i + 1, step));
            }
            if !case.expected_result.is_empty() {
                output.push_str(&format!("    Expected: {}\n", case.expected_result));
            }
        }

        output
    }
}

fn report_csv(report: &Report) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["id", "title", "status"])?;
    for entry in report.entries() {
        writer.write_record([
            entry.id.as_str(),
            entry.title,
            entry.status.to_string().to_lowercase().as_str(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV: {e}"))?;
    Ok(String::from_utf8(bytes)?)
}

fn cases_csv(cases: &[TestCase]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["id", "title", "description", "steps", "expected_result", "status"])?;
    for case in cases {
        writer.write_record([
            case.id.as_str(),
            case.title.as_str(),
            case.description.as_str(),
            case.steps.join("\n").as_str(),
            case.expected_result.as_str(),
            case.status.to_string().to_lowercase().as_str(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV: {e}"))?;
    Ok(String::from_utf8(bytes)?)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        s.to_string()
    }
}
