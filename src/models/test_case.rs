//! Test case models
//!
//! Defines generated test case content, stored records and their status.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned identifier of a test case record
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestCaseId(String);

impl TestCaseId {
    /// Identifier for the record at `index` in seed order
    pub fn from_index(index: usize) -> Self {
        Self(format!("case-{index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TestCaseId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TestCaseId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for TestCaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw test case content as produced by a generator
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseContent {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub expected_result: String,
}

impl TestCaseContent {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_step(mut self, step: impl Into<String>) -> Self {
        self.steps.push(step.into());
        self
    }

    pub fn with_expected_result(mut self, expected: impl Into<String>) -> Self {
        self.expected_result = expected.into();
        self
    }
}

/// Execution status of a test case
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    #[default]
    Pending,
    Running,
    Passed,
    Failed,
}

impl TestStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            TestStatus::Pending => "○",
            TestStatus::Running => "…",
            TestStatus::Passed => "✓",
            TestStatus::Failed => "✗",
        }
    }

    /// `passed` or `failed`
    pub fn is_terminal(&self) -> bool {
        matches!(self, TestStatus::Passed | TestStatus::Failed)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TestStatus::Passed)
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestStatus::Pending => write!(f, "PENDING"),
            TestStatus::Running => write!(f, "RUNNING"),
            TestStatus::Passed => write!(f, "PASSED"),
            TestStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// A stored test case record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub id: TestCaseId,
    pub title: String,
    pub description: String,
    pub steps: Vec<String>,
    pub expected_result: String,
    pub status: TestStatus,
}

impl TestCase {
    /// Create a pending record from generated content
    pub fn from_content(id: TestCaseId, content: TestCaseContent) -> Self {
        Self {
            id,
            title: content.title,
            description: content.description,
            steps: content.steps,
            expected_result: content.expected_result,
            status: TestStatus::Pending,
        }
    }

    /// Content fields of this record, without identity or status
    pub fn content(&self) -> TestCaseContent {
        TestCaseContent {
            title: self.title.clone(),
            description: self.description.clone(),
            steps: self.steps.clone(),
            expected_result: self.expected_result.clone(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == TestStatus::Running
    }

    /// Whether `other` differs from this record in any content field
    pub fn content_differs(&self, other: &TestCase) -> bool {
        self.title != other.title
            || self.description != other.description
            || self.steps != other.steps
            || self.expected_result != other.expected_result
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.status.symbol(), self.id, self.title)
    }
}

/// Partial update of a test case record
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TestCasePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub steps: Option<Vec<String>>,
    pub expected_result: Option<String>,
    pub status: Option<TestStatus>,
}

impl TestCasePatch {
    /// Patch that only changes the status
    pub fn status(status: TestStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn steps(mut self, steps: Vec<String>) -> Self {
        self.steps = Some(steps);
        self
    }

    pub fn expected_result(mut self, expected: impl Into<String>) -> Self {
        self.expected_result = Some(expected.into());
        self
    }

    pub fn touches_content(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.steps.is_some()
            || self.expected_result.is_some()
    }

    /// Merge the provided fields into `record`
    pub fn apply_to(self, record: &mut TestCase) {
        if let Some(title) = self.title {
            record.title = title;
        }
        if let Some(description) = self.description {
            record.description = description;
        }
        if let Some(steps) = self.steps {
            record.steps = steps;
        }
        if let Some(expected) = self.expected_result {
            record.expected_result = expected;
        }
        if let Some(status) = self.status {
            record.status = status;
        }
    }
}
