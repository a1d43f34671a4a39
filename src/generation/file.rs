//! File-backed test case generator
//!
//! Reads previously generated (and possibly hand-edited) test cases from a
//! JSON or YAML file.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{parse_json_payload, parse_yaml_payload, GenerationError, TestCaseGenerator};
use crate::models::TestCaseContent;

/// Generator returning the contents of a test case file
#[derive(Clone, Debug)]
pub struct FileGenerator {
    path: PathBuf,
}

impl FileGenerator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file without going through URL validation
    pub fn load(&self) -> Result<Vec<TestCaseContent>, GenerationError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            GenerationError::Service(format!(
                "Failed to read test cases from {}: {e}",
                self.path.display()
            ))
        })?;

        if is_yaml_file(&self.path) {
            parse_yaml_payload(&content)
        } else {
            parse_json_payload(&content)
        }
    }
}

#[async_trait]
impl TestCaseGenerator for FileGenerator {
    async fn generate(&self, url: &Url) -> Result<Vec<TestCaseContent>, GenerationError> {
        debug!("Loading test cases for {} from {}", url, self.path.display());
        self.load()
    }
}

#[derive(Serialize)]
struct TestCaseFile<'a> {
    #[serde(rename = "testCases")]
    test_cases: &'a [TestCaseContent],
}

/// Write test cases in the format [`FileGenerator`] reads back
pub fn save_test_cases(path: impl AsRef<Path>, cases: &[TestCaseContent]) -> Result<()> {
    let path = path.as_ref();
    let file = TestCaseFile { test_cases: cases };

    let content = if is_yaml_file(path) {
        serde_yaml::to_string(&file).context("Failed to serialize test cases")?
    } else {
        serde_json::to_string_pretty(&file).context("Failed to serialize test cases")?
    };

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write test cases: {}", path.display()))?;
    Ok(())
}

fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}
