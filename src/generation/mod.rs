//! Test case generation
//!
//! Turns a website URL into raw test case content. Generators are external
//! collaborators; this module validates input and normalizes their output.

#![allow(dead_code)]

mod file;
mod llm;

pub use file::{save_test_cases, FileGenerator};
pub use llm::LlmGenerator;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::models::TestCaseContent;

const INVALID_URL_MESSAGE: &str = "Please enter a valid URL.";
const NO_CASES_MESSAGE: &str =
    "Could not generate test cases for this URL. Please try a different one.";

/// Generation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Service(String),
}

/// Produces test case content for a website
#[async_trait]
pub trait TestCaseGenerator: Send + Sync {
    async fn generate(&self, url: &Url) -> Result<Vec<TestCaseContent>, GenerationError>;
}

/// Accept only absolute http(s) URLs with a host
pub fn validate_url(raw: &str) -> Result<Url, GenerationError> {
    let url = Url::parse(raw.trim())
        .map_err(|_| GenerationError::Validation(INVALID_URL_MESSAGE.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(GenerationError::Validation(INVALID_URL_MESSAGE.to_string()));
    }

    Ok(url)
}

/// Validate `raw_url` and ask `generator` for test cases.
///
/// An empty result is reported as a service error.
pub async fn generate_test_cases(
    generator: &dyn TestCaseGenerator,
    raw_url: &str,
) -> Result<Vec<TestCaseContent>, GenerationError> {
    let url = validate_url(raw_url)?;
    info!("Generating test cases for {}", url);

    let cases = generator.generate(&url).await.map_err(|e| {
        error!("Test case generation failed for {}: {}", url, e);
        e
    })?;

    if cases.is_empty() {
        warn!("Generator returned no test cases for {}", url);
        return Err(GenerationError::Service(NO_CASES_MESSAGE.to_string()));
    }

    info!("Generated {} test cases", cases.len());
    Ok(cases)
}

/// Generator payload: either `{"testCases": [...]}` or a bare list
#[derive(Deserialize)]
#[serde(untagged)]
enum GeneratedPayload {
    Wrapped {
        #[serde(rename = "testCases")]
        test_cases: Vec<TestCaseContent>,
    },
    Bare(Vec<TestCaseContent>),
}

impl GeneratedPayload {
    /// Drop cases without a usable title
    fn into_cases(self) -> Vec<TestCaseContent> {
        let cases = match self {
            GeneratedPayload::Wrapped { test_cases } => test_cases,
            GeneratedPayload::Bare(cases) => cases,
        };

        let total = cases.len();
        let usable: Vec<_> = cases
            .into_iter()
            .filter(|case| !case.title.trim().is_empty())
            .collect();
        if usable.len() < total {
            warn!("Discarded {} test cases without a title", total - usable.len());
        }
        usable
    }
}

/// Parse JSON generator output, tolerating a surrounding code fence
pub(crate) fn parse_json_payload(text: &str) -> Result<Vec<TestCaseContent>, GenerationError> {
    let payload: GeneratedPayload = serde_json::from_str(strip_code_fence(text))
        .map_err(|e| GenerationError::Service(format!("Failed to parse generated test cases: {e}")))?;
    Ok(payload.into_cases())
}

/// Parse YAML test case files
pub(crate) fn parse_yaml_payload(text: &str) -> Result<Vec<TestCaseContent>, GenerationError> {
    let payload: GeneratedPayload = serde_yaml::from_str(text)
        .map_err(|e| GenerationError::Service(format!("Failed to parse test cases: {e}")))?;
    Ok(payload.into_cases())
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // skip an optional language tag on the opening fence
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
    body.trim_end().trim_end_matches("```").trim()
}
