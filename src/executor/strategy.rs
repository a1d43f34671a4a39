//! Test executor strategies
//!
//! The engine hands each test case to a [`TestExecutor`]; the simulated
//! executor stands in for real browser automation.

#![allow(dead_code)]

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::debug;

use crate::config::SimulationConfig;
use crate::models::{TestCaseContent, TestStatus};

const DEFAULT_PASS_PROBABILITY: f64 = 0.7;

/// Result reported by an executor for one test case
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail,
}

impl Outcome {
    /// Terminal status recorded for this outcome
    pub fn status(self) -> TestStatus {
        match self {
            Outcome::Pass => TestStatus::Passed,
            Outcome::Fail => TestStatus::Failed,
        }
    }
}

/// Executor errors, distinct from a failing outcome
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    #[error("Execution failed: {0}")]
    Failed(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

/// Runs a single test case
#[async_trait]
pub trait TestExecutor: Send + Sync {
    async fn execute(&self, case: &TestCaseContent) -> Result<Outcome, ExecutorError>;
}

/// Executor with randomized latency and outcome
#[derive(Clone, Debug)]
pub struct SimulatedExecutor {
    base_delay: Duration,
    jitter: Duration,
    pass_probability: f64,
}

impl SimulatedExecutor {
    pub fn new(base_delay: Duration, jitter: Duration) -> Self {
        Self {
            base_delay,
            jitter,
            pass_probability: DEFAULT_PASS_PROBABILITY,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(
            Duration::from_millis(config.base_delay_ms),
            Duration::from_millis(config.jitter_ms),
        )
        .with_pass_probability(config.pass_probability)
    }

    /// Clamped to 0.0-1.0; NaN falls back to the default
    pub fn with_pass_probability(mut self, probability: f64) -> Self {
        self.pass_probability = if probability.is_nan() {
            DEFAULT_PASS_PROBABILITY
        } else {
            probability.clamp(0.0, 1.0)
        };
        self
    }

    fn next_delay(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        self.base_delay + Duration::from_millis(rand::random_range(0..=jitter_ms))
    }
}

impl Default for SimulatedExecutor {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000), Duration::from_millis(1000))
    }
}

#[async_trait]
impl TestExecutor for SimulatedExecutor {
    async fn execute(&self, case: &TestCaseContent) -> Result<Outcome, ExecutorError> {
        let delay = self.next_delay();
        debug!("Simulating '{}' ({} steps) for {}ms", case.title, case.steps.len(), delay.as_millis());
        sleep(delay).await;

        if rand::random_bool(self.pass_probability) {
            Ok(Outcome::Pass)
        } else {
            Ok(Outcome::Fail)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_status() {
        assert_eq!(Outcome::Pass.status(), TestStatus::Passed);
        assert_eq!(Outcome::Fail.status(), TestStatus::Failed);
    }

    #[test]
    fn test_delay_within_bounds() {
        let executor = SimulatedExecutor::new(Duration::from_millis(700), Duration::from_millis(500));
        for _ in 0..50 {
            let delay = executor.next_delay();
            assert!(delay >= Duration::from_millis(700));
            assert!(delay <= Duration::from_millis(1200));
        }
    }

    #[test]
    fn test_probability_clamped() {
        let executor = SimulatedExecutor::default().with_pass_probability(3.0);
        assert_eq!(executor.pass_probability, 1.0);
    }

    #[tokio::test]
    async fn test_nan_probability_uses_default() {
        let executor = SimulatedExecutor::new(Duration::ZERO, Duration::ZERO)
            .with_pass_probability(f64::NAN);
        assert_eq!(executor.pass_probability, DEFAULT_PASS_PROBABILITY);

        // must not panic inside the random draw
        let case = TestCaseContent::new("Checkout");
        assert!(executor.execute(&case).await.is_ok());
    }

    #[tokio::test]
    async fn test_certain_outcomes() {
        let case = TestCaseContent::new("Browse products");

        let always_pass = SimulatedExecutor::new(Duration::ZERO, Duration::ZERO).with_pass_probability(1.0);
        assert_eq!(always_pass.execute(&case).await, Ok(Outcome::Pass));

        let always_fail = SimulatedExecutor::new(Duration::ZERO, Duration::ZERO).with_pass_probability(0.0);
        assert_eq!(always_fail.execute(&case).await, Ok(Outcome::Fail));
    }
}
