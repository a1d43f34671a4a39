//! Test execution engine
//!
//! Provides sequential execution of test cases over a pluggable executor.

mod engine;
mod strategy;

pub use engine::{BatchOutcome, EngineError, ExecutionEngine};
pub use strategy::{ExecutorError, Outcome, SimulatedExecutor, TestExecutor};
