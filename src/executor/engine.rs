//! Test execution engine
//!
//! Drives status transitions for single test cases and sequential batches.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::strategy::{ExecutorError, TestExecutor};
use crate::events::{EventBus, Progress, RunEvent};
use crate::models::{
    Report, TestCase, TestCaseContent, TestCaseId, TestCasePatch, TestStatus,
};
use crate::report::ReportAggregator;
use crate::store::{StoreError, TestCaseStore};
use crate::utils::Timer;

/// Engine errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Test case not found: {0}")]
    NotFound(TestCaseId),

    #[error("Already running: {0}")]
    AlreadyRunning(String),

    #[error("Invalid state for {id}: {reason}")]
    InvalidState { id: TestCaseId, reason: String },
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => EngineError::NotFound(id),
            StoreError::InvalidState { id, reason } => EngineError::InvalidState { id, reason },
        }
    }
}

/// Result of a completed batch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
}

/// Ids being processed by one run-all, plus the cursor into them
#[derive(Debug)]
struct ExecutionBatch {
    ids: Vec<TestCaseId>,
    cursor: usize,
}

impl ExecutionBatch {
    fn new(ids: Vec<TestCaseId>) -> Self {
        Self { ids, cursor: 0 }
    }

    fn len(&self) -> usize {
        self.ids.len()
    }

    fn current(&self) -> Option<&TestCaseId> {
        self.ids.get(self.cursor)
    }

    /// Mark the current record complete
    fn advance(&mut self) -> Progress {
        self.cursor += 1;
        self.progress()
    }

    fn progress(&self) -> Progress {
        Progress::new(self.cursor, self.ids.len())
    }
}

/// Clears the batch flag when the batch ends, however it ends
struct BatchGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BatchGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Puts a running record back to pending if its execution is abandoned,
/// e.g. when the caller drops the `run_one`/`run_all` future
struct RunningGuard {
    store: Arc<Mutex<TestCaseStore>>,
    id: Option<TestCaseId>,
}

impl RunningGuard {
    fn new(store: Arc<Mutex<TestCaseStore>>, id: TestCaseId) -> Self {
        Self {
            store,
            id: Some(id),
        }
    }

    /// The record reached a terminal status
    fn disarm(mut self) {
        self.id = None;
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };
        warn!("Execution of {} was abandoned, resetting it to pending", id);

        match self.store.try_lock() {
            Ok(mut store) => release_abandoned(&mut store, &id),
            Err(_) => {
                let store = self.store.clone();
                if let Ok(handle) = tokio::runtime::Handle::try_current() {
                    handle.spawn(async move {
                        release_abandoned(&mut *store.lock().await, &id);
                    });
                }
            }
        }
    }
}

fn release_abandoned(store: &mut TestCaseStore, id: &TestCaseId) {
    if store.get(id).is_some_and(TestCase::is_running) {
        if let Err(e) = store.update(id, TestCasePatch::status(TestStatus::Pending)) {
            warn!("Failed to reset {}: {}", id, e);
        }
    }
}

/// Runs test cases against a [`TestExecutor`] and owns the record store
pub struct ExecutionEngine {
    store: Arc<Mutex<TestCaseStore>>,
    executor: Arc<dyn TestExecutor>,
    events: EventBus,
    batch_active: AtomicBool,
    timeout: Option<Duration>,
}

impl ExecutionEngine {
    /// Create an engine with an empty store
    pub fn new(executor: Arc<dyn TestExecutor>) -> Self {
        let events = EventBus::new();
        Self {
            store: Arc::new(Mutex::new(TestCaseStore::with_events(events.clone()))),
            executor,
            events,
            batch_active: AtomicBool::new(false),
            timeout: None,
        }
    }

    /// Bound every executor invocation; a timeout counts as a failure
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Receive store and engine events from now on
    pub fn subscribe(&self) -> UnboundedReceiver<RunEvent> {
        self.events.subscribe()
    }

    pub fn is_batch_running(&self) -> bool {
        self.batch_active.load(Ordering::SeqCst)
    }

    /// Replace all records with fresh pending ones
    pub async fn seed(
        &self,
        raw_cases: impl IntoIterator<Item = TestCaseContent>,
    ) -> Result<Vec<TestCase>, EngineError> {
        let mut store = self.store.lock().await;
        self.ensure_idle()?;
        if store.any_running() {
            return Err(EngineError::AlreadyRunning(
                "cannot replace test cases while one is running".to_string(),
            ));
        }
        Ok(store.seed(raw_cases).to_vec())
    }

    /// Merge a content `patch` into a record. Status only changes through
    /// `run_one` and `run_all`.
    pub async fn update(&self, id: &TestCaseId, patch: TestCasePatch) -> Result<TestCase, EngineError> {
        if patch.status.is_some() {
            return Err(EngineError::InvalidState {
                id: id.clone(),
                reason: "status is set by test execution only".to_string(),
            });
        }
        let mut store = self.store.lock().await;
        self.ensure_idle()?;
        Ok(store.update(id, patch)?)
    }

    /// Save an edited record; its id and status are kept
    pub async fn replace(&self, id: &TestCaseId, record: TestCase) -> Result<TestCase, EngineError> {
        let mut store = self.store.lock().await;
        self.ensure_idle()?;
        Ok(store.replace(id, record)?)
    }

    pub async fn list(&self) -> Vec<TestCase> {
        self.store.lock().await.list().to_vec()
    }

    pub async fn get(&self, id: &TestCaseId) -> Option<TestCase> {
        self.store.lock().await.get(id).cloned()
    }

    /// Snapshot the current records; running ones count as pending
    pub async fn report(&self) -> Report {
        let store = self.store.lock().await;
        ReportAggregator::generate(store.list())
    }

    /// No batch active and every record has a terminal status
    pub async fn all_finished(&self) -> bool {
        let store = self.store.lock().await;
        !self.is_batch_running() && store.list().iter().all(|tc| tc.status.is_terminal())
    }

    /// Run a single test case
    pub async fn run_one(&self, id: &TestCaseId) -> Result<TestStatus, EngineError> {
        let content = {
            let mut store = self.store.lock().await;
            self.ensure_idle()?;

            let record = store
                .get(id)
                .ok_or_else(|| EngineError::NotFound(id.clone()))?;
            if record.is_running() {
                return Err(EngineError::AlreadyRunning(format!("test case {id}")));
            }

            store
                .update(id, TestCasePatch::status(TestStatus::Running))?
                .content()
        };

        info!("Running {}: {}", id, content.title);
        self.execute_record(id, content).await
    }

    /// Reset every record and run them one at a time in store order
    pub async fn run_all(&self) -> Result<BatchOutcome, EngineError> {
        let _guard = BatchGuard::acquire(&self.batch_active)
            .ok_or_else(|| EngineError::AlreadyRunning("a batch is in progress".to_string()))?;
        let timer = Timer::start("batch");

        let mut batch = {
            let mut store = self.store.lock().await;
            if store.any_running() {
                return Err(EngineError::AlreadyRunning(
                    "a test case is still running".to_string(),
                ));
            }
            store.reset_all();
            ExecutionBatch::new(store.ids())
        };

        let total = batch.len();
        info!("Starting batch of {} test cases", total);
        self.events.publish(RunEvent::BatchStarted { total });

        if total == 0 {
            self.events.publish(RunEvent::Progress(batch.progress()));
        }

        let mut outcome = BatchOutcome {
            total,
            ..Default::default()
        };

        while let Some(id) = batch.current().cloned() {
            let content = self
                .store
                .lock()
                .await
                .update(&id, TestCasePatch::status(TestStatus::Running))?
                .content();

            match self.execute_record(&id, content).await? {
                TestStatus::Passed => outcome.passed += 1,
                _ => outcome.failed += 1,
            }

            let progress = batch.advance();
            debug!(
                "Batch progress {}/{} ({:.0}%)",
                progress.completed,
                progress.total,
                progress.percent()
            );
            self.events.publish(RunEvent::Progress(progress));
        }

        outcome.duration_ms = timer.stop().as_millis() as u64;
        self.events.publish(RunEvent::BatchFinished {
            passed: outcome.passed,
            failed: outcome.failed,
        });

        info!(
            "Batch completed in {}ms - Passed: {}/{}",
            outcome.duration_ms, outcome.passed, outcome.total
        );

        Ok(outcome)
    }

    /// Await the executor for a record already marked running, then record
    /// the terminal status. Executor errors become `failed`.
    async fn execute_record(
        &self,
        id: &TestCaseId,
        content: TestCaseContent,
    ) -> Result<TestStatus, EngineError> {
        let timer = Timer::start(id.to_string());
        let guard = RunningGuard::new(self.store.clone(), id.clone());

        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.executor.execute(&content))
                .await
                .unwrap_or(Err(ExecutorError::Timeout(limit))),
            None => self.executor.execute(&content).await,
        };

        let status = match result {
            Ok(outcome) => outcome.status(),
            Err(e) => {
                warn!("Executor failed for {}: {}", id, e);
                self.events.publish(RunEvent::ExecutorFailed {
                    id: id.clone(),
                    message: e.to_string(),
                });
                TestStatus::Failed
            }
        };

        let record = self
            .store
            .lock()
            .await
            .update(id, TestCasePatch::status(status))?;
        guard.disarm();
        info!("  {} [{}ms]", record, timer.elapsed_ms());

        Ok(status)
    }

    // Callers hold the store lock so a batch cannot start in between.
    fn ensure_idle(&self) -> Result<(), EngineError> {
        if self.is_batch_running() {
            return Err(EngineError::AlreadyRunning(
                "a batch is in progress".to_string(),
            ));
        }
        Ok(())
    }
}
