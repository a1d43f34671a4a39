//! Test case record store
//!
//! Holds the canonical ordered list of test cases and guards its invariants.

#![allow(dead_code)]

use thiserror::Error;
use tracing::debug;

use crate::events::{EventBus, RunEvent};
use crate::models::{TestCase, TestCaseContent, TestCaseId, TestCasePatch, TestStatus};

/// Store errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Test case not found: {0}")]
    NotFound(TestCaseId),

    #[error("Invalid state for {id}: {reason}")]
    InvalidState { id: TestCaseId, reason: String },
}

/// Ordered collection of test case records
#[derive(Default)]
pub struct TestCaseStore {
    records: Vec<TestCase>,
    events: EventBus,
}

impl TestCaseStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store publishing changes on `events`
    pub fn with_events(events: EventBus) -> Self {
        Self {
            records: Vec::new(),
            events,
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Replace all records with fresh pending ones, in input order
    pub fn seed(&mut self, raw_cases: impl IntoIterator<Item = TestCaseContent>) -> &[TestCase] {
        self.records = raw_cases
            .into_iter()
            .enumerate()
            .map(|(index, content)| TestCase::from_content(TestCaseId::from_index(index), content))
            .collect();

        debug!("Seeded store with {} test cases", self.records.len());
        self.events.publish(RunEvent::Seeded {
            total: self.records.len(),
        });

        &self.records
    }

    /// Merge `patch` into the record with `id`
    pub fn update(&mut self, id: &TestCaseId, patch: TestCasePatch) -> Result<TestCase, StoreError> {
        let index = self.position(id)?;
        let record = &mut self.records[index];

        if patch.touches_content() {
            ensure_editable(record)?;
            if matches!(&patch.title, Some(title) if title.trim().is_empty()) {
                return Err(blank_title(id));
            }
        }

        let previous = record.status;
        patch.apply_to(record);
        if previous != record.status {
            debug!("{}: {} -> {}", id, previous, record.status);
        }

        let updated = record.clone();
        self.events.publish(RunEvent::RecordUpdated(updated.clone()));
        Ok(updated)
    }

    /// Replace the record's content, keeping the stored id and status
    pub fn replace(&mut self, id: &TestCaseId, mut record: TestCase) -> Result<TestCase, StoreError> {
        let index = self.position(id)?;
        let current = &self.records[index];

        if current.content_differs(&record) {
            ensure_editable(current)?;
        }
        if record.title.trim().is_empty() {
            return Err(blank_title(id));
        }

        record.id = current.id.clone();
        record.status = current.status;
        self.records[index] = record.clone();

        debug!("Replaced test case {}", id);
        self.events.publish(RunEvent::RecordUpdated(record.clone()));
        Ok(record)
    }

    /// Set every record back to pending
    pub fn reset_all(&mut self) {
        for record in &mut self.records {
            record.status = TestStatus::Pending;
            self.events.publish(RunEvent::RecordUpdated(record.clone()));
        }
    }

    /// Current ordered records
    pub fn list(&self) -> &[TestCase] {
        &self.records
    }

    pub fn get(&self, id: &TestCaseId) -> Option<&TestCase> {
        self.records.iter().find(|tc| &tc.id == id)
    }

    pub fn ids(&self) -> Vec<TestCaseId> {
        self.records.iter().map(|tc| tc.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn any_running(&self) -> bool {
        self.records.iter().any(TestCase::is_running)
    }

    fn position(&self, id: &TestCaseId) -> Result<usize, StoreError> {
        self.records
            .iter()
            .position(|tc| &tc.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }
}

fn ensure_editable(record: &TestCase) -> Result<(), StoreError> {
    if record.is_running() {
        return Err(StoreError::InvalidState {
            id: record.id.clone(),
            reason: "cannot edit a running test case".to_string(),
        });
    }
    Ok(())
}

fn blank_title(id: &TestCaseId) -> StoreError {
    StoreError::InvalidState {
        id: id.clone(),
        reason: "title must not be empty".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn raw(n: usize) -> Vec<TestCaseContent> {
        (0..n)
            .map(|i| {
                TestCaseContent::new(format!("Case {i}"))
                    .with_description("desc")
                    .with_step("open home page")
                    .with_expected_result("page loads")
            })
            .collect()
    }

    #[test]
    fn test_seed_assigns_unique_pending_ids() {
        let mut store = TestCaseStore::new();
        let records = store.seed(raw(3));

        assert_eq!(records.len(), 3);
        let ids: HashSet<_> = records.iter().map(|tc| tc.id.clone()).collect();
        assert_eq!(ids.len(), 3);
        assert!(records.iter().all(|tc| tc.status == TestStatus::Pending));
        assert_eq!(records[2].title, "Case 2");
    }

    #[test]
    fn test_seed_replaces_prior_list() {
        let mut store = TestCaseStore::new();
        store.seed(raw(5));
        store.seed(raw(2));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_seed_empty() {
        let mut store = TestCaseStore::new();
        store.seed(Vec::new());
        assert!(store.is_empty());
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_update_not_found() {
        let mut store = TestCaseStore::new();
        store.seed(raw(1));

        let err = store
            .update(&"case-99".into(), TestCasePatch::status(TestStatus::Passed))
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound("case-99".into()));
    }

    #[test]
    fn test_update_merges_fields() {
        let mut store = TestCaseStore::new();
        store.seed(raw(2));
        let id = TestCaseId::from_index(1);

        let updated = store
            .update(&id, TestCasePatch::default().title("Renamed"))
            .unwrap();

        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.description, "desc");
        assert_eq!(store.get(&id).unwrap().title, "Renamed");
    }

    #[test]
    fn test_update_rejects_content_edit_while_running() {
        let mut store = TestCaseStore::new();
        store.seed(raw(1));
        let id = TestCaseId::from_index(0);
        store
            .update(&id, TestCasePatch::status(TestStatus::Running))
            .unwrap();

        let err = store
            .update(&id, TestCasePatch::default().title("nope"))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidState { .. }));

        // status transitions remain allowed
        let done = store
            .update(&id, TestCasePatch::status(TestStatus::Failed))
            .unwrap();
        assert_eq!(done.status, TestStatus::Failed);
    }

    #[test]
    fn test_update_rejects_blank_title() {
        let mut store = TestCaseStore::new();
        store.seed(raw(1));
        let err = store
            .update(&TestCaseId::from_index(0), TestCasePatch::default().title("  "))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidState { .. }));
    }

    #[test]
    fn test_replace_preserves_store_id() {
        let mut store = TestCaseStore::new();
        store.seed(raw(2));
        let id = TestCaseId::from_index(0);

        let mut edited = store.get(&id).unwrap().clone();
        edited.id = "case-other".into();
        edited.steps = vec!["step one".to_string(), "step two".to_string()];

        let saved = store.replace(&id, edited).unwrap();
        assert_eq!(saved.id, id);
        assert_eq!(store.list()[0].steps.len(), 2);
        assert!(store.get(&"case-other".into()).is_none());
    }

    #[test]
    fn test_replace_rejects_content_edit_while_running() {
        let mut store = TestCaseStore::new();
        store.seed(raw(1));
        let id = TestCaseId::from_index(0);
        store
            .update(&id, TestCasePatch::status(TestStatus::Running))
            .unwrap();

        let mut edited = store.get(&id).unwrap().clone();
        edited.title = "Renamed".to_string();
        let err = store.replace(&id, edited).unwrap_err();
        assert!(matches!(err, StoreError::InvalidState { .. }));
        assert_eq!(store.list()[0].title, "Case 0");
    }

    #[test]
    fn test_replace_keeps_stored_status() {
        let mut store = TestCaseStore::new();
        store.seed(raw(2));
        let id = TestCaseId::from_index(0);
        store
            .update(&id, TestCasePatch::status(TestStatus::Running))
            .unwrap();

        // same content, different status: the running record stays running
        let mut unchanged = store.get(&id).unwrap().clone();
        unchanged.status = TestStatus::Pending;
        let saved = store.replace(&id, unchanged).unwrap();
        assert_eq!(saved.status, TestStatus::Running);

        let other = TestCaseId::from_index(1);
        let mut edited = store.get(&other).unwrap().clone();
        edited.status = TestStatus::Passed;
        edited.description = "new description".to_string();
        let saved = store.replace(&other, edited).unwrap();
        assert_eq!(saved.status, TestStatus::Pending);
        assert_eq!(saved.description, "new description");
    }

    #[test]
    fn test_replace_not_found() {
        let mut store = TestCaseStore::new();
        store.seed(raw(1));
        let record = store.list()[0].clone();
        let err = store.replace(&"missing".into(), record).unwrap_err();
        assert_eq!(err, StoreError::NotFound("missing".into()));
    }

    #[test]
    fn test_observers_see_full_record() {
        let events = EventBus::new();
        let mut rx = events.subscribe();
        let mut store = TestCaseStore::with_events(events);
        store.seed(raw(1));
        let id = TestCaseId::from_index(0);
        store
            .update(&id, TestCasePatch::status(TestStatus::Passed))
            .unwrap();

        assert_eq!(rx.try_recv().unwrap(), RunEvent::Seeded { total: 1 });
        match rx.try_recv().unwrap() {
            RunEvent::RecordUpdated(record) => {
                assert_eq!(record.id, id);
                assert_eq!(record.status, TestStatus::Passed);
                assert_eq!(record.title, "Case 0");
            }
            other => panic!("Expected RecordUpdated, got {other:?}"),
        }
    }

    #[test]
    fn test_reset_all() {
        let mut store = TestCaseStore::new();
        store.seed(raw(2));
        store
            .update(&TestCaseId::from_index(0), TestCasePatch::status(TestStatus::Failed))
            .unwrap();

        store.reset_all();
        assert!(store.list().iter().all(|tc| tc.status == TestStatus::Pending));
    }
}
