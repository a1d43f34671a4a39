//! Test case storage
//!
//! In-memory record store; the only owner of test case state.

mod records;

pub use records::{StoreError, TestCaseStore};
