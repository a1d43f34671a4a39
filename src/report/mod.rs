//! Report generation
//!
//! Summaries and immutable snapshots of test case state.

mod aggregator;

pub use aggregator::ReportAggregator;
