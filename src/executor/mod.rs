//! Executor module - runs queries against the tabular store
//!
//! - query: statement execution, result materialization
//! - stats: per-column summaries of the current result
pub mod query;
pub mod stats;

pub use query::QueryExecutor;
pub use stats::{ColumnStats, NumericSummary, ResultStats};
