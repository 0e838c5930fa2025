// In-memory tabular store backed by the embedded engine
pub mod tabular_store;

pub use tabular_store::{ColumnInfo, TableNaming, TabularStore};
