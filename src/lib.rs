// SheetSQL - query spreadsheet workbooks with SQL
// Workbooks are loaded into an in-memory engine; saved queries live in a JSON catalog

// Clippy configuration - allow non-critical warnings
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::format_push_string)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]

// Values, sheets, result sets, errors
pub mod core;

// Workbook reading (calamine, CSV) and identifier sanitization
pub mod loader;

// In-memory tabular store (embedded SQLite)
pub mod storage;

// Query execution and result statistics
pub mod executor;

// Saved-query catalog with folders and JSON persistence
pub mod catalog;

// Query templates and format-aware suggestions
pub mod suggest;

// Result export (CSV, XLSX, JSON)
pub mod export;

// Session controller tying store, executor and catalog together
pub mod session;

// REPL command parser (meta-commands, SQL passthrough)
pub mod parser;

// Layered configuration (file, environment)
pub mod config;

// Terminal front end (REPL, output formatting)
pub mod shell;

// Re-export commonly used types for convenience
pub use crate::core::{DataType, ResultSet, SessionError, Value};
pub use crate::catalog::{CatalogEntry, EntryId, QueryCatalog};
pub use crate::config::AppConfig;
pub use crate::executor::QueryExecutor;
pub use crate::export::ExportFormat;
pub use crate::parser::{parse_command, Command};
pub use crate::session::Session;
pub use crate::storage::TabularStore;
