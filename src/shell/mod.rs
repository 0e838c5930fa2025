//! Terminal front end: the interactive loop and output rendering
pub mod completer;
pub mod formatter;
pub mod repl;

pub use completer::SheetHelper;
pub use formatter::{format_catalog, format_columns, format_result, format_stats, OutputFormat};
pub use repl::{dispatch, run, DisplayOptions, Flow, HELP};
