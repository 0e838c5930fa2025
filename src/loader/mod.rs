// Spreadsheet reading: calamine workbooks and plain CSV files
pub mod sanitize;
pub mod workbook;

pub use sanitize::{dedupe_names, quote_identifier, sanitize_columns, sanitize_identifier};
pub use workbook::{build_sheet, read_workbook};
