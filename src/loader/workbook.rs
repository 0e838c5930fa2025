use std::fs;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDateTime;
use tracing::{debug, info};

use super::sanitize::sanitize_columns;
use crate::core::{Column, DataType, LoadError, Sheet, Value, Workbook};

/// Largest float that still converts to an integer without loss
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Spreadsheet container formats handled by calamine
const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "xla", "ods"];

/// Reads a workbook file into its sheets.
///
/// `.csv` files become a single sheet named after the file stem; spreadsheet
/// containers yield one sheet per worksheet in workbook order. The first row of
/// every sheet is the header row.
pub fn read_workbook(path: &Path) -> Result<Workbook, LoadError> {
    fs::metadata(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    let sheets = if extension == "csv" {
        vec![read_csv(path, &stem)?]
    } else if SPREADSHEET_EXTENSIONS.contains(&extension.as_str()) {
        read_spreadsheet(path)?
    } else {
        return Err(LoadError::UnsupportedFormat(path.to_path_buf()));
    };

    info!(path = %path.display(), sheets = sheets.len(), "read workbook");
    Ok(Workbook { stem, sheets })
}

fn malformed(path: &Path, err: impl std::fmt::Display) -> LoadError {
    LoadError::Malformed {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn read_spreadsheet(path: &Path) -> Result<Vec<Sheet>, LoadError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| malformed(path, e))?;
    let names = workbook.sheet_names();

    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| malformed(path, format!("sheet '{name}': {e}")))?;

        let mut rows = range.rows();
        let header: Vec<String> = rows
            .next()
            .map(|cells| cells.iter().map(header_text).collect())
            .unwrap_or_default();
        let data: Vec<Vec<Value>> = rows
            .map(|cells| cells.iter().map(cell_to_value).collect())
            .collect();

        debug!(sheet = %name, rows = data.len(), "read worksheet");
        sheets.push(build_sheet(name, header, data));
    }

    Ok(sheets)
}

fn read_csv(path: &Path, stem: &str) -> Result<Sheet, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| malformed(path, e))?;

    let header: Vec<String> = reader
        .headers()
        .map_err(|e| malformed(path, e))?
        .iter()
        .map(String::from)
        .collect();

    let mut data = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| malformed(path, e))?;
        data.push(record.iter().map(Value::infer_from_text).collect());
    }

    Ok(build_sheet(stem.to_string(), header, data))
}

fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Int(i) => Value::Integer(*i),
        Data::Float(f) => float_to_value(*f),
        Data::String(s) => {
            if s.trim().is_empty() {
                Value::Null
            } else {
                Value::Text(s.clone())
            }
        }
        Data::Bool(b) => Value::Boolean(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map_or_else(|| Value::Real(dt.as_f64()), Value::DateTime),
        Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .map_or_else(|_| Value::Text(s.clone()), Value::DateTime),
        Data::DurationIso(s) => Value::Text(s.clone()),
        Data::Error(_) | Data::Empty => Value::Null,
    }
}

// Spreadsheets store every number as a float; whole numbers are read back as integers
fn float_to_value(f: f64) -> Value {
    if f.fract() == 0.0 && f.abs() < MAX_EXACT_INT {
        Value::Integer(f as i64)
    } else {
        Value::Real(f)
    }
}

fn header_text(cell: &Data) -> String {
    match cell_to_value(cell) {
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Pads ragged rows, drops blank rows, sanitizes headers and infers column types
#[must_use]
pub fn build_sheet(name: String, header: Vec<String>, rows: Vec<Vec<Value>>) -> Sheet {
    let mut rows: Vec<Vec<Value>> = rows
        .into_iter()
        .filter(|row| row.iter().any(|v| !v.is_null()))
        .collect();

    let width = rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0)
        .max(1);

    let mut header = header;
    header.resize(width, String::new());
    for row in &mut rows {
        row.resize(width, Value::Null);
    }

    let names = sanitize_columns(&header);
    let columns = names
        .into_iter()
        .zip(header)
        .enumerate()
        .map(|(i, (name, source_name))| {
            let data_type = DataType::infer(rows.iter().map(|row| &row[i]));
            Column::new(name, source_name, data_type)
        })
        .collect();

    Sheet::new(name, columns, rows)
}
