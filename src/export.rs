use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use serde_json::Map;
use tracing::info;

use crate::core::{ExportError, ResultSet, Value};

/// File formats a result set can be written to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Json,
}

impl ExportFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ExportError::UnsupportedFormat(path.display().to_string()))?;
        ext.parse()
    }

    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            "json" => Ok(Self::Json),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Write `result` to `path`, overwriting any existing file
pub fn export(result: &ResultSet, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
    match format {
        ExportFormat::Csv => write_csv(result, path)?,
        ExportFormat::Xlsx => write_xlsx(result, path)?,
        ExportFormat::Json => write_json(result, path)?,
    }
    info!(path = %path.display(), rows = result.row_count(), format = format.extension(), "exported result");
    Ok(())
}

// Nulls are written as empty fields rather than the grid's NULL marker
fn field(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn write_csv(result: &ResultSet, path: &Path) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&result.columns)?;
    for row in &result.rows {
        writer.write_record(row.iter().map(field))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_xlsx(result: &ResultSet, path: &Path) -> Result<(), ExportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let bold = Format::new().set_bold();

    for (col, name) in result.columns.iter().enumerate() {
        sheet.write_string_with_format(0, column_index(col)?, name, &bold)?;
    }
    for (i, row) in result.rows.iter().enumerate() {
        let row_idx = u32::try_from(i + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
        for (col, value) in row.iter().enumerate() {
            write_cell(sheet, row_idx, column_index(col)?, value)?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn column_index(col: usize) -> Result<u16, XlsxError> {
    u16::try_from(col).map_err(|_| XlsxError::RowColumnLimitError)
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, value: &Value) -> Result<(), XlsxError> {
    match value {
        Value::Null => {}
        Value::Integer(i) => {
            sheet.write_number(row, col, *i as f64)?;
        }
        Value::Real(r) => {
            sheet.write_number(row, col, *r)?;
        }
        Value::Boolean(b) => {
            sheet.write_boolean(row, col, *b)?;
        }
        other => {
            sheet.write_string(row, col, other.to_string())?;
        }
    }
    Ok(())
}

fn write_json(result: &ResultSet, path: &Path) -> Result<(), ExportError> {
    let records: Vec<Map<String, serde_json::Value>> = result
        .rows
        .iter()
        .map(|row| {
            result
                .columns
                .iter()
                .cloned()
                .zip(row.iter().map(serde_json::Value::from))
                .collect()
        })
        .collect();

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &records)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::read_workbook;
    use tempfile::TempDir;

    fn sample() -> ResultSet {
        ResultSet::new(
            vec!["region".to_string(), "total".to_string(), "note".to_string()],
            vec![
                vec![Value::Text("north".to_string()), Value::Integer(120), Value::Null],
                vec![Value::Text("south".to_string()), Value::Real(80.5), Value::Text("late, partial".to_string())],
            ],
        )
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ExportFormat::from_path(Path::new("out.CSV")).unwrap(), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_path(Path::new("a/b.xlsx")).unwrap(), ExportFormat::Xlsx);
        assert_eq!(ExportFormat::from_path(Path::new("r.json")).unwrap(), ExportFormat::Json);
        assert!(matches!(
            ExportFormat::from_path(Path::new("r.parquet")),
            Err(ExportError::UnsupportedFormat(_))
        ));
        assert!(ExportFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_export_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        export(&sample(), &path, ExportFormat::Csv).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "region,total,note\nnorth,120,\nsouth,80.5,\"late, partial\"\n");
    }

    #[test]
    fn test_export_json_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        export(&sample(), &path, ExportFormat::Json).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let records = parsed.as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["region"], "north");
        assert_eq!(records[0]["total"], 120);
        assert!(records[0]["note"].is_null());
        assert_eq!(records[1]["total"], 80.5);
    }

    #[test]
    fn test_export_xlsx_reads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.xlsx");
        export(&sample(), &path, ExportFormat::Xlsx).unwrap();

        let workbook = read_workbook(&path).unwrap();
        let sheet = &workbook.sheets[0];
        assert_eq!(sheet.column_names(), vec!["region", "total", "note"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0][1], Value::Integer(120));
        assert_eq!(sheet.rows[1][1], Value::Real(80.5));
    }

    #[test]
    fn test_export_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.json");
        assert!(matches!(
            export(&sample(), &path, ExportFormat::Json),
            Err(ExportError::Io(_))
        ));
    }
}
