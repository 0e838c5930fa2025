//! Rendering of results, statistics and catalog listings for the terminal.

use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde::Deserialize;

use crate::catalog::FolderView;
use crate::core::{ExportError, ResultSet};
use crate::executor::ResultStats;
use crate::storage::ColumnInfo;

/// How query results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

/// Render a result; grids are capped at `max_rows` rows
pub fn format_result(result: &ResultSet, format: OutputFormat, max_rows: usize) -> Result<String, ExportError> {
    if result.is_statement() {
        let affected = result.affected_rows.unwrap_or(0);
        return Ok(format!("OK, {affected} row(s) affected\n"));
    }
    match format {
        OutputFormat::Table => Ok(format_table(result, max_rows)),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Json => format_json(result),
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn format_table(result: &ResultSet, max_rows: usize) -> String {
    let total = result.row_count();
    if total == 0 {
        return "(0 rows)\n".to_string();
    }

    let mut table = new_table();
    table.set_header(result.columns.iter().map(Cell::new));
    for row in result.text_rows().into_iter().take(max_rows) {
        table.add_row(row);
    }

    if total > max_rows {
        format!("{table}\n(showing {max_rows} of {total} rows)\n")
    } else {
        format!("{table}\n({total} rows)\n")
    }
}

fn format_csv(result: &ResultSet) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&result.columns)?;
    for row in result.text_rows() {
        writer.write_record(&row)?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn format_json(result: &ResultSet) -> Result<String, ExportError> {
    let rows: Vec<serde_json::Map<String, serde_json::Value>> = result
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
    Ok(serde_json::to_string_pretty(&rows)? + "\n")
}

pub fn format_stats(stats: &ResultStats) -> String {
    let mut table = new_table();
    table.set_header(vec!["column", "non-null", "distinct", "min", "max", "mean"]);
    for column in &stats.columns {
        let (min, max, mean) = column.numeric.map_or_else(
            || (String::new(), String::new(), String::new()),
            |n| (n.min.to_string(), n.max.to_string(), format!("{:.4}", n.mean)),
        );
        table.add_row(vec![
            column.name.clone(),
            column.non_null.to_string(),
            column.distinct.to_string(),
            min,
            max,
            mean,
        ]);
    }
    format!(
        "{table}\n({} rows, {} columns)\n",
        stats.row_count, stats.column_count
    )
}

pub fn format_columns(table_name: &str, columns: &[ColumnInfo], row_count: usize) -> String {
    let mut table = new_table();
    table.set_header(vec!["column", "type"]);
    for column in columns {
        table.add_row(vec![column.name.clone(), column.data_type.sql_name().to_string()]);
    }
    format!("Table \"{table_name}\" ({row_count} rows)\n{table}\n")
}

/// Saved queries grouped by folder, one row per entry
pub fn format_catalog(folders: &[FolderView<'_>]) -> String {
    if folders.is_empty() {
        return "(no saved queries)\n".to_string();
    }

    let mut table = new_table();
    table.set_header(vec!["folder", "label", "id", "saved", "query"]);
    for folder in folders {
        if folder.entries.is_empty() {
            table.add_row(vec![format!("{}/", folder.name), "(empty)".to_string()]);
            continue;
        }
        for (i, entry) in folder.entries.iter().enumerate() {
            let folder_cell = if i == 0 { format!("{}/", folder.name) } else { String::new() };
            table.add_row(vec![
                folder_cell,
                entry.label.clone(),
                entry.id.short(),
                entry.timestamp.format("%Y-%m-%d %H:%M").to_string(),
                first_line(&entry.query),
            ]);
        }
    }
    format!("{table}\n")
}

fn first_line(query: &str) -> String {
    let mut lines = query.lines();
    let first = lines.next().unwrap_or_default().to_string();
    if lines.next().is_some() {
        first + " ..."
    } else {
        first
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::QueryCatalog;
    use crate::core::Value;

    fn sample() -> ResultSet {
        ResultSet::new(
            vec!["id".to_string(), "name".to_string()],
            vec![
                vec![Value::Integer(1), Value::Text("Alice".to_string())],
                vec![Value::Integer(2), Value::Null],
                vec![Value::Integer(3), Value::Text("Carol, Jr".to_string())],
            ],
        )
    }

    #[test]
    fn test_table_respects_max_rows() {
        let out = format_result(&sample(), OutputFormat::Table, 2).unwrap();
        assert!(out.contains("Alice"));
        assert!(!out.contains("Carol"));
        assert!(out.ends_with("(showing 2 of 3 rows)\n"));

        let out = format_result(&sample(), OutputFormat::Table, 200).unwrap();
        assert!(out.ends_with("(3 rows)\n"));
    }

    #[test]
    fn test_empty_and_statement_results() {
        let empty = ResultSet::new(vec!["id".to_string()], Vec::new());
        assert_eq!(format_result(&empty, OutputFormat::Table, 10).unwrap(), "(0 rows)\n");
        assert_eq!(
            format_result(&ResultSet::statement(4), OutputFormat::Json, 10).unwrap(),
            "OK, 4 row(s) affected\n"
        );
    }

    #[test]
    fn test_csv_output_quotes_fields() {
        let out = format_result(&sample(), OutputFormat::Csv, 1).unwrap();
        assert_eq!(out, "id,name\n1,Alice\n2,NULL\n3,\"Carol, Jr\"\n");
    }

    #[test]
    fn test_json_output() {
        let out = format_result(&sample(), OutputFormat::Json, 10).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[0]["name"], "Alice");
        assert!(parsed[1]["name"].is_null());
    }

    #[test]
    fn test_catalog_listing() {
        let mut catalog = QueryCatalog::in_memory();
        catalog.save("reports/sales", "SELECT *\nFROM sales").unwrap();
        catalog.create_folder("drafts").unwrap();

        let out = format_catalog(&catalog.list());
        assert!(out.contains("reports/"));
        assert!(out.contains("SELECT * ..."));
        assert!(out.contains("(empty)"));
        assert_eq!(format_catalog(&[]), "(no saved queries)\n");
    }
}
