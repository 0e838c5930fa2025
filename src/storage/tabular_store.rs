use rusqlite::{params_from_iter, Connection};
use tracing::{debug, info};

use crate::core::{DataType, Sheet, StoreError, Workbook};
use crate::loader::{dedupe_names, quote_identifier};

/// How table names are derived from sheets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableNaming {
    /// Sheet name alone (one workbook loaded)
    SheetName,
    /// `{workbook_stem}_{sheet}` (several workbooks aggregated)
    WorkbookPrefixed,
}

impl TableNaming {
    #[must_use]
    pub fn table_name(self, workbook_stem: &str, sheet: &str) -> String {
        match self {
            Self::SheetName => sheet.to_string(),
            Self::WorkbookPrefixed => format!("{workbook_stem}_{sheet}"),
        }
    }
}

/// Column description as reported by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: DataType,
}

/// In-memory relational store holding loaded sheets as tables.
///
/// Recreated for every session and never persisted.
pub struct TabularStore {
    conn: Connection,
}

impl TabularStore {
    pub fn new() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Raw engine access for the query executor
    pub(crate) const fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Materialize every sheet of every workbook in one transaction.
    ///
    /// Returns the table names in workbook and sheet order. Names that clash
    /// within the batch (compared case-insensitively) get `_2`, `_3`, ...
    /// Any failure rolls the whole batch back.
    pub fn load(&mut self, workbooks: &[Workbook], naming: TableNaming) -> Result<Vec<String>, StoreError> {
        let sheets: Vec<(&Workbook, &Sheet)> = workbooks
            .iter()
            .flat_map(|wb| wb.sheets.iter().map(move |sheet| (wb, sheet)))
            .collect();
        let names = dedupe_names(sheets.iter().map(|(wb, sheet)| naming.table_name(&wb.stem, &sheet.name)));

        let tx = self.conn.transaction()?;
        for (name, (_, sheet)) in names.iter().zip(&sheets) {
            Self::write_table(&tx, name, sheet)?;
        }
        tx.commit()?;

        info!(workbooks = workbooks.len(), tables = names.len(), "loaded workbooks into store");
        Ok(names)
    }

    /// Create `name` from `sheet`, replacing any table with that name
    pub fn create_or_replace_table(&mut self, name: &str, sheet: &Sheet) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        Self::write_table(&tx, name, sheet)?;
        tx.commit()?;
        Ok(())
    }

    fn write_table(conn: &Connection, name: &str, sheet: &Sheet) -> Result<(), StoreError> {
        let table = quote_identifier(name);
        let column_defs: Vec<String> = sheet
            .columns
            .iter()
            .map(|c| format!("{} {}", quote_identifier(&c.name), c.data_type.sql_name()))
            .collect();

        conn.execute(&format!("DROP TABLE IF EXISTS {table}"), [])?;
        conn.execute(&format!("CREATE TABLE {table} ({})", column_defs.join(", ")), [])?;

        let placeholders = vec!["?"; sheet.columns.len()].join(", ");
        let mut insert = conn.prepare(&format!("INSERT INTO {table} VALUES ({placeholders})"))?;
        for row in &sheet.rows {
            insert.execute(params_from_iter(row.iter()))?;
        }

        debug!(table = %name, columns = sheet.columns.len(), rows = sheet.rows.len(), "materialized table");
        Ok(())
    }

    /// Current table names, sorted; reflects tables created or dropped by queries
    pub fn table_names(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    pub fn has_table(&self, name: &str) -> Result<bool, StoreError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>, StoreError> {
        if !self.has_table(table)? {
            return Err(StoreError::TableNotFound(table.to_string()));
        }

        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({})", quote_identifier(table)))?;
        let columns = stmt
            .query_map([], |row| {
                let name: String = row.get(1)?;
                let declared: String = row.get(2)?;
                Ok(ColumnInfo {
                    name,
                    data_type: DataType::from_declared(&declared),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }

    pub fn row_count(&self, table: &str) -> Result<usize, StoreError> {
        if !self.has_table(table)? {
            return Err(StoreError::TableNotFound(table.to_string()));
        }
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_identifier(table)),
            [],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Completion words for query authoring: table names and `table.column` pairs
    pub fn suggestions(&self) -> Result<Vec<String>, StoreError> {
        let mut words = Vec::new();
        for table in self.table_names()? {
            let columns = self.columns(&table)?;
            words.extend(columns.iter().map(|c| format!("{table}.{}", c.name)));
            words.push(table);
        }
        words.sort();
        words.dedup();
        Ok(words)
    }
}
