use tracing::debug;

use crate::core::{QueryError, ResultSet, Value};
use crate::storage::TabularStore;

pub struct QueryExecutor;

impl QueryExecutor {
    /// Runs one statement against the store.
    ///
    /// Returns `Ok(None)` for a blank query. Statements that produce no columns
    /// (CREATE, INSERT, UPDATE, DROP, ...) run for their side effects and come
    /// back as a `ResultSet` carrying only `affected_rows`.
    pub fn execute(store: &mut TabularStore, query: &str) -> Result<Option<ResultSet>, QueryError> {
        let sql = query.trim();
        if sql.is_empty() {
            return Ok(None);
        }

        let conn = store.connection();
        let fail = |e: rusqlite::Error| QueryError::new(sql, &e);

        let mut stmt = conn.prepare(sql).map_err(fail)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        if columns.is_empty() {
            // changes() is not reset by DDL, so count through the running total
            let before = total_changes(conn).map_err(fail)?;
            stmt.execute([]).map_err(fail)?;
            let after = total_changes(conn).map_err(fail)?;
            let affected = usize::try_from(after - before).unwrap_or(0);
            debug!(affected, "executed statement");
            return Ok(Some(ResultSet::statement(affected)));
        }

        let width = columns.len();
        let mut rows = Vec::new();
        let mut cursor = stmt.query([]).map_err(fail)?;
        while let Some(row) = cursor.next().map_err(fail)? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(Value::from(row.get_ref(i).map_err(fail)?));
            }
            rows.push(values);
        }

        debug!(columns = width, rows = rows.len(), "executed query");
        Ok(Some(ResultSet::new(columns, rows)))
    }
}

fn total_changes(conn: &rusqlite::Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT total_changes()", [], |row| row.get(0))
}
