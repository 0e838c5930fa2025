use super::value::Value;

/// Output of one successful query execution
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    /// Set for statements that return no columns (DDL, INSERT, UPDATE, ...)
    pub affected_rows: Option<usize>,
}

impl ResultSet {
    #[must_use]
    pub const fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns,
            rows,
            affected_rows: None,
        }
    }

    #[must_use]
    pub const fn statement(affected_rows: usize) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            affected_rows: Some(affected_rows),
        }
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_statement(&self) -> bool {
        self.columns.is_empty() && self.affected_rows.is_some()
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Rows rendered as text, as shown in a grid
    #[must_use]
    pub fn text_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(ToString::to_string).collect())
            .collect()
    }
}
