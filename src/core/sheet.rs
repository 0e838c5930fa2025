use super::column::Column;
use super::value::Value;

/// One worksheet read from a workbook, ready to be materialized as a table
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Value>>,
}

impl Sheet {
    #[must_use]
    pub const fn new(name: String, columns: Vec<Column>, rows: Vec<Vec<Value>>) -> Self {
        Self { name, columns, rows }
    }

    #[must_use]
    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// All sheets of one workbook file, in workbook order
#[derive(Debug, Clone, PartialEq)]
pub struct Workbook {
    /// File stem, used to prefix table names when several workbooks are loaded
    pub stem: String,
    pub sheets: Vec<Sheet>,
}
