use serde::{Deserialize, Serialize};
use super::value::Value;

/// Column type inferred from the cells of a sheet
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DataType {
    Integer,
    Real,
    Boolean,
    DateTime,
    Text,
}

impl DataType {
    /// Declared type used in CREATE TABLE
    #[must_use]
    pub const fn sql_name(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Boolean => "BOOLEAN",
            Self::DateTime => "TIMESTAMP",
            Self::Text => "TEXT",
        }
    }

    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Real)
    }

    /// Map a declared SQLite type back, following SQLite's affinity rules loosely
    #[must_use]
    pub fn from_declared(declared: &str) -> Self {
        let upper = declared.to_ascii_uppercase();
        if upper.contains("INT") {
            Self::Integer
        } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
            Self::Real
        } else if upper.contains("BOOL") {
            Self::Boolean
        } else if upper.contains("TIME") || upper.contains("DATE") {
            Self::DateTime
        } else {
            Self::Text
        }
    }

    /// Infer a column type from its cells; nulls are ignored, an all-null column is Text
    pub fn infer<'a, I>(cells: I) -> Self
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let mut inferred: Option<Self> = None;

        for cell in cells {
            let cell_type = match cell {
                Value::Null => continue,
                Value::Integer(_) => Self::Integer,
                Value::Real(_) => Self::Real,
                Value::Boolean(_) => Self::Boolean,
                Value::DateTime(_) => Self::DateTime,
                Value::Text(_) | Value::Blob(_) => return Self::Text,
            };

            inferred = Some(match (inferred, cell_type) {
                (None, t) => t,
                (Some(a), b) if a == b => a,
                (Some(Self::Integer | Self::Real), Self::Integer | Self::Real) => Self::Real,
                _ => return Self::Text,
            });
        }

        inferred.unwrap_or(Self::Text)
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.sql_name())
    }
}
