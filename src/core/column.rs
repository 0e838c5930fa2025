use serde::{Deserialize, Serialize};
use super::data_type::DataType;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Column {
    /// Sanitized identifier; generated queries still quote it
    pub name: String,
    /// Header text as it appeared in the sheet
    pub source_name: String,
    pub data_type: DataType,
}

impl Column {
    #[must_use]
    pub fn new(name: impl Into<String>, source_name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            source_name: source_name.into(),
            data_type,
        }
    }
}
