// Module declarations
pub mod error;
pub mod value;
pub mod data_type;
pub mod column;
pub mod sheet;
pub mod result_set;

// Re-exports for convenience
pub use error::{CatalogError, ExportError, LoadError, ParseError, QueryError, SessionError, StoreError};
pub use value::Value;
pub use data_type::DataType;
pub use column::Column;
pub use sheet::{Sheet, Workbook};
pub use result_set::ResultSet;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Integer(42).to_string(), "42");
        assert_eq!(Value::Real(3.5).to_string(), "3.5");
        assert_eq!(Value::Text("hello".to_string()).to_string(), "hello");
        assert_eq!(Value::Boolean(true).to_string(), "true");
        assert_eq!(Value::Blob(vec![0xde, 0xad]).to_string(), "\\xdead");

        let dt = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(Value::DateTime(dt).to_string(), "2024-03-01 09:30:00");
    }

    #[test]
    fn test_value_infer_from_text() {
        assert_eq!(Value::infer_from_text(""), Value::Null);
        assert_eq!(Value::infer_from_text("  "), Value::Null);
        assert_eq!(Value::infer_from_text("12"), Value::Integer(12));
        assert_eq!(Value::infer_from_text("-1.25"), Value::Real(-1.25));
        assert_eq!(Value::infer_from_text("TRUE"), Value::Boolean(true));
        assert_eq!(Value::infer_from_text("false"), Value::Boolean(false));
        assert_eq!(Value::infer_from_text("NaN"), Value::Text("NaN".to_string()));
        assert_eq!(Value::infer_from_text("Alice"), Value::Text("Alice".to_string()));
        assert!(matches!(
            Value::infer_from_text("2024-01-02 03:04:05"),
            Value::DateTime(_)
        ));
    }

    #[test]
    fn test_value_as_f64() {
        assert_eq!(Value::Integer(2).as_f64(), Some(2.0));
        assert_eq!(Value::Real(0.5).as_f64(), Some(0.5));
        assert_eq!(Value::Boolean(true).as_f64(), None);
        assert_eq!(Value::Null.as_f64(), None);
    }

    #[test]
    fn test_data_type_infer() {
        let ints = [Value::Integer(1), Value::Null, Value::Integer(3)];
        assert_eq!(DataType::infer(&ints), DataType::Integer);

        let mixed = [Value::Integer(1), Value::Real(2.5)];
        assert_eq!(DataType::infer(&mixed), DataType::Real);

        let bools = [Value::Boolean(true), Value::Boolean(false)];
        assert_eq!(DataType::infer(&bools), DataType::Boolean);

        let text = [Value::Integer(1), Value::Text("x".to_string())];
        assert_eq!(DataType::infer(&text), DataType::Text);

        let bool_and_int = [Value::Boolean(true), Value::Integer(1)];
        assert_eq!(DataType::infer(&bool_and_int), DataType::Text);

        let empty: [Value; 2] = [Value::Null, Value::Null];
        assert_eq!(DataType::infer(&empty), DataType::Text);
    }

    #[test]
    fn test_data_type_from_declared() {
        assert_eq!(DataType::from_declared("INTEGER"), DataType::Integer);
        assert_eq!(DataType::from_declared("bigint"), DataType::Integer);
        assert_eq!(DataType::from_declared("REAL"), DataType::Real);
        assert_eq!(DataType::from_declared("double"), DataType::Real);
        assert_eq!(DataType::from_declared("BOOLEAN"), DataType::Boolean);
        assert_eq!(DataType::from_declared("TIMESTAMP"), DataType::DateTime);
        assert_eq!(DataType::from_declared(""), DataType::Text);
    }

    #[test]
    fn test_result_set_statement() {
        let rs = ResultSet::statement(3);
        assert!(rs.is_statement());
        assert_eq!(rs.row_count(), 0);

        let rows = ResultSet::new(vec!["a".to_string()], vec![]);
        assert!(!rows.is_statement());
        assert_eq!(rows.column_index("a"), Some(0));
    }

    #[test]
    fn test_sheet_column_lookup() {
        let sheet = Sheet::new(
            "Sheet1".to_string(),
            vec![
                Column::new("id", "id", DataType::Integer),
                Column::new("unit_price", "Unit Price", DataType::Real),
            ],
            vec![],
        );
        assert_eq!(sheet.get_column_index("unit_price"), Some(1));
        assert_eq!(sheet.get_column_index("Unit Price"), None);
        assert_eq!(sheet.column_names(), vec!["id", "unit_price"]);
    }
}
