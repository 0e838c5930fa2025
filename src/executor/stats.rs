use std::collections::HashSet;

use crate::core::{ResultSet, Value};

/// Summary of one result column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub name: String,
    pub non_null: usize,
    pub distinct: usize,
    /// Present only when every non-null value is numeric
    pub numeric: Option<NumericSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultStats {
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<ColumnStats>,
}

impl ResultSet {
    #[must_use]
    pub fn stats(&self) -> ResultStats {
        let columns = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| column_stats(name, self.rows.iter().filter_map(|row| row.get(i))))
            .collect();

        ResultStats {
            row_count: self.rows.len(),
            column_count: self.columns.len(),
            columns,
        }
    }
}

fn column_stats<'a>(name: &str, cells: impl Iterator<Item = &'a Value>) -> ColumnStats {
    let mut non_null = 0;
    let mut distinct = HashSet::new();
    let mut numbers = Vec::new();
    let mut all_numeric = true;

    for cell in cells.filter(|c| !c.is_null()) {
        non_null += 1;
        distinct.insert(cell.to_string());
        match cell.as_f64() {
            Some(n) => numbers.push(n),
            None => all_numeric = false,
        }
    }

    let numeric = if all_numeric && !numbers.is_empty() {
        let min = numbers.iter().copied().fold(f64::INFINITY, f64::min);
        let max = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = numbers.iter().sum::<f64>() / numbers.len() as f64;
        Some(NumericSummary { min, max, mean })
    } else {
        None
    };

    ColumnStats {
        name: name.to_string(),
        non_null,
        distinct: distinct.len(),
        numeric,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_numeric_and_text_columns() {
        let rs = ResultSet::new(
            vec!["region".to_string(), "amount".to_string()],
            vec![
                vec![Value::Text("north".to_string()), Value::Integer(10)],
                vec![Value::Text("south".to_string()), Value::Real(30.0)],
                vec![Value::Text("north".to_string()), Value::Null],
            ],
        );

        let stats = rs.stats();
        assert_eq!(stats.row_count, 3);
        assert_eq!(stats.column_count, 2);

        let region = &stats.columns[0];
        assert_eq!(region.non_null, 3);
        assert_eq!(region.distinct, 2);
        assert!(region.numeric.is_none());

        let amount = &stats.columns[1];
        assert_eq!(amount.non_null, 2);
        assert_eq!(
            amount.numeric,
            Some(NumericSummary { min: 10.0, max: 30.0, mean: 20.0 })
        );
    }

    #[test]
    fn test_stats_of_empty_result() {
        let rs = ResultSet::new(vec!["a".to_string()], vec![]);
        let stats = rs.stats();
        assert_eq!(stats.row_count, 0);
        assert_eq!(stats.columns[0].non_null, 0);
        assert!(stats.columns[0].numeric.is_none());
    }
}
