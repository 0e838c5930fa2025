use crate::loader::quote_identifier;
use crate::storage::ColumnInfo;
use crate::core::DataType;

/// Kind of data a sheet seems to hold, guessed from its column names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    TimeSeries,
    Financial,
    Inventory,
    Contact,
    Generic,
}

const TIMESERIES_KEYWORDS: &[&str] = &["date", "time", "year", "month"];
const FINANCIAL_KEYWORDS: &[&str] = &["price", "amount", "total", "cost", "revenue"];
const INVENTORY_KEYWORDS: &[&str] = &["product", "sku", "inventory", "stock", "quantity"];
const CONTACT_KEYWORDS: &[&str] = &["name", "address", "email", "phone"];

impl std::fmt::Display for DataFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::TimeSeries => "timeseries",
            Self::Financial => "financial",
            Self::Inventory => "inventory",
            Self::Contact => "contact",
            Self::Generic => "generic",
        };
        f.write_str(name)
    }
}

/// First matching format wins, checked in the order time series, financial, inventory, contact
#[must_use]
pub fn detect_format<S: AsRef<str>>(columns: &[S]) -> DataFormat {
    let lowered: Vec<String> = columns.iter().map(|c| c.as_ref().to_lowercase()).collect();
    let has_any = |keywords: &[&str]| lowered.iter().any(|c| keywords.contains(&c.as_str()));

    if has_any(TIMESERIES_KEYWORDS) {
        DataFormat::TimeSeries
    } else if has_any(FINANCIAL_KEYWORDS) {
        DataFormat::Financial
    } else if has_any(INVENTORY_KEYWORDS) {
        DataFormat::Inventory
    } else if has_any(CONTACT_KEYWORDS) {
        DataFormat::Contact
    } else {
        DataFormat::Generic
    }
}

/// A ready-to-run query proposed for a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestedQuery {
    pub name: String,
    pub query: String,
}

impl SuggestedQuery {
    fn new(name: &str, query: String) -> Self {
        Self {
            name: name.to_string(),
            query,
        }
    }
}

/// Queries tailored to the detected format of `table`
#[must_use]
pub fn format_queries(format: DataFormat, table: &str, columns: &[ColumnInfo]) -> Vec<SuggestedQuery> {
    let Some(first) = columns.first().map(|c| quote_identifier(&c.name)) else {
        return Vec::new();
    };
    let t = quote_identifier(table);
    let second = columns.get(1).map_or_else(|| first.clone(), |c| quote_identifier(&c.name));
    let numeric = columns
        .iter()
        .find(|c| c.data_type.is_numeric())
        .map_or_else(|| second.clone(), |c| quote_identifier(&c.name));
    let date = columns
        .iter()
        .find(|c| c.data_type == DataType::DateTime)
        .map_or_else(|| first.clone(), |c| quote_identifier(&c.name));

    match format {
        DataFormat::TimeSeries => vec![
            SuggestedQuery::new(
                "Daily Summary",
                format!("SELECT {date}, SUM({numeric}) FROM {t} GROUP BY {date}"),
            ),
            SuggestedQuery::new(
                "Monthly Trend",
                format!("SELECT strftime('%Y-%m', {date}) AS month, COUNT(*) FROM {t} GROUP BY month"),
            ),
        ],
        DataFormat::Financial => vec![
            SuggestedQuery::new(
                "Transaction Summary",
                format!("SELECT {first}, SUM({numeric}) FROM {t} GROUP BY {first}"),
            ),
            SuggestedQuery::new(
                "Large Transactions",
                format!("SELECT * FROM {t} WHERE {numeric} > (SELECT AVG({numeric}) FROM {t})"),
            ),
        ],
        DataFormat::Inventory => vec![
            SuggestedQuery::new(
                "Low Stock",
                format!("SELECT {first}, {numeric} FROM {t} WHERE {numeric} < (SELECT AVG({numeric}) FROM {t})"),
            ),
            SuggestedQuery::new(
                "Popular Items",
                format!("SELECT {first}, SUM({numeric}) AS total FROM {t} GROUP BY {first} ORDER BY total DESC"),
            ),
        ],
        DataFormat::Contact => {
            let missing = columns
                .iter()
                .take(3)
                .map(|c| format!("{} IS NULL", quote_identifier(&c.name)))
                .collect::<Vec<_>>()
                .join(" OR ");
            vec![
                SuggestedQuery::new(
                    "Contact Count by Category",
                    format!("SELECT {second}, COUNT(*) FROM {t} GROUP BY {second}"),
                ),
                SuggestedQuery::new("Missing Information", format!("SELECT * FROM {t} WHERE {missing}")),
            ]
        }
        DataFormat::Generic => {
            let stats = columns
                .iter()
                .map(|c| {
                    let name = quote_identifier(&c.name);
                    let alias = |suffix: &str| quote_identifier(&format!("{}_{suffix}", c.name));
                    if c.data_type.is_numeric() {
                        format!("COUNT({name}) AS {}, AVG({name}) AS {}", alias("count"), alias("avg"))
                    } else {
                        format!("COUNT({name}) AS {}, MIN({name}) AS {}", alias("count"), alias("min"))
                    }
                })
                .collect::<Vec<_>>()
                .join(", ");
            vec![
                SuggestedQuery::new("Basic Analysis", format!("SELECT * FROM {t} LIMIT 100")),
                SuggestedQuery::new("Column Stats", format!("SELECT {stats} FROM {t}")),
            ]
        }
    }
}
