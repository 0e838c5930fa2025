use crate::loader::quote_identifier;

/// Row limit substituted for `${n}`
pub const DEFAULT_TOP_N: usize = 10;

/// A reusable query with `${table}`, `${columns}`, `${column}` and `${n}` placeholders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTemplate {
    pub category: &'static str,
    pub name: &'static str,
    pub text: &'static str,
}

pub const BUILTIN_TEMPLATES: &[QueryTemplate] = &[
    QueryTemplate {
        category: "Basic",
        name: "Select All",
        text: "SELECT * FROM ${table} LIMIT 100",
    },
    QueryTemplate {
        category: "Basic",
        name: "Column Summary",
        text: "SELECT ${columns} FROM ${table}",
    },
    QueryTemplate {
        category: "Basic",
        name: "Count Rows",
        text: "SELECT COUNT(*) AS total_rows FROM ${table}",
    },
    QueryTemplate {
        category: "Analysis",
        name: "Find Duplicates",
        text: "SELECT ${columns}, COUNT(*) AS duplicates FROM ${table} GROUP BY ${columns} HAVING duplicates > 1",
    },
    QueryTemplate {
        category: "Analysis",
        name: "Top N Records",
        text: "SELECT * FROM ${table} ORDER BY ${column} DESC LIMIT ${n}",
    },
];

impl QueryTemplate {
    /// `Category: Name`, as listed to the user
    #[must_use]
    pub fn title(&self) -> String {
        format!("{}: {}", self.category, self.name)
    }

    #[must_use]
    pub fn render<S: AsRef<str>>(&self, table: &str, columns: &[S]) -> String {
        let column_list = if columns.is_empty() {
            "*".to_string()
        } else {
            columns.iter().map(|c| quote_identifier(c.as_ref())).collect::<Vec<_>>().join(", ")
        };
        let first_column = columns.first().map_or_else(|| "1".to_string(), |c| quote_identifier(c.as_ref()));

        self.text
            .replace("${table}", &quote_identifier(table))
            .replace("${columns}", &column_list)
            .replace("${column}", &first_column)
            .replace("${n}", &DEFAULT_TOP_N.to_string())
    }
}

/// Look a template up by title or bare name, case-insensitively
#[must_use]
pub fn find_template(selector: &str) -> Option<&'static QueryTemplate> {
    let selector = selector.trim();
    BUILTIN_TEMPLATES.iter().find(|t| {
        t.title().eq_ignore_ascii_case(selector) || t.name.eq_ignore_ascii_case(selector)
    })
}
