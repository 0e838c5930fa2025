//! Column identifier sanitization
//!
//! Every header character outside `[alphanumeric_]` is replaced with `_`.
//! Keywords and leading digits survive, so queries built from these names
//! go through [`quote_identifier`]. Distinct headers never share an
//! identifier, collisions get a numeric suffix.

use std::collections::HashSet;

/// Sanitize a single header; `position` is 0-based and only used for blank headers
#[must_use]
pub fn sanitize_identifier(name: &str, position: usize) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return format!("column_{}", position + 1);
    }

    trimmed
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Sanitize a whole header row, suffixing `_2`, `_3`, ... on collision.
///
/// Comparison is case-insensitive because the engine treats identifiers that way.
#[must_use]
pub fn sanitize_columns<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    dedupe_names(
        names
            .iter()
            .enumerate()
            .map(|(position, name)| sanitize_identifier(name.as_ref(), position)),
    )
}

/// Keep names unique case-insensitively by suffixing `_2`, `_3`, ... in order
#[must_use]
pub fn dedupe_names<I: IntoIterator<Item = String>>(names: I) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut result = Vec::new();

    for base in names {
        let mut candidate = base.clone();
        let mut suffix = 2;
        while taken.contains(&candidate.to_lowercase()) {
            candidate = format!("{base}_{suffix}");
            suffix += 1;
        }

        taken.insert(candidate.to_lowercase());
        result.push(candidate);
    }

    result
}

/// Quote an identifier for the engine
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_unsafe_characters() {
        assert_eq!(sanitize_identifier("Unit Price", 0), "Unit_Price");
        assert_eq!(sanitize_identifier("cost (USD)", 0), "cost__USD_");
        assert_eq!(sanitize_identifier("in/out", 0), "in_out");
        assert_eq!(sanitize_identifier("a\\b", 0), "a_b");
        assert_eq!(sanitize_identifier("e-mail", 0), "e_mail");
        assert_eq!(sanitize_identifier("rate%", 0), "rate_");
        assert_eq!(sanitize_identifier("  padded  ", 0), "padded");
    }

    #[test]
    fn test_blank_headers_get_positional_names() {
        assert_eq!(sanitize_identifier("", 0), "column_1");
        assert_eq!(sanitize_identifier("   ", 4), "column_5");
    }

    #[test]
    fn test_collisions_are_suffixed() {
        let names = ["a b", "a-b", "a/b", "A_B"];
        assert_eq!(sanitize_columns(&names), vec!["a_b", "a_b_2", "a_b_3", "A_B_4"]);
    }

    #[test]
    fn test_suffix_skips_existing_names() {
        let names = ["x", "x_2", "x"];
        assert_eq!(sanitize_columns(&names), vec!["x", "x_2", "x_3"]);
    }

    #[test]
    fn test_dedupe_names() {
        let names = ["sales_sales", "Sales_Sales", "a_b_c", "a_b_c"].map(String::from);
        assert_eq!(dedupe_names(names), vec!["sales_sales", "Sales_Sales_2", "a_b_c", "a_b_c_2"]);
    }

    #[test]
    fn test_sanitization_is_deterministic() {
        let names = ["Order ID", "Order-ID", "", "Total (net)"];
        assert_eq!(sanitize_columns(&names), sanitize_columns(&names));
        assert_eq!(
            sanitize_columns(&names),
            vec!["Order_ID", "Order_ID_2", "column_3", "Total__net_"]
        );
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("Sheet 1"), "\"Sheet 1\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }
}
