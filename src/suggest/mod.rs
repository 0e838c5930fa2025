// Query assistance: built-in templates and format-aware suggestions
pub mod templates;
pub mod formats;

pub use templates::{find_template, QueryTemplate, BUILTIN_TEMPLATES, DEFAULT_TOP_N};
pub use formats::{detect_format, format_queries, DataFormat, SuggestedQuery};
