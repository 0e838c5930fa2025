use std::path::PathBuf;
use thiserror::Error;

/// Workbook could not be read or understood
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unsupported workbook type '{0}'")]
    UnsupportedFormat(PathBuf),
    #[error("Malformed workbook '{path}': {message}")]
    Malformed { path: PathBuf, message: String },
    #[error("No workbooks given")]
    NothingToLoad,
}

/// Failure inside the embedded engine while materializing or inspecting tables
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Table '{0}' not found")]
    TableNotFound(String),
    #[error("Engine error: {0}")]
    Engine(#[from] rusqlite::Error),
}

/// Query execution failure, carries the engine diagnostic
#[derive(Error, Debug)]
#[error("Query failed: {message}")]
pub struct QueryError {
    pub message: String,
    pub query: String,
}

impl QueryError {
    pub fn new(query: &str, err: &rusqlite::Error) -> Self {
        Self {
            message: err.to_string(),
            query: query.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed catalog '{path}': {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Catalog version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("Invalid timestamp '{0}' in catalog")]
    InvalidTimestamp(String),
    #[error("Invalid name '{0}'")]
    InvalidName(String),
    #[error("Query text is empty")]
    EmptyQuery,
    #[error("Saved query '{0}' not found")]
    EntryNotFound(String),
    #[error("'{0}' matches more than one saved query")]
    AmbiguousSelector(String),
    #[error("Folder '{0}' not found")]
    FolderNotFound(String),
    #[error("Folder '{0}' already exists")]
    FolderAlreadyExists(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Unsupported export format '{0}'")]
    UnsupportedFormat(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything a session command can fail with. None of these are fatal.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("No result to work with, run a query first")]
    NoResult,
    #[error("No query to save")]
    NothingToSave,
    #[error("Unknown template '{0}'")]
    UnknownTemplate(String),
}

/// REPL input that is neither SQL nor a well-formed meta-command
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown command '\\{0}', try \\?")]
    UnknownCommand(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
}
