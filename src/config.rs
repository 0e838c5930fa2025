use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use tracing::debug;

use crate::shell::OutputFormat;

const APP_DIR: &str = "sheetsql";
const CONFIG_FILE: &str = "sheetsql.toml";
const ENV_PREFIX: &str = "SHEETSQL";

/// Settings shared by the REPL and the one-shot mode
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,
    #[serde(default = "default_history_file")]
    pub history_file: Option<PathBuf>,
    #[serde(default)]
    pub output_format: OutputFormat,
    /// Rows shown in a grid before the output is cut
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
}

fn default_catalog_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("query_catalog.json")
}

fn default_history_file() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".sheetsql_history"))
}

const fn default_max_rows() -> usize {
    200
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            history_file: default_history_file(),
            output_format: OutputFormat::default(),
            max_rows: default_max_rows(),
        }
    }
}

impl AppConfig {
    /// Load configuration with priority: ENV > config file > defaults.
    ///
    /// An explicit `path` must exist; otherwise the first of
    /// `./sheetsql.toml` and `<config_dir>/sheetsql/sheetsql.toml` is used
    /// when present. Command-line flags are applied on top by the caller.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        } else if let Some(found) = Self::candidate_files().into_iter().find(|p| p.exists()) {
            debug!(path = %found.display(), "using config file");
            builder = builder.add_source(File::from(found));
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX));
        builder.build()?.try_deserialize()
    }

    fn candidate_files() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join(APP_DIR).join(CONFIG_FILE));
        }
        paths
    }
}
