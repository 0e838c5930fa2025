use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::catalog::{CatalogEntry, EntryId, FolderView, QueryCatalog};
use crate::core::{LoadError, ResultSet, SessionError, Workbook};
use crate::executor::{QueryExecutor, ResultStats};
use crate::export::{export, ExportFormat};
use crate::loader::read_workbook;
use crate::storage::{ColumnInfo, TableNaming, TabularStore};
use crate::suggest::{detect_format, find_template, format_queries, DataFormat, SuggestedQuery};

/// One interactive session: the loaded tables, the saved-query catalog and
/// the result of the last successful query.
///
/// Every command runs to completion before returning and none of the errors
/// it reports leave the session in a changed state.
pub struct Session {
    store: TabularStore,
    catalog: QueryCatalog,
    current: Option<ResultSet>,
    last_query: Option<String>,
    loaded: Vec<String>,
}

impl Session {
    pub fn new(catalog: QueryCatalog) -> Result<Self, SessionError> {
        Ok(Self {
            store: TabularStore::new()?,
            catalog,
            current: None,
            last_query: None,
            loaded: Vec::new(),
        })
    }

    pub fn load_workbook<P: AsRef<Path>>(&mut self, path: P) -> Result<Vec<String>, SessionError> {
        self.load_workbooks(&[path])
    }

    /// Load workbooks into the store and return the tables created.
    ///
    /// A single workbook gives one table per sheet named after the sheet;
    /// several are combined with `{workbook}_{sheet}` names, suffixed with
    /// `_2`, `_3`, ... when two of them clash. Every file is read first and
    /// all tables are written in one transaction, so a failure changes nothing.
    pub fn load_workbooks<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<Vec<String>, SessionError> {
        if paths.is_empty() {
            return Err(LoadError::NothingToLoad.into());
        }
        let workbooks = paths
            .iter()
            .map(|p| read_workbook(p.as_ref()))
            .collect::<Result<Vec<Workbook>, LoadError>>()?;

        let naming = if workbooks.len() == 1 {
            TableNaming::SheetName
        } else {
            TableNaming::WorkbookPrefixed
        };

        let tables = self.store.load(&workbooks, naming)?;

        for table in &tables {
            if !self.loaded.contains(table) {
                self.loaded.push(table.clone());
            }
        }
        info!(files = workbooks.len(), tables = tables.len(), "loaded workbooks");
        Ok(tables)
    }

    /// Tables created by loads in this session, in load order
    #[must_use]
    pub fn loaded_tables(&self) -> &[String] {
        &self.loaded
    }

    /// Every table currently in the store, including ones created by queries
    pub fn tables(&self) -> Result<Vec<String>, SessionError> {
        Ok(self.store.table_names()?)
    }

    pub fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>, SessionError> {
        Ok(self.store.columns(table)?)
    }

    pub fn row_count(&self, table: &str) -> Result<usize, SessionError> {
        Ok(self.store.row_count(table)?)
    }

    /// Table and `table.column` names for completion
    pub fn completions(&self) -> Result<Vec<String>, SessionError> {
        Ok(self.store.suggestions()?)
    }

    /// Run a query; a blank query returns `Ok(None)` and changes nothing.
    ///
    /// The current result is only replaced when the query succeeds.
    pub fn execute(&mut self, query: &str) -> Result<Option<&ResultSet>, SessionError> {
        let Some(result) = QueryExecutor::execute(&mut self.store, query)? else {
            return Ok(None);
        };
        debug!(rows = result.row_count(), "replacing current result");
        self.current = Some(result);
        self.last_query = Some(query.trim().to_string());
        Ok(self.current.as_ref())
    }

    #[must_use]
    pub const fn current_result(&self) -> Option<&ResultSet> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    pub fn stats(&self) -> Result<ResultStats, SessionError> {
        self.current
            .as_ref()
            .map(ResultSet::stats)
            .ok_or(SessionError::NoResult)
    }

    /// Write the current result; the format defaults to the file extension
    pub fn export(&self, path: &Path, format: Option<ExportFormat>) -> Result<PathBuf, SessionError> {
        let result = self.current.as_ref().ok_or(SessionError::NoResult)?;
        let format = match format {
            Some(format) => format,
            None => ExportFormat::from_path(path)?,
        };
        export(result, path, format)?;
        Ok(path.to_path_buf())
    }

    #[must_use]
    pub const fn catalog(&self) -> &QueryCatalog {
        &self.catalog
    }

    /// Save `query`, or the last executed query when none is given
    pub fn save_query(&mut self, full_name: &str, query: Option<&str>) -> Result<EntryId, SessionError> {
        let query = match query {
            Some(q) if !q.trim().is_empty() => q.to_string(),
            _ => self.last_query.clone().ok_or(SessionError::NothingToSave)?,
        };
        Ok(self.catalog.save(full_name, &query)?)
    }

    pub fn saved_query(&self, selector: &str) -> Result<&CatalogEntry, SessionError> {
        Ok(self.catalog.resolve(selector)?)
    }

    /// Execute a saved query as if it had been typed
    pub fn run_saved(&mut self, selector: &str) -> Result<Option<&ResultSet>, SessionError> {
        let query = self.catalog.resolve(selector)?.query.clone();
        self.execute(&query)
    }

    pub fn rename_saved(&mut self, selector: &str, new_label: &str) -> Result<EntryId, SessionError> {
        let id = self.catalog.resolve(selector)?.id;
        self.catalog.rename(id, new_label)?;
        Ok(id)
    }

    pub fn move_saved(&mut self, selector: &str, new_folder: &str) -> Result<EntryId, SessionError> {
        let id = self.catalog.resolve(selector)?.id;
        self.catalog.move_entry(id, new_folder)?;
        Ok(id)
    }

    pub fn update_saved(&mut self, selector: &str, query: &str) -> Result<EntryId, SessionError> {
        let id = self.catalog.resolve(selector)?.id;
        self.catalog.update_query(id, query)?;
        Ok(id)
    }

    pub fn delete_saved(&mut self, selector: &str) -> Result<CatalogEntry, SessionError> {
        let id = self.catalog.resolve(selector)?.id;
        Ok(self.catalog.delete(id)?)
    }

    pub fn create_folder(&mut self, name: &str) -> Result<(), SessionError> {
        Ok(self.catalog.create_folder(name)?)
    }

    pub fn rename_folder(&mut self, old: &str, new: &str) -> Result<(), SessionError> {
        Ok(self.catalog.rename_folder(old, new)?)
    }

    pub fn delete_folder(&mut self, name: &str) -> Result<usize, SessionError> {
        Ok(self.catalog.delete_folder(name)?)
    }

    #[must_use]
    pub fn saved_queries(&self) -> Vec<FolderView<'_>> {
        self.catalog.list()
    }

    /// Render a built-in template against a table's columns
    pub fn template_query(&self, template: &str, table: &str) -> Result<String, SessionError> {
        let template = find_template(template).ok_or_else(|| SessionError::UnknownTemplate(template.to_string()))?;
        let columns: Vec<String> = self.columns(table)?.into_iter().map(|c| c.name).collect();
        Ok(template.render(table, &columns))
    }

    /// Guess what a table holds and propose matching queries
    pub fn suggest(&self, table: &str) -> Result<(DataFormat, Vec<SuggestedQuery>), SessionError> {
        let columns = self.columns(table)?;
        let format = detect_format(&columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>());
        Ok((format, format_queries(format, table, &columns)))
    }
}
