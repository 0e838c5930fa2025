use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use super::backend::{CatalogBackend, CatalogSnapshot, JsonFileBackend, MemoryBackend};
use super::entry::{validate_folder_name, validate_label, CatalogEntry, EntryId};
use super::folder::Folder;
use crate::core::CatalogError;

/// Shortest id prefix accepted when resolving a selector
const MIN_ID_PREFIX: usize = 4;

/// One folder of the catalog with its entries, in insertion order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderView<'a> {
    pub name: &'a str,
    pub explicit: bool,
    pub entries: Vec<&'a CatalogEntry>,
}

impl FolderView<'_> {
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }
}

/// Persisted collection of saved queries organized in folders.
///
/// Entries are addressed by their [`EntryId`]. Each mutation is applied to a
/// copy, persisted through the backend, and only then becomes visible; a
/// failed write leaves the catalog as it was.
pub struct QueryCatalog {
    backend: Box<dyn CatalogBackend>,
    state: CatalogSnapshot,
}

impl QueryCatalog {
    pub fn open(backend: Box<dyn CatalogBackend>) -> Result<Self, CatalogError> {
        let state = backend.load()?;
        info!(
            location = %backend.location(),
            folders = state.folders.len(),
            entries = state.entries.len(),
            "opened query catalog"
        );
        Ok(Self { backend, state })
    }

    pub fn open_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        Self::open(Box::new(JsonFileBackend::new(path)))
    }

    /// Catalog that is not kept after the process exits
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            backend: Box::new(MemoryBackend::new()),
            state: CatalogSnapshot::default(),
        }
    }

    #[must_use]
    pub fn location(&self) -> String {
        self.backend.location()
    }

    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.state.entries
    }

    #[must_use]
    pub fn folders(&self) -> &[Folder] {
        &self.state.folders
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: EntryId) -> Option<&CatalogEntry> {
        self.state.entries.iter().find(|e| e.id == id)
    }

    /// First entry with this full name; names are not unique
    #[must_use]
    pub fn find(&self, full_name: &str) -> Option<&CatalogEntry> {
        let full_name = full_name.trim();
        self.state.entries.iter().find(|e| e.full_name == full_name)
    }

    #[must_use]
    pub fn find_by_query(&self, query: &str) -> Option<&CatalogEntry> {
        let query = query.trim();
        self.state.entries.iter().find(|e| e.query.trim() == query)
    }

    /// Resolve user input to one entry: a full id, a full name, or a unique id prefix
    pub fn resolve(&self, selector: &str) -> Result<&CatalogEntry, CatalogError> {
        let selector = selector.trim();

        if let Ok(uuid) = Uuid::parse_str(selector) {
            if let Some(entry) = self.get(EntryId::from(uuid)) {
                return Ok(entry);
            }
        }

        let by_name: Vec<&CatalogEntry> = self
            .state
            .entries
            .iter()
            .filter(|e| e.full_name == selector)
            .collect();
        match by_name.as_slice() {
            [entry] => return Ok(*entry),
            [_, _, ..] => return Err(CatalogError::AmbiguousSelector(selector.to_string())),
            [] => {}
        }

        let prefix = selector.to_ascii_lowercase().replace('-', "");
        if prefix.len() >= MIN_ID_PREFIX && prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            let by_id: Vec<&CatalogEntry> = self
                .state
                .entries
                .iter()
                .filter(|e| e.id.as_uuid().simple().to_string().starts_with(&prefix))
                .collect();
            match by_id.as_slice() {
                [entry] => return Ok(*entry),
                [_, _, ..] => return Err(CatalogError::AmbiguousSelector(selector.to_string())),
                [] => {}
            }
        }

        Err(CatalogError::EntryNotFound(selector.to_string()))
    }

    /// Save a query under `folder/label` (or a bare label); returns the new entry's id
    pub fn save(&mut self, full_name: &str, query: &str) -> Result<EntryId, CatalogError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CatalogError::EmptyQuery);
        }

        let timestamp = self.next_timestamp();
        let entry = CatalogEntry::new(full_name, query, timestamp)?;
        let id = entry.id;

        let mut next = self.state.clone();
        ensure_folder(&mut next, &entry.folder, timestamp, false);
        next.entries.push(entry);
        self.commit(next)?;

        info!(%id, full_name = full_name.trim(), "saved query");
        Ok(id)
    }

    /// Give an entry a new label inside its current folder
    pub fn rename(&mut self, id: EntryId, new_label: &str) -> Result<(), CatalogError> {
        let label = validate_label(new_label)?;
        let mut next = self.state.clone();
        let entry = entry_mut(&mut next, id)?;
        entry.label = label;
        entry.refresh_full_name();
        self.commit(next)
    }

    /// File an entry under another folder, creating the folder when needed
    pub fn move_entry(&mut self, id: EntryId, new_folder: &str) -> Result<(), CatalogError> {
        let folder = validate_folder_name(new_folder)?;
        let now = self.next_timestamp();
        let mut next = self.state.clone();

        let entry = entry_mut(&mut next, id)?;
        let old_folder = std::mem::replace(&mut entry.folder, folder.clone());
        entry.refresh_full_name();

        ensure_folder(&mut next, &folder, now, false);
        prune_folder(&mut next, &old_folder);
        self.commit(next)?;

        debug!(%id, from = %old_folder, to = %folder, "moved saved query");
        Ok(())
    }

    /// Replace the query text of an entry; name and timestamp stay
    pub fn update_query(&mut self, id: EntryId, query: &str) -> Result<(), CatalogError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CatalogError::EmptyQuery);
        }
        let mut next = self.state.clone();
        entry_mut(&mut next, id)?.query = query.to_string();
        self.commit(next)
    }

    /// Remove an entry; the others keep their order
    pub fn delete(&mut self, id: EntryId) -> Result<CatalogEntry, CatalogError> {
        let mut next = self.state.clone();
        let position = next
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| CatalogError::EntryNotFound(id.to_string()))?;
        let removed = next.entries.remove(position);
        prune_folder(&mut next, &removed.folder);
        self.commit(next)?;

        info!(%id, full_name = %removed.full_name, "deleted saved query");
        Ok(removed)
    }

    /// Create an empty folder that stays listed until deleted
    pub fn create_folder(&mut self, name: &str) -> Result<(), CatalogError> {
        let name = validate_folder_name(name)?;
        let mut next = self.state.clone();

        match next.folders.iter_mut().find(|f| f.name == name) {
            Some(folder) if folder.explicit => return Err(CatalogError::FolderAlreadyExists(name)),
            Some(folder) => folder.explicit = true,
            None => next.folders.push(Folder::new(name, self.next_timestamp(), true)),
        }
        self.commit(next)
    }

    /// Rename a folder in place; its entries follow
    pub fn rename_folder(&mut self, old: &str, new: &str) -> Result<(), CatalogError> {
        let old = old.trim();
        let new = validate_folder_name(new)?;
        if old == new {
            return Ok(());
        }

        let mut next = self.state.clone();
        if next.folders.iter().any(|f| f.name == new) {
            return Err(CatalogError::FolderAlreadyExists(new));
        }
        let folder = next
            .folders
            .iter_mut()
            .find(|f| f.name == old)
            .ok_or_else(|| CatalogError::FolderNotFound(old.to_string()))?;
        folder.name.clone_from(&new);

        for entry in next.entries.iter_mut().filter(|e| e.folder == old) {
            entry.folder.clone_from(&new);
            entry.refresh_full_name();
        }
        self.commit(next)
    }

    /// Delete a folder together with every entry in it; returns how many entries went
    pub fn delete_folder(&mut self, name: &str) -> Result<usize, CatalogError> {
        let name = name.trim();
        let mut next = self.state.clone();

        let position = next
            .folders
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| CatalogError::FolderNotFound(name.to_string()))?;
        next.folders.remove(position);

        let before = next.entries.len();
        next.entries.retain(|e| e.folder != name);
        let removed = before - next.entries.len();

        self.commit(next)?;
        info!(folder = name, removed, "deleted folder");
        Ok(removed)
    }

    /// Folder hierarchy: folders in order of first appearance, entries in insertion order
    #[must_use]
    pub fn list(&self) -> Vec<FolderView<'_>> {
        self.state
            .folders
            .iter()
            .map(|folder| FolderView {
                name: &folder.name,
                explicit: folder.explicit,
                entries: self
                    .state
                    .entries
                    .iter()
                    .filter(|e| e.folder == folder.name)
                    .collect(),
            })
            .collect()
    }

    fn commit(&mut self, next: CatalogSnapshot) -> Result<(), CatalogError> {
        self.backend.persist(&next)?;
        self.state = next;
        Ok(())
    }

    // Creation times strictly increase so entries keep a total order even within one clock tick
    fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now();
        let latest = self
            .state
            .entries
            .iter()
            .map(|e| e.timestamp)
            .chain(self.state.folders.iter().map(|f| f.created_at))
            .max();
        match latest {
            Some(latest) if latest >= now => latest + Duration::microseconds(1),
            _ => now,
        }
    }
}

fn entry_mut(state: &mut CatalogSnapshot, id: EntryId) -> Result<&mut CatalogEntry, CatalogError> {
    state
        .entries
        .iter_mut()
        .find(|e| e.id == id)
        .ok_or_else(|| CatalogError::EntryNotFound(id.to_string()))
}

fn ensure_folder(state: &mut CatalogSnapshot, name: &str, created_at: DateTime<Utc>, explicit: bool) {
    if !state.folders.iter().any(|f| f.name == name) {
        state.folders.push(Folder::new(name.to_string(), created_at, explicit));
    }
}

// Implicit folders exist only while they hold entries
fn prune_folder(state: &mut CatalogSnapshot, name: &str) {
    let in_use = state.entries.iter().any(|e| e.folder == name);
    if !in_use {
        state.folders.retain(|f| f.name != name || f.explicit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(catalog: &QueryCatalog) -> Vec<(String, Vec<String>)> {
        catalog
            .list()
            .iter()
            .map(|f| {
                (
                    f.name.to_string(),
                    f.labels().into_iter().map(String::from).collect(),
                )
            })
            .collect()
    }

    fn failing_catalog() -> (QueryCatalog, EntryId) {
        let mut catalog = QueryCatalog::in_memory();
        let id = catalog.save("reports/sales", "SELECT 1").unwrap();
        let mut backend = MemoryBackend::with_document(
            crate::catalog::backend::encode(&catalog.state).unwrap(),
        );
        backend.set_fail_writes(true);
        let catalog = QueryCatalog::open(Box::new(backend)).unwrap();
        (catalog, id)
    }

    #[test]
    fn test_save_and_list_example() {
        let mut catalog = QueryCatalog::in_memory();
        catalog.save("reports/sales", "SELECT * FROM sheet1").unwrap();
        catalog.save("reports/inventory", "SELECT * FROM sheet2").unwrap();

        assert_eq!(
            tree(&catalog),
            vec![("reports".to_string(), vec!["sales".to_string(), "inventory".to_string()])]
        );
    }

    #[test]
    fn test_bare_name_is_its_own_folder() {
        let mut catalog = QueryCatalog::in_memory();
        let id = catalog.save("daily", "SELECT 1").unwrap();

        assert_eq!(tree(&catalog), vec![("daily".to_string(), vec!["daily".to_string()])]);
        let entry = catalog.get(id).unwrap();
        assert_eq!(entry.full_name, "daily");
    }

    #[test]
    fn test_save_rejects_bad_input() {
        let mut catalog = QueryCatalog::in_memory();
        assert!(matches!(catalog.save("a/b", "   "), Err(CatalogError::EmptyQuery)));
        assert!(matches!(catalog.save("a/", "SELECT 1"), Err(CatalogError::InvalidName(_))));
        assert!(catalog.is_empty());
        assert!(catalog.folders().is_empty());
    }

    #[test]
    fn test_duplicate_names_are_distinct_entries() {
        let mut catalog = QueryCatalog::in_memory();
        let a = catalog.save("r/x", "SELECT 1").unwrap();
        let b = catalog.save("r/x", "SELECT 1").unwrap();
        assert_ne!(a, b);
        assert_eq!(catalog.len(), 2);

        catalog.delete(a).unwrap();
        assert!(catalog.get(b).is_some());
        assert!(catalog.get(a).is_none());
    }

    #[test]
    fn test_timestamps_strictly_increase() {
        let mut catalog = QueryCatalog::in_memory();
        for i in 0..20 {
            catalog.save(&format!("f/q{i}"), "SELECT 1").unwrap();
        }
        let stamps: Vec<_> = catalog.entries().iter().map(|e| e.timestamp).collect();
        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_rename_keeps_folder_query_and_timestamp() {
        let mut catalog = QueryCatalog::in_memory();
        let id = catalog.save("reports/sales", "SELECT 1").unwrap();
        let before = catalog.get(id).unwrap().clone();

        catalog.rename(id, "revenue").unwrap();

        let after = catalog.get(id).unwrap();
        assert_eq!(after.folder, "reports");
        assert_eq!(after.label, "revenue");
        assert_eq!(after.full_name, "reports/revenue");
        assert_eq!(after.query, before.query);
        assert_eq!(after.timestamp, before.timestamp);
        assert_eq!(tree(&catalog), vec![("reports".to_string(), vec!["revenue".to_string()])]);
    }

    #[test]
    fn test_rename_bare_entry() {
        let mut catalog = QueryCatalog::in_memory();
        let id = catalog.save("daily", "SELECT 1").unwrap();
        catalog.rename(id, "morning").unwrap();
        assert_eq!(tree(&catalog), vec![("daily".to_string(), vec!["morning".to_string()])]);
        assert_eq!(catalog.get(id).unwrap().full_name, "daily/morning");
    }

    #[test]
    fn test_move_never_duplicates() {
        let mut catalog = QueryCatalog::in_memory();
        let sales = catalog.save("reports/sales", "SELECT 1").unwrap();
        catalog.save("reports/inventory", "SELECT 2").unwrap();

        catalog.move_entry(sales, "archive").unwrap();

        assert_eq!(
            tree(&catalog),
            vec![
                ("reports".to_string(), vec!["inventory".to_string()]),
                ("archive".to_string(), vec!["sales".to_string()]),
            ]
        );
        assert_eq!(catalog.get(sales).unwrap().full_name, "archive/sales");
    }

    #[test]
    fn test_move_prunes_implicit_empty_folder() {
        let mut catalog = QueryCatalog::in_memory();
        let id = catalog.save("old/q", "SELECT 1").unwrap();
        catalog.move_entry(id, "new").unwrap();
        assert_eq!(tree(&catalog), vec![("new".to_string(), vec!["q".to_string()])]);
    }

    #[test]
    fn test_delete_keeps_order_of_others() {
        let mut catalog = QueryCatalog::in_memory();
        catalog.save("r/a", "SELECT 1").unwrap();
        let b = catalog.save("r/b", "SELECT 2").unwrap();
        catalog.save("r/c", "SELECT 3").unwrap();

        let removed = catalog.delete(b).unwrap();
        assert_eq!(removed.label, "b");
        assert_eq!(tree(&catalog), vec![("r".to_string(), vec!["a".to_string(), "c".to_string()])]);
        assert!(matches!(catalog.delete(b), Err(CatalogError::EntryNotFound(_))));
    }

    #[test]
    fn test_update_query() {
        let mut catalog = QueryCatalog::in_memory();
        let id = catalog.save("r/a", "SELECT 1").unwrap();
        catalog.update_query(id, " SELECT 2 ").unwrap();
        assert_eq!(catalog.get(id).unwrap().query, "SELECT 2");
        assert!(matches!(catalog.update_query(id, ""), Err(CatalogError::EmptyQuery)));
    }

    #[test]
    fn test_explicit_folders() {
        let mut catalog = QueryCatalog::in_memory();
        catalog.create_folder("drafts").unwrap();
        assert_eq!(tree(&catalog), vec![("drafts".to_string(), vec![])]);
        assert!(matches!(
            catalog.create_folder("drafts"),
            Err(CatalogError::FolderAlreadyExists(_))
        ));

        let id = catalog.save("drafts/one", "SELECT 1").unwrap();
        catalog.delete(id).unwrap();
        assert_eq!(tree(&catalog), vec![("drafts".to_string(), vec![])]);
    }

    #[test]
    fn test_rename_folder_moves_entries() {
        let mut catalog = QueryCatalog::in_memory();
        let id = catalog.save("reports/sales", "SELECT 1").unwrap();
        catalog.save("other/x", "SELECT 2").unwrap();

        catalog.rename_folder("reports", "finance").unwrap();
        assert_eq!(catalog.get(id).unwrap().full_name, "finance/sales");
        assert_eq!(catalog.list()[0].name, "finance");

        assert!(matches!(
            catalog.rename_folder("finance", "other"),
            Err(CatalogError::FolderAlreadyExists(_))
        ));
        assert!(matches!(
            catalog.rename_folder("missing", "x"),
            Err(CatalogError::FolderNotFound(_))
        ));
    }

    #[test]
    fn test_delete_folder_removes_entries() {
        let mut catalog = QueryCatalog::in_memory();
        catalog.save("a/1", "SELECT 1").unwrap();
        catalog.save("a/2", "SELECT 2").unwrap();
        catalog.save("b/3", "SELECT 3").unwrap();

        assert_eq!(catalog.delete_folder("a").unwrap(), 2);
        assert_eq!(tree(&catalog), vec![("b".to_string(), vec!["3".to_string()])]);
    }

    #[test]
    fn test_resolve() {
        let mut catalog = QueryCatalog::in_memory();
        let id = catalog.save("reports/sales", "SELECT 1").unwrap();
        catalog.save("dup/x", "SELECT 2").unwrap();
        catalog.save("dup/x", "SELECT 3").unwrap();

        assert_eq!(catalog.resolve(&id.to_string()).unwrap().id, id);
        assert_eq!(catalog.resolve(&id.short()).unwrap().id, id);
        assert_eq!(catalog.resolve("reports/sales").unwrap().id, id);
        assert!(matches!(catalog.resolve("dup/x"), Err(CatalogError::AmbiguousSelector(_))));
        assert!(matches!(catalog.resolve("nothing"), Err(CatalogError::EntryNotFound(_))));
    }

    #[test]
    fn test_find_helpers() {
        let mut catalog = QueryCatalog::in_memory();
        let id = catalog.save("r/a", "SELECT 1").unwrap();
        assert_eq!(catalog.find("r/a").unwrap().id, id);
        assert_eq!(catalog.find_by_query("  SELECT 1 ").unwrap().id, id);
        assert!(catalog.find("r/b").is_none());
    }

    #[test]
    fn test_failed_write_leaves_catalog_unchanged() {
        let (mut catalog, id) = failing_catalog();
        let before = tree(&catalog);

        assert!(matches!(catalog.save("x/y", "SELECT 2"), Err(CatalogError::Io { .. })));
        assert!(catalog.rename(id, "z").is_err());
        assert!(catalog.move_entry(id, "elsewhere").is_err());
        assert!(catalog.delete(id).is_err());
        assert!(catalog.create_folder("new").is_err());

        assert_eq!(tree(&catalog), before);
        assert_eq!(catalog.get(id).unwrap().label, "sales");
    }

    #[test]
    fn test_unknown_entry() {
        let mut catalog = QueryCatalog::in_memory();
        let ghost = EntryId::new();
        assert!(matches!(catalog.rename(ghost, "x"), Err(CatalogError::EntryNotFound(_))));
        assert!(matches!(catalog.move_entry(ghost, "x"), Err(CatalogError::EntryNotFound(_))));
    }
}
