// Saved-query catalog: entries, folders, persistence
pub mod entry;
pub mod folder;
pub mod backend;
pub mod query_catalog;

pub use entry::{split_full_name, CatalogEntry, EntryId, FOLDER_SEPARATOR};
pub use folder::Folder;
pub use backend::{CatalogBackend, CatalogSnapshot, JsonFileBackend, MemoryBackend, CATALOG_VERSION};
pub use query_catalog::{FolderView, QueryCatalog};
