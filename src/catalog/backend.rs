use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::entry::{split_full_name, CatalogEntry, EntryId};
use super::folder::Folder;
use crate::core::CatalogError;

/// Current on-disk document version
pub const CATALOG_VERSION: u32 = 1;

/// Complete catalog contents; every mutation writes one of these in full
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    pub folders: Vec<Folder>,
    pub entries: Vec<CatalogEntry>,
}

impl CatalogSnapshot {
    /// Makes sure every entry's folder has a record, in order of first appearance
    pub(crate) fn normalize(&mut self) {
        for i in 0..self.entries.len() {
            let folder = &self.entries[i].folder;
            if !self.folders.iter().any(|f| &f.name == folder) {
                let created_at = self.entries[i].timestamp;
                self.folders.push(Folder::new(folder.clone(), created_at, false));
            }
        }
    }
}

/// Where a catalog lives between sessions
pub trait CatalogBackend {
    /// Read the stored catalog; a catalog that was never written is empty
    fn load(&self) -> Result<CatalogSnapshot, CatalogError>;

    /// Replace the stored catalog with `snapshot`
    fn persist(&mut self, snapshot: &CatalogSnapshot) -> Result<(), CatalogError>;

    /// Human-readable location, for messages
    fn location(&self) -> String;
}

#[derive(Serialize)]
struct DocumentOut<'a> {
    version: u32,
    folders: &'a [Folder],
    entries: &'a [CatalogEntry],
}

#[derive(Deserialize)]
struct DocumentIn {
    version: u32,
    #[serde(default)]
    folders: Vec<Folder>,
    #[serde(default)]
    entries: Vec<CatalogEntry>,
}

/// Record shape of catalogs written before folders and ids existed
#[derive(Deserialize)]
struct LegacyRecord {
    #[serde(default)]
    query: String,
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    folder: Option<String>,
    #[serde(default)]
    label: Option<String>,
    timestamp: String,
}

pub fn encode(snapshot: &CatalogSnapshot) -> Result<String, CatalogError> {
    let doc = DocumentOut {
        version: CATALOG_VERSION,
        folders: &snapshot.folders,
        entries: &snapshot.entries,
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Parses a catalog document; `origin` only feeds error messages
pub fn decode(text: &str, origin: &Path) -> Result<CatalogSnapshot, CatalogError> {
    let malformed = |source: serde_json::Error| CatalogError::Malformed {
        path: origin.to_path_buf(),
        source,
    };

    let raw: serde_json::Value = serde_json::from_str(text).map_err(malformed)?;

    let mut snapshot = if raw.is_array() {
        let records: Vec<LegacyRecord> = serde_json::from_value(raw).map_err(malformed)?;
        info!(origin = %origin.display(), records = records.len(), "importing legacy catalog");
        import_legacy(records)?
    } else {
        let doc: DocumentIn = serde_json::from_value(raw).map_err(malformed)?;
        if doc.version > CATALOG_VERSION {
            return Err(CatalogError::UnsupportedVersion {
                found: doc.version,
                supported: CATALOG_VERSION,
            });
        }
        CatalogSnapshot {
            folders: doc.folders,
            entries: doc.entries,
        }
    };

    snapshot.normalize();
    Ok(snapshot)
}

fn parse_legacy_timestamp(raw: &str) -> Result<DateTime<Utc>, CatalogError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| CatalogError::InvalidTimestamp(raw.to_string()))
}

// Records with an empty query were folder placeholders; they become explicit folders
fn import_legacy(records: Vec<LegacyRecord>) -> Result<CatalogSnapshot, CatalogError> {
    let mut snapshot = CatalogSnapshot::default();

    for record in records {
        let timestamp = parse_legacy_timestamp(&record.timestamp)?;
        let folder = record.folder.map(|f| f.trim().to_string()).filter(|f| !f.is_empty());
        let label = record.label.map(|l| l.trim().to_string()).filter(|l| !l.is_empty());
        let (folder, label) = match (folder, label) {
            (Some(folder), Some(label)) => (folder, label),
            (folder, label) => {
                let (split_folder, split_label) = split_full_name(&record.full_name)?;
                (folder.unwrap_or(split_folder), label.unwrap_or(split_label))
            }
        };

        let is_placeholder = record.query.trim().is_empty();
        match snapshot.folders.iter_mut().find(|f| f.name == folder) {
            Some(existing) => existing.explicit |= is_placeholder,
            None => snapshot
                .folders
                .push(Folder::new(folder.clone(), timestamp, is_placeholder)),
        }

        if !is_placeholder {
            let mut entry = CatalogEntry {
                id: EntryId::new(),
                query: record.query,
                full_name: record.full_name.trim().to_string(),
                folder,
                label,
                timestamp,
            };
            // The folder/label fields win over a stale or blank full name
            if split_full_name(&entry.full_name).ok() != Some((entry.folder.clone(), entry.label.clone())) {
                entry.refresh_full_name();
            }
            snapshot.entries.push(entry);
        }
    }

    Ok(snapshot)
}

/// Catalog stored as one JSON document, rewritten in full on every change
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    #[must_use]
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> CatalogError {
        CatalogError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl CatalogBackend for JsonFileBackend {
    fn load(&self) -> Result<CatalogSnapshot, CatalogError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no catalog file yet");
                return Ok(CatalogSnapshot::default());
            }
            Err(e) => return Err(self.io_error(e)),
        };
        decode(&text, &self.path)
    }

    fn persist(&mut self, snapshot: &CatalogSnapshot) -> Result<(), CatalogError> {
        let encoded = encode(snapshot)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        // Replace by rename: the previous document stays intact if the write fails
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, encoded).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), entries = snapshot.entries.len(), "persisted catalog");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Catalog that lives only as long as the process
#[derive(Default)]
pub struct MemoryBackend {
    document: Option<String>,
    fail_writes: bool,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already encoded document
    #[must_use]
    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            document: Some(document.into()),
            fail_writes: false,
        }
    }

    /// Make every following `persist` fail, to exercise rollback
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    #[must_use]
    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }
}

impl CatalogBackend for MemoryBackend {
    fn load(&self) -> Result<CatalogSnapshot, CatalogError> {
        self.document
            .as_deref()
            .map_or_else(|| Ok(CatalogSnapshot::default()), |doc| decode(doc, Path::new("<memory>")))
    }

    fn persist(&mut self, snapshot: &CatalogSnapshot) -> Result<(), CatalogError> {
        if self.fail_writes {
            return Err(CatalogError::Io {
                path: PathBuf::from("<memory>"),
                source: io::Error::other("writes disabled"),
            });
        }
        self.document = Some(encode(snapshot)?);
        Ok(())
    }

    fn location(&self) -> String {
        "<memory>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> CatalogSnapshot {
        let now = Utc::now();
        let entry = CatalogEntry::new("reports/sales", "SELECT 1", now).unwrap();
        let mut snapshot = CatalogSnapshot {
            folders: vec![Folder::new("empty".to_string(), now, true)],
            entries: vec![entry],
        };
        snapshot.normalize();
        snapshot
    }

    #[test]
    fn test_missing_file_is_empty_catalog() {
        let dir = TempDir::new().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("catalog.json"));
        assert_eq!(backend.load().unwrap(), CatalogSnapshot::default());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut backend = JsonFileBackend::new(dir.path().join("nested").join("catalog.json"));
        let snapshot = sample();

        backend.persist(&snapshot).unwrap();
        assert_eq!(backend.load().unwrap(), snapshot);
        assert!(!dir.path().join("nested").join("catalog.json.tmp").exists());
    }

    #[test]
    fn test_document_carries_version_and_record_fields() {
        let text = encode(&sample()).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(raw["version"], CATALOG_VERSION);
        let entry = &raw["entries"][0];
        for field in ["id", "query", "full_name", "folder", "label", "timestamp"] {
            assert!(entry.get(field).is_some(), "missing field {field}");
        }
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        fs::write(&path, "{ not json").unwrap();

        let backend = JsonFileBackend::new(&path);
        assert!(matches!(backend.load(), Err(CatalogError::Malformed { .. })));
    }

    #[test]
    fn test_newer_version_is_rejected() {
        let doc = r#"{"version": 99, "folders": [], "entries": []}"#;
        assert!(matches!(
            decode(doc, Path::new("x")),
            Err(CatalogError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn test_legacy_array_import() {
        let doc = r#"[
            {"query": "SELECT * FROM a", "full_name": "reports/sales", "folder": "reports", "label": "sales", "timestamp": "2024-05-01T10:00:00.123456"},
            {"query": "", "full_name": "archive", "folder": "archive", "label": "archive", "timestamp": "2024-05-01T10:00:01"},
            {"query": "SELECT 2", "full_name": "daily", "timestamp": "2024-05-01T10:00:02+00:00"}
        ]"#;

        let snapshot = decode(doc, Path::new("legacy.json")).unwrap();
        let folders: Vec<(&str, bool)> = snapshot
            .folders
            .iter()
            .map(|f| (f.name.as_str(), f.explicit))
            .collect();
        assert_eq!(folders, vec![("reports", false), ("archive", true), ("daily", false)]);

        assert_eq!(snapshot.entries.len(), 2);
        assert_eq!(snapshot.entries[1].folder, "daily");
        assert_eq!(snapshot.entries[1].label, "daily");
        assert_ne!(snapshot.entries[0].id, snapshot.entries[1].id);
    }

    #[test]
    fn test_legacy_fields_override_full_name() {
        let doc = r#"[
            {"query": "SELECT 1", "full_name": "old/name", "folder": "reports", "label": "sales", "timestamp": "2024-05-01T10:00:00"},
            {"query": "SELECT 2", "full_name": "", "folder": "archive", "label": "q1", "timestamp": "2024-05-01T10:00:01"},
            {"query": "SELECT 3", "full_name": "daily", "folder": "daily", "label": "daily", "timestamp": "2024-05-01T10:00:02"}
        ]"#;

        let snapshot = decode(doc, Path::new("legacy.json")).unwrap();
        let names: Vec<&str> = snapshot.entries.iter().map(|e| e.full_name.as_str()).collect();
        assert_eq!(names, vec!["reports/sales", "archive/q1", "daily"]);

        let doc = r#"[{"query": "SELECT 1", "full_name": "", "timestamp": "2024-05-01T10:00:00"}]"#;
        assert!(matches!(decode(doc, Path::new("x")), Err(CatalogError::InvalidName(_))));
    }

    #[test]
    fn test_legacy_bad_timestamp() {
        let doc = r#"[{"query": "q", "full_name": "a/b", "timestamp": "yesterday"}]"#;
        assert!(matches!(
            decode(doc, Path::new("x")),
            Err(CatalogError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_memory_backend_fail_writes() {
        let mut backend = MemoryBackend::new();
        backend.set_fail_writes(true);
        assert!(matches!(backend.persist(&sample()), Err(CatalogError::Io { .. })));
        assert!(backend.document().is_none());
    }
}
