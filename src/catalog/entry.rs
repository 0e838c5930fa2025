use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::CatalogError;

/// Separator between folder and label in a full name
pub const FOLDER_SEPARATOR: char = '/';

/// Stable identity of a saved query, assigned once at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// First eight hex digits, enough to address an entry interactively
    #[must_use]
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for EntryId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One saved query
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: EntryId,
    pub query: String,
    pub full_name: String,
    pub folder: String,
    pub label: String,
    /// Creation time
    pub timestamp: DateTime<Utc>,
}

impl CatalogEntry {
    pub(crate) fn new(full_name: &str, query: &str, timestamp: DateTime<Utc>) -> Result<Self, CatalogError> {
        let (folder, label) = split_full_name(full_name)?;
        Ok(Self {
            id: EntryId::new(),
            query: query.to_string(),
            full_name: full_name.trim().to_string(),
            folder,
            label,
            timestamp,
        })
    }

    pub(crate) fn refresh_full_name(&mut self) {
        self.full_name = format!("{}{FOLDER_SEPARATOR}{}", self.folder, self.label);
    }
}

/// Splits a full name on the first separator into `(folder, label)`.
///
/// A name without separator files the entry under a folder named after itself.
pub fn split_full_name(full_name: &str) -> Result<(String, String), CatalogError> {
    let trimmed = full_name.trim();

    let (folder, label) = match trimmed.split_once(FOLDER_SEPARATOR) {
        Some((folder, label)) => (folder.trim(), label.trim()),
        None => (trimmed, trimmed),
    };

    if folder.is_empty() || label.is_empty() {
        return Err(CatalogError::InvalidName(full_name.to_string()));
    }
    Ok((folder.to_string(), label.to_string()))
}

pub(crate) fn validate_label(label: &str) -> Result<String, CatalogError> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::InvalidName(label.to_string()));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn validate_folder_name(name: &str) -> Result<String, CatalogError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.contains(FOLDER_SEPARATOR) {
        return Err(CatalogError::InvalidName(name.to_string()));
    }
    Ok(trimmed.to_string())
}
