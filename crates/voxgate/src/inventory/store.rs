use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{GatewayError, GatewayResult};
use crate::inventory::persistence::save_entries;

/// A known application. Persisted as a two-element `[name, path]` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct ApplicationEntry {
    pub name: String,
    pub path: String,
}

impl ApplicationEntry {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

impl From<(String, String)> for ApplicationEntry {
    fn from((name, path): (String, String)) -> Self {
        Self { name, path }
    }
}

impl From<ApplicationEntry> for (String, String) {
    fn from(entry: ApplicationEntry) -> Self {
        (entry.name, entry.path)
    }
}

/// Point-in-time copy of the inventory. Lookups run against this copy so no lock is held
/// while a request is being resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventorySnapshot {
    entries: Vec<ApplicationEntry>,
}

impl InventorySnapshot {
    pub fn new(entries: Vec<ApplicationEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ApplicationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry, in inventory order, whose name occurs case-insensitively in `text`.
    /// Entries with blank names never match.
    pub fn find_in(&self, text: &str) -> Option<&ApplicationEntry> {
        let lowered = text.to_lowercase();
        self.entries.iter().find(|entry| {
            let name = entry.name.trim().to_lowercase();
            !name.is_empty() && lowered.contains(&name)
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    /// Names joined with `|`, the form the prompt template expects.
    pub fn joined_names(&self) -> String {
        self.names().join("|")
    }
}

/// Shared, mutable application inventory.
///
/// Cloning the handle shares the underlying list. Writers come from the management API;
/// readers take a [`InventorySnapshot`] and never hold the lock across an await.
#[derive(Debug, Clone, Default)]
pub struct ApplicationInventory {
    entries: Arc<RwLock<Vec<ApplicationEntry>>>,
    document: Option<PathBuf>,
}

impl ApplicationInventory {
    pub fn new(entries: Vec<ApplicationEntry>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(entries)),
            document: None,
        }
    }

    /// An inventory whose mutations are written back to `document`.
    pub fn persistent(entries: Vec<ApplicationEntry>, document: PathBuf) -> Self {
        Self {
            entries: Arc::new(RwLock::new(entries)),
            document: Some(document),
        }
    }

    pub fn snapshot(&self) -> GatewayResult<InventorySnapshot> {
        Ok(InventorySnapshot::new(self.read()?.clone()))
    }

    pub fn list(&self) -> GatewayResult<Vec<ApplicationEntry>> {
        Ok(self.read()?.clone())
    }

    pub fn len(&self) -> GatewayResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> GatewayResult<bool> {
        Ok(self.read()?.is_empty())
    }

    /// Append an entry and return its index.
    pub fn add(&self, entry: ApplicationEntry) -> GatewayResult<usize> {
        validate(&entry)?;
        let index = {
            let mut guard = self.write()?;
            guard.push(entry);
            guard.len() - 1
        };
        self.persist()?;
        Ok(index)
    }

    /// Edit the name and/or path of the entry at `index`.
    pub fn update(
        &self,
        index: usize,
        name: Option<String>,
        path: Option<String>,
    ) -> GatewayResult<ApplicationEntry> {
        let updated = {
            let mut guard = self.write()?;
            let entry = guard.get_mut(index).ok_or_else(|| {
                GatewayError::NotFound(format!("no application at index {index}"))
            })?;
            let mut candidate = entry.clone();
            if let Some(name) = name {
                candidate.name = name;
            }
            if let Some(path) = path {
                candidate.path = path;
            }
            validate(&candidate)?;
            *entry = candidate.clone();
            candidate
        };
        self.persist()?;
        Ok(updated)
    }

    /// Swap in a freshly discovered list.
    pub fn replace(&self, entries: Vec<ApplicationEntry>) -> GatewayResult<()> {
        *self.write()? = entries;
        self.persist()
    }

    /// Write the current list to the backing document, if there is one.
    pub fn persist(&self) -> GatewayResult<()> {
        let Some(document) = self.document.as_deref() else {
            return Ok(());
        };
        let entries = self.list()?;
        save_entries(document, &entries)
    }

    fn read(&self) -> GatewayResult<RwLockReadGuard<'_, Vec<ApplicationEntry>>> {
        self.entries
            .read()
            .map_err(|_| GatewayError::Internal("application inventory lock poisoned".to_string()))
    }

    fn write(&self) -> GatewayResult<RwLockWriteGuard<'_, Vec<ApplicationEntry>>> {
        self.entries
            .write()
            .map_err(|_| GatewayError::Internal("application inventory lock poisoned".to_string()))
    }
}

fn validate(entry: &ApplicationEntry) -> GatewayResult<()> {
    if entry.name.trim().is_empty() {
        return Err(GatewayError::InvalidInput(
            "application name must not be empty".to_string(),
        ));
    }
    if entry.path.trim().is_empty() {
        return Err(GatewayError::InvalidInput(
            "application path must not be empty".to_string(),
        ));
    }
    Ok(())
}
