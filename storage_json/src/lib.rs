//! JSON file storage backend for txwatch.
//!
//! Persists the partitioned table as a single JSON document, keyed by a
//! storage key (one file per key). The file may be shared by several
//! processes tracking the same table; writes go through a temp file and a
//! rename so readers never observe a half-written document.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use txwatch_storage::{PartitionedTable, StorageError, TableStorage};

/// A [`TableStorage`] backed by one JSON file.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Use an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under `<dir>/<key>.json`.
    pub fn in_dir(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{key}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TableStorage for JsonFileStorage {
    fn load(&self) -> Result<PartitionedTable, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(PartitionedTable::new()),
            Err(e) => {
                return Err(StorageError::Backend(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )))
            }
        };
        match serde_json::from_str(&contents) {
            Ok(table) => Ok(table),
            Err(e) => {
                // Corrupt data is recoverable: start from an empty table.
                tracing::warn!(
                    path = %self.path.display(),
                    "discarding corrupt persisted table: {e}"
                );
                Ok(PartitionedTable::new())
            }
        }
    }

    fn save(&self, table: &PartitionedTable) -> Result<(), StorageError> {
        let json = serde_json::to_string(table)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StorageError::Backend(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| {
            StorageError::Backend(format!("failed to write {}: {e}", tmp.display()))
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            StorageError::Backend(format!("failed to replace {}: {e}", self.path.display()))
        })
    }
}
