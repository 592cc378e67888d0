//! Filesystem-backed JSON document store

use crate::storage::traits::{Storage, StorageError, StorageResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Stores documents as files under a root directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a relative document path
    pub fn resolve(&self, path: &str) -> PathBuf {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.root.clone(), |acc, segment| acc.join(segment))
    }
}

impl Storage for JsonFileStore {
    fn write_document(&self, path: &str, contents: &str) -> StorageResult<()> {
        let target = self.resolve(path);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::from_io(parent, e))?;
        }

        // Write next to the target and rename so readers never see a torn file
        let mut tmp_name = target
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        tmp_name.push(".tmp");
        let tmp = target.with_file_name(tmp_name);

        fs::write(&tmp, contents).map_err(|e| StorageError::from_io(&tmp, e))?;
        if let Err(e) = fs::rename(&tmp, &target) {
            let _ = fs::remove_file(&tmp);
            return Err(StorageError::from_io(&target, e));
        }

        tracing::trace!("Wrote {} bytes to {}", contents.len(), target.display());
        Ok(())
    }

    fn read_document(&self, path: &str) -> StorageResult<String> {
        let target = self.resolve(path);
        fs::read_to_string(&target).map_err(|e| StorageError::from_io(&target, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());

        store
            .write_document("countries/vn/vn.states.json", "{}")
            .unwrap();

        let written = dir.path().join("countries").join("vn").join("vn.states.json");
        assert!(written.is_file());
        assert!(!dir
            .path()
            .join("countries")
            .join("vn")
            .join("vn.states.json.tmp")
            .exists());
    }

    #[test]
    fn test_write_overwrites_existing_document() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());

        store.write_document("countries.json", "[1, 2, 3]").unwrap();
        store.write_document("countries.json", "[]").unwrap();

        assert_eq!(store.read_document("countries.json").unwrap(), "[]");
    }

    #[test]
    fn test_read_missing_document_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());

        let err = store.read_document("missing.json").unwrap_err();
        assert!(err.is_not_found());
    }
}
