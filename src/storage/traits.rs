//! Storage traits and error types
//!
//! This module defines the trait interface for document storage backends and
//! the associated error types.

use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// The document does not exist (yet). Readers of the crawl output treat
    /// this as "nothing persisted", see [`crate::storage::load_or_default`].
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Serialization error on {path}: {message}")]
    Serialization { path: String, message: String },
}

impl StorageError {
    /// Maps an IO error, separating a missing file from other failures
    pub fn from_io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path.display().to_string())
        } else {
            Self::Io {
                path: path.display().to_string(),
                source,
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for document storage backends
///
/// Paths are relative to the backend's root and use `/` as separator, e.g.
/// `countries/vn/vn.states.json`.
pub trait Storage {
    /// Replaces the document at `path` with `contents`
    ///
    /// Implementations must never leave a partially written document behind
    /// and must create missing parent directories.
    fn write_document(&self, path: &str, contents: &str) -> StorageResult<()>;

    /// Reads the full document at `path`
    ///
    /// Returns [`StorageError::NotFound`] when no document exists.
    fn read_document(&self, path: &str) -> StorageResult<String>;
}

impl<S: Storage + ?Sized> Storage for &S {
    fn write_document(&self, path: &str, contents: &str) -> StorageResult<()> {
        (**self).write_document(path, contents)
    }

    fn read_document(&self, path: &str) -> StorageResult<String> {
        (**self).read_document(path)
    }
}
