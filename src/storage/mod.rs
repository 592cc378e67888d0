//! Storage module for persisting crawl output
//!
//! This module handles the metadata tree the crawler writes and the atlas
//! reads, including:
//! - Whole-document JSON persistence with atomic overwrite
//! - The file layout contract (`countries.json`, per-country state files, ...)
//! - Lenient loading, where a missing or corrupt document means "no data"

mod json;
mod traits;

pub use json::JsonFileStore;
pub use traits::{Storage, StorageError, StorageResult};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::hash::Hash;

pub const COUNTRIES_FILE: &str = "countries.json";
pub const PHONE_CODES_FILE: &str = "phone.codes.json";
pub const CURRENCIES_FILE: &str = "currencies.json";
pub const LANGUAGES_FILE: &str = "languages.json";

/// `countries/{cc}/{cc}.states.json`, lowercased
pub fn states_path(country_code: &str) -> String {
    let cc = country_code.to_lowercase();
    format!("countries/{cc}/{cc}.states.json")
}

/// `countries/{cc}/{state code}.cities.json`, lowercased
pub fn cities_path(country_code: &str, state_code: &str) -> String {
    format!(
        "countries/{}/{}.cities.json",
        country_code.to_lowercase(),
        state_code.to_lowercase()
    )
}

/// Serializes `value` as pretty-printed JSON and replaces the document at `path`
pub fn save<S, T>(store: &S, path: &str, value: &T) -> StorageResult<()>
where
    S: Storage + ?Sized,
    T: Serialize + ?Sized,
{
    let contents =
        serde_json::to_string_pretty(value).map_err(|e| StorageError::Serialization {
            path: path.to_string(),
            message: e.to_string(),
        })?;
    store.write_document(path, &contents)
}

/// Deserializes a single JSON document
pub fn load_document<S, T>(store: &S, path: &str) -> StorageResult<T>
where
    S: Storage + ?Sized,
    T: DeserializeOwned,
{
    let contents = store.read_document(path)?;
    serde_json::from_str(&contents).map_err(|e| StorageError::Serialization {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// Deserializes a JSON array, keeping document order
pub fn load_list<S, T>(store: &S, path: &str) -> StorageResult<Vec<T>>
where
    S: Storage + ?Sized,
    T: DeserializeOwned,
{
    load_document(store, path)
}

/// Deserializes a JSON array into a set
pub fn load<S, T>(store: &S, path: &str) -> StorageResult<HashSet<T>>
where
    S: Storage + ?Sized,
    T: DeserializeOwned + Eq + Hash,
{
    Ok(load_list::<S, T>(store, path)?.into_iter().collect())
}

/// [`load`] with the lenient contract: any read or parse failure yields an
/// empty set
pub fn load_or_default<S, T>(store: &S, path: &str) -> HashSet<T>
where
    S: Storage + ?Sized,
    T: DeserializeOwned + Eq + Hash,
{
    or_empty(path, load(store, path))
}

/// Collapses a storage result into `T::default()`, logging why
///
/// A missing document is expected before the first crawl and is logged at
/// debug; anything else indicates a damaged tree and is logged at warn.
pub fn or_empty<T: Default>(path: &str, result: StorageResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(StorageError::NotFound(_)) => {
            tracing::debug!("No document at {}, using empty default", path);
            T::default()
        }
        Err(e) => {
            tracing::warn!("Failed to load {}: {}. Using empty default", path, e);
            T::default()
        }
    }
}
