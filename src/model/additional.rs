//! Static enrichment dataset (`countries.additional.json`)

use crate::storage::StorageError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// One entry of the enrichment dataset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CountryAdditional {
    pub country_code: String,
    pub iso_alpha3: String,
    pub country_name: String,
    /// Endonym; `None` when the entry has no such field
    pub native: Option<String>,
    pub phone_code: String,
    /// ISO 4217 currency code
    pub currency: String,
    pub currency_name: String,
    pub currency_symbol: String,
    pub emoji: String,
}

/// Enrichment entries indexed by alpha-2 country code
#[derive(Debug, Clone, Default)]
pub struct AdditionalIndex {
    entries: HashMap<String, CountryAdditional>,
}

impl AdditionalIndex {
    /// Reads and indexes the dataset at `path`
    ///
    /// Unlike the persisted crawl output, this file is an input: a missing or
    /// corrupt dataset is an error, not an empty index.
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        let content = std::fs::read_to_string(path).map_err(|e| StorageError::from_io(path, e))?;
        let entries: Vec<CountryAdditional> =
            serde_json::from_str(&content).map_err(|e| StorageError::Serialization {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(Self::from_entries(entries))
    }

    /// Builds an index; on duplicate codes the first entry wins
    pub fn from_entries(entries: impl IntoIterator<Item = CountryAdditional>) -> Self {
        let mut map = HashMap::new();
        for entry in entries {
            map.entry(entry.country_code.clone()).or_insert(entry);
        }
        Self { entries: map }
    }

    pub fn get(&self, country_code: &str) -> Option<&CountryAdditional> {
        self.entries.get(country_code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn entry(code: &str, phone: &str) -> CountryAdditional {
        CountryAdditional {
            country_code: code.to_string(),
            phone_code: phone.to_string(),
            ..CountryAdditional::default()
        }
    }

    #[test]
    fn test_first_entry_wins_on_duplicates() {
        let index = AdditionalIndex::from_entries(vec![entry("VN", "84"), entry("VN", "99")]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("VN").unwrap().phone_code, "84");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"countryCode": "VN", "native": "Việt Nam", "phoneCode": "84",
                 "currency": "VND", "currencyName": "Vietnamese đồng",
                 "currencySymbol": "₫", "emoji": "🇻🇳"}}]"#
        )
        .unwrap();

        let index = AdditionalIndex::load(file.path()).unwrap();
        let vn = index.get("VN").unwrap();
        assert_eq!(vn.native.as_deref(), Some("Việt Nam"));
        assert_eq!(vn.currency, "VND");
        assert_eq!(vn.iso_alpha3, "");
    }

    #[test]
    fn test_absent_native_is_distinct_from_blank() {
        let entries: Vec<CountryAdditional> = serde_json::from_str(
            r#"[{"countryCode": "XK"}, {"countryCode": "AQ", "native": ""}]"#,
        )
        .unwrap();

        assert_eq!(entries[0].native, None);
        assert_eq!(entries[1].native.as_deref(), Some(""));
    }

    #[test]
    fn test_missing_dataset_is_an_error() {
        let result = AdditionalIndex::load(Path::new("/nonexistent/countries.additional.json"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }
}
