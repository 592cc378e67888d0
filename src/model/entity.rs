//! Normalized entities
//!
//! These are the shapes written to the metadata tree. Keys are camelCase so
//! the persisted JSON stays compatible with existing readers of the layout.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A country, enriched from the auxiliary dataset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    /// GeoNames identifier
    pub id: u64,
    pub name: String,
    pub native_name: String,
    /// ISO 3166-1 alpha-2 code, e.g. "VN"
    pub code: String,
    pub iso_alpha3: String,
    pub continent: String,
    pub continent_name: String,
    pub phone_code: String,
    pub postal_code_format: String,
    pub currency_code: String,
    pub currency_name: String,
    pub currency_symbol: String,
    pub capital: String,
    /// Comma-separated language tags as reported by GeoNames
    pub languages: String,
    pub emoji: String,
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) {}", self.id, self.code, self.name)
    }
}

/// A first-level administrative division
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub id: u64,
    pub name: String,
    pub native_name: String,
    /// `{countryCode}-{ISO 3166-2 or admin code}`, unique within the country
    pub code: String,
    /// ISO 3166-2 subdivision code, empty when GeoNames has none
    pub internal_code: String,
    pub country_id: u64,
    pub country_code: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) {}", self.id, self.code, self.name)
    }
}

/// A city or district within a state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub id: u64,
    pub name: String,
    pub native_name: String,
    /// `{stateCode}-{id}`, globally unique
    pub code: String,
    pub country_id: u64,
    pub country_code: String,
    pub state_code: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// All states of one country
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryState {
    pub country_id: u64,
    pub country_code: String,
    pub states: Vec<State>,
}

/// All cities of one state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateCity {
    pub state_id: u64,
    pub state_code: String,
    #[serde(default)]
    pub country_code: String,
    pub cities: Vec<City>,
}

/// A country with every state and the cities of each state
///
/// Derived by the atlas; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryStateCity {
    pub country_id: u64,
    pub country_code: String,
    pub states: Vec<StateCity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneCode {
    pub country_code: String,
    pub phone_code: String,
    pub emoji: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    pub country_code: String,
    /// ISO 4217 code
    pub code: String,
    pub name: String,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Language {
    pub code: String,
    pub name: String,
    pub native: String,
}

/// Compact country entry for pickers and select boxes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryOption {
    pub id: u64,
    pub code: String,
    pub name: String,
    pub native_name: String,
    pub emoji: String,
}

impl From<&Country> for CountryOption {
    fn from(country: &Country) -> Self {
        Self {
            id: country.id,
            code: country.code.clone(),
            name: country.name.clone(),
            native_name: country.native_name.clone(),
            emoji: country.emoji.clone(),
        }
    }
}
