//! Raw gazetteer records to normalized entities
//!
//! Composite codes:
//! - state: `{countryCode}-{ISO 3166-2 subdivision, else adminCode1}`
//! - city: `{stateCode}-{geonameId}`

use crate::model::{
    AdditionalIndex, City, CityGeoname, Country, CountryAdditional, CountryGeoname, CountryState,
    Currency, PhoneCode, State, StateCity, StateGeoname,
};
use std::collections::HashSet;

/// Output of the countries stage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountryCatalog {
    pub countries: Vec<Country>,
    pub phone_codes: Vec<PhoneCode>,
    pub currencies: Vec<Currency>,
}

pub fn state_code(country_code: &str, raw: &StateGeoname) -> String {
    let subdivision = raw.iso_subdivision().unwrap_or(raw.admin_code1.as_str());
    format!("{}-{}", country_code, subdivision)
}

pub fn city_code(state_code: &str, geoname_id: u64) -> String {
    format!("{}-{}", state_code, geoname_id)
}

/// Builds a country, enriched from `extra` when present
///
/// Without an auxiliary entry every enrichment field is the empty string,
/// except the native name which falls back to the gazetteer name. The same
/// fallback applies when the entry has no `native` field at all; an explicit
/// empty string is kept.
pub fn build_country(raw: &CountryGeoname, extra: Option<&CountryAdditional>) -> Country {
    let empty = CountryAdditional::default();
    let extra = extra.unwrap_or(&empty);

    let native_name = extra
        .native
        .clone()
        .unwrap_or_else(|| raw.country_name.clone());

    Country {
        id: raw.geoname_id,
        name: raw.country_name.clone(),
        native_name,
        code: raw.country_code.clone(),
        iso_alpha3: raw.iso_alpha3.clone(),
        continent: raw.continent.clone(),
        continent_name: raw.continent_name.clone(),
        phone_code: extra.phone_code.clone(),
        postal_code_format: raw.postal_code_format.clone(),
        currency_code: extra.currency.clone(),
        currency_name: extra.currency_name.clone(),
        currency_symbol: extra.currency_symbol.clone(),
        capital: raw.capital.clone(),
        languages: raw.languages.clone(),
        emoji: extra.emoji.clone(),
    }
}

pub fn phone_code(country: &Country) -> PhoneCode {
    PhoneCode {
        country_code: country.code.clone(),
        phone_code: country.phone_code.clone(),
        emoji: country.emoji.clone(),
    }
}

pub fn currency(country: &Country) -> Currency {
    Currency {
        country_code: country.code.clone(),
        code: country.currency_code.clone(),
        name: country.currency_name.clone(),
        symbol: country.currency_symbol.clone(),
    }
}

/// Builds the three country-stage outputs
///
/// Keeps one country per alpha-2 code; later duplicates are dropped.
pub fn build_catalog(raw: &[CountryGeoname], index: &AdditionalIndex) -> CountryCatalog {
    let mut seen = HashSet::new();
    let mut catalog = CountryCatalog::default();

    for record in raw {
        if !seen.insert(record.country_code.as_str()) {
            tracing::warn!(
                "Duplicate country code {} (geonameId {}), keeping the first",
                record.country_code,
                record.geoname_id
            );
            continue;
        }

        let extra = index.get(&record.country_code);
        if extra.is_none() {
            tracing::debug!("No enrichment entry for {}", record.country_code);
        }

        let country = build_country(record, extra);
        catalog.phone_codes.push(phone_code(&country));
        catalog.currencies.push(currency(&country));
        catalog.countries.push(country);
    }

    catalog
}

pub fn map_state(country: &Country, raw: &StateGeoname) -> State {
    State {
        id: raw.geoname_id,
        name: raw.name.clone(),
        native_name: raw.toponym_name.clone(),
        code: state_code(&country.code, raw),
        internal_code: raw.iso_subdivision().unwrap_or_default().to_string(),
        country_id: country.id,
        country_code: country.code.clone(),
        latitude: raw.lat,
        longitude: raw.lng,
    }
}

pub fn map_city(state: &State, raw: &CityGeoname) -> City {
    City {
        id: raw.geoname_id,
        name: raw.name.clone(),
        native_name: raw.toponym_name.clone(),
        code: city_code(&state.code, raw.geoname_id),
        country_id: state.country_id,
        country_code: state.country_code.clone(),
        state_code: state.code.clone(),
        latitude: raw.lat,
        longitude: raw.lng,
    }
}

pub fn country_states(country: &Country, children: &[StateGeoname]) -> CountryState {
    CountryState {
        country_id: country.id,
        country_code: country.code.clone(),
        states: children.iter().map(|raw| map_state(country, raw)).collect(),
    }
}

pub fn state_cities(state: &State, children: &[CityGeoname]) -> StateCity {
    StateCity {
        state_id: state.id,
        state_code: state.code.clone(),
        country_code: state.country_code.clone(),
        cities: children.iter().map(|raw| map_city(state, raw)).collect(),
    }
}
