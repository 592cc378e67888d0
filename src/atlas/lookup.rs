use crate::model::{
    City, Country, CountryOption, CountryState, CountryStateCity, Currency, Language, PhoneCode,
    State, StateCity,
};
use crate::storage::{self, JsonFileStore, Storage};
use deunicode::deunicode;
use std::path::Path;

/// Folds diacritics and case for fuzzy name matching
///
/// `"  Việt Nam "` becomes `"viet nam"`.
pub fn normalize(s: &str) -> String {
    deunicode(s).to_lowercase().trim().to_string()
}

/// Read-only geographic reference data
#[derive(Debug, Clone, Default)]
pub struct Atlas {
    countries: Vec<Country>,
    country_states: Vec<CountryState>,
    state_cities: Vec<StateCity>,
    phone_codes: Vec<PhoneCode>,
    currencies: Vec<Currency>,
    languages: Vec<Language>,
}

impl Atlas {
    /// Loads every document under a metadata directory
    pub fn load(dir: impl AsRef<Path>) -> Self {
        Self::from_store(&JsonFileStore::new(dir.as_ref()))
    }

    /// Loads every document reachable from `countries.json` in a store
    ///
    /// States files are located through the country list and cities files
    /// through the states, so orphaned files are ignored.
    pub fn from_store<S: Storage + ?Sized>(store: &S) -> Self {
        let countries: Vec<Country> = list_or_empty(store, storage::COUNTRIES_FILE);

        let country_states: Vec<CountryState> = countries
            .iter()
            .filter_map(|country| document_or_none(store, &storage::states_path(&country.code)))
            .collect();

        let state_cities: Vec<StateCity> = country_states
            .iter()
            .flat_map(|group| group.states.iter())
            .filter_map(|state| {
                document_or_none(
                    store,
                    &storage::cities_path(&state.country_code, &state.code),
                )
            })
            .collect();

        let atlas = Self {
            countries,
            country_states,
            state_cities,
            phone_codes: list_or_empty(store, storage::PHONE_CODES_FILE),
            currencies: list_or_empty(store, storage::CURRENCIES_FILE),
            languages: list_or_empty(store, storage::LANGUAGES_FILE),
        };

        tracing::debug!(
            "Atlas loaded: {} countries, {} state groups, {} city groups",
            atlas.countries.len(),
            atlas.country_states.len(),
            atlas.state_cities.len()
        );
        atlas
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    /// States of a country by alpha-2 code (case-insensitive)
    pub fn states(&self, country_code: &str) -> &[State] {
        self.country_states
            .iter()
            .find(|group| group.country_code.eq_ignore_ascii_case(country_code))
            .map(|group| group.states.as_slice())
            .unwrap_or_default()
    }

    /// Cities of a state by country and composite state code (case-insensitive)
    pub fn cities(&self, country_code: &str, state_code: &str) -> &[City] {
        self.state_cities
            .iter()
            .find(|group| {
                group.country_code.eq_ignore_ascii_case(country_code)
                    && group.state_code.eq_ignore_ascii_case(state_code)
            })
            .map(|group| group.cities.as_slice())
            .unwrap_or_default()
    }

    pub fn phone_codes(&self) -> &[PhoneCode] {
        &self.phone_codes
    }

    pub fn currencies(&self) -> &[Currency] {
        &self.currencies
    }

    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    pub fn country_states(&self) -> &[CountryState] {
        &self.country_states
    }

    pub fn state_cities(&self) -> &[StateCity] {
        &self.state_cities
    }

    pub fn country_by_id(&self, id: u64) -> Option<&Country> {
        self.countries.iter().find(|c| c.id == id)
    }

    pub fn country_by_code(&self, code: &str) -> Option<&Country> {
        self.countries
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code))
    }

    pub fn country_options(&self) -> Vec<CountryOption> {
        self.countries.iter().map(CountryOption::from).collect()
    }

    pub fn states_by_country_id(&self, country_id: u64) -> &[State] {
        self.country_states
            .iter()
            .find(|group| group.country_id == country_id)
            .map(|group| group.states.as_slice())
            .unwrap_or_default()
    }

    pub fn cities_by_state_id(&self, state_id: u64) -> &[City] {
        self.state_cities
            .iter()
            .find(|group| group.state_id == state_id)
            .map(|group| group.cities.as_slice())
            .unwrap_or_default()
    }

    /// Cities of a state by composite state code alone (case-insensitive)
    pub fn cities_by_state_code(&self, state_code: &str) -> &[City] {
        self.state_cities
            .iter()
            .find(|group| group.state_code.eq_ignore_ascii_case(state_code))
            .map(|group| group.cities.as_slice())
            .unwrap_or_default()
    }

    /// Nested country → states → cities view of every country with a states
    /// file
    ///
    /// States without a cities file get an empty city list.
    pub fn country_state_cities(&self) -> Vec<CountryStateCity> {
        self.country_states
            .iter()
            .map(|group| self.nest(group))
            .collect()
    }

    pub fn country_state_cities_by_country_id(&self, country_id: u64) -> Option<CountryStateCity> {
        self.country_states
            .iter()
            .find(|group| group.country_id == country_id)
            .map(|group| self.nest(group))
    }

    fn nest(&self, group: &CountryState) -> CountryStateCity {
        let states = group
            .states
            .iter()
            .map(|state| StateCity {
                state_id: state.id,
                state_code: state.code.clone(),
                country_code: group.country_code.clone(),
                cities: self.cities_by_state_id(state.id).to_vec(),
            })
            .collect();

        CountryStateCity {
            country_id: group.country_id,
            country_code: group.country_code.clone(),
            states,
        }
    }

    pub fn phone_code_by_country_code(&self, country_code: &str) -> Option<&PhoneCode> {
        self.phone_codes
            .iter()
            .find(|p| p.country_code.eq_ignore_ascii_case(country_code))
    }

    pub fn currency_by_country_code(&self, country_code: &str) -> Option<&Currency> {
        self.currencies
            .iter()
            .find(|c| c.country_code.eq_ignore_ascii_case(country_code))
    }

    /// First currency with the given ISO 4217 code
    pub fn currency_by_code(&self, code: &str) -> Option<&Currency> {
        self.currencies
            .iter()
            .find(|c| !c.code.is_empty() && c.code.eq_ignore_ascii_case(code))
    }

    pub fn language_by_code(&self, code: &str) -> Option<&Language> {
        self.languages
            .iter()
            .find(|l| l.code.eq_ignore_ascii_case(code))
    }

    /// Countries whose name or native name contains `query`, ignoring
    /// diacritics and case
    pub fn search_countries(&self, query: &str) -> Vec<&Country> {
        let needle = normalize(query);
        if needle.is_empty() {
            return Vec::new();
        }

        self.countries
            .iter()
            .filter(|c| {
                normalize(&c.name).contains(&needle) || normalize(&c.native_name).contains(&needle)
            })
            .collect()
    }
}

fn list_or_empty<S, T>(store: &S, path: &str) -> Vec<T>
where
    S: Storage + ?Sized,
    T: serde::de::DeserializeOwned,
{
    storage::or_empty(path, storage::load_list(store, path))
}

fn document_or_none<S, T>(store: &S, path: &str) -> Option<T>
where
    S: Storage + ?Sized,
    T: serde::de::DeserializeOwned,
{
    storage::or_empty(path, storage::load_document(store, path).map(Some))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::save;
    use tempfile::TempDir;

    fn country(id: u64, code: &str, name: &str, native: &str) -> Country {
        Country {
            id,
            name: name.to_string(),
            native_name: native.to_string(),
            code: code.to_string(),
            iso_alpha3: String::new(),
            continent: String::new(),
            continent_name: String::new(),
            phone_code: String::new(),
            postal_code_format: String::new(),
            currency_code: String::new(),
            currency_name: String::new(),
            currency_symbol: String::new(),
            capital: String::new(),
            languages: String::new(),
            emoji: String::new(),
        }
    }

    fn state(id: u64, code: &str, country_id: u64, country_code: &str) -> State {
        State {
            id,
            name: format!("State {code}"),
            native_name: String::new(),
            code: code.to_string(),
            internal_code: String::new(),
            country_id,
            country_code: country_code.to_string(),
            latitude: 0.0,
            longitude: 0.0,
        }
    }

    fn city(id: u64, state: &State) -> City {
        City {
            id,
            name: format!("City {id}"),
            native_name: String::new(),
            code: format!("{}-{}", state.code, id),
            country_id: state.country_id,
            country_code: state.country_code.clone(),
            state_code: state.code.clone(),
            latitude: 0.0,
            longitude: 0.0,
        }
    }

    fn write_tree(dir: &Path) {
        let store = JsonFileStore::new(dir);
        let vn = country(1562822, "VN", "Vietnam", "Việt Nam");
        let is = country(2629691, "IS", "Iceland", "Ísland");
        save(&store, storage::COUNTRIES_FILE, &vec![vn.clone(), is]).unwrap();

        let sg = state(1580578, "VN-SG", vn.id, "VN");
        save(
            &store,
            &storage::states_path("VN"),
            &CountryState {
                country_id: vn.id,
                country_code: "VN".to_string(),
                states: vec![sg.clone()],
            },
        )
        .unwrap();
        save(
            &store,
            &storage::cities_path("VN", "VN-SG"),
            &StateCity {
                state_id: sg.id,
                state_code: sg.code.clone(),
                country_code: "VN".to_string(),
                cities: vec![city(9999, &sg)],
            },
        )
        .unwrap();

        save(
            &store,
            storage::PHONE_CODES_FILE,
            &vec![PhoneCode {
                country_code: "VN".to_string(),
                phone_code: "84".to_string(),
                emoji: "🇻🇳".to_string(),
            }],
        )
        .unwrap();
        save(
            &store,
            storage::CURRENCIES_FILE,
            &vec![Currency {
                country_code: "VN".to_string(),
                code: "VND".to_string(),
                name: "Vietnamese đồng".to_string(),
                symbol: "₫".to_string(),
            }],
        )
        .unwrap();
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Việt Nam "), "viet nam");
        assert_eq!(normalize("Ísland"), "island");
    }

    #[test]
    fn test_accessors_over_persisted_tree() {
        let dir = TempDir::new().unwrap();
        write_tree(dir.path());
        let atlas = Atlas::load(dir.path());

        assert_eq!(atlas.countries().len(), 2);
        assert_eq!(atlas.states("VN").len(), 1);
        assert_eq!(atlas.states("vn")[0].code, "VN-SG");
        assert_eq!(atlas.cities("VN", "VN-SG")[0].code, "VN-SG-9999");
        assert_eq!(atlas.cities_by_state_id(1580578).len(), 1);
        assert_eq!(atlas.states_by_country_id(1562822).len(), 1);
        assert_eq!(atlas.phone_code_by_country_code("VN").unwrap().phone_code, "84");
        assert_eq!(atlas.currency_by_code("vnd").unwrap().country_code, "VN");
        assert_eq!(atlas.country_by_id(2629691).unwrap().code, "IS");
        assert_eq!(atlas.country_options()[0].code, "VN");
    }

    #[test]
    fn test_cities_by_state_code() {
        let dir = TempDir::new().unwrap();
        write_tree(dir.path());
        let atlas = Atlas::load(dir.path());

        assert_eq!(atlas.cities_by_state_code("VN-SG").len(), 1);
        assert_eq!(atlas.cities_by_state_code("vn-sg")[0].id, 9999);
        assert!(atlas.cities_by_state_code("VN-HN").is_empty());
    }

    #[test]
    fn test_country_state_cities_nests_every_state() {
        let dir = TempDir::new().unwrap();
        write_tree(dir.path());
        let store = JsonFileStore::new(dir.path());

        // A second state with no cities file
        let hanoi = state(1581129, "VN-HN", 1562822, "VN");
        let mut group: CountryState = storage::load_document(&store, &storage::states_path("VN")).unwrap();
        group.states.push(hanoi);
        save(&store, &storage::states_path("VN"), &group).unwrap();

        let atlas = Atlas::load(dir.path());
        let nested = atlas.country_state_cities();

        // Iceland has no states file, so only Vietnam is nested
        assert_eq!(nested.len(), 1);
        let vn = &nested[0];
        assert_eq!(vn.country_code, "VN");
        assert_eq!(vn.states.len(), 2);
        assert_eq!(vn.states[0].state_code, "VN-SG");
        assert_eq!(vn.states[0].cities[0].code, "VN-SG-9999");
        assert_eq!(vn.states[1].state_code, "VN-HN");
        assert!(vn.states[1].cities.is_empty());

        assert_eq!(atlas.country_state_cities_by_country_id(1562822).as_ref(), Some(vn));
        assert!(atlas.country_state_cities_by_country_id(2629691).is_none());
    }

    #[test]
    fn test_missing_data_is_empty_not_error() {
        let dir = TempDir::new().unwrap();
        write_tree(dir.path());
        let atlas = Atlas::load(dir.path());

        // Iceland has no states file, and languages.json was never written
        assert!(atlas.states("IS").is_empty());
        assert!(atlas.cities("VN", "VN-HN").is_empty());
        assert!(atlas.languages().is_empty());
        assert!(atlas.language_by_code("vi").is_none());
        assert!(atlas.country_by_code("ZZ").is_none());
    }

    #[test]
    fn test_empty_directory_loads_empty_atlas() {
        let dir = TempDir::new().unwrap();
        let atlas = Atlas::load(dir.path().join("never-crawled"));

        assert!(atlas.countries().is_empty());
        assert!(atlas.phone_codes().is_empty());
        assert!(atlas.currencies().is_empty());
    }

    #[test]
    fn test_search_ignores_diacritics() {
        let dir = TempDir::new().unwrap();
        write_tree(dir.path());
        let atlas = Atlas::load(dir.path());

        let hits: Vec<&str> = atlas
            .search_countries("viet")
            .iter()
            .map(|c| c.code.as_str())
            .collect();
        assert_eq!(hits, vec!["VN"]);

        assert_eq!(atlas.search_countries("ISLAND").len(), 1);
        assert!(atlas.search_countries("   ").is_empty());
    }
}
