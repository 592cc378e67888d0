//! Raw GeoNames payloads
//!
//! Only the fields the crawler maps are modeled; everything else in the
//! response is ignored. Coordinates arrive as strings (`"21.0245"`) and are
//! parsed leniently.

use serde::{Deserialize, Deserializer};

/// Envelope of `GET /countryInfoJSON`
#[derive(Debug, Clone, Deserialize)]
pub struct CountryInfoResponse {
    #[serde(default)]
    pub geonames: Vec<CountryGeoname>,
}

/// Envelope of `GET /childrenJSON`
///
/// `geonames` is absent when a feature has no children.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildrenResponse {
    #[serde(default)]
    pub total_results_count: u64,
    #[serde(default)]
    pub geonames: Vec<ChildGeoname>,
}

/// Error payload GeoNames returns with HTTP 200 (quota, bad username, ...)
#[derive(Debug, Clone, Deserialize)]
pub struct ApiStatus {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub value: i64,
}

/// A country as listed by `countryInfoJSON`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CountryGeoname {
    pub geoname_id: u64,
    pub country_code: String,
    pub iso_alpha3: String,
    pub iso_numeric: String,
    pub country_name: String,
    pub capital: String,
    pub languages: String,
    pub continent: String,
    pub continent_name: String,
    pub currency_code: String,
    pub postal_code_format: String,
    #[serde(deserialize_with = "lenient_u64")]
    pub population: u64,
}

/// ISO 3166-2 subdivision codes attached to an administrative feature
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AdminCodes {
    #[serde(rename = "ISO3166_2", default)]
    pub iso3166_2: Option<String>,
}

/// A child feature from `childrenJSON`; states and cities share this shape
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChildGeoname {
    pub geoname_id: u64,
    pub name: String,
    pub toponym_name: String,
    pub country_code: String,
    pub admin_code1: String,
    pub admin_name1: String,
    pub admin_codes1: Option<AdminCodes>,
    pub fcode: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub lat: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub lng: f64,
}

pub type StateGeoname = ChildGeoname;
pub type CityGeoname = ChildGeoname;

impl ChildGeoname {
    /// The ISO 3166-2 subdivision code, if present and non-empty
    pub fn iso_subdivision(&self) -> Option<&str> {
        self.admin_codes1
            .as_ref()
            .and_then(|codes| codes.iso3166_2.as_deref())
            .filter(|code| !code.is_empty())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        match Option::<NumberOrString>::deserialize(deserializer)? {
            Some(NumberOrString::Number(n)) => Some(n),
            Some(NumberOrString::Text(s)) => s.trim().parse().ok(),
            None => None,
        },
    )
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(deserializer)?.unwrap_or(0.0))
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(deserializer)?
        .filter(|n| *n >= 0.0)
        .map(|n| n as u64)
        .unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_geoname_with_string_coordinates() {
        let raw = r#"{
            "geonameId": 1580578,
            "name": "Ho Chi Minh",
            "toponymName": "Thành Phố Hồ Chí Minh",
            "countryCode": "VN",
            "adminCode1": "20",
            "adminCodes1": { "ISO3166_2": "SG" },
            "lat": "10.75",
            "lng": "106.66667",
            "fcode": "ADM1"
        }"#;

        let state: StateGeoname = serde_json::from_str(raw).unwrap();
        assert_eq!(state.geoname_id, 1580578);
        assert_eq!(state.iso_subdivision(), Some("SG"));
        assert!((state.lat - 10.75).abs() < f64::EPSILON);
        assert!((state.lng - 106.66667).abs() < 1e-9);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let state: StateGeoname =
            serde_json::from_str(r#"{"geonameId": 1, "name": "X", "lat": "n/a"}"#).unwrap();
        assert_eq!(state.iso_subdivision(), None);
        assert_eq!(state.toponym_name, "");
        assert_eq!(state.lat, 0.0);
        assert_eq!(state.lng, 0.0);
    }

    #[test]
    fn test_empty_iso_code_is_absent() {
        let state: StateGeoname = serde_json::from_str(
            r#"{"geonameId": 1, "adminCode1": "01", "adminCodes1": {"ISO3166_2": ""}}"#,
        )
        .unwrap();
        assert_eq!(state.iso_subdivision(), None);
    }

    #[test]
    fn test_children_without_geonames() {
        let response: ChildrenResponse =
            serde_json::from_str(r#"{"totalResultsCount": 0}"#).unwrap();
        assert_eq!(response.total_results_count, 0);
        assert!(response.geonames.is_empty());
    }

    #[test]
    fn test_country_population_as_string() {
        let country: CountryGeoname = serde_json::from_str(
            r#"{"geonameId": 1562822, "countryCode": "VN", "population": "95540395"}"#,
        )
        .unwrap();
        assert_eq!(country.population, 95540395);
    }
}
