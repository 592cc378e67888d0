//! Data model for geographic reference data
//!
//! # Components
//!
//! - `geoname`: Raw records as returned by the GeoNames gazetteer
//! - `entity`: Normalized entities persisted by the crawler and served by the atlas
//! - `additional`: The static enrichment dataset keyed by alpha-2 country code

mod additional;
mod entity;
mod geoname;

pub use additional::{AdditionalIndex, CountryAdditional};
pub use entity::{
    City, Country, CountryOption, CountryState, CountryStateCity, Currency, Language, PhoneCode,
    State, StateCity,
};
pub use geoname::{
    AdminCodes, ApiStatus, ChildGeoname, ChildrenResponse, CityGeoname, CountryGeoname,
    CountryInfoResponse, StateGeoname,
};
