//! Statistics over a persisted metadata tree
//!
//! Used by `--stats` to judge how complete the files on disk are without
//! re-running a crawl.

use crate::atlas::Atlas;

/// Dataset statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetStatistics {
    pub countries: usize,
    pub countries_with_states: usize,
    pub states: usize,
    pub states_with_cities: usize,
    pub cities: usize,
    pub phone_codes: usize,
    pub currencies: usize,
    pub languages: usize,

    /// Alpha-2 codes of countries that have no states file
    pub countries_missing_states: Vec<String>,
}

/// Computes statistics from a loaded atlas
pub fn load_statistics(atlas: &Atlas) -> DatasetStatistics {
    let countries_missing_states = atlas
        .countries()
        .iter()
        .filter(|country| {
            !atlas
                .country_states()
                .iter()
                .any(|group| group.country_code == country.code)
        })
        .map(|country| country.code.clone())
        .collect();

    DatasetStatistics {
        countries: atlas.countries().len(),
        countries_with_states: atlas.country_states().len(),
        states: atlas.country_states().iter().map(|g| g.states.len()).sum(),
        states_with_cities: atlas.state_cities().len(),
        cities: atlas.state_cities().iter().map(|g| g.cities.len()).sum(),
        phone_codes: atlas.phone_codes().len(),
        currencies: atlas.currencies().len(),
        languages: atlas.languages().len(),
        countries_missing_states,
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &DatasetStatistics) {
    println!("=== Dataset Statistics ===\n");

    println!("Records:");
    println!("  Countries: {}", stats.countries);
    println!("  States: {}", stats.states);
    println!("  Cities: {}", stats.cities);
    println!("  Phone codes: {}", stats.phone_codes);
    println!("  Currencies: {}", stats.currencies);
    println!("  Languages: {}", stats.languages);
    println!();

    println!("Coverage:");
    println!(
        "  Countries with states file: {} / {} ({:.1}%)",
        stats.countries_with_states,
        stats.countries,
        percentage(stats.countries_with_states, stats.countries)
    );
    println!(
        "  States with cities file: {} / {} ({:.1}%)",
        stats.states_with_cities,
        stats.states,
        percentage(stats.states_with_cities, stats.states)
    );
    println!();

    if !stats.countries_missing_states.is_empty() {
        println!(
            "Countries Missing States ({}):",
            stats.countries_missing_states.len()
        );
        for code in &stats.countries_missing_states {
            println!("  - {}", code);
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_atlas_statistics() {
        let stats = load_statistics(&Atlas::default());
        assert_eq!(stats, DatasetStatistics::default());
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(1, 4), 25.0);
    }
}
