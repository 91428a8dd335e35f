//! Read-only country and city lookup over the bundled dataset.
//!
//! Every country is compiled into the library with its main cities and parsed
//! once per process. A full `countries+cities.json` or
//! `countries+states+cities.json` export of the dr5hn database can be loaded
//! from disk instead with [`LocationDirectory::load_from`]. Lookups are
//! synchronous and never touch the network.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use once_cell::sync::OnceCell;
use serde::Deserialize;

use crate::error::LocationError;
use crate::model::{City, Country};

const BUNDLED_DATASET: &str = include_str!("../data/locations.json");

static BUNDLED: OnceCell<LocationDirectory> = OnceCell::new();

/// One country entry. Both the bundled file and dr5hn exports parse into this.
#[derive(Debug, Deserialize)]
struct CountryRaw {
    iso2: String,
    name: String,
    #[serde(default, alias = "phonecode")]
    phone_code: Option<String>,
    #[serde(default)]
    cities: Vec<CityRaw>,
    #[serde(default)]
    states: Vec<StateRaw>,
}

#[derive(Debug, Deserialize)]
struct StateRaw {
    #[serde(default)]
    cities: Vec<CityRaw>,
}

/// A bare name in the bundled file, an object with a `name` in dr5hn exports.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CityRaw {
    Name(String),
    Entry { name: String },
}

impl CityRaw {
    fn into_name(self) -> String {
        match self {
            Self::Name(name) | Self::Entry { name } => name.trim().to_string(),
        }
    }
}

impl CountryRaw {
    /// Country-level cities first, then each state's, without duplicates.
    fn city_names(self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.cities
            .into_iter()
            .chain(self.states.into_iter().flat_map(|state| state.cities))
            .map(CityRaw::into_name)
            .filter(|name| !name.is_empty() && seen.insert(name.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LocationDirectory {
    /// Dataset order.
    countries: Vec<Country>,
    /// City names, parallel to `countries`.
    cities: Vec<Vec<String>>,
}

impl LocationDirectory {
    /// The dataset shipped with the crate, parsed on first use.
    pub fn bundled() -> Result<&'static LocationDirectory, LocationError> {
        BUNDLED.get_or_try_init(|| Self::from_json(BUNDLED_DATASET))
    }

    /// Read a dataset file, e.g. a dr5hn `countries+states+cities.json`.
    pub fn load_from(path: &Path) -> Result<Self, LocationError> {
        let json = fs::read_to_string(path).map_err(|source| LocationError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let directory = Self::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            countries = directory.countries.len(),
            "loaded location dataset from file"
        );
        Ok(directory)
    }

    /// Build a directory from a JSON array of countries.
    ///
    /// Each entry needs `iso2` and `name`. `phone_code` (or `phonecode`) is
    /// optional. Cities come from `cities` and from every `states[].cities`,
    /// given either as plain names or as objects with a `name`.
    pub fn from_json(json: &str) -> Result<Self, LocationError> {
        let raw: Vec<CountryRaw> = serde_json::from_str(json)?;

        let mut directory = Self::default();
        for entry in raw {
            let country = Country {
                code: normalize_code(&entry.iso2),
                name: entry.name.trim().to_string(),
                phone_code: entry
                    .phone_code
                    .as_deref()
                    .unwrap_or_default()
                    .trim()
                    .trim_start_matches('+')
                    .to_string(),
            };
            directory.countries.push(country);
            directory.cities.push(entry.city_names());
        }

        tracing::debug!(countries = directory.countries.len(), "location directory loaded");
        Ok(directory)
    }

    pub fn list_countries(&self) -> &[Country] {
        &self.countries
    }

    /// Cities of a country in dataset order. Empty for an unknown or blank code.
    pub fn list_cities(&self, country_code: &str) -> Vec<City> {
        let Some(index) = self.index_of(country_code) else {
            return Vec::new();
        };

        let code = &self.countries[index].code;
        self.cities[index]
            .iter()
            .map(|name| City {
                name: name.clone(),
                country_code: code.clone(),
            })
            .collect()
    }

    pub fn country_by_code(&self, code: &str) -> Option<&Country> {
        self.index_of(code).map(|index| &self.countries[index])
    }

    /// Match a country by ISO code or by case-insensitive name.
    pub fn find_country(&self, query: &str) -> Option<&Country> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        self.country_by_code(query).or_else(|| {
            let lower = query.to_lowercase();
            self.countries
                .iter()
                .find(|country| country.name.to_lowercase() == lower)
        })
    }

    /// Match a city of the given country by case-insensitive name.
    pub fn find_city(&self, country_code: &str, query: &str) -> Option<City> {
        let lower = query.trim().to_lowercase();
        if lower.is_empty() {
            return None;
        }

        self.list_cities(country_code)
            .into_iter()
            .find(|city| city.name.to_lowercase() == lower)
    }

    fn index_of(&self, code: &str) -> Option<usize> {
        let code = normalize_code(code);
        if code.is_empty() {
            return None;
        }
        self.countries.iter().position(|country| country.code == code)
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        { "iso2": "JP", "name": "Japan", "phone_code": "81", "cities": ["Tokyo", "Osaka"] },
        { "iso2": "fr", "name": "France", "phone_code": "+33", "cities": ["Paris"] },
        { "iso2": "AQ", "name": "Antarctica", "phone_code": "672" }
    ]"#;

    fn sample() -> LocationDirectory {
        LocationDirectory::from_json(SAMPLE).expect("sample dataset")
    }

    #[test]
    fn countries_keep_dataset_order() {
        let directory = sample();
        let codes: Vec<&str> = directory
            .list_countries()
            .iter()
            .map(|c| c.code.as_str())
            .collect();

        assert_eq!(codes, ["JP", "FR", "AQ"]);
    }

    #[test]
    fn codes_and_phone_codes_are_normalized() {
        let directory = sample();
        let france = directory.country_by_code("FR").expect("france");

        assert_eq!(france.code, "FR");
        assert_eq!(france.phone_code, "33");
    }

    #[test]
    fn cities_belong_to_their_country() {
        let directory = sample();
        let cities = directory.list_cities("jp");

        assert_eq!(cities.len(), 2);
        assert_eq!(cities[0].name, "Tokyo");
        assert!(cities.iter().all(|c| c.country_code == "JP"));
    }

    #[test]
    fn unknown_or_blank_code_yields_no_cities() {
        let directory = sample();

        assert!(directory.list_cities("ZZ").is_empty());
        assert!(directory.list_cities("").is_empty());
        assert!(directory.list_cities("   ").is_empty());
        assert!(directory.list_cities("AQ").is_empty());
    }

    #[test]
    fn find_country_accepts_code_or_name() {
        let directory = sample();

        assert_eq!(directory.find_country("japan").map(|c| c.code.as_str()), Some("JP"));
        assert_eq!(directory.find_country(" jp ").map(|c| c.code.as_str()), Some("JP"));
        assert!(directory.find_country("Narnia").is_none());
    }

    #[test]
    fn find_city_is_case_insensitive() {
        let directory = sample();

        let city = directory.find_city("JP", "tokyo").expect("tokyo");
        assert_eq!(city.name, "Tokyo");
        assert!(directory.find_city("FR", "Tokyo").is_none());
    }

    #[test]
    fn bundled_dataset_parses_and_contains_tokyo() {
        let directory = LocationDirectory::bundled().expect("bundled dataset");

        let japan = directory.country_by_code("JP").expect("japan");
        assert_eq!(japan.phone_code, "81");
        assert!(directory.find_city("JP", "Tokyo").is_some());
    }

    #[test]
    fn bundled_dataset_lists_every_country() {
        let directory = LocationDirectory::bundled().expect("bundled dataset");
        let countries = directory.list_countries();

        assert_eq!(countries.len(), 250);
        for code in ["LU", "KH", "XK", "VA", "AX", "SS"] {
            assert!(directory.country_by_code(code).is_some(), "missing {code}");
        }
        assert!(directory.find_city("LU", "Luxembourg").is_some());
        assert!(directory.find_city("KH", "Phnom Penh").is_some());
        assert!(directory.list_cities("DE").len() > 30);

        let mut codes: Vec<&str> = countries.iter().map(|c| c.code.as_str()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), countries.len());
    }

    #[test]
    fn reads_dr5hn_exports_with_states() {
        let json = r#"[
            {
                "id": 82, "name": "Germany", "iso3": "DEU", "iso2": "DE", "phonecode": "49",
                "states": [
                    { "id": 3009, "name": "Bavaria", "cities": [
                        { "id": 1, "name": "Munich", "latitude": "48.13", "longitude": "11.57" },
                        { "id": 2, "name": "Nuremberg" }
                    ]},
                    { "id": 3010, "name": "Berlin", "cities": [{ "id": 3, "name": "Berlin" }] }
                ]
            },
            {
                "name": "Luxembourg", "iso2": "LU", "phone_code": "+352",
                "cities": [{ "name": "Luxembourg" }, { "name": "Luxembourg" }]
            }
        ]"#;
        let directory = LocationDirectory::from_json(json).expect("dr5hn dataset");

        let germany: Vec<String> = directory.list_cities("DE").into_iter().map(|c| c.name).collect();
        assert_eq!(germany, ["Munich", "Nuremberg", "Berlin"]);
        assert_eq!(directory.country_by_code("DE").expect("de").phone_code, "49");
        assert_eq!(directory.country_by_code("LU").expect("lu").phone_code, "352");
        assert_eq!(directory.list_cities("LU").len(), 1);
    }

    #[test]
    fn load_from_reads_a_dataset_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("countries+cities.json");
        fs::write(&path, SAMPLE).expect("write dataset");

        let directory = LocationDirectory::load_from(&path).expect("load dataset");
        assert_eq!(directory.list_countries().len(), 3);

        let missing = LocationDirectory::load_from(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(missing, LocationError::Io { .. }));
        assert!(missing.to_string().contains("missing.json"));
    }

    #[test]
    fn malformed_dataset_is_an_error() {
        assert!(LocationDirectory::from_json("{ not json").is_err());
    }
}
