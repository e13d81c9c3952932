//! Country and region reference tables
//!
//! Built once, on first access, from embedded ISO 3166 data:
//!
//! - `data/countries.csv` - ISO 3166-1 alpha-2 codes and English names
//! - `data/subdivisions.csv` - ISO 3166-2 subdivisions (code suffix + name)
//!
//! A manual override table adds search keywords, region and postal-code
//! field titles, and dial codes for the territories the numbering plan does
//! not cover. Everything else about dial codes comes from [`crate::phone`].
//!
//! Regions point back at their country by code; [`RegionEntry::country`]
//! resolves it through the global table, so neither table owns the other.
//!
//! # Example
//!
//! ```rust
//! use fieldguard_core::reference::countries;
//!
//! let us = countries().get("US").unwrap();
//! let regions = us.regions();
//! let california = &regions["CA"];
//! assert_eq!(california.name, "California");
//! assert_eq!(california.country().unwrap().code, "US");
//! ```

use once_cell::sync::Lazy;
use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::{Error, Result};
use crate::{phone, postal};

const COUNTRIES_CSV: &str = include_str!("../data/countries.csv");
const SUBDIVISIONS_CSV: &str = include_str!("../data/subdivisions.csv");

#[derive(Debug, Clone, Copy)]
struct CountryOverride {
    name: Option<&'static str>,
    dial_code: Option<&'static str>,
    keywords: &'static [&'static str],
    region_title: Option<&'static str>,
    postal_code_title: Option<&'static str>,
}

const NO_OVERRIDE: CountryOverride = CountryOverride {
    name: None,
    dial_code: None,
    keywords: &[],
    region_title: None,
    postal_code_title: None,
};

macro_rules! titles {
    ($keywords:expr, $region:expr, $postal:expr) => {
        CountryOverride {
            keywords: $keywords,
            region_title: $region,
            postal_code_title: Some($postal),
            ..NO_OVERRIDE
        }
    };
}

// Territories with a dial code here are missing from the numbering plan.
static OVERRIDES: phf::Map<&'static str, CountryOverride> = phf_map! {
    "AQ" => CountryOverride { dial_code: Some("672"), ..titles!(&["aq", "ata", "antarctica"], None, "Postal Code") },
    "AU" => titles!(&["au", "aus", "australia", "upside down", "down under", "oz"], Some("State or Territory"), "Postcode"),
    "BD" => titles!(&["bd", "bgd", "bangladesh"], Some("Division"), "Postal Code"),
    "BR" => titles!(&["br", "bra", "brazil"], Some("State"), "CEP"),
    "BV" => CountryOverride { dial_code: Some("47"), ..titles!(&["bv", "bvt", "bouvet island"], None, "Postal Code") },
    "CA" => titles!(&[], Some("Province or Territory"), "Postal Code"),
    "CN" => titles!(&["cn", "chn", "china"], Some("Province or Territory"), "Postal Code"),
    "DE" => titles!(&["de", "deu", "germany"], Some("State"), "Postal Code"),
    "EG" => titles!(&["eg", "egy", "egypt"], Some("Governorate"), "Postal Code"),
    "ES" => titles!(&["es", "esp", "spain"], Some("Autonomous Community"), "Postal Code"),
    "FR" => titles!(&["fr", "fra", "france"], Some("Region"), "Postal Code"),
    "GB" => titles!(&["gb", "uk", "united kingdom", "britain", "england", "scotland", "wales", "northern ireland"], Some("County, District or Parish"), "Postcode"),
    "GS" => CountryOverride { dial_code: Some("500"), ..titles!(&["gs", "sgs", "south georgia and the south sandwich islands"], None, "Postal Code") },
    "HM" => CountryOverride { dial_code: Some("672"), ..titles!(&["hm", "hmd", "heard island and mcdonald islands"], None, "Postal Code") },
    "ID" => titles!(&["id", "idn", "indonesia"], Some("Province or Territory"), "Postal Code"),
    "IN" => titles!(&["in", "ind", "india"], Some("State or Union Territory"), "PIN Code"),
    "IT" => titles!(&["it", "ita", "italy"], Some("Region"), "CAP"),
    "JP" => titles!(&["jp", "jpn", "japan"], Some("Prefecture"), "Postal Code"),
    "KR" => titles!(&["kr", "kor", "south korea"], Some("Province or Metropolitan City"), "Postal Code"),
    "MX" => titles!(&["mx", "mex", "mexico"], Some("State"), "Postal Code"),
    "NG" => titles!(&["ng", "nga", "nigeria"], Some("State or Territory"), "Postal Code"),
    "PH" => titles!(&["ph", "phl", "philippines"], Some("Province or Territory"), "ZIP Code"),
    "PK" => titles!(&["pk", "pak", "pakistan"], Some("Province or Territory"), "Postal Code"),
    "PN" => CountryOverride { dial_code: Some("64"), ..titles!(&["pn", "pcn", "pitcairn"], None, "Postal Code") },
    "RU" => titles!(&["ru", "rus", "russia"], Some("Federal Subject"), "Postal Code"),
    "TF" => CountryOverride { dial_code: Some("262"), ..titles!(&["tf", "atf", "french southern territories"], None, "Postal Code") },
    "UM" => CountryOverride { dial_code: Some("1"), ..titles!(&["um", "umi", "united states minor outlying islands"], None, "ZIP Code") },
    "US" => CountryOverride {
        name: Some("United States"),
        dial_code: Some("1"),
        ..titles!(&["us", "usa", "america", "united states"], Some("State or Territory"), "ZIP Code")
    },
};

/// One ISO 3166-1 country
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CountryEntry {
    /// Display name
    pub name: String,
    /// ISO 3166-1 alpha-2 code
    pub code: String,
    /// Country calling code without `+`; empty when unknown
    pub dial_code: String,
    /// Lowercase search keywords
    pub keywords: Vec<String>,
    /// Label for the region select field (e.g. "State or Territory")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_title: Option<String>,
    /// Label for the postal-code field (e.g. "ZIP Code")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code_title: Option<String>,
}

impl CountryEntry {
    /// Subdivisions of this country, keyed by ISO 3166-2 suffix
    pub fn regions(&self) -> BTreeMap<String, RegionEntry> {
        regions_for(&self.code)
    }

    /// Whether the country uses postal codes
    pub fn has_postal_codes(&self) -> bool {
        postal::has_postal_codes(&self.code)
    }

    fn matches(&self, needle: &str) -> bool {
        self.keywords.iter().any(|k| k.contains(needle))
    }
}

/// One ISO 3166-2 subdivision
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegionEntry {
    /// Display name
    pub name: String,
    /// Subdivision code without the country prefix (`CA` for `US-CA`)
    pub code: String,
    /// Alpha-2 code of the owning country
    pub country_code: String,
    /// Lowercase search keywords
    pub keywords: Vec<String>,
}

impl RegionEntry {
    /// Resolve the owning country through the global table
    pub fn country(&self) -> Option<&'static CountryEntry> {
        countries().get(&self.country_code)
    }

    /// Full ISO 3166-2 code (`US-CA`)
    pub fn iso_code(&self) -> String {
        format!("{}-{}", self.country_code, self.code)
    }
}

#[derive(Debug, Deserialize)]
struct CountryRow {
    code: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct SubdivisionRow {
    country: String,
    code: String,
    name: String,
}

/// Read-only country table keyed by alpha-2 code
#[derive(Debug, Clone, Default)]
pub struct CountryTable {
    entries: BTreeMap<String, CountryEntry>,
}

impl CountryTable {
    /// Build a table from `code,name` CSV, applying overrides and dial codes
    ///
    /// A missing dial code is logged and left empty; it never aborts the
    /// build.
    pub fn build(csv_data: &str) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(csv_data.as_bytes());
        let mut entries = BTreeMap::new();

        for row in reader.deserialize() {
            let row: CountryRow = row?;
            let code = row.code.trim().to_ascii_uppercase();
            if code.len() != 2 {
                return Err(Error::ReferenceData {
                    table: "countries".to_string(),
                    message: format!("'{}' is not an alpha-2 code", row.code),
                });
            }

            let over = OVERRIDES.get(code.as_str()).copied().unwrap_or(NO_OVERRIDE);
            let name = over.name.map(str::to_string).unwrap_or(row.name);

            let dial_code = match over.dial_code.map(str::to_string).or_else(|| {
                phone::calling_code(&code).map(|dial| dial.to_string())
            }) {
                Some(dial) => dial,
                None => {
                    tracing::debug!(country = %code, "no dial code for country");
                    String::new()
                }
            };

            let keywords = keywords(
                [code.to_lowercase(), name.to_lowercase()]
                    .into_iter()
                    .chain(over.keywords.iter().map(|k| k.to_string())),
            );

            let entry = CountryEntry {
                name,
                code: code.clone(),
                dial_code,
                keywords,
                region_title: over.region_title.map(str::to_string),
                postal_code_title: over.postal_code_title.map(str::to_string),
            };
            entries.insert(code, entry);
        }

        tracing::debug!(count = entries.len(), "built country table");
        Ok(Self { entries })
    }

    /// Look up a country by alpha-2 code (case-insensitive)
    pub fn get(&self, code: &str) -> Option<&CountryEntry> {
        self.entries.get(code.trim().to_ascii_uppercase().as_str())
    }

    /// All countries, ordered by code
    pub fn iter(&self) -> impl Iterator<Item = &CountryEntry> {
        self.entries.values()
    }

    /// Number of countries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Countries with a keyword containing `query`, ordered by code
    ///
    /// The query is trimmed and lowercased; an empty query matches all.
    pub fn search(&self, query: &str) -> Vec<&CountryEntry> {
        let needle = query.trim().to_lowercase();
        self.iter().filter(|c| c.matches(&needle)).collect()
    }
}

static COUNTRIES: Lazy<CountryTable> = Lazy::new(|| {
    CountryTable::build(COUNTRIES_CSV).unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to build country table");
        CountryTable::default()
    })
});

static SUBDIVISIONS: Lazy<HashMap<String, Vec<(String, String)>>> = Lazy::new(|| {
    load_subdivisions(SUBDIVISIONS_CSV).unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to load subdivisions");
        HashMap::new()
    })
});

fn load_subdivisions(csv_data: &str) -> Result<HashMap<String, Vec<(String, String)>>> {
    let mut reader = csv::Reader::from_reader(csv_data.as_bytes());
    let mut by_country: HashMap<String, Vec<(String, String)>> = HashMap::new();
    for row in reader.deserialize() {
        let row: SubdivisionRow = row?;
        by_country
            .entry(row.country.to_ascii_uppercase())
            .or_default()
            .push((row.code, row.name));
    }
    Ok(by_country)
}

/// Global country table
pub fn countries() -> &'static CountryTable {
    &COUNTRIES
}

/// Subdivisions of `country`, keyed by code suffix
///
/// Builds a fresh map on every call. Countries without embedded
/// subdivision data yield an empty map.
pub fn regions_for(country: &str) -> BTreeMap<String, RegionEntry> {
    let country = country.trim().to_ascii_uppercase();
    let Some(rows) = SUBDIVISIONS.get(&country) else {
        return BTreeMap::new();
    };

    rows.iter()
        .map(|(code, name)| {
            let entry = RegionEntry {
                name: name.clone(),
                code: code.clone(),
                country_code: country.clone(),
                keywords: keywords([code.to_lowercase(), name.to_lowercase()]),
            };
            (code.clone(), entry)
        })
        .collect()
}

/// Collect keywords, dropping repeats but keeping first-seen order
fn keywords(parts: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in parts {
        if !out.contains(&part) {
            out.push(part);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_covers_iso_3166_1() {
        assert_eq!(countries().len(), 249);
    }

    #[test]
    fn test_us_entry_uses_overrides() {
        let us = countries().get("US").unwrap();
        assert_eq!(us.name, "United States");
        assert_eq!(us.dial_code, "1");
        assert_eq!(us.region_title.as_deref(), Some("State or Territory"));
        assert_eq!(us.postal_code_title.as_deref(), Some("ZIP Code"));
        assert_eq!(
            us.keywords,
            vec!["us", "united states", "usa", "america"]
        );
    }

    #[test]
    fn test_dial_code_from_numbering_plan() {
        assert_eq!(countries().get("GB").unwrap().dial_code, "44");
        assert_eq!(countries().get("de").unwrap().dial_code, "49");
    }

    #[test]
    fn test_dial_code_overrides_for_missing_territories() {
        for (code, dial) in [("AQ", "672"), ("BV", "47"), ("GS", "500"), ("PN", "64")] {
            assert_eq!(countries().get(code).unwrap().dial_code, dial, "{code}");
        }
    }

    #[test]
    fn test_every_country_has_dial_code() {
        for country in countries().iter() {
            assert!(!country.dial_code.is_empty(), "{}", country.code);
        }
    }

    #[test]
    fn test_country_without_overrides() {
        let se = countries().get("SE").unwrap();
        assert_eq!(se.name, "Sweden");
        assert_eq!(se.keywords, vec!["se", "sweden"]);
        assert!(se.region_title.is_none());
        assert!(se.postal_code_title.is_none());
    }

    #[test]
    fn test_regions_round_trip() {
        let us = countries().get("US").unwrap();
        let regions = us.regions();
        assert!(!regions.is_empty());
        let california = regions.get("CA").unwrap();
        assert_eq!(california.name, "California");
        assert_eq!(california.iso_code(), "US-CA");
        assert_eq!(california.keywords, vec!["ca", "california"]);
        assert_eq!(california.country(), Some(us));
    }

    #[test]
    fn test_regions_are_idempotent() {
        let ca = countries().get("CA").unwrap();
        assert_eq!(ca.regions(), ca.regions());
        assert_eq!(ca.regions().len(), 13);
    }

    #[test]
    fn test_titled_countries_have_regions() {
        for country in countries().iter().filter(|c| c.region_title.is_some()) {
            assert!(!country.regions().is_empty(), "{}", country.code);
        }
        let gb = countries().get("GB").unwrap().regions();
        assert_eq!(gb.get("SCT").unwrap().name, "Scotland");
        assert_eq!(gb.get("SCT").unwrap().iso_code(), "GB-SCT");
    }

    #[test]
    fn test_country_without_subdivision_data() {
        assert!(countries().get("AQ").unwrap().regions().is_empty());
        assert!(regions_for("ZZ").is_empty());
    }

    #[test]
    fn test_search() {
        let hits: Vec<&str> = countries()
            .search("America")
            .iter()
            .map(|c| c.code.as_str())
            .collect();
        assert!(hits.contains(&"US"));
        assert!(hits.contains(&"AS"));

        assert_eq!(countries().search("  ").len(), countries().len());
        assert!(countries().search("down under")[0].code == "AU");
        assert!(countries().search("xyzzy").is_empty());
    }

    #[test]
    fn test_build_rejects_bad_codes() {
        let err = CountryTable::build("code,name\nUSA,United States\n").unwrap_err();
        assert!(matches!(err, Error::ReferenceData { .. }));
    }

    #[test]
    fn test_build_custom_table() {
        let table = CountryTable::build("code,name\nse,Sweden\nUS,Whatever\n").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("SE").unwrap().dial_code, "46");
        assert_eq!(table.get("US").unwrap().name, "United States");
    }

    #[test]
    fn test_keywords_dedupe_preserves_order() {
        let kw = keywords(["a", "b", "a", "c"].map(String::from));
        assert_eq!(kw, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_country_serializes_camel_case() {
        let json = serde_json::to_value(countries().get("US").unwrap()).unwrap();
        assert_eq!(json["dialCode"], "1");
        assert_eq!(json["postalCodeTitle"], "ZIP Code");
    }
}
