//! Postal-code formats
//!
//! Per-country validation patterns keyed by ISO 3166-1 alpha-2 code.
//! Redundant characters (usually space and dash) are stripped before
//! matching, and patterns are case-insensitive.

use once_cell::sync::Lazy;
use phf::phf_map;
use regex::Regex;
use std::collections::HashMap;

use crate::reference;

/// Postal-code format of one country
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostalFormat {
    /// Characters removed before matching
    pub redundant: &'static str,
    /// Pattern the cleaned code must match; `None` for countries without
    /// postal codes
    pub pattern: Option<&'static str>,
}

const SPACE_DASH: &str = " -";

macro_rules! postal {
    () => {
        PostalFormat { redundant: SPACE_DASH, pattern: None }
    };
    ($pattern:literal) => {
        PostalFormat { redundant: SPACE_DASH, pattern: Some($pattern) }
    };
}

static FORMATS: phf::Map<&'static str, PostalFormat> = phf_map! {
    "AD" => postal!(r"AD\d{3}"),
    "AE" => postal!(),
    "AF" => postal!(r"\d{4}"),
    "AG" => postal!(),
    "AI" => postal!(r"(?:AI)?2640"),
    "AL" => postal!(r"\d{4}"),
    "AM" => postal!(r"\d{4}"),
    "AO" => postal!(),
    "AR" => postal!(r"[A-HJ-NP-Z]?\d{4}(?:[A-Z]{3})?"),
    "AS" => postal!(r"96799"),
    "AT" => postal!(r"\d{4}"),
    "AU" => postal!(r"\d{4}"),
    "AW" => postal!(),
    "AX" => postal!(r"22\d{3}"),
    "AZ" => postal!(r"(?:AZ)?\d{4}"),
    "BA" => postal!(r"\d{5}"),
    "BB" => postal!(r"(?:BB)?\d{5}"),
    "BD" => postal!(r"\d{4}"),
    "BE" => postal!(r"\d{4}"),
    "BF" => postal!(),
    "BG" => postal!(r"\d{4}"),
    "BH" => postal!(r"(?:1[0-2]|[1-9])\d{2}"),
    "BI" => postal!(),
    "BJ" => postal!(),
    "BM" => postal!(r"[A-Z]{2}[A-Z0-9]{2}"),
    "BN" => postal!(r"[A-Z]{2}\d{4}"),
    "BO" => postal!(),
    "BR" => postal!(r"\d{8}"),
    "BS" => postal!(),
    "BT" => postal!(r"\d{5}"),
    "BW" => postal!(),
    "BY" => postal!(r"\d{6}"),
    "BZ" => postal!(),
    "CA" => postal!(r"[ABCEGHJ-NPRSTVXY]\d[ABCEGHJ-NPRSTV-Z]\d[ABCEGHJ-NPRSTV-Z]\d"),
    "CC" => postal!(r"6799"),
    "CD" => postal!(),
    "CF" => postal!(),
    "CG" => postal!(),
    "CH" => postal!(r"\d{4}"),
    "CI" => postal!(),
    "CK" => postal!(),
    "CL" => postal!(r"\d{7}"),
    "CM" => postal!(),
    "CN" => postal!(r"\d{6}"),
    "CO" => postal!(r"\d{6}"),
    "CR" => postal!(r"\d{4,5}|\d{7}"),
    "CU" => postal!(r"\d{5}"),
    "CV" => postal!(r"\d{4}"),
    "CX" => postal!(r"6798"),
    "CY" => postal!(r"\d{4}"),
    "CZ" => postal!(r"\d{5}"),
    "DE" => postal!(r"\d{5}"),
    "DJ" => postal!(),
    "DK" => postal!(r"\d{4}"),
    "DM" => postal!(),
    "DO" => postal!(r"\d{5}"),
    "DZ" => postal!(r"\d{5}"),
    "EC" => postal!(r"\d{6}"),
    "EE" => postal!(r"\d{5}"),
    "EG" => postal!(r"\d{5}"),
    "ER" => postal!(),
    "ES" => postal!(r"(?:0[1-9]|[1-4]\d|5[0-2])\d{3}"),
    "ET" => postal!(r"\d{4}"),
    "FI" => postal!(r"\d{5}"),
    "FJ" => postal!(),
    "FK" => postal!(r"FIQQ1ZZ"),
    "FM" => postal!(r"9694[1-4](?:\d{4})?"),
    "FO" => postal!(r"\d{3}"),
    "FR" => postal!(r"\d{5}"),
    "GA" => postal!(),
    "GB" => postal!(r"GIR0AA|[A-PR-UWYZ](?:\d{1,2}|[A-HK-Y]\d{1,2}|\d[A-HJKPSTUW]|[A-HK-Y]\d[ABEHMNPRV-Y])\d[ABD-HJLNP-UW-Z]{2}"),
    "GD" => postal!(),
    "GE" => postal!(r"\d{4}"),
    "GF" => postal!(r"9[78]3\d{2}"),
    "GG" => postal!(r"GY\d[\dA-Z]?\d[A-Z]{2}"),
    "GH" => postal!(),
    "GI" => postal!(r"GX111AA"),
    "GL" => postal!(r"39\d{2}"),
    "GM" => postal!(),
    "GN" => postal!(r"\d{3}"),
    "GP" => postal!(r"9[78][01]\d{2}"),
    "GQ" => postal!(),
    "GR" => postal!(r"\d{5}"),
    "GS" => postal!(r"SIQQ1ZZ"),
    "GT" => postal!(r"\d{5}"),
    "GU" => postal!(r"969\d{2}(?:\d{4})?"),
    "GW" => postal!(r"\d{4}"),
    "GY" => postal!(),
    "HK" => postal!(),
    "HN" => postal!(r"[A-Z]{2}\d{4}|\d{5}"),
    "HR" => postal!(r"\d{5}"),
    "HT" => postal!(r"\d{4}"),
    "HU" => postal!(r"\d{4}"),
    "ID" => postal!(r"\d{5}"),
    "IE" => postal!(r"[A-Z]\d[\dW][A-Z\d]{4}|[A-Z]\d[\dW]"),
    "IL" => postal!(r"\d{5}(?:\d{2})?"),
    "IM" => postal!(r"IM\d[\dA-Z]?\d[A-Z]{2}"),
    "IN" => postal!(r"\d{6}"),
    "IO" => postal!(r"BBND1ZZ"),
    "IQ" => postal!(r"\d{5}"),
    "IR" => postal!(r"\d{10}"),
    "IS" => postal!(r"\d{3}"),
    "IT" => postal!(r"\d{5}"),
    "JE" => postal!(r"JE\d[\dA-Z]?\d[A-Z]{2}"),
    "JM" => postal!(),
    "JO" => postal!(r"\d{5}"),
    "JP" => postal!(r"\d{7}"),
    "KE" => postal!(r"\d{5}"),
    "KG" => postal!(r"\d{6}"),
    "KH" => postal!(r"\d{5}"),
    "KI" => postal!(),
    "KM" => postal!(),
    "KN" => postal!(),
    "KP" => postal!(),
    "KR" => postal!(r"\d{5}"),
    "KW" => postal!(r"\d{5}"),
    "KY" => postal!(r"KY\d{5}"),
    "KZ" => postal!(r"\d{6}"),
    "LA" => postal!(r"\d{5}"),
    "LB" => postal!(r"\d{4}(?:\d{4})?"),
    "LC" => postal!(),
    "LI" => postal!(r"948[5-9]|949[0-7]"),
    "LK" => postal!(r"\d{5}"),
    "LR" => postal!(r"\d{4}"),
    "LS" => postal!(r"\d{3}"),
    "LT" => postal!(r"(?:LT)?\d{5}"),
    "LU" => postal!(r"L?\d{4}"),
    "LV" => postal!(r"(?:LV)?\d{4}"),
    "LY" => postal!(),
    "MA" => postal!(r"\d{5}"),
    "MC" => postal!(r"980\d{2}"),
    "MD" => postal!(r"(?:MD)?\d{4}"),
    "ME" => postal!(r"8\d{4}"),
    "MF" => postal!(r"9[78][01]\d{2}"),
    "MG" => postal!(r"\d{3}"),
    "MH" => postal!(r"969[67]\d(?:\d{4})?"),
    "MK" => postal!(r"\d{4}"),
    "ML" => postal!(),
    "MN" => postal!(r"\d{5}"),
    "MO" => postal!(),
    "MP" => postal!(r"9695[012](?:\d{4})?"),
    "MQ" => postal!(r"9[78]2\d{2}"),
    "MR" => postal!(),
    "MS" => postal!(),
    "MT" => postal!(r"[A-Z]{3}\d{2,4}"),
    "MU" => postal!(r"\d{5}"),
    "MV" => postal!(r"\d{5}"),
    "MW" => postal!(),
    "MX" => postal!(r"\d{5}"),
    "MY" => postal!(r"\d{5}"),
    "MZ" => postal!(r"\d{4}"),
    "NA" => postal!(r"\d{5}"),
    "NC" => postal!(r"988\d{2}"),
    "NE" => postal!(r"\d{4}"),
    "NF" => postal!(r"2899"),
    "NG" => postal!(r"\d{6}"),
    "NI" => postal!(r"\d{5}"),
    "NL" => postal!(r"\d{4}[A-Z]{2}"),
    "NO" => postal!(r"\d{4}"),
    "NP" => postal!(r"\d{5}"),
    "NR" => postal!(),
    "NU" => postal!(),
    "NZ" => postal!(r"\d{4}"),
    "OM" => postal!(r"\d{3}"),
    "PA" => postal!(r"\d{4}"),
    "PE" => postal!(r"\d{5}"),
    "PF" => postal!(r"987\d{2}"),
    "PG" => postal!(r"\d{3}"),
    "PH" => postal!(r"\d{4}"),
    "PK" => postal!(r"\d{5}"),
    "PL" => postal!(r"\d{5}"),
    "PM" => postal!(r"97500"),
    "PN" => postal!(r"PCRN1ZZ"),
    "PR" => postal!(r"00[679]\d{2}(?:\d{4})?"),
    "PS" => postal!(r"\d{3}"),
    "PT" => postal!(r"\d{7}"),
    "PW" => postal!(r"96940"),
    "PY" => postal!(r"\d{4}"),
    "QA" => postal!(),
    "RE" => postal!(r"9[78]4\d{2}"),
    "RO" => postal!(r"\d{6}"),
    "RS" => postal!(r"\d{5,6}"),
    "RU" => postal!(r"\d{6}"),
    "RW" => postal!(),
    "SA" => postal!(r"\d{5}(?:\d{4})?"),
    "SB" => postal!(),
    "SC" => postal!(),
    "SD" => postal!(r"\d{5}"),
    "SE" => postal!(r"\d{5}"),
    "SG" => postal!(r"\d{6}"),
    "SH" => postal!(r"(?:ASCN|STHL|TDCU)1ZZ"),
    "SI" => postal!(r"(?:SI)?\d{4}"),
    "SJ" => postal!(r"\d{4}"),
    "SK" => postal!(r"\d{5}"),
    "SL" => postal!(),
    "SM" => postal!(r"4789\d"),
    "SN" => postal!(r"\d{5}"),
    "SO" => postal!(r"[A-Z]{2}\d{5}"),
    "SR" => postal!(),
    "SS" => postal!(),
    "ST" => postal!(),
    "SV" => postal!(r"CP\d{4}"),
    "SY" => postal!(),
    "SZ" => postal!(r"[HLMS]\d{3}"),
    "TC" => postal!(r"TKCA1ZZ"),
    "TD" => postal!(),
    "TG" => postal!(),
    "TH" => postal!(r"\d{5}"),
    "TJ" => postal!(r"\d{6}"),
    "TK" => postal!(),
    "TL" => postal!(),
    "TM" => postal!(r"\d{6}"),
    "TN" => postal!(r"\d{4}"),
    "TO" => postal!(),
    "TR" => postal!(r"\d{5}"),
    "TT" => postal!(r"\d{6}"),
    "TV" => postal!(),
    "TW" => postal!(r"\d{3}(?:\d{2,3})?"),
    "TZ" => postal!(r"\d{5}"),
    "UA" => postal!(r"\d{5}"),
    "UG" => postal!(),
    "US" => postal!(r"\d{5}(?:\d{4})?"),
    "UY" => postal!(r"\d{5}"),
    "UZ" => postal!(r"\d{6}"),
    "VA" => postal!(r"00120"),
    "VC" => postal!(r"VC\d{4}"),
    "VE" => postal!(r"\d{4}"),
    "VG" => postal!(r"VG\d{4}"),
    "VI" => postal!(r"008[0-5]\d(?:\d{4})?"),
    "VN" => postal!(r"\d{6}"),
    "VU" => postal!(),
    "WF" => postal!(r"986\d{2}"),
    "YE" => postal!(),
    "YT" => postal!(r"976\d{2}"),
    "ZA" => postal!(r"\d{4}"),
    "ZM" => postal!(r"\d{5}"),
    "ZW" => postal!(),
};

static PATTERNS: Lazy<HashMap<&'static str, Regex>> = Lazy::new(|| {
    let mut compiled = HashMap::new();
    for (country, format) in FORMATS.entries() {
        let Some(pattern) = format.pattern else {
            continue;
        };
        match Regex::new(&format!("(?i)^(?:{pattern})$")) {
            Ok(re) => {
                compiled.insert(*country, re);
            }
            Err(e) => tracing::error!(country = *country, error = %e, "invalid postal code pattern"),
        }
    }
    compiled
});

/// Postal-code format for a country, if one is known
pub fn format_for(country: &str) -> Option<PostalFormat> {
    FORMATS.get(country.to_ascii_uppercase().as_str()).copied()
}

/// Whether a country is known to use postal codes
pub fn has_postal_codes(country: &str) -> bool {
    format_for(country).is_some_and(|f| f.pattern.is_some())
}

/// Check `value` against the postal-code format of `country`
///
/// Countries without a postal system, and ISO countries with no recorded
/// format, accept any value. Codes that are not ISO countries reject
/// everything.
pub fn validate(country: &str, value: &str) -> bool {
    let country = country.trim().to_ascii_uppercase();
    let Some(format) = FORMATS.get(country.as_str()) else {
        let known = reference::countries().get(&country).is_some();
        tracing::debug!(country = %country, known, "no postal format for country");
        return known;
    };
    if format.pattern.is_none() {
        return true;
    }

    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| !format.redundant.contains(*c))
        .collect();

    PATTERNS
        .get(country.as_str())
        .is_some_and(|re| re.is_match(&cleaned))
}
