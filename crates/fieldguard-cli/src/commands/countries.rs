//! Reference data commands

use anyhow::{Result, bail};
use fieldguard_core::{CountryEntry, countries};
use serde::Serialize;

/// A country as listed, with its postal-code flag
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Listing<'a> {
    #[serde(flatten)]
    country: &'a CountryEntry,
    has_postal_codes: bool,
}

/// List countries matching `query`
pub fn list(query: Option<&str>, json: bool) -> Result<()> {
    let matches = countries().search(query.unwrap_or(""));
    tracing::debug!("{} countries match", matches.len());

    if json {
        let listings: Vec<_> = matches
            .into_iter()
            .map(|country| Listing {
                country,
                has_postal_codes: country.has_postal_codes(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listings)?);
        return Ok(());
    }

    for country in matches {
        let dial = if country.dial_code.is_empty() {
            String::new()
        } else {
            format!("+{}", country.dial_code)
        };
        let postal = if country.has_postal_codes() {
            ""
        } else {
            " (no postal codes)"
        };
        println!("{}  {:<6} {}{}", country.code, dial, country.name, postal);
    }
    Ok(())
}

/// List the subdivisions of `code`
pub fn regions(code: &str, json: bool) -> Result<()> {
    let Some(country) = countries().get(code) else {
        bail!("Unknown country code '{}'", code);
    };
    let regions = country.regions();

    if json {
        let list: Vec<_> = regions.values().collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    if regions.is_empty() {
        tracing::warn!("No subdivision data for {}", country.name);
        return Ok(());
    }

    if let Some(title) = &country.region_title {
        println!("# {} - {}", country.name, title);
    }
    for region in regions.values() {
        println!("{:<8} {}", region.iso_code(), region.name);
    }
    Ok(())
}
