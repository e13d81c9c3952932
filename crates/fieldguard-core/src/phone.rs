//! Telephone number parsing
//!
//! Thin layer over the `phonenumber` crate, a port of libphonenumber with
//! the full per-region metadata (calling codes, trunk prefixes, possible
//! lengths and number-type patterns).
//!
//! Input without a usable default region and without a leading `+` cannot
//! be placed in any plan. Such numbers fall back to the generic
//! international rule: 4 to 14 digits is possible, and possible is valid.

use phonenumber::country;
use phonenumber::metadata::{DATABASE, Metadata};
use phonenumber::{Mode, PhoneNumber as Parsed};
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

const GENERIC_LENGTHS: RangeInclusive<usize> = 4..=14;

/// Country calling code of a region, e.g. `44` for `"GB"`
pub fn calling_code(region: &str) -> Option<u16> {
    DATABASE
        .by_id(region.trim().to_ascii_uppercase().as_str())
        .map(Metadata::country_code)
}

/// Possible lengths of a national significant number in a region
///
/// The union over every number type the region defines.
pub fn possible_lengths(meta: &Metadata) -> BTreeSet<usize> {
    let d = meta.descriptors();
    [
        d.fixed_line(),
        d.mobile(),
        d.toll_free(),
        d.premium_rate(),
        d.shared_cost(),
        d.personal_number(),
        d.voip(),
        d.pager(),
        d.uan(),
        d.voicemail(),
    ]
    .into_iter()
    .flatten()
    .flat_map(|desc| desc.possible_length().iter().map(|&len| len as usize))
    .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    Placed(Parsed),
    Unplaced(String),
}

/// A telephone number read from free-form input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber {
    kind: Kind,
}

impl PhoneNumber {
    /// National significant number, leading zeros kept
    pub fn national_number(&self) -> String {
        match &self.kind {
            Kind::Placed(number) => number.national().to_string(),
            Kind::Unplaced(digits) => digits.clone(),
        }
    }

    /// Country calling code the number was placed under
    pub fn calling_code(&self) -> Option<u16> {
        match &self.kind {
            Kind::Placed(number) => Some(number.code().value()),
            Kind::Unplaced(_) => None,
        }
    }

    /// The national number has a length some number type of its region allows
    pub fn is_possible(&self) -> bool {
        match &self.kind {
            Kind::Placed(number) => metadata(number)
                .is_some_and(|meta| possible_lengths(meta).contains(&self.national_number().len())),
            Kind::Unplaced(digits) => GENERIC_LENGTHS.contains(&digits.len()),
        }
    }

    /// The number matches one of its region's number-type patterns
    pub fn is_valid(&self) -> bool {
        match &self.kind {
            Kind::Placed(number) => number.is_valid(),
            Kind::Unplaced(_) => self.is_possible(),
        }
    }

    /// E.164 form (`+14155552671`) when the calling code is known
    pub fn e164(&self) -> Option<String> {
        match &self.kind {
            Kind::Placed(number) => Some(number.format().mode(Mode::E164).to_string()),
            Kind::Unplaced(_) => None,
        }
    }
}

fn metadata(number: &Parsed) -> Option<&'static Metadata> {
    number.metadata(&DATABASE).or_else(|| {
        DATABASE
            .by_code(&number.code().value())
            .and_then(|all| all.into_iter().next())
    })
}

/// Parse free-form input for a default region
///
/// A leading `+` marks an international number whose calling code is read
/// from the input. Otherwise the region's trunk prefix and any dialled
/// calling code are stripped. Returns `None` when the input has no digits
/// or cannot be read as a number at all.
pub fn parse(input: &str, region: Option<&str>) -> Option<PhoneNumber> {
    let input = input.trim();
    if !input.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let id = region.and_then(|r| r.trim().to_ascii_uppercase().parse::<country::Id>().ok());
    if id.is_some() || input.starts_with('+') {
        return match phonenumber::parse(id, input) {
            Ok(number) => Some(PhoneNumber {
                kind: Kind::Placed(number),
            }),
            Err(e) => {
                tracing::debug!(region = ?region, error = %e, "unparseable telephone number");
                None
            }
        };
    }

    tracing::debug!(region = ?region, "no numbering plan for region, using generic lengths");
    Some(PhoneNumber {
        kind: Kind::Unplaced(input.chars().filter(char::is_ascii_digit).collect()),
    })
}
