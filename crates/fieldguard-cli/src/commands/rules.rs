//! List the validator rules

use anyhow::Result;
use fieldguard_core::validators::{self, ConfirmMatchArgs, CountryArgs};
use fieldguard_core::{FieldValidator, Resolver, ValidatorKey};

/// Run the rules command
pub fn run() -> Result<()> {
    for key in ValidatorKey::ALL {
        let validator = default_validator(key)?;
        let sticky = if validator.sticky { "*" } else { " " };
        let linked = if key.needs_resolver() { "+" } else { " " };
        println!(
            "{:<20}{}{} {:<28} {}",
            key.as_str(),
            sticky,
            linked,
            validator.badge,
            validator.message
        );
    }
    println!();
    println!("* always shown");
    println!("+ reads another field");
    Ok(())
}

/// Build `key` with default arguments
fn default_validator(key: ValidatorKey) -> Result<FieldValidator> {
    let unresolved = || key.needs_resolver().then(|| Resolver::new(|| None));
    let validator = match key {
        ValidatorKey::Required => validators::required(Default::default()),
        ValidatorKey::MinLength => validators::min_length(Default::default()),
        ValidatorKey::MaxLength => validators::max_length(Default::default()),
        ValidatorKey::SpecialChar => validators::special_char(Default::default()),
        ValidatorKey::Email => validators::email(Default::default()),
        ValidatorKey::NumberRequired => validators::number_required(Default::default()),
        ValidatorKey::UppercaseRequired => validators::uppercase_required(Default::default()),
        ValidatorKey::LowercaseRequired => validators::lowercase_required(Default::default()),
        ValidatorKey::SpecialCharRequired => {
            validators::special_char_required(Default::default())
        }
        ValidatorKey::ConfirmMatch => validators::confirm_match(ConfirmMatchArgs {
            label: None,
            get_match_value: unresolved(),
        })?,
        ValidatorKey::CompleteTelephone => validators::complete_telephone(CountryArgs {
            label: None,
            get_country_code: unresolved(),
        })?,
        ValidatorKey::PossibleTelephone => validators::possible_telephone(CountryArgs {
            label: None,
            get_country_code: unresolved(),
        })?,
        ValidatorKey::PostalCode => validators::postal_code(CountryArgs {
            label: None,
            get_country_code: unresolved(),
        })?,
    };
    Ok(validator)
}
