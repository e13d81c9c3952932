//! Validator descriptors
//!
//! A [`FieldValidator`] pairs a predicate with the metadata a UI needs to
//! render it: badge text, stickiness, failure message and popup placement.
//! Descriptors are built by the factories in [`crate::validators`] and are
//! immutable afterwards.
//!
//! Every validator except `required` treats an empty or absent value as
//! valid, so rules can be chained on optional fields without duplicating
//! the `required` failure.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::popup::PopupSettings;
use crate::{phone, postal};

static SPECIAL_CHAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Invalid regex pattern"));

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("Invalid regex pattern")
});

/// Rule identifier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ValidatorKey {
    /// Value must be present
    Required,
    /// Minimum character count
    MinLength,
    /// Maximum character count
    MaxLength,
    /// Letters, digits and underscore only
    SpecialChar,
    /// Email address shape
    Email,
    /// Minimum number of digits
    NumberRequired,
    /// Minimum number of uppercase letters
    UppercaseRequired,
    /// Minimum number of lowercase letters
    LowercaseRequired,
    /// Minimum number of characters from a choice set
    SpecialCharRequired,
    /// Must equal another field's value
    ConfirmMatch,
    /// Complete and valid telephone number
    CompleteTelephone,
    /// Telephone number of a possible length
    PossibleTelephone,
    /// Postal code format for the selected country
    PostalCode,
}

impl ValidatorKey {
    /// All rule keys, in documentation order
    pub const ALL: [ValidatorKey; 13] = [
        Self::Required,
        Self::MinLength,
        Self::MaxLength,
        Self::SpecialChar,
        Self::Email,
        Self::NumberRequired,
        Self::UppercaseRequired,
        Self::LowercaseRequired,
        Self::SpecialCharRequired,
        Self::ConfirmMatch,
        Self::CompleteTelephone,
        Self::PossibleTelephone,
        Self::PostalCode,
    ];

    /// Wire name of the key
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::MinLength => "minLength",
            Self::MaxLength => "maxLength",
            Self::SpecialChar => "specialChar",
            Self::Email => "email",
            Self::NumberRequired => "numberRequired",
            Self::UppercaseRequired => "uppercaseRequired",
            Self::LowercaseRequired => "lowercaseRequired",
            Self::SpecialCharRequired => "specialCharRequired",
            Self::ConfirmMatch => "confirmMatch",
            Self::CompleteTelephone => "completeTelephone",
            Self::PossibleTelephone => "possibleTelephone",
            Self::PostalCode => "postalCode",
        }
    }

    /// Whether validators of this kind need a dependent-value resolver
    pub fn needs_resolver(&self) -> bool {
        matches!(
            self,
            Self::ConfirmMatch | Self::CompleteTelephone | Self::PossibleTelephone | Self::PostalCode
        )
    }
}

impl fmt::Display for ValidatorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied callback that reads another value at test time
///
/// Used for cross-field rules: the current country selection for phone and
/// postal validators, or a sibling field for `confirmMatch`.
#[derive(Clone)]
pub struct Resolver(Arc<dyn Fn() -> Option<String> + Send + Sync>);

impl Resolver {
    /// Wrap a closure
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> Option<String> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Resolver that always yields the same value
    pub fn constant(value: impl Into<String>) -> Self {
        let value = value.into();
        Self::new(move || Some(value.clone()))
    }

    /// Read the current value
    pub fn resolve(&self) -> Option<String> {
        (self.0)()
    }

    /// Read the current value, treating an empty string as absent
    pub fn resolve_non_empty(&self) -> Option<String> {
        self.resolve().filter(|v| !v.is_empty())
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Resolver(..)")
    }
}

/// Construction parameters, one variant per rule
///
/// Resolvers are skipped when serializing; the remaining fields are what a
/// UI would display.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum ValidatorArgs {
    /// `required`
    Required {
        /// Optional field label
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    /// `minLength`
    MinLength {
        /// Optional field label
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        /// Minimum number of characters
        min_len: usize,
    },
    /// `maxLength`
    MaxLength {
        /// Optional field label
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        /// Maximum number of characters
        max_len: usize,
    },
    /// `specialChar`
    SpecialChar {
        /// Optional field label
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    /// `email`
    Email {
        /// Optional field label
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    /// `numberRequired`
    NumberRequired {
        /// Optional field label
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        /// Minimum number of digits
        count: usize,
    },
    /// `uppercaseRequired`
    UppercaseRequired {
        /// Optional field label
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        /// Minimum number of uppercase letters
        count: usize,
    },
    /// `lowercaseRequired`
    LowercaseRequired {
        /// Optional field label
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        /// Minimum number of lowercase letters
        count: usize,
    },
    /// `specialCharRequired`
    SpecialCharRequired {
        /// Optional field label
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        /// Minimum number of characters from `choices`
        count: usize,
        /// Accepted special characters
        choices: Vec<char>,
    },
    /// `confirmMatch`
    ConfirmMatch {
        /// Optional field label
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        /// Reads the value this field must equal
        #[serde(skip)]
        get_match_value: Resolver,
    },
    /// `completeTelephone`
    CompleteTelephone {
        /// Optional field label
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        /// Reads the selected ISO country code
        #[serde(skip)]
        get_country_code: Resolver,
    },
    /// `possibleTelephone`
    PossibleTelephone {
        /// Optional field label
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        /// Reads the selected ISO country code
        #[serde(skip)]
        get_country_code: Resolver,
    },
    /// `postalCode`
    PostalCode {
        /// Optional field label
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        /// Reads the selected ISO country code, if any
        #[serde(skip)]
        get_country_code: Resolver,
    },
}

impl ValidatorArgs {
    /// Key of the rule these arguments belong to
    pub fn key(&self) -> ValidatorKey {
        match self {
            Self::Required { .. } => ValidatorKey::Required,
            Self::MinLength { .. } => ValidatorKey::MinLength,
            Self::MaxLength { .. } => ValidatorKey::MaxLength,
            Self::SpecialChar { .. } => ValidatorKey::SpecialChar,
            Self::Email { .. } => ValidatorKey::Email,
            Self::NumberRequired { .. } => ValidatorKey::NumberRequired,
            Self::UppercaseRequired { .. } => ValidatorKey::UppercaseRequired,
            Self::LowercaseRequired { .. } => ValidatorKey::LowercaseRequired,
            Self::SpecialCharRequired { .. } => ValidatorKey::SpecialCharRequired,
            Self::ConfirmMatch { .. } => ValidatorKey::ConfirmMatch,
            Self::CompleteTelephone { .. } => ValidatorKey::CompleteTelephone,
            Self::PossibleTelephone { .. } => ValidatorKey::PossibleTelephone,
            Self::PostalCode { .. } => ValidatorKey::PostalCode,
        }
    }

    /// Field label, if one was given
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Required { label }
            | Self::MinLength { label, .. }
            | Self::MaxLength { label, .. }
            | Self::SpecialChar { label }
            | Self::Email { label }
            | Self::NumberRequired { label, .. }
            | Self::UppercaseRequired { label, .. }
            | Self::LowercaseRequired { label, .. }
            | Self::SpecialCharRequired { label, .. }
            | Self::ConfirmMatch { label, .. }
            | Self::CompleteTelephone { label, .. }
            | Self::PossibleTelephone { label, .. }
            | Self::PostalCode { label, .. } => label.as_deref(),
        }
    }
}

/// Immutable validator descriptor
#[derive(Debug, Clone, Serialize)]
pub struct FieldValidator {
    /// Rule identifier
    pub key: ValidatorKey,
    /// Construction parameters
    pub args: ValidatorArgs,
    /// Short label for the badge
    pub badge: String,
    /// Badge stays visible even when the rule passes
    pub sticky: bool,
    /// Failure explanation
    pub message: String,
    /// Popup placement hint
    pub popup: PopupSettings,
}

impl FieldValidator {
    /// Test a value; `true` means valid
    ///
    /// `None` stands for a null or undefined value and is treated like an
    /// empty string.
    pub fn test<'a>(&self, value: impl Into<Option<&'a str>>) -> bool {
        let Some(value) = value.into().filter(|v| !v.is_empty()) else {
            return !matches!(self.args, ValidatorArgs::Required { .. });
        };

        match &self.args {
            ValidatorArgs::Required { .. } => true,
            ValidatorArgs::MinLength { min_len, .. } => value.chars().count() >= *min_len,
            ValidatorArgs::MaxLength { max_len, .. } => value.chars().count() <= *max_len,
            ValidatorArgs::SpecialChar { .. } => SPECIAL_CHAR.is_match(value),
            ValidatorArgs::Email { .. } => EMAIL.is_match(value),
            ValidatorArgs::NumberRequired { count, .. } => {
                count_chars(value, |c| c.is_ascii_digit()) >= *count
            }
            ValidatorArgs::UppercaseRequired { count, .. } => {
                count_chars(value, |c| c.is_ascii_uppercase()) >= *count
            }
            ValidatorArgs::LowercaseRequired { count, .. } => {
                count_chars(value, |c| c.is_ascii_lowercase()) >= *count
            }
            ValidatorArgs::SpecialCharRequired { count, choices, .. } => {
                count_chars(value, |c| choices.contains(&c)) >= *count
            }
            ValidatorArgs::ConfirmMatch {
                get_match_value, ..
            } => get_match_value
                .resolve_non_empty()
                .is_some_and(|expected| expected == value),
            ValidatorArgs::CompleteTelephone {
                get_country_code, ..
            } => {
                let region = get_country_code.resolve_non_empty();
                phone::parse(value, region.as_deref())
                    .is_some_and(|number| number.is_possible() && number.is_valid())
            }
            ValidatorArgs::PossibleTelephone {
                get_country_code, ..
            } => {
                let region = get_country_code.resolve_non_empty();
                phone::parse(value, region.as_deref()).is_some_and(|number| number.is_possible())
            }
            ValidatorArgs::PostalCode {
                get_country_code, ..
            } => match get_country_code.resolve_non_empty() {
                // Nothing to check against until a country is chosen
                None => true,
                Some(country) => postal::validate(&country, value),
            },
        }
    }
}

fn count_chars(value: &str, pred: impl Fn(char) -> bool) -> usize {
    value.chars().filter(|c| pred(*c)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::popup::make_popup;

    fn descriptor(args: ValidatorArgs) -> FieldValidator {
        FieldValidator {
            key: args.key(),
            args,
            badge: "badge".to_string(),
            sticky: false,
            message: "message".to_string(),
            popup: make_popup(),
        }
    }

    #[test]
    fn test_key_wire_names_match_serde() {
        for key in ValidatorKey::ALL {
            let json = serde_json::to_value(key).unwrap();
            assert_eq!(json, key.as_str());
        }
    }

    #[test]
    fn test_needs_resolver() {
        assert!(ValidatorKey::ConfirmMatch.needs_resolver());
        assert!(ValidatorKey::PostalCode.needs_resolver());
        assert!(!ValidatorKey::Email.needs_resolver());
    }

    #[test]
    fn test_resolver_constant_and_non_empty() {
        assert_eq!(Resolver::constant("US").resolve(), Some("US".to_string()));
        assert_eq!(Resolver::constant("").resolve_non_empty(), None);
        assert_eq!(Resolver::new(|| None).resolve(), None);
    }

    #[test]
    fn test_required_polarity() {
        let v = descriptor(ValidatorArgs::Required { label: None });
        assert!(!v.test(""));
        assert!(!v.test(None));
        assert!(v.test("x"));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let v = descriptor(ValidatorArgs::MaxLength {
            label: None,
            max_len: 3,
        });
        assert!(v.test("héé"));
        assert!(!v.test("héé!"));
    }

    #[test]
    fn test_special_char_required_counts_choices() {
        let v = descriptor(ValidatorArgs::SpecialCharRequired {
            label: None,
            count: 2,
            choices: vec!['!', '#'],
        });
        assert!(!v.test("abc!"));
        assert!(v.test("a!b#"));
        assert!(!v.test("a@b$"));
    }

    #[test]
    fn test_args_serialize_without_resolvers() {
        let args = ValidatorArgs::ConfirmMatch {
            label: Some("password".to_string()),
            get_match_value: Resolver::constant("x"),
        };
        let json = serde_json::to_value(&args).unwrap();
        assert_eq!(json, serde_json::json!({"label": "password"}));

        let args = ValidatorArgs::MinLength {
            label: None,
            min_len: 5,
        };
        let json = serde_json::to_value(&args).unwrap();
        assert_eq!(json, serde_json::json!({"minLen": 5}));
    }
}
