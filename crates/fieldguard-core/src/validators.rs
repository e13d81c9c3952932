//! Validator factories
//!
//! One constructor per rule. Each returns a fresh [`FieldValidator`] with its
//! own popup anchor. Rules that read another value (`confirm_match`, the
//! telephone rules and `postal_code`) fail at construction when their
//! resolver is missing.
//!
//! # Example
//!
//! ```rust
//! use fieldguard_core::validators::{self, CountArgs, MinLengthArgs};
//!
//! let rules = vec![
//!     validators::required(Default::default()),
//!     validators::min_length(MinLengthArgs { min_len: 8, ..Default::default() }),
//!     validators::number_required(CountArgs::default()),
//! ];
//! assert!(rules.iter().all(|v| v.test("hunter22")));
//! ```

use crate::error::{Error, Result};
use crate::popup::make_popup;
use crate::validator::{FieldValidator, Resolver, ValidatorArgs};

/// Special characters accepted by `special_char_required` unless overridden
pub const DEFAULT_SPECIAL_CHARS: [char; 29] = [
    '!', '@', '#', '$', '%', '^', '&', '*', '(', ')', '-', '_', '=', '+', '[', ']', '{', '}', ';',
    ':', ',', '.', '<', '>', '?', '/', '|', '~', '`',
];

/// Arguments for rules that only take a label
#[derive(Debug, Clone, Default)]
pub struct LabelArgs {
    /// Optional field label
    pub label: Option<String>,
}

/// Arguments for `min_length`
#[derive(Debug, Clone)]
pub struct MinLengthArgs {
    /// Optional field label
    pub label: Option<String>,
    /// Minimum number of characters
    pub min_len: usize,
}

impl Default for MinLengthArgs {
    fn default() -> Self {
        Self {
            label: None,
            min_len: 3,
        }
    }
}

/// Arguments for `max_length`
#[derive(Debug, Clone)]
pub struct MaxLengthArgs {
    /// Optional field label
    pub label: Option<String>,
    /// Maximum number of characters
    pub max_len: usize,
}

impl Default for MaxLengthArgs {
    fn default() -> Self {
        Self {
            label: None,
            max_len: 20,
        }
    }
}

/// Arguments for the character-count rules
#[derive(Debug, Clone)]
pub struct CountArgs {
    /// Optional field label
    pub label: Option<String>,
    /// Minimum number of matching characters
    pub count: usize,
}

impl Default for CountArgs {
    fn default() -> Self {
        Self {
            label: None,
            count: 1,
        }
    }
}

/// Arguments for `special_char_required`
#[derive(Debug, Clone)]
pub struct SpecialCharRequiredArgs {
    /// Optional field label
    pub label: Option<String>,
    /// Minimum number of special characters
    pub count: usize,
    /// Characters that count as special
    pub choices: Vec<char>,
}

impl Default for SpecialCharRequiredArgs {
    fn default() -> Self {
        Self {
            label: None,
            count: 1,
            choices: DEFAULT_SPECIAL_CHARS.to_vec(),
        }
    }
}

/// Arguments for `confirm_match`
#[derive(Debug, Clone, Default)]
pub struct ConfirmMatchArgs {
    /// Optional field label, used in the badge and message
    pub label: Option<String>,
    /// Reads the value this field must equal
    pub get_match_value: Option<Resolver>,
}

/// Arguments for the rules that depend on the selected country
#[derive(Debug, Clone, Default)]
pub struct CountryArgs {
    /// Optional field label
    pub label: Option<String>,
    /// Reads the selected ISO 3166-1 alpha-2 code
    pub get_country_code: Option<Resolver>,
}

fn build(args: ValidatorArgs, badge: impl Into<String>, message: impl Into<String>) -> FieldValidator {
    let key = args.key();
    FieldValidator {
        key,
        sticky: matches!(args, ValidatorArgs::Required { .. }),
        args,
        badge: badge.into(),
        message: message.into(),
        popup: make_popup(),
    }
}

fn plural(count: usize) -> &'static str {
    if count > 1 { "s" } else { "" }
}

/// Value must be non-empty
pub fn required(args: LabelArgs) -> FieldValidator {
    build(
        ValidatorArgs::Required { label: args.label },
        "Required",
        "This field is required",
    )
}

/// Value must have at least `min_len` characters
pub fn min_length(args: MinLengthArgs) -> FieldValidator {
    let message = format!("Must be at least {} characters long", args.min_len);
    build(
        ValidatorArgs::MinLength {
            label: args.label,
            min_len: args.min_len,
        },
        "Min length",
        message,
    )
}

/// Value must have at most `max_len` characters
pub fn max_length(args: MaxLengthArgs) -> FieldValidator {
    let message = format!("Must be at most {} characters long", args.max_len);
    build(
        ValidatorArgs::MaxLength {
            label: args.label,
            max_len: args.max_len,
        },
        "Max length",
        message,
    )
}

/// Value may only contain ASCII letters, digits and underscore
pub fn special_char(args: LabelArgs) -> FieldValidator {
    build(
        ValidatorArgs::SpecialChar { label: args.label },
        "Special characters",
        "Must not contain spaces or special characters",
    )
}

/// Value must look like `local@domain.tld`
pub fn email(args: LabelArgs) -> FieldValidator {
    build(
        ValidatorArgs::Email { label: args.label },
        "Email",
        "Must be a valid email address",
    )
}

/// Value must contain at least `count` digits
pub fn number_required(args: CountArgs) -> FieldValidator {
    let message = format!(
        "Must have at least {} number{}",
        args.count,
        plural(args.count)
    );
    build(
        ValidatorArgs::NumberRequired {
            label: args.label,
            count: args.count,
        },
        "Number Required",
        message,
    )
}

/// Value must contain at least `count` uppercase letters
pub fn uppercase_required(args: CountArgs) -> FieldValidator {
    let message = format!(
        "Must have at least {} uppercase letter{}",
        args.count,
        plural(args.count)
    );
    build(
        ValidatorArgs::UppercaseRequired {
            label: args.label,
            count: args.count,
        },
        "Uppercase Required",
        message,
    )
}

/// Value must contain at least `count` lowercase letters
pub fn lowercase_required(args: CountArgs) -> FieldValidator {
    let message = format!(
        "Must have at least {} lowercase letter{}",
        args.count,
        plural(args.count)
    );
    build(
        ValidatorArgs::LowercaseRequired {
            label: args.label,
            count: args.count,
        },
        "Lowercase Required",
        message,
    )
}

/// Value must contain at least `count` characters from `choices`
pub fn special_char_required(args: SpecialCharRequiredArgs) -> FieldValidator {
    let such_as = args
        .choices
        .iter()
        .map(char::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let message = format!(
        "Must have at least {} special character{}, such as {}",
        args.count,
        plural(args.count),
        such_as
    );
    build(
        ValidatorArgs::SpecialCharRequired {
            label: args.label,
            count: args.count,
            choices: args.choices,
        },
        "Special Character Required",
        message,
    )
}

/// Value must equal the value read from `get_match_value`
///
/// # Errors
///
/// Returns [`Error::MissingResolver`] when `get_match_value` is `None`.
pub fn confirm_match(args: ConfirmMatchArgs) -> Result<FieldValidator> {
    let get_match_value = args
        .get_match_value
        .ok_or_else(|| Error::missing_resolver("confirmMatchValidator", "getMatchValue"))?;

    let (badge, message) = match args.label.as_deref() {
        Some(label) => (
            format!("{}s Match", sentence_case(label)),
            format!(
                "The {}s entered does not match, please try again",
                label.to_lowercase()
            ),
        ),
        None => (
            "Values Match".to_string(),
            "The values entered does not match, please try again".to_string(),
        ),
    };

    Ok(build(
        ValidatorArgs::ConfirmMatch {
            label: args.label,
            get_match_value,
        },
        badge,
        message,
    ))
}

/// Value must be a possible and valid phone number for the selected country
///
/// # Errors
///
/// Returns [`Error::MissingResolver`] when `get_country_code` is `None`.
pub fn complete_telephone(args: CountryArgs) -> Result<FieldValidator> {
    let get_country_code = args
        .get_country_code
        .ok_or_else(|| Error::missing_resolver("completeTelephoneValidator", "getCountryCode"))?;
    Ok(build(
        ValidatorArgs::CompleteTelephone {
            label: args.label,
            get_country_code,
        },
        "Invalid",
        "Must be a complete phone number",
    ))
}

/// Value must be a phone number of a possible length for the selected country
///
/// # Errors
///
/// Returns [`Error::MissingResolver`] when `get_country_code` is `None`.
pub fn possible_telephone(args: CountryArgs) -> Result<FieldValidator> {
    let get_country_code = args
        .get_country_code
        .ok_or_else(|| Error::missing_resolver("possibleTelephoneValidator", "getCountryCode"))?;
    Ok(build(
        ValidatorArgs::PossibleTelephone {
            label: args.label,
            get_country_code,
        },
        "Partial",
        "You must enter a valid phone number",
    ))
}

/// Value must match the postal-code format of the selected country
///
/// Passes while no country is selected.
///
/// # Errors
///
/// Returns [`Error::MissingResolver`] when `get_country_code` is `None`.
pub fn postal_code(args: CountryArgs) -> Result<FieldValidator> {
    let get_country_code = args
        .get_country_code
        .ok_or_else(|| Error::missing_resolver("postalCodeValidator", "getCountryCode"))?;
    Ok(build(
        ValidatorArgs::PostalCode {
            label: args.label,
            get_country_code,
        },
        "Format",
        "Must be a valid postal code",
    ))
}

/// `"password confirmation"` -> `"Password confirmation"`
fn sentence_case(label: &str) -> String {
    let words: Vec<String> = label
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();
    let joined = words.join(" ");
    let mut chars = joined.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::ValidatorKey;
    use rstest::rstest;

    fn country(code: Option<&'static str>) -> CountryArgs {
        CountryArgs {
            label: None,
            get_country_code: Some(Resolver::new(move || code.map(str::to_string))),
        }
    }

    fn all_validators() -> Vec<FieldValidator> {
        vec![
            required(LabelArgs::default()),
            min_length(MinLengthArgs::default()),
            max_length(MaxLengthArgs::default()),
            special_char(LabelArgs::default()),
            email(LabelArgs::default()),
            number_required(CountArgs::default()),
            uppercase_required(CountArgs::default()),
            lowercase_required(CountArgs::default()),
            special_char_required(SpecialCharRequiredArgs::default()),
            confirm_match(ConfirmMatchArgs {
                label: None,
                get_match_value: Some(Resolver::constant("secret")),
            })
            .unwrap(),
            complete_telephone(country(Some("US"))).unwrap(),
            possible_telephone(country(Some("US"))).unwrap(),
            postal_code(country(Some("US"))).unwrap(),
        ]
    }

    #[test]
    fn test_empty_is_vacuously_valid_except_required() {
        for v in all_validators() {
            let expected = v.key != ValidatorKey::Required;
            assert_eq!(v.test(""), expected, "{} on empty string", v.key);
            assert_eq!(v.test(None), expected, "{} on absent value", v.key);
        }
    }

    #[test]
    fn test_only_required_is_sticky() {
        for v in all_validators() {
            assert_eq!(v.sticky, v.key == ValidatorKey::Required, "{}", v.key);
        }
    }

    #[test]
    fn test_factories_use_distinct_popup_targets() {
        let validators = all_validators();
        let mut targets: Vec<&str> = validators.iter().map(|v| v.popup.target.as_str()).collect();
        targets.sort_unstable();
        targets.dedup();
        assert_eq!(targets.len(), validators.len());
    }

    #[test]
    fn test_required() {
        let v = required(LabelArgs::default());
        assert!(!v.test(""));
        assert!(v.test("x"));
        assert_eq!(v.badge, "Required");
        assert_eq!(v.message, "This field is required");
    }

    #[rstest]
    #[case("abcd", false)]
    #[case("abcde", true)]
    #[case("abcdefgh", true)]
    fn test_min_length(#[case] value: &str, #[case] expected: bool) {
        let v = min_length(MinLengthArgs {
            min_len: 5,
            ..Default::default()
        });
        assert_eq!(v.test(value), expected);
        assert_eq!(v.message, "Must be at least 5 characters long");
    }

    #[rstest]
    #[case("abcdef", false)]
    #[case("abcde", true)]
    #[case("a", true)]
    fn test_max_length(#[case] value: &str, #[case] expected: bool) {
        let v = max_length(MaxLengthArgs {
            max_len: 5,
            ..Default::default()
        });
        assert_eq!(v.test(value), expected);
    }

    #[test]
    fn test_length_defaults() {
        assert_eq!(
            min_length(MinLengthArgs::default()).message,
            "Must be at least 3 characters long"
        );
        assert_eq!(
            max_length(MaxLengthArgs::default()).message,
            "Must be at most 20 characters long"
        );
    }

    #[rstest]
    #[case("abc def", false)]
    #[case("abc_123", true)]
    #[case("abc-123", false)]
    #[case("ABC", true)]
    fn test_special_char(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(special_char(LabelArgs::default()).test(value), expected);
    }

    #[rstest]
    #[case("alice@example.com", true)]
    #[case("Alice.Smith+tag@Mail.Example.ORG", true)]
    #[case("alice@example", false)]
    #[case("alice.example.com", false)]
    #[case("alice@example.c", false)]
    fn test_email(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(email(LabelArgs::default()).test(value), expected);
    }

    #[test]
    fn test_count_rules_and_messages() {
        let numbers = number_required(CountArgs {
            count: 2,
            ..Default::default()
        });
        assert!(!numbers.test("abc1"));
        assert!(numbers.test("a1b2"));
        assert_eq!(numbers.message, "Must have at least 2 numbers");

        let upper = uppercase_required(CountArgs::default());
        assert!(!upper.test("abc"));
        assert!(upper.test("aBc"));
        assert_eq!(upper.message, "Must have at least 1 uppercase letter");

        let lower = lowercase_required(CountArgs::default());
        assert!(!lower.test("ABC"));
        assert!(lower.test("ABc"));
    }

    #[test]
    fn test_special_char_required_message_lists_choices() {
        let v = special_char_required(SpecialCharRequiredArgs {
            count: 1,
            choices: vec!['!', '?'],
            label: None,
        });
        assert_eq!(
            v.message,
            "Must have at least 1 special character, such as !, ?"
        );
        assert!(v.test("hi!"));
        assert!(!v.test("hi."));
    }

    #[test]
    fn test_default_special_char_choices() {
        let v = special_char_required(SpecialCharRequiredArgs::default());
        assert!(v.test("pa`ss"));
        assert!(!v.test("password"));
    }

    #[test]
    fn test_confirm_match_requires_resolver() {
        let err = confirm_match(ConfirmMatchArgs::default()).unwrap_err();
        assert!(matches!(err, Error::MissingResolver { .. }));
        assert!(err.to_string().contains("getMatchValue"));
    }

    #[test]
    fn test_confirm_match_reads_resolver_at_test_time() {
        use std::sync::{Arc, Mutex};

        let current = Arc::new(Mutex::new("first".to_string()));
        let source = Arc::clone(&current);
        let v = confirm_match(ConfirmMatchArgs {
            label: Some("password".to_string()),
            get_match_value: Some(Resolver::new(move || source.lock().ok().map(|s| s.clone()))),
        })
        .unwrap();

        assert!(v.test("first"));
        *current.lock().unwrap() = "second".to_string();
        assert!(!v.test("first"));
        assert!(v.test("second"));
    }

    #[test]
    fn test_confirm_match_fails_when_match_value_empty() {
        let v = confirm_match(ConfirmMatchArgs {
            label: None,
            get_match_value: Some(Resolver::constant("")),
        })
        .unwrap();
        assert!(!v.test("anything"));
        assert!(v.test(""));
    }

    #[test]
    fn test_confirm_match_labels() {
        let v = confirm_match(ConfirmMatchArgs {
            label: Some("PASSWORD".to_string()),
            get_match_value: Some(Resolver::constant("x")),
        })
        .unwrap();
        assert_eq!(v.badge, "Passwords Match");
        assert_eq!(
            v.message,
            "The passwords entered does not match, please try again"
        );

        let v = confirm_match(ConfirmMatchArgs {
            label: None,
            get_match_value: Some(Resolver::constant("x")),
        })
        .unwrap();
        assert_eq!(v.badge, "Values Match");
    }

    #[test]
    fn test_telephone_rules_require_resolver() {
        assert!(complete_telephone(CountryArgs::default()).is_err());
        assert!(possible_telephone(CountryArgs::default()).is_err());
        assert!(postal_code(CountryArgs::default()).is_err());
    }

    #[rstest]
    #[case("(415) 555-2671", true)]
    #[case("+1 415-555-2671", true)]
    #[case("415555", false)]
    #[case("(015) 555-2671", false)]
    fn test_complete_telephone_us(#[case] value: &str, #[case] expected: bool) {
        let v = complete_telephone(country(Some("US"))).unwrap();
        assert_eq!(v.test(value), expected);
    }

    #[rstest]
    #[case("(015) 555-2671", true)]
    #[case("415555", false)]
    fn test_possible_telephone_us(#[case] value: &str, #[case] expected: bool) {
        let v = possible_telephone(country(Some("US"))).unwrap();
        assert_eq!(v.test(value), expected);
    }

    #[rstest]
    #[case("SE", "1234", false)]
    #[case("KR", "99999", false)]
    #[case("PL", "000000", false)]
    #[case("CH", "12345678901234", false)]
    #[case("CH", "123456789", false)]
    #[case("CH", "044 668 18 00", true)]
    #[case("SE", "+46 8 123 456 78", true)]
    fn test_complete_telephone_by_region(
        #[case] region: &'static str,
        #[case] value: &str,
        #[case] expected: bool,
    ) {
        let v = complete_telephone(country(Some(region))).unwrap();
        assert_eq!(v.test(value), expected, "{region} {value}");
    }

    #[test]
    fn test_possible_telephone_accepts_invalid_swiss_number() {
        let v = possible_telephone(country(Some("CH"))).unwrap();
        assert!(v.test("123456789"));
        assert!(!v.test("12345678901234"));
    }

    #[test]
    fn test_postal_code_us() {
        let v = postal_code(country(Some("US"))).unwrap();
        assert!(v.test("12345"));
        assert!(!v.test("1234"));
    }

    #[test]
    fn test_postal_code_without_country_is_valid() {
        let v = postal_code(country(None)).unwrap();
        assert!(v.test("anything"));
    }

    #[test]
    fn test_sentence_case() {
        assert_eq!(sentence_case("password"), "Password");
        assert_eq!(sentence_case("EMAIL_ADDRESS"), "Email address");
        assert_eq!(sentence_case(""), "");
    }
}
