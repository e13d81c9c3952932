//! Form configuration parsing and record validation
//!
//! A form file names its fields and the rules each one carries. Rules are
//! written either as a bare name or as a single-key map holding their
//! arguments, with an optional `message` template beside it:
//!
//! ```yaml
//! name: signup
//! fields:
//!   - name: username
//!     validators:
//!       - required
//!       - min_length: 3
//!       - special_char
//!   - name: password
//!     validators: [required]
//!   - name: password_confirm
//!     validators:
//!       - confirm_match: { field: password, label: password }
//!   - name: country
//!   - name: postal_code
//!     validators:
//!       - postal_code: { country_field: country }
//!         message: "{{ label }} is not a valid postal code"
//! ```
//!
//! Cross-field rules are checked against the declared fields when the file
//! is loaded. Resolvers are bound to a concrete record in
//! [`FormConfig::validate_record`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::evaluate::{FieldReport, evaluate};
use crate::validator::{FieldValidator, Resolver, ValidatorKey};
use crate::validators::{
    self, ConfirmMatchArgs, CountArgs, CountryArgs, LabelArgs, MaxLengthArgs, MinLengthArgs,
    SpecialCharRequiredArgs,
};

/// Example form written by `fieldguard init`
pub const EXAMPLE_FORM: &str = r#"name: signup
description: Account sign-up form
fields:
  - name: username
    label: Username
    validators:
      - required
      - min_length: 3
      - max_length: 20
      - special_char
  - name: email
    label: Email
    validators:
      - required
      - email
  - name: password
    label: Password
    validators:
      - required
      - min_length: 8
      - number_required
      - uppercase_required
      - lowercase_required
      - special_char_required: 1
  - name: password_confirm
    validators:
      - required
      - confirm_match: { field: password, label: password }
  - name: country
    label: Country
    validators:
      - required
  - name: phone
    label: Phone
    validators:
      - possible_telephone: { country_field: country }
      - complete_telephone: { country_field: country }
  - name: postal_code
    label: Postal code
    validators:
      - postal_code: { country_field: country }
        message: "{{ label }} is not a valid postal code"
"#;

/// Rules that take no arguments beyond the field label
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RuleName {
    /// `required`
    Required,
    /// `min_length` with the default minimum
    MinLength,
    /// `max_length` with the default maximum
    MaxLength,
    /// `special_char`
    SpecialChar,
    /// `email`
    Email,
    /// `number_required` with a count of one
    NumberRequired,
    /// `uppercase_required` with a count of one
    UppercaseRequired,
    /// `lowercase_required` with a count of one
    LowercaseRequired,
    /// `special_char_required` with the default character set
    SpecialCharRequired,
}

/// Arguments of `special_char_required`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpecialCharSpec {
    /// Just the count
    Count(usize),
    /// Count and a custom character set
    Full {
        /// Minimum number of special characters
        #[serde(default = "default_count")]
        count: usize,
        /// Accepted characters, written as one string
        #[serde(default, skip_serializing_if = "Option::is_none")]
        choices: Option<String>,
    },
}

fn default_count() -> usize {
    1
}

/// Arguments of `confirm_match`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmMatchSpec {
    /// Field whose value must be repeated
    pub field: String,
    /// Label used in the badge and message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Arguments of the country-dependent rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountrySpec {
    /// Field holding the ISO 3166-1 alpha-2 country code
    pub country_field: String,
}

/// One rule entry in a field's `validators` list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleConfig {
    /// Bare rule name
    Named(RuleName),

    /// Explicit `{ rule: <name>, message: ... }`
    Explicit {
        /// Rule name
        rule: RuleName,
        /// Message template override
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// `min_length: <n>`
    MinLength {
        /// Minimum number of characters
        min_length: usize,
        /// Message template override
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// `max_length: <n>`
    MaxLength {
        /// Maximum number of characters
        max_length: usize,
        /// Message template override
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// `number_required: <n>`
    NumberRequired {
        /// Minimum number of digits
        number_required: usize,
        /// Message template override
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// `uppercase_required: <n>`
    UppercaseRequired {
        /// Minimum number of uppercase letters
        uppercase_required: usize,
        /// Message template override
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// `lowercase_required: <n>`
    LowercaseRequired {
        /// Minimum number of lowercase letters
        lowercase_required: usize,
        /// Message template override
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// `special_char_required: <n>` or `{ count, choices }`
    SpecialCharRequired {
        /// Count and character set
        special_char_required: SpecialCharSpec,
        /// Message template override
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// `confirm_match: { field, label }`
    ConfirmMatch {
        /// Sibling field and label
        confirm_match: ConfirmMatchSpec,
        /// Message template override
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// `complete_telephone: { country_field }`
    CompleteTelephone {
        /// Country field reference
        complete_telephone: CountrySpec,
        /// Message template override
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// `possible_telephone: { country_field }`
    PossibleTelephone {
        /// Country field reference
        possible_telephone: CountrySpec,
        /// Message template override
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// `postal_code: { country_field }`
    PostalCode {
        /// Country field reference
        postal_code: CountrySpec,
        /// Message template override
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl RuleConfig {
    /// Validator key this entry builds
    pub fn key(&self) -> ValidatorKey {
        match self {
            RuleConfig::Named(name) | RuleConfig::Explicit { rule: name, .. } => match name {
                RuleName::Required => ValidatorKey::Required,
                RuleName::MinLength => ValidatorKey::MinLength,
                RuleName::MaxLength => ValidatorKey::MaxLength,
                RuleName::SpecialChar => ValidatorKey::SpecialChar,
                RuleName::Email => ValidatorKey::Email,
                RuleName::NumberRequired => ValidatorKey::NumberRequired,
                RuleName::UppercaseRequired => ValidatorKey::UppercaseRequired,
                RuleName::LowercaseRequired => ValidatorKey::LowercaseRequired,
                RuleName::SpecialCharRequired => ValidatorKey::SpecialCharRequired,
            },
            RuleConfig::MinLength { .. } => ValidatorKey::MinLength,
            RuleConfig::MaxLength { .. } => ValidatorKey::MaxLength,
            RuleConfig::NumberRequired { .. } => ValidatorKey::NumberRequired,
            RuleConfig::UppercaseRequired { .. } => ValidatorKey::UppercaseRequired,
            RuleConfig::LowercaseRequired { .. } => ValidatorKey::LowercaseRequired,
            RuleConfig::SpecialCharRequired { .. } => ValidatorKey::SpecialCharRequired,
            RuleConfig::ConfirmMatch { .. } => ValidatorKey::ConfirmMatch,
            RuleConfig::CompleteTelephone { .. } => ValidatorKey::CompleteTelephone,
            RuleConfig::PossibleTelephone { .. } => ValidatorKey::PossibleTelephone,
            RuleConfig::PostalCode { .. } => ValidatorKey::PostalCode,
        }
    }

    /// Message template override, if any
    pub fn message(&self) -> Option<&str> {
        match self {
            RuleConfig::Named(_) => None,
            RuleConfig::Explicit { message, .. }
            | RuleConfig::MinLength { message, .. }
            | RuleConfig::MaxLength { message, .. }
            | RuleConfig::NumberRequired { message, .. }
            | RuleConfig::UppercaseRequired { message, .. }
            | RuleConfig::LowercaseRequired { message, .. }
            | RuleConfig::SpecialCharRequired { message, .. }
            | RuleConfig::ConfirmMatch { message, .. }
            | RuleConfig::CompleteTelephone { message, .. }
            | RuleConfig::PossibleTelephone { message, .. }
            | RuleConfig::PostalCode { message, .. } => message.as_deref(),
        }
    }

    /// Sibling field this rule reads, if any
    pub fn reference(&self) -> Option<&str> {
        match self {
            RuleConfig::ConfirmMatch { confirm_match, .. } => Some(&confirm_match.field),
            RuleConfig::CompleteTelephone {
                complete_telephone: spec,
                ..
            }
            | RuleConfig::PossibleTelephone {
                possible_telephone: spec,
                ..
            }
            | RuleConfig::PostalCode {
                postal_code: spec, ..
            } => Some(&spec.country_field),
            _ => None,
        }
    }

    /// Build the validator, reading sibling values from `record`
    pub fn build(&self, label: Option<&str>, record: &Arc<Map<String, Value>>) -> Result<FieldValidator> {
        let label = label.map(str::to_string);

        let validator = match self {
            RuleConfig::Named(name) | RuleConfig::Explicit { rule: name, .. } => {
                build_named(*name, label)
            }
            RuleConfig::MinLength { min_length, .. } => validators::min_length(MinLengthArgs {
                label,
                min_len: *min_length,
            }),
            RuleConfig::MaxLength { max_length, .. } => validators::max_length(MaxLengthArgs {
                label,
                max_len: *max_length,
            }),
            RuleConfig::NumberRequired {
                number_required, ..
            } => validators::number_required(CountArgs {
                label,
                count: *number_required,
            }),
            RuleConfig::UppercaseRequired {
                uppercase_required, ..
            } => validators::uppercase_required(CountArgs {
                label,
                count: *uppercase_required,
            }),
            RuleConfig::LowercaseRequired {
                lowercase_required, ..
            } => validators::lowercase_required(CountArgs {
                label,
                count: *lowercase_required,
            }),
            RuleConfig::SpecialCharRequired {
                special_char_required,
                ..
            } => {
                let mut args = SpecialCharRequiredArgs {
                    label,
                    ..Default::default()
                };
                match special_char_required {
                    SpecialCharSpec::Count(count) => args.count = *count,
                    SpecialCharSpec::Full { count, choices } => {
                        args.count = *count;
                        if let Some(choices) = choices {
                            args.choices = choices.chars().collect();
                        }
                    }
                }
                validators::special_char_required(args)
            }
            RuleConfig::ConfirmMatch { confirm_match, .. } => {
                validators::confirm_match(ConfirmMatchArgs {
                    label: confirm_match.label.clone(),
                    get_match_value: Some(field_resolver(record, &confirm_match.field)),
                })?
            }
            RuleConfig::CompleteTelephone {
                complete_telephone, ..
            } => validators::complete_telephone(country_args(
                label,
                record,
                &complete_telephone.country_field,
            ))?,
            RuleConfig::PossibleTelephone {
                possible_telephone, ..
            } => validators::possible_telephone(country_args(
                label,
                record,
                &possible_telephone.country_field,
            ))?,
            RuleConfig::PostalCode { postal_code, .. } => validators::postal_code(country_args(
                label,
                record,
                &postal_code.country_field,
            ))?,
        };
        Ok(validator)
    }
}

fn build_named(name: RuleName, label: Option<String>) -> FieldValidator {
    match name {
        RuleName::Required => validators::required(LabelArgs { label }),
        RuleName::MinLength => validators::min_length(MinLengthArgs {
            label,
            ..Default::default()
        }),
        RuleName::MaxLength => validators::max_length(MaxLengthArgs {
            label,
            ..Default::default()
        }),
        RuleName::SpecialChar => validators::special_char(LabelArgs { label }),
        RuleName::Email => validators::email(LabelArgs { label }),
        RuleName::NumberRequired => validators::number_required(CountArgs {
            label,
            ..Default::default()
        }),
        RuleName::UppercaseRequired => validators::uppercase_required(CountArgs {
            label,
            ..Default::default()
        }),
        RuleName::LowercaseRequired => validators::lowercase_required(CountArgs {
            label,
            ..Default::default()
        }),
        RuleName::SpecialCharRequired => {
            validators::special_char_required(SpecialCharRequiredArgs {
                label,
                ..Default::default()
            })
        }
    }
}

fn country_args(label: Option<String>, record: &Arc<Map<String, Value>>, field: &str) -> CountryArgs {
    CountryArgs {
        label,
        get_country_code: Some(field_resolver(record, field)),
    }
}

fn field_resolver(record: &Arc<Map<String, Value>>, field: &str) -> Resolver {
    let record = Arc::clone(record);
    let field = field.to_string();
    Resolver::new(move || record_value(&record, &field))
}

/// Read a field of a JSON record as text
///
/// Strings, numbers and booleans are read; null, missing, arrays and
/// objects read as absent.
pub fn record_value(record: &Map<String, Value>, field: &str) -> Option<String> {
    match record.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// One field of a form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Key of the field in submitted records
    pub name: String,

    /// Display label passed to the field's rules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Rules, evaluated in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<RuleConfig>,
}

impl FieldConfig {
    /// Build this field's validators against `record`, applying message overrides
    pub fn build_validators(&self, record: &Arc<Map<String, Value>>) -> Result<Vec<FieldValidator>> {
        self.validators
            .iter()
            .map(|rule| {
                let mut validator = rule.build(self.label.as_deref(), record)?;
                if let Some(template) = rule.message() {
                    validator.message = self.render_message(template, &validator)?;
                }
                Ok(validator)
            })
            .collect()
    }

    fn render_message(&self, template: &str, validator: &FieldValidator) -> Result<String> {
        let mut context = Map::new();
        if let Value::Object(args) = serde_json::to_value(&validator.args)? {
            for (key, value) in args {
                context.insert(snake_case(&key), value);
            }
        }
        let label = validator
            .args
            .label()
            .or(self.label.as_deref())
            .unwrap_or(&self.name)
            .to_string();
        context.insert("label".to_string(), Value::String(label));
        context.insert("field".to_string(), Value::String(self.name.clone()));
        context.insert("badge".to_string(), Value::String(validator.badge.clone()));

        let env = minijinja::Environment::new();
        Ok(env.render_str(template, Value::Object(context))?)
    }
}

/// `minLen` -> `min_len`
fn snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 2);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// A form definition loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormConfig {
    /// Form name
    pub name: String,

    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Fields, evaluated in order
    pub fields: Vec<FieldConfig>,
}

impl FormConfig {
    /// Load and check a form file
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let form = FormConfig::load("./signup.yaml")?;
    /// println!("Form: {}", form.name);
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let form = Self::from_yaml(&contents)?;
        tracing::debug!(form = %form.name, path = %path.display(), "loaded form config");
        Ok(form)
    }

    /// Parse and check a form definition
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let form: FormConfig = serde_yaml::from_str(yaml)?;
        check_rule_keys(&serde_yaml::from_str(yaml)?)?;
        form.check()?;
        Ok(form)
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldConfig> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn check(&self) -> Result<()> {
        let mut names = HashSet::new();
        for field in &self.fields {
            if !names.insert(field.name.as_str()) {
                return Err(Error::ConfigInvalid {
                    message: format!("field '{}' is declared twice", field.name),
                });
            }
        }

        let env = minijinja::Environment::new();
        for field in &self.fields {
            for rule in &field.validators {
                if let Some(reference) = rule.reference() {
                    if !names.contains(reference) {
                        return Err(Error::UnknownFieldReference {
                            field: field.name.clone(),
                            reference: reference.to_string(),
                        });
                    }
                    if reference == field.name {
                        return Err(Error::ConfigInvalid {
                            message: format!(
                                "{} on '{}' cannot reference its own field",
                                rule.key(),
                                field.name
                            ),
                        });
                    }
                }
                if let Some(template) = rule.message() {
                    env.template_from_str(template)?;
                }
            }
        }
        Ok(())
    }

    /// Evaluate every field of `record`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRecord`] when `record` is not a JSON object,
    /// and template errors from message overrides.
    pub fn validate_record(&self, record: &Value) -> Result<FormReport> {
        let Value::Object(map) = record else {
            return Err(Error::InvalidRecord {
                message: format!("expected a JSON object, got {}", json_kind(record)),
            });
        };
        let record = Arc::new(map.clone());

        let mut fields = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            let validators = field.build_validators(&record)?;
            let value = record_value(&record, &field.name);
            let report = evaluate(value.as_deref(), &validators);
            tracing::debug!(
                field = %field.name,
                state = ?report.state,
                failures = report.failures.len(),
                "evaluated field"
            );
            fields.push(FieldOutcome {
                field: field.name.clone(),
                report,
            });
        }

        let valid = fields.iter().all(|f| f.report.is_valid());
        Ok(FormReport {
            form: self.name.clone(),
            valid,
            fields,
        })
    }
}

/// Keys that select a rule in a validator map
const RULE_KEYS: &[&str] = &[
    "rule",
    "min_length",
    "max_length",
    "number_required",
    "uppercase_required",
    "lowercase_required",
    "special_char_required",
    "confirm_match",
    "complete_telephone",
    "possible_telephone",
    "postal_code",
];

/// Reject validator maps that name several rules or carry unknown keys
///
/// Untagged parsing keeps the first variant that fits and drops the rest
/// of the map, so `{ min_length: 3, max_length: 20 }` would lose a rule.
fn check_rule_keys(raw: &serde_yaml::Value) -> Result<()> {
    let fields = raw
        .get("fields")
        .and_then(serde_yaml::Value::as_sequence)
        .into_iter()
        .flatten();

    for field in fields {
        let name = field
            .get("name")
            .and_then(serde_yaml::Value::as_str)
            .unwrap_or_default();
        let rules = field
            .get("validators")
            .and_then(serde_yaml::Value::as_sequence)
            .into_iter()
            .flatten()
            .filter_map(serde_yaml::Value::as_mapping);

        for rule in rules {
            let keys: Vec<&str> = rule.keys().filter_map(serde_yaml::Value::as_str).collect();
            if let Some(unknown) = keys
                .iter()
                .find(|key| **key != "message" && !RULE_KEYS.contains(key))
            {
                return Err(Error::ConfigInvalid {
                    message: format!("unknown key '{}' in a validator of '{}'", unknown, name),
                });
            }

            let named: Vec<&str> = keys
                .into_iter()
                .filter(|key| RULE_KEYS.contains(key))
                .collect();
            if named.len() > 1 {
                return Err(Error::ConfigInvalid {
                    message: format!(
                        "validator of '{}' names several rules ({}); list each separately",
                        name,
                        named.join(", ")
                    ),
                });
            }
        }
    }
    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Report for one field of a record
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldOutcome {
    /// Field name
    pub field: String,
    /// Evaluation result
    #[serde(flatten)]
    pub report: FieldReport,
}

/// Result of validating a record against a form
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FormReport {
    /// Form name
    pub form: String,
    /// Whether every field passed
    pub valid: bool,
    /// Per-field reports, in declaration order
    pub fields: Vec<FieldOutcome>,
}

impl FormReport {
    /// Report for a named field
    pub fn field(&self, name: &str) -> Option<&FieldReport> {
        self.fields
            .iter()
            .find(|f| f.field == name)
            .map(|f| &f.report)
    }
}
