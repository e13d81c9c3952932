//! Run a validator set against one value
//!
//! Aggregates pass/fail into the three-way state a form field shows, and
//! decides which badges are visible.

use serde::Serialize;

use crate::validator::{FieldValidator, ValidatorKey};

/// Display state of a field
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValidState {
    /// Non-empty and every validator passes
    Valid,
    /// At least one validator fails
    Invalid,
    /// Empty and nothing fails
    #[default]
    None,
}

/// A badge to render next to the field
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BadgeView {
    /// Validator that owns the badge
    pub key: ValidatorKey,
    /// Badge text
    pub badge: String,
    /// Whether the validator failed
    pub failing: bool,
    /// Failure message, present only when failing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Outcome of evaluating one field
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
pub struct FieldReport {
    /// Aggregate state
    pub state: ValidState,
    /// Keys of failing validators, in declaration order
    pub failures: Vec<ValidatorKey>,
    /// Visible badges
    pub badges: Vec<BadgeView>,
}

impl FieldReport {
    /// Whether the field has no failures
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Evaluate `value` against `validators`
///
/// Sticky badges are always shown; the others only while failing.
pub fn evaluate<'a>(value: impl Into<Option<&'a str>>, validators: &[FieldValidator]) -> FieldReport {
    let value = value.into();
    let mut report = FieldReport::default();

    for validator in validators {
        let passed = validator.test(value);
        tracing::trace!(key = %validator.key, passed, "evaluated validator");

        if !passed {
            report.failures.push(validator.key);
        }
        if validator.sticky || !passed {
            report.badges.push(BadgeView {
                key: validator.key,
                badge: validator.badge.clone(),
                failing: !passed,
                message: (!passed).then(|| validator.message.clone()),
            });
        }
    }

    report.state = if !report.failures.is_empty() {
        ValidState::Invalid
    } else if value.is_some_and(|v| !v.is_empty()) {
        ValidState::Valid
    } else {
        ValidState::None
    };
    report
}
