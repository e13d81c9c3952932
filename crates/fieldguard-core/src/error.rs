//! Error types for fieldguard-core

use thiserror::Error;

/// Result type alias for fieldguard-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in fieldguard-core
///
/// A failing validator is not an error: `FieldValidator::test` returns
/// `false`. These variants cover configuration mistakes that must surface
/// when a validator or form is built.
#[derive(Error, Debug)]
pub enum Error {
    /// A validator that depends on another value was built without its resolver
    #[error("{validator} requires a {resolver} function")]
    MissingResolver {
        /// Validator key (e.g. `confirmMatch`)
        validator: String,
        /// Name of the missing resolver argument
        resolver: String,
    },

    /// Form configuration file could not be found
    #[error("form configuration not found: {path}")]
    ConfigNotFound {
        /// Path that was searched
        path: String,
    },

    /// Failed to parse YAML configuration
    #[error("failed to parse form configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// Invalid configuration value
    #[error("invalid form configuration: {message}")]
    ConfigInvalid {
        /// Description of what's invalid
        message: String,
    },

    /// A field's validator refers to a field the form does not declare
    #[error("field '{field}' references unknown field '{reference}'")]
    UnknownFieldReference {
        /// Field that declares the validator
        field: String,
        /// Sibling field that could not be found
        reference: String,
    },

    /// Record handed to a form is not shaped like one
    #[error("invalid record: {message}")]
    InvalidRecord {
        /// Description of the problem
        message: String,
    },

    /// Embedded reference data could not be read
    #[error("reference data error in '{table}': {message}")]
    ReferenceData {
        /// Table being built
        table: String,
        /// Description of the error
        message: String,
    },

    /// Message template rendering error
    #[error("template error: {0}")]
    TemplateError(#[from] minijinja::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn missing_resolver(validator: &str, resolver: &str) -> Self {
        Self::MissingResolver {
            validator: validator.to_string(),
            resolver: resolver.to_string(),
        }
    }
}
