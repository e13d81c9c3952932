//! FieldGuard Core Library
//!
//! This crate provides the core functionality for FieldGuard:
//! - Reusable field validators with UI-facing badges, messages and popups
//! - Country, region, postal-code and phone-number reference data
//! - Evaluation of a validator set into a field state
//! - YAML form definitions validated against JSON records
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │    Form     │────▶│ Validators  │────▶│   Report    │
//! │   (YAML)    │     │  + Resolver │     │   (JSON)    │
//! └─────────────┘     └──────┬──────┘     └─────────────┘
//!                            │
//!                     ┌──────▼──────┐
//!                     │  Reference  │
//!                     │    Data     │
//!                     └─────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use fieldguard_core::{Resolver, evaluate, validators};
//! use fieldguard_core::validators::CountryArgs;
//!
//! let rules = vec![
//!     validators::required(Default::default()),
//!     validators::postal_code(CountryArgs {
//!         get_country_code: Some(Resolver::constant("CA")),
//!         ..Default::default()
//!     })
//!     .unwrap(),
//! ];
//! assert!(evaluate("K1A 0B1", &rules).is_valid());
//! assert!(!evaluate("12345", &rules).is_valid());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod evaluate;
pub mod phone;
pub mod popup;
pub mod postal;
pub mod reference;
pub mod validator;
pub mod validators;

pub use config::{FormConfig, FormReport};
pub use error::{Error, Result};
pub use evaluate::{FieldReport, ValidState, evaluate};
pub use reference::{CountryEntry, CountryTable, RegionEntry, countries};
pub use validator::{FieldValidator, Resolver, ValidatorArgs, ValidatorKey};
