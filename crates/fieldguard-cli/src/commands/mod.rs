//! CLI command implementations

pub mod check;
pub mod countries;
pub mod init;
pub mod rules;
