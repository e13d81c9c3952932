//! Validate a record against a form

use anyhow::{Context, Result};
use fieldguard_core::FormConfig;
use std::io::Read;

/// Run the check command
///
/// Prints the JSON report and returns whether the record is valid.
pub fn run(form_path: &str, record_path: &str, compact: bool) -> Result<bool> {
    tracing::info!("Checking {} against {}", record_path, form_path);

    let form = FormConfig::load(form_path).context("Failed to load form")?;

    let contents = if record_path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read record from stdin")?;
        buf
    } else {
        std::fs::read_to_string(record_path)
            .with_context(|| format!("Failed to read record: {}", record_path))?
    };
    let record: serde_json::Value =
        serde_json::from_str(&contents).context("Record is not valid JSON")?;

    let report = form
        .validate_record(&record)
        .context("Failed to validate record")?;

    let output = if compact {
        serde_json::to_string(&report)?
    } else {
        serde_json::to_string_pretty(&report)?
    };
    println!("{}", output);

    if report.valid {
        tracing::info!("✓ Record is valid");
    } else {
        let failing: Vec<&str> = report
            .fields
            .iter()
            .filter(|f| !f.report.is_valid())
            .map(|f| f.field.as_str())
            .collect();
        tracing::warn!("Record is invalid: {}", failing.join(", "));
    }
    Ok(report.valid)
}
