//! Write an example form and record

use anyhow::{Context, Result};
use fieldguard_core::FormConfig;
use fieldguard_core::config::EXAMPLE_FORM;
use std::fs;
use std::path::Path;

const EXAMPLE_RECORD: &str = r#"{
  "username": "alice_01",
  "email": "alice@example.com",
  "password": "Secr3t!pass",
  "password_confirm": "Secr3t!pass",
  "country": "US",
  "phone": "(415) 555-2671",
  "postal_code": "94103"
}
"#;

/// Run the init command
pub fn run(path: &str, name: Option<&str>, force: bool) -> Result<()> {
    let dir = Path::new(path);

    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }

    let form_path = dir.join("form.yaml");
    let record_path = dir.join("record.json");

    // Check if already initialized
    if !force {
        for existing in [&form_path, &record_path] {
            if existing.exists() {
                anyhow::bail!(
                    "'{}' already exists (use --force to overwrite)",
                    existing.display()
                );
            }
        }
    }

    let form = match name {
        Some(name) => {
            let mut form = FormConfig::from_yaml(EXAMPLE_FORM)?;
            form.name = name.to_string();
            let yaml = serde_yaml::to_string(&form)?;
            FormConfig::from_yaml(&yaml).context("Generated form is invalid")?;
            yaml
        }
        None => EXAMPLE_FORM.to_string(),
    };

    tracing::info!("Creating example form in {}", dir.display());

    fs::write(&form_path, form)?;
    fs::write(&record_path, EXAMPLE_RECORD)?;

    tracing::info!("✓ Created {}", form_path.display());
    tracing::info!("✓ Created {}", record_path.display());
    tracing::info!("");
    tracing::info!("Next steps:");
    tracing::info!(
        "  fieldguard check --form {} {}",
        form_path.display(),
        record_path.display()
    );

    Ok(())
}
