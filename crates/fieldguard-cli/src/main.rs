//! FieldGuard CLI
//!
//! Developer tool for checking records against form definitions and
//! browsing the built-in reference data.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// FieldGuard - form field validation
#[derive(Parser)]
#[command(name = "fieldguard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write an example form and record
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,

        /// Form name (defaults to "signup")
        #[arg(short, long)]
        name: Option<String>,

        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Validate a JSON record against a form
    Check {
        /// Form definition file
        #[arg(short, long, default_value = "form.yaml")]
        form: String,

        /// JSON record file, or `-` for stdin
        record: String,

        /// Print the report on one line
        #[arg(long)]
        compact: bool,
    },

    /// List countries, optionally filtered by a search query
    Countries {
        /// Search query matched against codes, names and keywords
        query: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List the subdivisions of a country
    Regions {
        /// ISO 3166-1 alpha-2 country code
        country: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List the available validator rules
    Rules,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for command output
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Init { path, name, force } => {
            commands::init::run(&path, name.as_deref(), force)?;
        }
        Commands::Check {
            form,
            record,
            compact,
        } => {
            if !commands::check::run(&form, &record, compact)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Countries { query, json } => {
            commands::countries::list(query.as_deref(), json)?;
        }
        Commands::Regions { country, json } => {
            commands::countries::regions(&country, json)?;
        }
        Commands::Rules => {
            commands::rules::run()?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
