//! `termmap`: run the medical term mapping engine from the command line.
//!
//! ```bash
//! termmap --builtin extract "Patient reports diabetes and fatigue"
//! termmap --terms medical_terms.csv map entities.json --pretty
//! termmap normalize --input transcription.json
//! ```

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{execute, Cli};
use logger_redacted::{init_logging, LoggerConfig};

fn main() -> Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_logging(&LoggerConfig {
        log_level: cli.log_level.clone(),
        json_output: cli.json_logs,
        ..LoggerConfig::default()
    })?;

    let normalizer = cli.engine.normalizer()?;
    let output = execute(&cli.command, &normalizer)?;

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", rendered);
    Ok(())
}
