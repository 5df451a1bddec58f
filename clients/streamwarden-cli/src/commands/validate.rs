//! `streamwarden validate` -- run the config validator and print the report.

use std::path::Path;

use anyhow::Result;
use streamwarden_core::config::validator;

pub fn run(config: Option<&Path>, json: bool) -> Result<()> {
    let config = super::load_config(config)?;
    let report = validator::validate(&config);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for error in &report.errors {
            println!("error: {error}");
        }
        for warning in &report.warnings {
            println!("warning: {warning}");
        }
        if report.is_valid() {
            println!("configuration is valid ({} warning(s))", report.warnings.len());
        }
    }

    if !report.is_valid() {
        std::process::exit(1);
    }
    Ok(())
}
