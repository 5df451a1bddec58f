//! Subcommand implementations.

pub mod sanitize;
pub mod validate;

use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use streamwarden_core::config::MonitorConfig;

/// Load the monitor configuration, requiring `--config`.
pub(crate) fn load_config(path: Option<&Path>) -> Result<MonitorConfig> {
    let Some(path) = path else {
        bail!("--config <file> is required for this command");
    };
    MonitorConfig::load_from_file(path)
}

/// Take text from the argument, or read it from stdin.
pub(crate) fn read_text(text: Option<String>) -> Result<String> {
    match text {
        Some(t) => Ok(t),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read text from stdin")?;
            Ok(buf)
        }
    }
}
