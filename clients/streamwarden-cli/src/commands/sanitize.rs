//! `streamwarden sanitize` -- inspect what the sanitizer does to text.

use anyhow::Result;
use streamwarden_core::sanitize::{sanitize_custom_prompt, sanitize_event_content};

pub fn run(text: Option<String>, prompt: bool, json: bool) -> Result<()> {
    let text = super::read_text(text)?;
    let result = if prompt {
        sanitize_custom_prompt(&text)
    } else {
        sanitize_event_content(&text)
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if result.blocked {
        println!(
            "blocked: {}",
            result.reason.as_deref().unwrap_or("no reason recorded")
        );
        std::process::exit(1);
    }
    for warning in &result.warnings {
        println!("warning: {warning}");
    }
    println!("{}", result.sanitized);
    Ok(())
}
