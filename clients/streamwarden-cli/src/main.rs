//! CLI client for exercising a Streamwarden monitor configuration.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Streamwarden -- rules-based monitoring for event streams.
#[derive(Parser, Debug)]
#[command(name = "streamwarden", version, about)]
struct Cli {
    /// Path to the monitor configuration TOML file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit results as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate the configured rules against ad-hoc text, with no side effects.
    Test {
        /// Text to evaluate; reads stdin when omitted.
        text: Option<String>,
    },

    /// Validate a monitor configuration and print errors and warnings.
    Validate,

    /// Run the content sanitizer over text and print the outcome.
    Sanitize {
        /// Text to sanitize; reads stdin when omitted.
        text: Option<String>,

        /// Apply the stricter custom-prompt limits.
        #[arg(long)]
        prompt: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Test { text } => commands::test::run(cli.config.as_deref(), text, cli.json),
        Commands::Validate => commands::validate::run(cli.config.as_deref(), cli.json),
        Commands::Sanitize { text, prompt } => commands::sanitize::run(text, prompt, cli.json),
    }
}
