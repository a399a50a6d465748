// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! `GemRelay` CLI - resilient Gemini requests from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Create the configuration file, then add your keys to it
//! gemrelay config init
//!
//! # Ask for a plain-text answer
//! gemrelay ask "Name a medieval blacksmith"
//!
//! # Ask for a JSON object
//! gemrelay ask --json "Describe a blacksmith with name and trade fields"
//!
//! # Translate a YAML language file
//! gemrelay translate language.yml --output language.de.yml
//!
//! # Show the configured keys
//! gemrelay keys --format json --pretty
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use gemrelay_store::ConfigError;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{ask, config, keys, translate};

// ============================================================================
// CLI Definition
// ============================================================================

/// `GemRelay` CLI - resilient Gemini requests.
#[derive(Parser)]
#[command(name = "gemrelay")]
#[command(about = "Gemini client with key rotation and response repair")]
#[command(long_about = r#"
GemRelay sends prompts to the Gemini generateContent API.

API keys are rotated at random; keys that report an exceeded quota are
taken out of rotation. Failed requests are retried after a fixed delay.

Examples:
  gemrelay config init                # Write the default config file
  gemrelay ask "Say hello"            # Plain-text answer
  gemrelay ask --json "..."           # Repaired JSON answer
  gemrelay translate language.yml     # Translate a YAML file
  gemrelay keys                       # List configured keys
"#)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to the user config directory).
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Send a prompt and print the answer.
    #[command(visible_alias = "a")]
    Ask(ask::AskArgs),

    /// Translate a YAML file into the configured language.
    #[command(visible_alias = "t")]
    Translate(translate::TranslateArgs),

    /// List configured API keys.
    #[command(visible_alias = "k")]
    Keys,

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// No API keys configured yet.
    NotConfigured = 2,
}

impl ExitCode {
    fn for_error(error: &anyhow::Error) -> Self {
        match error.downcast_ref::<ConfigError>() {
            Some(e) if e.is_not_configured() => ExitCode::NotConfigured,
            _ => ExitCode::Error,
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

/// Tracing targets of the workspace crates.
const LOG_TARGETS: [&str; 4] = ["gemrelay", "gemrelay_core", "gemrelay_client", "gemrelay_store"];

fn log_directives(level: &str) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new(format!("{},info", log_directives("debug")))
    } else {
        EnvFilter::new(log_directives("warn"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result: Result<()> = match &cli.command {
        Commands::Ask(args) => ask::run(args, &cli).await,
        Commands::Translate(args) => translate::run(args, &cli).await,
        Commands::Keys => keys::run(&cli).await,
        Commands::Config(args) => config::run(args, &cli).await,
    };

    let code = match result {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {e:#}");
            }
            ExitCode::for_error(&e)
        }
    };

    std::process::exit(code as i32);
}
