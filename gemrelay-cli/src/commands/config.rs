//! Config command - manage configuration.

use anyhow::Result;
use clap::{Args, Subcommand};
use gemrelay_core::mask_key;
use gemrelay_store::{default_config_dir, RelayConfig};
use tracing::info;

use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

use super::{config_path, load_config};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration (keys masked).
    Show,

    /// Show configuration paths.
    Path,

    /// Write the default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli).await,
        ConfigAction::Path => show_paths(cli),
        ConfigAction::Init { force } => init_config(*force, cli).await,
    }
}

/// Returns a copy safe for display.
fn redacted(config: &RelayConfig) -> RelayConfig {
    let mut shown = config.clone();
    shown.api_keys = config.api_keys.iter().map(|k| mask_key(k)).collect();
    if !shown.proxy.pass.is_empty() {
        shown.proxy.pass = "****".to_string();
    }
    shown
}

async fn show_config(cli: &Cli) -> Result<()> {
    let config = load_config(cli).await?;
    let shown = redacted(&config);

    match cli.format {
        OutputFormat::Text => {
            println!("GemRelay Configuration");
            println!("{}", "─".repeat(40));
            println!();
            print!("{}", serde_yaml::to_string(&shown)?);
            println!();
            match config.validate() {
                Ok(()) => println!("Status: ready"),
                Err(e) => println!("Status: {e}"),
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&shown)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli) -> Result<()> {
    let config_dir = default_config_dir();
    let config_file = config_path(cli);

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:  {}", config_dir.display());
            println!("Config file: {}", config_file.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "config_file": config_file.display().to_string(),
                "exists": config_file.exists(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

async fn init_config(force: bool, cli: &Cli) -> Result<()> {
    let path = config_path(cli);

    RelayConfig::write_default(&path, force).await?;

    info!(path = %path.display(), "Configuration initialized");
    println!("Wrote {}", path.display());
    println!("Add your API keys under api-keys before sending requests.");

    Ok(())
}
