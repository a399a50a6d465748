//! Keys command - list configured credentials.

use anyhow::Result;
use gemrelay_client::CredentialPool;

use crate::output::{JsonFormatter, KeyOutput, TextFormatter};
use crate::{Cli, OutputFormat};

use super::load_config;

/// Runs the keys command.
///
/// Lists keys as configured. Quota state is not persisted, so no
/// availability is reported. Keys are never printed in full.
pub async fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli).await?;
    let pool = CredentialPool::new(config.keys());
    let keys: Vec<KeyOutput> = pool.snapshot().iter().map(KeyOutput::from).collect();

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            print!("{}", formatter.format_keys(&keys));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&keys)?);
        }
    }

    Ok(())
}
