//! Translate command - translate a YAML file.

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

use super::build_client;

/// Arguments for the translate command.
#[derive(Args)]
pub struct TranslateArgs {
    /// YAML file to translate.
    pub file: PathBuf,

    /// Output file (defaults to `<stem>.<language>.yml` next to the input).
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Runs the translate command.
///
/// Translations retry until the model returns usable YAML, so this may run
/// for a long time.
pub async fn run(args: &TranslateArgs, cli: &Cli) -> Result<()> {
    let client = build_client(cli).await?;
    let language = client.settings().language.clone();
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.file, &language));

    info!(
        source = %args.file.display(),
        output = %output.display(),
        "Translating"
    );

    let mapping = client.translate(&args.file).await?;
    let yaml = serde_yaml::to_string(&mapping)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&output, yaml)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    match cli.format {
        OutputFormat::Text => {
            if !cli.quiet {
                println!("Translated {} keys", mapping.len());
            }
            println!("{}", output.display());
        }
        OutputFormat::Json => {
            let summary = serde_json::json!({
                "source": args.file.display().to_string(),
                "output": output.display().to_string(),
                "language": language,
                "keys": mapping.len(),
            });
            println!("{}", JsonFormatter::new(cli.pretty).format(&summary)?);
        }
    }

    Ok(())
}

/// Returns `<dir>/<stem>.<language>.yml` for `source`.
pub fn default_output_path(source: &Path, language: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map_or_else(|| "translation".to_string(), |s| s.to_string_lossy().into_owned());
    let language = language.trim().to_lowercase().replace(char::is_whitespace, "-");

    source.with_file_name(format!("{stem}.{language}.yml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        let path = default_output_path(Path::new("lang/language.yml"), "German");
        assert_eq!(path, PathBuf::from("lang/language.german.yml"));
    }

    #[test]
    fn test_default_output_path_multiword_language() {
        let path = default_output_path(Path::new("messages.yaml"), "Brazilian Portuguese");
        assert_eq!(path, PathBuf::from("messages.brazilian-portuguese.yml"));
    }
}
