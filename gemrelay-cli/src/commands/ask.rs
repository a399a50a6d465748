//! Ask command - send a bounded request.

use anyhow::Result;
use clap::Args;
use gemrelay_client::Text;
use tracing::info;

use crate::output::{AnswerOutput, JsonFormatter};
use crate::{Cli, OutputFormat};

use super::build_client;

/// Arguments for the ask command.
#[derive(Args)]
pub struct AskArgs {
    /// Prompt to send.
    pub prompt: String,

    /// Attempt budget (defaults to max-retries from the config).
    #[arg(long, short)]
    pub retries: Option<u32>,

    /// Expect a JSON object instead of plain text.
    #[arg(long)]
    pub json: bool,
}

/// Runs the ask command.
pub async fn run(args: &AskArgs, cli: &Cli) -> Result<()> {
    let client = build_client(cli).await?;
    let budget = args.retries.unwrap_or(client.settings().max_retries);
    let pipeline = client.pipeline();

    info!(budget, json = args.json, "Sending prompt");

    let answer = if args.json {
        let value: serde_json::Value = pipeline
            .request_with_retries(args.prompt.clone(), budget)
            .await?;
        AnswerOutput::Json(value)
    } else {
        let text: Text = pipeline
            .request_with_retries(args.prompt.clone(), budget)
            .await?;
        AnswerOutput::Text(text.into_inner())
    };

    match cli.format {
        OutputFormat::Text => match &answer {
            AnswerOutput::Text(text) => println!("{text}"),
            AnswerOutput::Json(value) => {
                println!("{}", JsonFormatter::new(true).format(value)?);
            }
        },
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_answer(&args.prompt, &answer)?);
        }
    }

    Ok(())
}
