mod analysis;
mod args;
mod keychain;
mod snapshot;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::config::{resolve_api_key, Settings};
use crate::enrichment::GeminiClient;

pub use analysis::{EvaluationReport, RuleSummary};
pub use args::{Command, EvaluateArgs, KeyAction, USAGE};
pub use keychain::{KeySource, KeyStatus};

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

/// Run one command. `args` excludes the program name.
pub fn dispatch(args: &[String]) -> Result<()> {
    let command = Command::from_args(args)?;

    if command == Command::Help {
        println!("{}", USAGE);
        return Ok(());
    }
    let settings = Settings::load()?;

    match command {
        Command::Parse { file } => print_json(&analysis::parse(&file)?),
        Command::Evaluate(evaluate_args) => {
            let client = GeminiClient::new(
                resolve_api_key(),
                &settings.model,
                settings.request_timeout_secs,
            )?
            .with_mock_mode(settings.mock_mode);
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("Failed to start async runtime")?;
            let report = runtime.block_on(analysis::evaluate(&evaluate_args, &settings, &client))?;
            print_json(&report)
        }
        Command::Rules { gene, category } => {
            print_json(&analysis::rules(&settings, gene.as_deref(), category.as_deref())?)
        }
        Command::Sample { preset } => print_json(&analysis::sample(&preset)?),
        Command::Show => print_json(&snapshot::show(&settings)?),
        Command::Status { id, status } => {
            let snapshot = snapshot::set_status(&settings, &id, status)?;
            print_json(&snapshot.recommendation(&id))
        }
        Command::Key(action) => print_json(&keychain::run(&action)?),
        Command::Help => Ok(()),
    }
}
