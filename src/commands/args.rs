//! Command-line argument parsing.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};

use crate::engine::RecommendationStatus;

pub const USAGE: &str = "\
Usage: sera <command> [options]

Commands:
  parse <file>                          Parse a genotype file and print the markers
  evaluate <file> [--profile <json>] [--enrich] [--max <n>] [--save]
                                        Evaluate markers against the rule table
  rules [--gene <symbol>] [--category <name>]
                                        List the rule table
  sample <healthy|diabetes-risk|brca-like>
                                        Print a demo marker set
  show                                  Print the saved snapshot
  status <recommendation-id> <pending|accepted|declined|saved>
                                        Change a saved recommendation's status
  key <set <value>|delete|status>       Manage the Gemini API key in the OS keychain

Environment:
  GEMINI_API_KEY   API key (takes precedence over the keychain)
  RUST_LOG         Log filter (default: info)";

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluateArgs {
    pub file: PathBuf,
    /// Raw JSON for a `UserProfile`
    pub profile: Option<String>,
    pub enrich: bool,
    pub max: Option<usize>,
    pub save: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum KeyAction {
    Set(String),
    Delete,
    Status,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Parse { file: PathBuf },
    Evaluate(EvaluateArgs),
    Rules { gene: Option<String>, category: Option<String> },
    Sample { preset: String },
    Show,
    Status { id: String, status: RecommendationStatus },
    Key(KeyAction),
    Help,
}

fn take_value(flag: &str, rest: &mut std::slice::Iter<'_, String>) -> Result<String> {
    rest.next()
        .cloned()
        .ok_or_else(|| anyhow!("{} requires a value", flag))
}

fn parse_status(value: &str) -> Result<RecommendationStatus> {
    match value.to_lowercase().as_str() {
        "pending" => Ok(RecommendationStatus::Pending),
        "accepted" | "accept" => Ok(RecommendationStatus::Accepted),
        "declined" | "decline" => Ok(RecommendationStatus::Declined),
        "saved" | "save" => Ok(RecommendationStatus::Saved),
        other => bail!("Unknown status '{}'", other),
    }
}

impl Command {
    /// Parse arguments, excluding the program name.
    pub fn from_args(args: &[String]) -> Result<Self> {
        let Some((name, rest)) = args.split_first() else {
            return Ok(Command::Help);
        };
        let mut rest = rest.iter();

        match name.as_str() {
            "parse" => {
                let file = rest.next().context("parse requires a file")?;
                Ok(Command::Parse {
                    file: PathBuf::from(file),
                })
            }
            "evaluate" => {
                let mut file = None;
                let mut parsed = EvaluateArgs {
                    file: PathBuf::new(),
                    profile: None,
                    enrich: false,
                    max: None,
                    save: false,
                };
                while let Some(arg) = rest.next() {
                    match arg.as_str() {
                        "--profile" => parsed.profile = Some(take_value(arg, &mut rest)?),
                        "--enrich" => parsed.enrich = true,
                        "--save" => parsed.save = true,
                        "--max" => {
                            let value = take_value(arg, &mut rest)?;
                            parsed.max = Some(
                                value
                                    .parse()
                                    .with_context(|| format!("Invalid --max value '{}'", value))?,
                            );
                        }
                        flag if flag.starts_with("--") => bail!("Unknown option '{}'", flag),
                        path if file.is_none() => file = Some(PathBuf::from(path)),
                        extra => bail!("Unexpected argument '{}'", extra),
                    }
                }
                parsed.file = file.context("evaluate requires a file")?;
                Ok(Command::Evaluate(parsed))
            }
            "rules" => {
                let mut gene = None;
                let mut category = None;
                while let Some(arg) = rest.next() {
                    match arg.as_str() {
                        "--gene" => gene = Some(take_value(arg, &mut rest)?),
                        "--category" => category = Some(take_value(arg, &mut rest)?),
                        other => bail!("Unknown option '{}'", other),
                    }
                }
                Ok(Command::Rules { gene, category })
            }
            "sample" => {
                let preset = rest.next().context("sample requires a preset name")?;
                Ok(Command::Sample {
                    preset: preset.clone(),
                })
            }
            "show" => Ok(Command::Show),
            "status" => {
                let id = rest.next().context("status requires a recommendation id")?;
                let status = rest.next().context("status requires a new status")?;
                Ok(Command::Status {
                    id: id.clone(),
                    status: parse_status(status)?,
                })
            }
            "key" => match rest.next().map(String::as_str) {
                Some("set") => {
                    let value = rest.next().context("key set requires a value")?;
                    Ok(Command::Key(KeyAction::Set(value.clone())))
                }
                Some("delete") => Ok(Command::Key(KeyAction::Delete)),
                Some("status") | None => Ok(Command::Key(KeyAction::Status)),
                Some(other) => bail!("Unknown key action '{}'", other),
            },
            "help" | "--help" | "-h" => Ok(Command::Help),
            other => bail!("Unknown command '{}'\n\n{}", other, USAGE),
        }
    }
}
