use std::process::ExitCode;

use anyhow::Context;
use colored::Colorize;
use jdb_store::{Store, StoreConfig, Value};

use crate::cli::*;

/// Result of a successfully executed command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// The requested key holds no value.
    Absent,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Done => ExitCode::SUCCESS,
            Outcome::Absent => ExitCode::from(1),
        }
    }
}

pub fn run_command(cli: Cli) -> anyhow::Result<Outcome> {
    let config = if cli.in_place {
        StoreConfig::in_place()
    } else {
        StoreConfig::default()
    };
    let mut store = Store::open_with_config(&cli.file, config)
        .with_context(|| format!("opening {}", cli.file.display()))?;
    tracing::debug!(file = %cli.file.display(), keys = store.len(), "store ready");

    let format = cli.format;
    match cli.command {
        Command::Get(args) => cmd_get(&store, &args.key, &format),
        Command::Set(args) => {
            store.set(&args.key, parse_value(&args.value))?;
            report(&format, "set", &args.key, None);
            Ok(Outcome::Done)
        }
        Command::Delete(args) => {
            let removed = store.delete(&args.key)?;
            report(&format, if removed { "deleted" } else { "absent" }, &args.key, None);
            Ok(Outcome::Done)
        }
        Command::Push(args) => {
            store.push(&args.key, parse_value(&args.value))?;
            report(&format, "pushed", &args.key, None);
            Ok(Outcome::Done)
        }
        Command::Has(args) => cmd_has(&store, &args.key, &format),
        Command::Add(args) => {
            let next = store.add(&args.key, args.count)?;
            report(&format, "add", &args.key, Some(next));
            Ok(Outcome::Done)
        }
        Command::Sub(args) => {
            let next = store.sub(&args.key, args.count)?;
            report(&format, "sub", &args.key, Some(next));
            Ok(Outcome::Done)
        }
        Command::Dump => {
            let doc = Value::Object(store.document().as_map().clone());
            println!("{}", serde_json::to_string_pretty(&doc)?);
            Ok(Outcome::Done)
        }
    }
}

/// Interpret a command-line value as JSON, falling back to a plain string.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn cmd_get(store: &Store, key: &str, format: &OutputFormat) -> anyhow::Result<Outcome> {
    let value = store.get(key)?;
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(&value.cloned().unwrap_or(Value::Null))?);
        }
        OutputFormat::Text => match value {
            Some(Value::String(s)) => println!("{s}"),
            Some(other) => println!("{}", serde_json::to_string_pretty(other)?),
            None => eprintln!("{} = {}", key.bold(), "(not set)".dimmed()),
        },
    }
    Ok(if value.is_some() { Outcome::Done } else { Outcome::Absent })
}

fn cmd_has(store: &Store, key: &str, format: &OutputFormat) -> anyhow::Result<Outcome> {
    let present = store.has(key);
    match format {
        OutputFormat::Json => println!("{present}"),
        OutputFormat::Text if present => println!("{} {}", "✓".green(), key.bold()),
        OutputFormat::Text => println!("{} {}", "✗".red(), key.bold()),
    }
    Ok(if present { Outcome::Done } else { Outcome::Absent })
}

fn report(format: &OutputFormat, action: &str, key: &str, value: Option<i64>) {
    match format {
        OutputFormat::Json => {
            let mut out = serde_json::Map::new();
            out.insert("action".into(), action.into());
            out.insert("key".into(), key.into());
            if let Some(value) = value {
                out.insert("value".into(), value.into());
            }
            println!("{}", Value::Object(out));
        }
        OutputFormat::Text => match value {
            Some(value) => println!(
                "{} {} = {}",
                "✓".green().bold(),
                key.bold(),
                value.to_string().cyan()
            ),
            None => println!("{} {} {}", "✓".green().bold(), action, key.bold()),
        },
    }
}
