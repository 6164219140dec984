use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "jdb",
    about = "jdb — dotted-key store over a single JSON file",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Document file to operate on
    #[arg(short, long, global = true, env = "JDB_FILE", default_value = "jdb.json")]
    pub file: PathBuf,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Rewrite the file in place instead of write-then-rename
    #[arg(long, global = true)]
    pub in_place: bool,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the value at a key
    Get(KeyArgs),
    /// Set a key to a value (parsed as JSON, else taken as a string)
    Set(ValueArgs),
    /// Remove a key
    Delete(KeyArgs),
    /// Append a value to the list at a key
    Push(ValueArgs),
    /// Exit 0 if a key is present, 1 otherwise
    Has(KeyArgs),
    /// Add to the integer at a key
    Add(CountArgs),
    /// Subtract from the integer at a key
    Sub(CountArgs),
    /// Print the whole document
    Dump,
}

#[derive(Args)]
pub struct KeyArgs {
    pub key: String,
}

#[derive(Args)]
pub struct ValueArgs {
    pub key: String,
    pub value: String,
}

#[derive(Args)]
pub struct CountArgs {
    pub key: String,
    #[arg(allow_negative_numbers = true, default_value = "1")]
    pub count: i64,
}
