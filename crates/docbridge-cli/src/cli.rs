use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "docbridge",
    about = "Admin CRUD protocol over document and blob stores",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Adapter configuration (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run one protocol operation
    Run(RunArgs),
    /// Run a JSON list of operations in order
    Script(ScriptArgs),
    /// List configured resources
    Resources,
}

/// In-memory store contents to start from and where to write them back.
#[derive(Args, Clone, Debug, Default)]
pub struct StoreArgs {
    /// JSON object mapping collection paths to arrays of documents
    #[arg(long)]
    pub fixtures: Option<PathBuf>,
    /// Write the final store contents here as JSON
    #[arg(long)]
    pub save: Option<PathBuf>,
}

#[derive(Args)]
pub struct RunArgs {
    /// Operation tag, e.g. GET_LIST or get-one
    pub operation: String,
    pub resource: String,
    /// Operation params as JSON
    #[arg(short, long, default_value = "{}")]
    pub params: String,
    /// Attach a file to an upload field: FIELD=PATH
    #[arg(long = "file", value_name = "FIELD=PATH")]
    pub files: Vec<String>,
    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Args)]
pub struct ScriptArgs {
    /// JSON array of {"operation", "resource", "params"} steps
    pub path: PathBuf,
    /// Keep going after a failed step
    #[arg(long)]
    pub keep_going: bool,
    #[command(flatten)]
    pub store: StoreArgs,
}
