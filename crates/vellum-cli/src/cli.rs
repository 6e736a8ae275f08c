use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use vellum_diff::DiffAlgorithm;

#[derive(Parser)]
#[command(
    name = "vellum",
    about = "Vellum: inline structural diffs for rich-text documents",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge two document snapshots into one annotated document
    Diff(DiffArgs),
    /// Check that a snapshot parses under the schema
    Validate(ValidateArgs),
    /// Print the active schema
    Schema(SchemaArgs),
}

#[derive(Args)]
pub struct DiffArgs {
    /// The old snapshot (interchange JSON)
    pub old: PathBuf,
    /// The new snapshot (interchange JSON)
    pub new: PathBuf,
    /// Diff configuration (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Schema (JSON or TOML); the built-in rich-text schema by default
    #[arg(long)]
    pub schema: Option<PathBuf>,
    /// Keep style marks on sentences that sit inside one source text node
    #[arg(long)]
    pub preserve_marks: bool,
    /// Override the configured sentence diff algorithm
    #[arg(long)]
    pub algorithm: Option<AlgorithmArg>,
}

#[derive(Args)]
pub struct ValidateArgs {
    pub file: PathBuf,
    #[arg(long)]
    pub schema: Option<PathBuf>,
}

#[derive(Args)]
pub struct SchemaArgs {
    #[arg(long)]
    pub schema: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum AlgorithmArg {
    Myers,
    Patience,
    Lcs,
}

impl From<AlgorithmArg> for DiffAlgorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Myers => DiffAlgorithm::Myers,
            AlgorithmArg::Patience => DiffAlgorithm::Patience,
            AlgorithmArg::Lcs => DiffAlgorithm::Lcs,
        }
    }
}
