use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "shapediff",
    about = "Structural diff of JSON documents",
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
    /// Compare two documents requiring identical types
    Strict(StrictArgs),
    /// Compare two documents by shape
    Similar(SimilarArgs),
}

#[derive(Args)]
pub struct StrictArgs {
    /// Expected document
    pub a: PathBuf,
    /// Actual document
    pub b: PathBuf,
}

#[derive(Args)]
pub struct SimilarArgs {
    /// Expected document
    pub a: PathBuf,
    /// Actual document
    pub b: PathBuf,
    /// Ignore the order of array elements
    #[arg(short, long)]
    pub unordered: bool,
}
