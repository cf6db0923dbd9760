use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use transmute_engine::Kind;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG: &str = "transmute.toml";

#[derive(Parser)]
#[command(name = "transmute", about = "Plugin asset converter")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert source plugin assets into the target layout
    Convert(ConvertArgs),
}

#[derive(Args, Clone, Debug)]
pub struct ConvertArgs {
    /// Path to the TOML config file
    #[arg(long, env = "TRANSMUTE_CONFIG")]
    pub config: Option<String>,

    /// Overrides `source_dir` from the config file
    #[arg(long, env = "TRANSMUTE_SOURCE")]
    pub source: Option<PathBuf>,

    /// Overrides `output_dir` from the config file
    #[arg(long, env = "TRANSMUTE_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Kinds to convert (items, images, sounds, languages, assets); all when omitted
    #[arg(long = "kind", value_delimiter = ',')]
    pub kinds: Vec<Kind>,

    /// Run kinds one after another on the main thread
    #[arg(long)]
    pub sync: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}
