//! Command-line parsing for the regime signal engine.
//!
//! Argument parsing stays here; dispatch lives in `app`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "regime", version, about = "Market regime signals from macro/market time series")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Score the regime from series CSV files in a data directory.
    Run(RunArgs),
    /// Run the engine on a synthetic scenario (no network, no files needed).
    Demo(DemoArgs),
    /// Download configured series from FRED into a data directory.
    Fetch(FetchArgs),
    /// Write the default engine config to a file.
    Config(ConfigArgs),
}

/// Output options shared by `run` and `demo`.
#[derive(Debug, Parser, Clone)]
pub struct OutputArgs {
    /// Print the full response as JSON instead of the terminal summary.
    #[arg(long)]
    pub json: bool,

    /// Also write the full response as JSON to this file.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,

    /// Skip the correlation and trigger tables.
    #[arg(long)]
    pub brief: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Engine config JSON. Defaults to the built-in model.
    #[arg(short = 'c', long, value_name = "JSON")]
    pub config: Option<PathBuf>,

    /// Directory holding one `<id>.csv` (`date,value`) per dataset.
    #[arg(short = 'd', long, default_value = "data")]
    pub data_dir: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Parser, Clone)]
pub struct DemoArgs {
    /// Random seed for the curve-spread noise.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Scenario length in years.
    #[arg(long, default_value_t = 3)]
    pub years: u32,

    /// Length of one credit cycle in business days.
    #[arg(long, default_value_t = 250)]
    pub cycle_days: usize,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Parser, Clone)]
pub struct FetchArgs {
    /// Engine config JSON. Defaults to the built-in model.
    #[arg(short = 'c', long, value_name = "JSON")]
    pub config: Option<PathBuf>,

    /// Directory to write `<id>.csv` files into.
    #[arg(short = 'd', long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Re-download series even if a CSV already exists.
    #[arg(long)]
    pub refresh: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct ConfigArgs {
    /// Destination file.
    #[arg(short = 'o', long, default_value = "regime.json")]
    pub out: PathBuf,

    /// Overwrite an existing file.
    #[arg(long)]
    pub force: bool,
}
