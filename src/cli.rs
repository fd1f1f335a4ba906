use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Capture-recapture history simulator.
#[derive(Parser)]
#[command(
    name = "recap",
    version,
    about = "Simulate capture-recapture histories from hidden Markov models"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Simulate histories for a capture dataset and write them to Parquet.
    Simulate(SimulateArgs),
    /// Compute and validate a model's matrices against a dataset.
    Check(CheckArgs),
}

/// Arguments for the `simulate` subcommand.
#[derive(clap::Args)]
pub struct SimulateArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "recap.toml")]
    pub config: PathBuf,

    /// Override input Parquet path from config.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Override output Parquet path from config.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override global RNG seed from config.
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Override the model name from config.
    #[arg(short, long)]
    pub model: Option<String>,
}

/// Arguments for the `check` subcommand.
#[derive(clap::Args)]
pub struct CheckArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "recap.toml")]
    pub config: PathBuf,

    /// Override input Parquet path from config.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Override the model name from config.
    #[arg(short, long)]
    pub model: Option<String>,
}
