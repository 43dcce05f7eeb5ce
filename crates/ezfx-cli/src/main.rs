//! ezfx CLI - offline host for the ezfx EQ + reverb chain.

mod commands;
mod wav;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ezfx")]
#[command(author, version, about = "ezfx EQ + reverb CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a WAV file through the EQ and reverb
    Process(commands::process::ProcessArgs),

    /// Generate test signals
    Generate(commands::generate::GenerateArgs),

    /// List parameters with ranges and defaults
    Params(commands::params::ParamsArgs),

    /// Write the effective settings as a TOML preset
    Preset(commands::preset::PresetArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process(args) => commands::process::run(args),
        Commands::Generate(args) => commands::generate::run(args),
        Commands::Params(args) => commands::params::run(args),
        Commands::Preset(args) => commands::preset::run(args),
    }
}
