//! zkey CLI - inspect and convert Groth16 zkey files
//!
//! Commands read and write the binary container through `zkey-core`;
//! JSON uses the snarkjs field names with decimal strings.

mod commands;
mod config;
mod json;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use commands::{export_json, import_json, inspect};
use console::style;
use std::path::PathBuf;

/// Inspect and convert Groth16 zkey proving keys
#[derive(Parser)]
#[command(name = "zkey")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Common options shared across commands
#[derive(Args, Clone)]
pub struct CommonArgs {
    /// Output format (human, json)
    #[arg(long, env = "ZKEY_OUTPUT")]
    pub output: Option<OutputFormat>,

    /// Config file (defaults to <config dir>/zkey/config.toml)
    #[arg(long, env = "ZKEY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the header and section table of a zkey file
    Inspect(inspect::InspectArgs),

    /// Convert a zkey file to JSON
    ExportJson(export_json::ExportJsonArgs),

    /// Build a zkey file from JSON
    ImportJson(import_json::ImportJsonArgs),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Inspect(args) => {
            let config = config::Config::load(&args.common)?;
            inspect::run(&config, args)
        }
        Commands::ExportJson(args) => {
            let config = config::Config::load(&args.common)?;
            export_json::run(&config, args)
        }
        Commands::ImportJson(args) => {
            let config = config::Config::load(&args.common)?;
            import_json::run(&config, args)
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
