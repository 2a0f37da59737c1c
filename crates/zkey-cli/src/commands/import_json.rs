//! Import command - JSON to zkey

use crate::config::Config;
use crate::json::ZKeyJson;
use crate::CommonArgs;
use anyhow::{Context, Result};
use clap::Args;
use console::style;
use std::fs;
use std::path::PathBuf;
use zkey_core::{zkey, ProvingKey, WriteOptions};

#[derive(Args)]
pub struct ImportJsonArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// JSON key to import
    input: PathBuf,

    /// zkey file to create
    output_file: PathBuf,

    /// Write public C points as infinity instead of failing
    #[arg(long)]
    lenient: bool,
}

pub fn run(config: &Config, args: ImportJsonArgs) -> Result<()> {
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {:?}", args.input))?;
    let json: ZKeyJson = serde_json::from_str(&text).context("Invalid zkey JSON")?;
    let key = ProvingKey::try_from(&json).context("Invalid proving key")?;

    let options = WriteOptions {
        strict_public_c: config.strict_public_c && !args.lenient,
    };
    zkey::write_with(&args.output_file, &key, &options)
        .with_context(|| format!("Failed to write {:?}", args.output_file))?;

    if config.json_output {
        let summary = serde_json::json!({
            "output": args.output_file.display().to_string(),
            "nVars": key.n_vars,
            "nPublic": key.n_public,
        });
        println!("{}", summary);
    } else if !config.quiet {
        println!(
            "{} Wrote {} (nVars={}, nPublic={})",
            style("✓").green().bold(),
            args.output_file.display(),
            key.n_vars,
            key.n_public
        );
    }

    Ok(())
}
