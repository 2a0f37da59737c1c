//! Export command - zkey to JSON

use crate::config::Config;
use crate::json::ZKeyJson;
use crate::CommonArgs;
use anyhow::{Context, Result};
use clap::Args;
use console::style;
use std::fs;
use std::path::PathBuf;
use zkey_core::zkey;

#[derive(Args)]
pub struct ExportJsonArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// zkey file to export
    file: PathBuf,

    /// Write JSON here instead of stdout
    #[arg(short = 'o', long = "out")]
    out: Option<PathBuf>,
}

pub fn run(config: &Config, args: ExportJsonArgs) -> Result<()> {
    let key = zkey::read(&args.file).with_context(|| format!("Failed to read {:?}", args.file))?;
    let text = serde_json::to_string_pretty(&ZKeyJson::from(&key))?;

    match &args.out {
        Some(out) => {
            fs::write(out, text).with_context(|| format!("Failed to write {:?}", out))?;
            log::debug!("exported {} coefficients", key.ccoefs.len());
            if !config.quiet && !config.json_output {
                println!(
                    "{} Exported {} to {}",
                    style("✓").green().bold(),
                    args.file.display(),
                    out.display()
                );
            }
        }
        None => println!("{}", text),
    }

    Ok(())
}
