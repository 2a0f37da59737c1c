//! Inspect command - print header and section table

use crate::config::Config;
use crate::CommonArgs;
use anyhow::{Context, Result};
use clap::Args;
use console::style;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use zkey_core::binfile::BinFileReader;
use zkey_core::constants::{ZKEY_MAGIC, ZKEY_VERSION};
use zkey_core::debug::{fe_to_hex, g1_to_hex, g2_to_hex};
use zkey_core::zkey;

#[derive(Args)]
pub struct InspectArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// zkey file to inspect
    file: PathBuf,
}

pub fn run(config: &Config, args: InspectArgs) -> Result<()> {
    let file = File::open(&args.file).with_context(|| format!("Failed to open {:?}", args.file))?;
    let container = BinFileReader::open(BufReader::new(file), &ZKEY_MAGIC, ZKEY_VERSION)
        .with_context(|| format!("Not a zkey container: {:?}", args.file))?;
    let version = container.version();
    let sections: Vec<(u32, u64)> = container.sections().map(|(id, e)| (id, e.size)).collect();
    drop(container);

    let key = zkey::read(&args.file).with_context(|| format!("Failed to read {:?}", args.file))?;

    if config.json_output {
        let sections: Vec<_> = sections
            .iter()
            .map(|(id, size)| serde_json::json!({ "id": id, "size": size }))
            .collect();
        let summary = serde_json::json!({
            "version": version,
            "protocol": key.protocol.name(),
            "n8q": key.n8q(),
            "q": key.q.to_string(),
            "n8r": key.n8r(),
            "r": key.r.to_string(),
            "nVars": key.n_vars,
            "nPublic": key.n_public,
            "domainSize": key.domain_size,
            "nCoefs": key.ccoefs.len(),
            "sections": sections,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if config.quiet {
        println!(
            "{} nVars={} nPublic={} domainSize={}",
            key.protocol.name(),
            key.n_vars,
            key.n_public,
            key.domain_size
        );
        return Ok(());
    }

    println!("{} {}", style("zkey").cyan().bold(), args.file.display());
    println!();
    println!("  Version:     {}", version);
    println!("  Protocol:    {}", key.protocol.name());
    println!("  q ({} bytes): {}", key.n8q(), fe_to_hex(&key.q));
    println!("  r ({} bytes): {}", key.n8r(), fe_to_hex(&key.r));
    println!("  nVars:       {}", key.n_vars);
    println!("  nPublic:     {}", key.n_public);
    println!("  domainSize:  {}", key.domain_size);
    println!("  ccoefs:      {}", key.ccoefs.len());
    println!();
    println!("  alfa1:  {}", g1_to_hex(&key.alfa1));
    println!("  beta1:  {}", g1_to_hex(&key.beta1));
    println!("  delta1: {}", g1_to_hex(&key.delta1));
    println!("  beta2:  {}", g2_to_hex(&key.beta2));
    println!("  gamma2: {}", g2_to_hex(&key.gamma2));
    println!("  delta2: {}", g2_to_hex(&key.delta2));
    println!();
    println!("  {}", style("Sections").bold());
    for (id, size) in &sections {
        println!("    {:>3}  {:>12} bytes", id, size);
    }

    Ok(())
}
