//! Configuration handling for the zkey CLI
//!
//! Priority: CLI flags > environment variables > config file > defaults

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf};

use crate::{CommonArgs, OutputFormat};

/// Resolved configuration for CLI commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub json_output: bool,
    pub quiet: bool,
    /// Reject keys with finite public C points when writing
    pub strict_public_c: bool,
}

impl Config {
    /// Load configuration from file, environment, and CLI args
    pub fn load(common: &CommonArgs) -> Result<Self> {
        let file_config = match &common.config {
            // An explicit path must exist
            Some(path) => Some(ConfigFile::load(path)?),
            None => config_file_path()
                .filter(|p| p.exists())
                .map(|p| ConfigFile::load(&p))
                .transpose()?,
        };
        Ok(Self::resolve(common, file_config.as_ref()))
    }

    fn resolve(common: &CommonArgs, file: Option<&ConfigFile>) -> Self {
        let output = common
            .output
            .or_else(|| file.and_then(ConfigFile::output))
            .unwrap_or(OutputFormat::Human);
        let strict_public_c = file.and_then(|f| f.strict_public_c).unwrap_or(true);

        Self {
            json_output: output == OutputFormat::Json,
            quiet: common.quiet,
            strict_public_c,
        }
    }
}

/// Configuration file structure
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    output: Option<String>,
    strict_public_c: Option<bool>,
}

impl ConfigFile {
    fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        Self::parse(&content).with_context(|| format!("Invalid config file {:?}", path))
    }

    fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn output(&self) -> Option<OutputFormat> {
        match self.output.as_deref() {
            Some("json") => Some(OutputFormat::Json),
            Some("human") => Some(OutputFormat::Human),
            Some(other) => {
                log::warn!("Ignoring unknown output format {:?} in config", other);
                None
            }
            None => None,
        }
    }
}

/// Get config file path
fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("zkey").join("config.toml"))
}
