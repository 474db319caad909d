use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::{ensure_tally_home, tally_home};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub format: OutputFormat,
    /// Write the column header line (CSV only).
    pub header: bool,
    /// Field delimiter (CSV only); must be a single ASCII character.
    pub delimiter: char,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Json,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            format: OutputFormat::Csv,
            header: true,
            delimiter: ',',
        }
    }
}

impl OutputSection {
    pub fn delimiter_byte(&self) -> Result<u8> {
        if !self.delimiter.is_ascii() {
            bail!("delimiter must be a single ASCII character, got {:?}", self.delimiter);
        }
        Ok(self.delimiter as u8)
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(tally_home()?.join("config.toml"))
}

/// Load the config at `path`, or the default location. A missing file means
/// defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let p = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };
    if !p.exists() {
        log::debug!("no config at {}, using defaults", p.display());
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn parse_config(s: &str) -> Result<Config> {
    let cfg: Config = toml::from_str(s)?;
    cfg.output.delimiter_byte()?;
    Ok(cfg)
}

pub fn init_config(path: Option<&Path>) -> Result<()> {
    let p = match path {
        Some(p) => p.to_path_buf(),
        None => ensure_tally_home()?.join("config.toml"),
    };
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let s = toml::to_string_pretty(&Config::default()).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(parse_config("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_output_section() {
        let cfg = parse_config("[output]\nformat = \"json\"\n").unwrap();
        assert_eq!(cfg.output.format, OutputFormat::Json);
        assert!(cfg.output.header);
        assert_eq!(cfg.output.delimiter, ',');
    }

    #[test]
    fn test_rejects_non_ascii_delimiter() {
        assert!(parse_config("[output]\ndelimiter = \"§\"\n").is_err());
    }

    #[test]
    fn test_default_roundtrips_through_toml() {
        let s = toml::to_string_pretty(&Config::default()).unwrap();
        assert_eq!(parse_config(&s).unwrap(), Config::default());
    }
}
