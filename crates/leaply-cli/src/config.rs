use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::cli::OutputFormat;

pub const KEYS: [&str; 3] = ["server", "format", "stale_secs"];

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ProfileConfig {
    pub server: Option<String>,
    pub format: Option<String>,
    /// Seconds a fetched list counts as fresh.
    pub stale_secs: Option<u64>,
}

impl ProfileConfig {
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "server" => self.server = Some(value.to_string()),
            "format" => {
                OutputFormat::from_str(value, true)
                    .map_err(|_| anyhow::anyhow!("Invalid format: {value}. Expected table or json"))?;
                self.format = Some(value.to_lowercase());
            }
            "stale_secs" => {
                let secs = value
                    .parse()
                    .with_context(|| format!("Invalid stale_secs: {value}"))?;
                self.stale_secs = Some(secs);
            }
            other => anyhow::bail!("Unknown config key: {other}. Valid keys: {}", KEYS.join(", ")),
        }
        Ok(())
    }

    pub fn output_format(&self) -> OutputFormat {
        self.format
            .as_deref()
            .and_then(|f| OutputFormat::from_str(f, true).ok())
            .unwrap_or_default()
    }

    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_secs.unwrap_or(0))
    }
}

pub type ConfigFile = HashMap<String, ProfileConfig>;

fn config_dir() -> Result<PathBuf> {
    let dir = dirs::home_dir()
        .context("Cannot determine home directory")?
        .join(".leaply");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

pub fn load_all() -> Result<ConfigFile> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(ConfigFile::new());
    }
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Invalid config file {}", path.display()))
}

pub fn load_profile(profile: &str) -> Result<ProfileConfig> {
    Ok(load_all()?.remove(profile).unwrap_or_default())
}

pub fn save_profile(profile: &str, config: &ProfileConfig) -> Result<()> {
    let mut all = load_all()?;
    all.insert(profile.to_string(), config.clone());
    let content = toml::to_string_pretty(&all)?;
    fs::write(config_path()?, content)?;
    Ok(())
}

pub fn resolve_server(cli_server: Option<&str>, config: &ProfileConfig) -> Result<String> {
    // 1. --server flag / LEAPLY_URL env
    if let Some(s) = cli_server {
        return Ok(s.to_string());
    }
    // 2. config.toml profile
    if let Some(s) = &config.server {
        return Ok(s.clone());
    }
    anyhow::bail!(
        "No server URL configured. Use --server, set LEAPLY_URL env var, or run: leaply-admin config set server <url>"
    )
}
