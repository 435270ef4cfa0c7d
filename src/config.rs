use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::provider::digitalocean::DIGITALOCEAN_API_BASE;

/// Overrides `digitalocean.api_token` when set.
pub const TOKEN_ENV_VAR: &str = "DIGITALOCEAN_TOKEN";

const MIN_RECORD_TTL: u32 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub digitalocean: DigitalOceanConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DigitalOceanConfig {
    #[serde(default)]
    pub api_token: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_record_ttl")]
    pub record_ttl: u32,
    /// No timeout when absent.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_api_base() -> String {
    DIGITALOCEAN_API_BASE.to_string()
}

fn default_record_ttl() -> u32 {
    60
}

impl Default for DigitalOceanConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            api_base: default_api_base(),
            record_ttl: default_record_ttl(),
            timeout_secs: None,
        }
    }
}

impl DigitalOceanConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
            config.apply_token_override(&token);
        }
        config.validate()?;

        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn apply_token_override(&mut self, token: &str) {
        let token = token.trim();
        if !token.is_empty() {
            self.digitalocean.api_token = token.to_string();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.digitalocean.api_token.trim().is_empty() {
            bail!(
                "DigitalOcean API token is not configured (set digitalocean.api_token or {})",
                TOKEN_ENV_VAR
            );
        }
        if self.digitalocean.record_ttl < MIN_RECORD_TTL {
            bail!(
                "digitalocean.record_ttl must be at least {} seconds, got {}",
                MIN_RECORD_TTL,
                self.digitalocean.record_ttl
            );
        }
        Ok(())
    }
}
