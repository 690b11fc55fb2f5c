//! TOML configuration.
//!
//! ```toml
//! [registry]
//! base_url = "http://localhost:8081"
//! api_prefix = "/api"        # optional
//!
//! [logging]
//! filter = "info"            # optional; RUST_LOG takes precedence
//! ```

use anyhow::{bail, Context, Result};
use reqwest::Url;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub registry: RegistryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RegistryConfig {
    /// Scheme, host, and port of the registry service.
    pub base_url: String,
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
}

fn default_api_prefix() -> String {
    "/api".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Config {
    /// Defaults for everything except the registry location.
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            registry: RegistryConfig {
                base_url: base_url.into(),
                api_prefix: default_api_prefix(),
            },
            logging: LoggingConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.registry.base_url)
            .with_context(|| format!("registry.base_url is not a URL: {}", self.registry.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!(
                "registry.base_url must use http or https, got '{}'",
                url.scheme()
            );
        }

        if self.logging.filter.trim().is_empty() {
            bail!("logging.filter must not be empty");
        }
        tracing_subscriber::EnvFilter::try_new(&self.logging.filter)
            .with_context(|| format!("logging.filter is invalid: {}", self.logging.filter))?;

        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.validate()?;

    Ok(config)
}
