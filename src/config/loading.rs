//! Configuration loading from files and environment variables
//!
//! The pool list is read from a JSON or TOML file. Indexed environment
//! variables take precedence for container deployments.

use anyhow::{Context, Result};
use std::path::Path;

use super::types::{Config, PoolConfig};
use crate::types::{PoolAddress, Protocol, StatusPath};

/// On-disk format of the pool list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// A bare array of pools, or an object with a `pools` array
    Json,
    /// `[[pools]]` tables
    Toml,
}

impl ConfigFormat {
    /// Pick the format from the file extension; anything but `.toml` is JSON
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Json,
        }
    }
}

/// Parse a pool list from its textual form
///
/// JSON accepts both the plain array form
/// `[{"protocol": "tcp", "address": "127.0.0.1:9001", "location": "/status"}]`
/// and an object `{"pools": [...], "fcgi_timeout": 5}`.
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<Config> {
    let config = match format {
        ConfigFormat::Json if content.trim_start().starts_with('[') => Config {
            pools: serde_json::from_str::<Vec<PoolConfig>>(content)?,
            ..Default::default()
        },
        ConfigFormat::Json => serde_json::from_str::<Config>(content)?,
        ConfigFormat::Toml => toml::from_str::<Config>(content)?,
    };
    Ok(config)
}

/// Load pools from indexed environment variables
///
/// - `FPM_POOL_0_ADDRESS` (required, stops the scan when absent)
/// - `FPM_POOL_0_PROTOCOL` (default: tcp)
/// - `FPM_POOL_0_LOCATION` (default: /status)
///
/// Returns `Ok(None)` when no pool variables are set.
pub fn load_pools_from_env() -> Result<Option<Vec<PoolConfig>>> {
    load_pools_with(|key| std::env::var(key).ok())
}

fn load_pools_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Option<Vec<PoolConfig>>> {
    let mut pools = Vec::new();

    for index in 0.. {
        let address_key = format!("FPM_POOL_{}_ADDRESS", index);
        let Some(address) = lookup(&address_key) else {
            break;
        };
        let address =
            PoolAddress::new(address).with_context(|| format!("Invalid {}", address_key))?;

        let protocol_key = format!("FPM_POOL_{}_PROTOCOL", index);
        let protocol = match lookup(&protocol_key) {
            Some(p) => p
                .parse::<Protocol>()
                .with_context(|| format!("Invalid {}", protocol_key))?,
            None => super::defaults::protocol(),
        };

        let location_key = format!("FPM_POOL_{}_LOCATION", index);
        let location = match lookup(&location_key) {
            Some(l) => StatusPath::new(l).with_context(|| format!("Invalid {}", location_key))?,
            None => super::defaults::location(),
        };

        pools.push(PoolConfig::new(protocol, address, location));
    }

    if pools.is_empty() {
        Ok(None)
    } else {
        Ok(Some(pools))
    }
}

/// Load configuration from a file, with environment variable overrides
///
/// Pools from `FPM_POOL_N_*` variables replace the file's pools entirely.
/// The result is validated before it is returned.
pub fn load_config(config_path: impl AsRef<Path>) -> Result<Config> {
    load_config_with(config_path.as_ref(), |key| std::env::var(key).ok())
}

fn load_config_with(path: &Path, lookup: impl Fn(&str) -> Option<String>) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;

    let mut config = parse_config(&content, ConfigFormat::from_path(path))
        .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;

    if let Some(env_pools) = load_pools_with(lookup)? {
        tracing::info!(
            "Using {} pool(s) from environment variables (overriding config file)",
            env_pools.len()
        );
        config.pools = env_pools;
    }

    config.validate()?;

    Ok(config)
}
